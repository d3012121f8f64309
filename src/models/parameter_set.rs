use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::{Field, Value};

/// Parsed state for one (timestamp, location) pair.
///
/// Variable names come from the file's header rows (`PRSS`, `TEMP`, ...) plus
/// the synthesized `pressure` and `pressure_at_surface` columns and the fields
/// added during post-processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub lat: f64,
    pub lng: f64,
    pub utc_offset: f64,

    #[serde(flatten)]
    pub fields: BTreeMap<String, Field>,
}

impl ParameterSet {
    pub fn new(lat: f64, lng: f64, utc_offset: f64) -> Self {
        Self {
            lat,
            lng,
            utc_offset,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, field: Field) {
        self.fields.insert(name.into(), field);
    }

    pub fn remove(&mut self, name: &str) -> Option<Field> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Per-level values of a variable, if it is a sequence.
    pub fn levels(&self, name: &str) -> Option<&[Value]> {
        self.fields.get(name).and_then(Field::levels)
    }

    /// First reading of a variable, whether scalar or sequence.
    pub fn first_value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).and_then(Field::first)
    }

    /// Number of pressure levels in this hour.
    pub fn level_count(&self) -> usize {
        self.levels("pressure").map_or(0, <[Value]>::len)
    }
}
