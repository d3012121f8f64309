use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use super::parameter_set::ParameterSet;

/// Assembled data keyed by UTC hour, then location index.
pub type UtcDataset = BTreeMap<NaiveDateTime, BTreeMap<usize, ParameterSet>>;

/// Final output keyed by location index, then local hour.
pub type HourlyProfile = BTreeMap<usize, LocalSeries>;

/// One location's hours keyed by local time.
pub type LocalSeries = BTreeMap<NaiveDateTime, ParameterSet>;
