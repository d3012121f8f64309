use chrono::{NaiveDateTime, Timelike};
use tracing::{debug, warn};

use crate::models::{Field, UtcDataset, Value};
use crate::utils::constants::FIRST_HOUR_KEYS;

fn is_zero(value: Option<&Value>) -> bool {
    matches!(value.map(Value::to_f64), Some(Ok(Some(v))) if v == 0.0)
}

/// Backfill surface values the profiler zeroes out at the first hour.
///
/// A location counts as zeroed when both `PRSS` and `T02M` read exactly 0.
/// Its surface keys are copied from the earliest later hour (1 to 23) of the
/// same date that has data for the location.
pub fn fix_first_hour(mut dataset: UtcDataset, first: NaiveDateTime) -> UtcDataset {
    let later_hours: Vec<NaiveDateTime> = (1..=23)
        .filter(|hour| *hour != first.hour())
        .filter_map(|hour| first.date().and_hms_opt(hour, 0, 0))
        .collect();

    let zeroed: Vec<usize> = match dataset.get(&first) {
        Some(locations) => locations
            .iter()
            .filter(|(_, params)| {
                is_zero(params.first_value("PRSS")) && is_zero(params.first_value("T02M"))
            })
            .map(|(location, _)| *location)
            .collect(),
        None => return dataset,
    };

    for location in zeroed {
        let replacements: Option<Vec<(&'static str, Field)>> = later_hours
            .iter()
            .find_map(|hour| dataset.get(hour).and_then(|locations| locations.get(&location)))
            .map(|donor| {
                FIRST_HOUR_KEYS
                    .iter()
                    .filter_map(|key| donor.get(key).map(|field| (*key, field.clone())))
                    .collect()
            });

        let Some(replacements) = replacements else {
            warn!(
                "First hour {} is zeroed for location {} but no later hour on that date has data for it",
                first, location
            );
            continue;
        };

        if let Some(params) = dataset
            .get_mut(&first)
            .and_then(|locations| locations.get_mut(&location))
        {
            debug!(
                "Backfilling {} surface fields for location {} at {}",
                replacements.len(),
                location,
                first
            );
            for (key, field) in replacements {
                params.insert(key, field);
            }
        }
    }

    dataset
}
