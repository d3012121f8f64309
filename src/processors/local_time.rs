use chrono::{Duration, NaiveDateTime};
use std::path::Path;

use crate::error::{ProfileError, Result};
use crate::models::{HourlyProfile, ParseWindow, UtcDataset};

/// Shift a UTC hour by a fractional-hour offset.
pub fn to_local(time: NaiveDateTime, utc_offset: f64) -> NaiveDateTime {
    time + Duration::seconds((utc_offset * 3600.0).round() as i64)
}

/// Re-key a gap-filled dataset by location, then local time.
///
/// Every hour of the window must be present; a hole here means an earlier
/// stage went wrong.
pub fn reindex_to_local(
    mut dataset: UtcDataset,
    window: &ParseWindow,
    path: &Path,
) -> Result<HourlyProfile> {
    let mut profile = HourlyProfile::new();

    for hour in window.hours() {
        let locations = dataset.remove(&hour).ok_or_else(|| ProfileError::MissingHour {
            time: hour,
            path: path.to_path_buf(),
        })?;

        for (location, params) in locations {
            let local = to_local(hour, params.utc_offset);
            profile.entry(location).or_default().insert(local, params);
        }
    }

    Ok(profile)
}
