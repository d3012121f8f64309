use tracing::debug;

use crate::error::{ProfileError, Result};
use crate::models::{ParseWindow, UtcDataset};

/// Restrict the dataset to the window and give it one entry per hour.
///
/// Profiles are often 3- or 6-hourly. Each missing hour gets a copy of the
/// nearest hour originally present; ties go to the earlier hour.
pub fn fill_hourly_gaps(mut dataset: UtcDataset, window: &ParseWindow) -> Result<UtcDataset> {
    dataset.retain(|time, _| window.contains(*time));

    let originals: Vec<_> = dataset.keys().copied().collect();
    if originals.is_empty() {
        return Err(ProfileError::NoDataInWindow {
            start: window.start(),
            end: window.end(),
        });
    }

    let mut filled = 0;
    for hour in window.hours() {
        if dataset.contains_key(&hour) {
            continue;
        }

        let nearest = originals
            .iter()
            .min_by_key(|time| (hour - **time).num_seconds().abs())
            .copied()
            .ok_or(ProfileError::NoDataInWindow {
                start: window.start(),
                end: window.end(),
            })?;

        let copy = dataset[&nearest].clone();
        dataset.insert(hour, copy);
        filled += 1;
    }

    debug!(
        "Filled {} of {} hours from {} original hours",
        filled,
        dataset.len(),
        originals.len()
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Field, ParameterSet, Value};
    use chrono::{NaiveDate, NaiveDateTime};
    use std::collections::BTreeMap;

    fn hour(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 5, 30)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn marked(label: &str) -> BTreeMap<usize, ParameterSet> {
        let mut params = ParameterSet::new(37.0, -121.0, -7.0);
        params.insert("PRSS", Field::Scalar(Value::raw(label)));
        BTreeMap::from([(0, params)])
    }

    fn label(dataset: &UtcDataset, h: u32) -> Value {
        dataset[&hour(h)][&0].first_value("PRSS").unwrap().clone()
    }

    #[test]
    fn test_three_hourly_data_spread() {
        let data: UtcDataset = [(hour(0), marked("0")), (hour(3), marked("3")), (hour(6), marked("6"))]
            .into_iter()
            .collect();
        let window = ParseWindow::new(hour(0), hour(0), hour(6)).unwrap();

        let filled = fill_hourly_gaps(data, &window).unwrap();
        assert_eq!(filled.len(), 7);
        assert_eq!(label(&filled, 1), Value::raw("0"));
        assert_eq!(label(&filled, 2), Value::raw("3"));
        assert_eq!(label(&filled, 4), Value::raw("3"));
        assert_eq!(label(&filled, 5), Value::raw("6"));
    }

    #[test]
    fn test_tie_goes_to_earlier_hour() {
        let data: UtcDataset = [(hour(0), marked("0")), (hour(2), marked("2"))].into_iter().collect();
        let window = ParseWindow::new(hour(0), hour(0), hour(2)).unwrap();

        let filled = fill_hourly_gaps(data, &window).unwrap();
        assert_eq!(label(&filled, 1), Value::raw("0"));
    }

    #[test]
    fn test_hours_outside_window_dropped() {
        let data: UtcDataset = [(hour(0), marked("0")), (hour(5), marked("5")), (hour(9), marked("9"))]
            .into_iter()
            .collect();
        let window = ParseWindow::new(hour(0), hour(4), hour(6)).unwrap();

        let filled = fill_hourly_gaps(data, &window).unwrap();
        assert_eq!(filled.keys().copied().collect::<Vec<_>>(), vec![hour(4), hour(5), hour(6)]);
        assert_eq!(label(&filled, 4), Value::raw("5"));
        assert_eq!(label(&filled, 6), Value::raw("5"));
    }

    #[test]
    fn test_empty_window_is_an_error() {
        let data: UtcDataset = [(hour(0), marked("0"))].into_iter().collect();
        let window = ParseWindow::new(hour(0), hour(4), hour(6)).unwrap();
        assert!(matches!(
            fill_hourly_gaps(data, &window),
            Err(ProfileError::NoDataInWindow { .. })
        ));
    }
}
