use tracing::debug;

use crate::error::Result;
use crate::models::{Field, ParameterSet, UtcDataset, Value};
use crate::utils::constants::{PRESSURE, PRESSURE_AT_SURFACE};

/// Drop pressure levels that lie below the ground.
///
/// Applies per hour and location only when the surface pressure falls within
/// the level pressures. Every multi-level sequence then starts at the first
/// level whose pressure is below the surface pressure, with its kept values
/// coerced to numbers.
pub fn strip_below_ground_levels(mut dataset: UtcDataset) -> Result<UtcDataset> {
    let mut stripped = 0;

    for locations in dataset.values_mut() {
        for params in locations.values_mut() {
            if let Some(index) = surface_index(params)? {
                truncate_levels(params, index)?;
                stripped += 1;
            }
        }
    }

    debug!("Stripped below-ground levels from {} profiles", stripped);
    Ok(dataset)
}

/// Index of the first level above the surface, when stripping applies.
fn surface_index(params: &ParameterSet) -> Result<Option<usize>> {
    let surface = match params.first_value(PRESSURE_AT_SURFACE) {
        Some(value) => value.to_f64()?,
        None => None,
    };
    let (Some(surface), Some(levels)) = (surface, params.levels(PRESSURE)) else {
        return Ok(None);
    };

    let (Some(bottom), Some(top)) = (levels.first(), levels.last()) else {
        return Ok(None);
    };
    let (Some(bottom), Some(top)) = (bottom.to_f64()?, top.to_f64()?) else {
        return Ok(None);
    };

    if surface > bottom || surface < top {
        return Ok(None);
    }

    for (index, level) in levels.iter().enumerate() {
        if matches!(level.to_f64()?, Some(pressure) if pressure < surface) {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn truncate_levels(params: &mut ParameterSet, index: usize) -> Result<()> {
    for field in params.fields.values_mut() {
        if let Field::Levels(values) = field {
            if values.len() > 1 {
                let kept = values
                    .drain(..)
                    .skip(index)
                    .map(Value::coerce)
                    .collect::<Result<Vec<_>>>()?;
                *values = kept;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn levels(values: &[&str]) -> Field {
        Field::Levels(values.iter().map(|v| Value::raw(*v)).collect())
    }

    fn dataset(surface: &str, pressure: &[&str], temp: &[&str]) -> UtcDataset {
        let mut params = ParameterSet::new(37.0, -121.0, -7.0);
        params.insert(PRESSURE_AT_SURFACE, levels(&[surface]));
        params.insert("PRSS", levels(&["996"]));
        params.insert(PRESSURE, levels(pressure));
        params.insert("TEMP", levels(temp));

        let time = NaiveDate::from_ymd_opt(2014, 5, 30)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        BTreeMap::from([(time, BTreeMap::from([(0, params)]))])
    }

    fn only(dataset: &UtcDataset) -> &ParameterSet {
        dataset.values().next().unwrap().values().next().unwrap()
    }

    #[test]
    fn test_levels_below_surface_removed() {
        let data = dataset(
            "979",
            &["1000", "990", "976", "968", "956"],
            &["20.0", "19.0", "18.0", "17.0", "16.0"],
        );
        let stripped = strip_below_ground_levels(data).unwrap();
        let params = only(&stripped);

        assert_eq!(
            params.levels(PRESSURE).unwrap(),
            &[Value::Number(976.0), Value::Number(968.0), Value::Number(956.0)]
        );
        assert_eq!(params.levels("TEMP").unwrap().len(), 3);
        assert_eq!(params.levels("TEMP").unwrap()[0], Value::Number(18.0));
        // single-element surface sequences are left alone
        assert_eq!(params.levels("PRSS").unwrap(), &[Value::raw("996")]);
    }

    #[test]
    fn test_every_level_field_keeps_pressure_length() {
        let mut data = dataset(
            "979",
            &["1000", "990", "976", "968", "956"],
            &["20.0", "19.0", "18.0", "17.0", "16.0"],
        );
        for locations in data.values_mut() {
            for params in locations.values_mut() {
                params.insert("UWND", levels(&["1.1", "1.3", "1.6", "1.9", "2.2"]));
                params.insert("SPHU", levels(&["6.1", "5.9", "5.5", "5.2", "4.9"]));
                params.insert(
                    "WDIR",
                    Field::Levels(vec![
                        Value::raw("250"),
                        Value::Missing,
                        Value::raw("252"),
                        Value::Missing,
                        Value::raw("254"),
                    ]),
                );
            }
        }

        let stripped = strip_below_ground_levels(data).unwrap();
        let params = only(&stripped);
        let expected = params.levels(PRESSURE).unwrap().len();
        assert_eq!(expected, 3);

        for (name, field) in &params.fields {
            if let Field::Levels(values) = field {
                if name != PRESSURE_AT_SURFACE && name != "PRSS" {
                    assert_eq!(values.len(), expected, "{} has a different length", name);
                }
            }
        }
        assert_eq!(
            params.levels("WDIR").unwrap(),
            &[Value::Number(252.0), Value::Missing, Value::Number(254.0)]
        );
    }

    #[test]
    fn test_zero_surface_pressure_untouched() {
        let data = dataset("0", &["993", "984", "975"], &["31.0", "29.5", "27.0"]);
        let stripped = strip_below_ground_levels(data.clone()).unwrap();
        assert_eq!(stripped, data);
    }

    #[test]
    fn test_missing_bounds_untouched() {
        let mut data = dataset("979", &["1000", "990", "976"], &["20.0", "19.0", "18.0"]);
        for locations in data.values_mut() {
            for params in locations.values_mut() {
                params.insert(
                    PRESSURE,
                    Field::Levels(vec![Value::Missing, Value::raw("990"), Value::raw("976")]),
                );
            }
        }
        let stripped = strip_below_ground_levels(data.clone()).unwrap();
        assert_eq!(stripped, data);
    }

    #[test]
    fn test_surface_equal_to_top_level_has_no_index() {
        let data = dataset("976", &["1000", "990", "976"], &["20.0", "19.0", "18.0"]);
        let stripped = strip_below_ground_levels(data.clone()).unwrap();
        assert_eq!(stripped, data);
    }
}
