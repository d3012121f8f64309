use tracing::debug;

use crate::error::Result;
use crate::models::{Field, ParameterSet, ParseWindow, UtcDataset, Value};
use crate::utils::constants::{
    BOUNDARY_LAYER_HEIGHT, DEW_POINT, ENSURED_KEYS, HEIGHT, PRESSURE, RELATIVE_HUMIDITY,
    SCALAR_KEYS, SUNRISE_HOUR, SUNSET_HOUR,
};
use crate::utils::meteorology::{default_pbl, dew_point, height_from_pressure, relative_humidity};
use crate::utils::solar::SolarCache;

/// Fills in the computed and defaulted fields of every profile.
///
/// Running it twice over the same input gives the same output.
pub struct DerivedFields {
    window: ParseWindow,
    solar: SolarCache,
}

impl DerivedFields {
    pub fn new(window: ParseWindow) -> Self {
        Self {
            window,
            solar: SolarCache::new(),
        }
    }

    pub fn apply(&mut self, mut dataset: UtcDataset) -> Result<UtcDataset> {
        for (time, locations) in dataset.iter_mut() {
            let hour = self.window.hours_since_first(*time);
            for params in locations.values_mut() {
                let (sunrise, sunset) =
                    self.solar
                        .local_hours(params.lat, params.lng, time.date(), params.utc_offset);
                derive(params, hour, sunrise, sunset)?;
            }
        }

        debug!("Derived fields for {} hours", dataset.len());
        Ok(dataset)
    }
}

fn derive(params: &mut ParameterSet, hour: f64, sunrise: f64, sunset: f64) -> Result<()> {
    for key in ENSURED_KEYS {
        if !params.contains(key) {
            params.insert(key, Field::missing());
        }
    }

    if needs_value(params.get(HEIGHT)) {
        let heights = map_levels(&[params.get(PRESSURE)], |p| height_from_pressure(p[0]))?;
        params.insert(HEIGHT, heights);
    }

    if needs_value(params.get(RELATIVE_HUMIDITY)) {
        let humidity = map_levels(
            &[params.get("SPHU"), params.get(PRESSURE), params.get("TEMP")],
            |v| relative_humidity(v[0], v[1], v[2]),
        )?;
        params.insert(RELATIVE_HUMIDITY, humidity);
    }

    let dew = map_levels(
        &[params.get(RELATIVE_HUMIDITY), params.get("TEMP")],
        |v| dew_point(v[0], v[1]),
    )?;
    params.insert(DEW_POINT, dew);

    params.insert(SUNRISE_HOUR, Field::Scalar(Value::Number(sunrise)));
    params.insert(SUNSET_HOUR, Field::Scalar(Value::Number(sunset)));

    for key in SCALAR_KEYS {
        collapse(params, key, Value::Missing)?;
    }
    collapse(
        params,
        BOUNDARY_LAYER_HEIGHT,
        Value::Number(default_pbl(hour, sunrise, sunset)),
    )?;

    Ok(())
}

/// Absent, `null` and empty sequences all count as missing.
fn needs_value(field: Option<&Field>) -> bool {
    field.map_or(true, |field| !field.is_present())
}

/// Apply `f` level by level across non-empty sequences.
///
/// Yields `null` when any input is not a non-empty sequence, and a `null`
/// level wherever one of the inputs is missing at that level. Inputs of
/// different lengths are zipped to the shortest.
fn map_levels<F>(inputs: &[Option<&Field>], f: F) -> Result<Field>
where
    F: Fn(&[f64]) -> f64,
{
    let mut columns = Vec::with_capacity(inputs.len());
    for input in inputs {
        match input.and_then(|field| field.levels()) {
            Some(values) if !values.is_empty() => columns.push(values),
            _ => return Ok(Field::missing()),
        }
    }

    let len = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    let mut output = Vec::with_capacity(len);
    let mut args = Vec::with_capacity(columns.len());

    for level in 0..len {
        args.clear();
        for column in &columns {
            match column[level].to_f64()? {
                Some(v) => args.push(v),
                None => break,
            }
        }
        output.push(if args.len() == columns.len() {
            Value::Number(f(&args))
        } else {
            Value::Missing
        });
    }

    Ok(Field::Levels(output))
}

/// Reduce a field to its first value, or insert `default` when absent.
fn collapse(params: &mut ParameterSet, key: &str, default: Value) -> Result<()> {
    let field = match params.remove(key) {
        Some(field) => field.into_scalar()?,
        None => Field::Scalar(default),
    };
    params.insert(key, field);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::{DAYTIME_PBL_HEIGHT, NIGHTTIME_PBL_HEIGHT, PRESSURE_AT_SURFACE};
    use chrono::{NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn hour(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 5, 30)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn numbers(values: &[f64]) -> Field {
        Field::Levels(values.iter().copied().map(Value::Number).collect())
    }

    fn profile() -> ParameterSet {
        let mut params = ParameterSet::new(37.43, -120.40, -7.0);
        params.insert(PRESSURE_AT_SURFACE, numbers(&[0.0]));
        params.insert("PRSS", numbers(&[996.0]));
        params.insert("T02M", numbers(&[31.5]));
        params.insert("PBLH", numbers(&[0.0]));
        params.insert(PRESSURE, numbers(&[993.0, 984.0]));
        params.insert("TEMP", numbers(&[31.0, 29.5]));
        params.insert(
            "SPHU",
            Field::Levels(vec![Value::Number(3.2), Value::Missing]),
        );
        params
    }

    fn dataset(time: NaiveDateTime) -> UtcDataset {
        BTreeMap::from([(time, BTreeMap::from([(0, profile())]))])
    }

    fn window() -> ParseWindow {
        ParseWindow::new(hour(0), hour(0), hour(23)).unwrap()
    }

    #[test]
    fn test_derived_values() {
        let derived = DerivedFields::new(window()).apply(dataset(hour(0))).unwrap();
        let params = &derived[&hour(0)][&0];

        let heights = params.levels(HEIGHT).unwrap();
        assert!((heights[0].as_number().unwrap() - 59.20695352193937).abs() < 1e-9);

        let humidity = params.levels(RELATIVE_HUMIDITY).unwrap();
        assert!((humidity[0].as_number().unwrap() - 11.352118179569345).abs() < 1e-9);
        assert_eq!(humidity[1], Value::Missing);

        let dew = params.levels(DEW_POINT).unwrap();
        assert!((dew[0].as_number().unwrap() - -2.6110043729268).abs() < 1e-9);
        assert_eq!(dew[1], Value::Missing);

        assert_eq!(params.get("PRSS"), Some(&Field::Scalar(Value::Number(996.0))));
        assert_eq!(params.get("TPP3"), Some(&Field::missing()));
        assert_eq!(params.get("TPOT"), Some(&Field::missing()));
        assert_eq!(params.get("PBLH"), Some(&Field::Scalar(Value::Number(0.0))));
        assert_eq!(
            params.get(BOUNDARY_LAYER_HEIGHT),
            Some(&Field::Scalar(Value::Number(NIGHTTIME_PBL_HEIGHT)))
        );

        let sunrise = params.first_value(SUNRISE_HOUR).unwrap().as_number().unwrap();
        assert!((sunrise - 5.72).abs() < 0.05);
    }

    #[test]
    fn test_daytime_default_pbl() {
        let derived = DerivedFields::new(window()).apply(dataset(hour(12))).unwrap();
        assert_eq!(
            derived[&hour(12)][&0].get(BOUNDARY_LAYER_HEIGHT),
            Some(&Field::Scalar(Value::Number(DAYTIME_PBL_HEIGHT)))
        );
    }

    #[test]
    fn test_daytime_default_pbl_with_sunset_past_midnight() {
        let mut data = dataset(hour(20));
        data.get_mut(&hour(20)).unwrap().get_mut(&0).unwrap().utc_offset = 0.0;

        let derived = DerivedFields::new(window()).apply(data).unwrap();
        let params = &derived[&hour(20)][&0];
        let sunset = params.first_value(SUNSET_HOUR).unwrap().as_number().unwrap();
        assert!(sunset > 24.0, "sunset {}", sunset);
        assert_eq!(
            params.get(BOUNDARY_LAYER_HEIGHT),
            Some(&Field::Scalar(Value::Number(DAYTIME_PBL_HEIGHT)))
        );
    }

    #[test]
    fn test_existing_height_and_hpbl_kept() {
        let mut data = dataset(hour(12));
        let params = data.get_mut(&hour(12)).unwrap().get_mut(&0).unwrap();
        params.insert(HEIGHT, numbers(&[100.0, 200.0]));
        params.insert(BOUNDARY_LAYER_HEIGHT, numbers(&[650.0]));

        let derived = DerivedFields::new(window()).apply(data).unwrap();
        let params = &derived[&hour(12)][&0];
        assert_eq!(params.get(HEIGHT), Some(&numbers(&[100.0, 200.0])));
        assert_eq!(
            params.get(BOUNDARY_LAYER_HEIGHT),
            Some(&Field::Scalar(Value::Number(650.0)))
        );
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let mut derived_fields = DerivedFields::new(window());
        let once = derived_fields.apply(dataset(hour(6))).unwrap();
        let twice = derived_fields.apply(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_no_pressure_means_no_height() {
        let mut data = dataset(hour(0));
        data.get_mut(&hour(0)).unwrap().get_mut(&0).unwrap().remove(PRESSURE);

        let derived = DerivedFields::new(window()).apply(data).unwrap();
        let params = &derived[&hour(0)][&0];
        assert_eq!(params.get(PRESSURE), Some(&Field::missing()));
        assert_eq!(params.get(HEIGHT), Some(&Field::missing()));
        assert_eq!(params.get(RELATIVE_HUMIDITY), Some(&Field::missing()));
        assert_eq!(params.get(DEW_POINT), Some(&Field::missing()));
    }
}
