use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::utils::constants::SUN_ZENITH_DEGREES;
use crate::utils::coordinates::CoordinateKey;

/// Sunrise and sunset for one date and place, in fractional UTC hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SunTimes {
    Daily { sunrise_utc: f64, sunset_utc: f64 },
    /// The sun stays above the horizon all day.
    PolarDay,
    /// The sun stays below the horizon all day; `noon_utc` is local solar noon.
    PolarNight { noon_utc: f64 },
}

impl SunTimes {
    /// Compute sunrise and sunset using the Almanac for Computers algorithm.
    pub fn compute(date: NaiveDate, lat: f64, lng: f64) -> Self {
        let rise = solar_event(date, lat, lng, true);
        let set = solar_event(date, lat, lng, false);

        match (rise, set) {
            (SolarEvent::At(sunrise_utc), SolarEvent::At(sunset_utc)) => SunTimes::Daily {
                sunrise_utc,
                sunset_utc,
            },
            (SolarEvent::NeverSets, _) | (_, SolarEvent::NeverSets) => SunTimes::PolarDay,
            _ => SunTimes::PolarNight {
                noon_utc: (12.0 - lng / 15.0).rem_euclid(24.0),
            },
        }
    }

    /// Local sunrise and sunset hours.
    ///
    /// Daily times are the UTC hour plus the offset, left unwrapped, so a
    /// sunset can read past 24 or a sunrise below 0. A polar day spans
    /// `0..24`, a polar night collapses both to solar noon so nothing counts
    /// as daytime.
    pub fn local_hours(&self, utc_offset: f64) -> (f64, f64) {
        match *self {
            SunTimes::Daily {
                sunrise_utc,
                sunset_utc,
            } => (sunrise_utc + utc_offset, sunset_utc + utc_offset),
            SunTimes::PolarDay => (0.0, 24.0),
            SunTimes::PolarNight { noon_utc } => {
                let noon = noon_utc + utc_offset;
                (noon, noon)
            }
        }
    }
}

enum SolarEvent {
    At(f64),
    NeverRises,
    NeverSets,
}

fn solar_event(date: NaiveDate, lat: f64, lng: f64, rising: bool) -> SolarEvent {
    let day_of_year = date.ordinal() as f64;
    let lng_hour = lng / 15.0;
    let approx = if rising { 6.0 } else { 18.0 };
    let t = day_of_year + (approx - lng_hour) / 24.0;

    let mean_anomaly = 0.9856 * t - 3.289;
    let true_lng = (mean_anomaly
        + 1.916 * mean_anomaly.to_radians().sin()
        + 0.020 * (2.0 * mean_anomaly).to_radians().sin()
        + 282.634)
        .rem_euclid(360.0);

    let mut right_ascension = (0.91764 * true_lng.to_radians().tan())
        .atan()
        .to_degrees()
        .rem_euclid(360.0);
    // same quadrant as the true longitude
    right_ascension +=
        (true_lng / 90.0).floor() * 90.0 - (right_ascension / 90.0).floor() * 90.0;
    let right_ascension = right_ascension / 15.0;

    let sin_dec = 0.39782 * true_lng.to_radians().sin();
    let cos_dec = sin_dec.asin().cos();

    let cos_hour_angle = (SUN_ZENITH_DEGREES.to_radians().cos()
        - sin_dec * lat.to_radians().sin())
        / (cos_dec * lat.to_radians().cos());

    if cos_hour_angle > 1.0 {
        return SolarEvent::NeverRises;
    }
    if cos_hour_angle < -1.0 {
        return SolarEvent::NeverSets;
    }

    let hour_angle_degrees = if rising {
        360.0 - cos_hour_angle.acos().to_degrees()
    } else {
        cos_hour_angle.acos().to_degrees()
    };
    let hour_angle = hour_angle_degrees / 15.0;

    let local_mean_time = hour_angle + right_ascension - 0.06571 * t - 6.622;
    SolarEvent::At((local_mean_time - lng_hour).rem_euclid(24.0))
}

/// Memoised sun times, keyed by place and date.
#[derive(Debug, Default)]
pub struct SolarCache {
    entries: HashMap<(CoordinateKey, NaiveDate), SunTimes>,
}

impl SolarCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sun_times(&mut self, lat: f64, lng: f64, date: NaiveDate) -> SunTimes {
        *self
            .entries
            .entry((CoordinateKey::new(lat, lng), date))
            .or_insert_with(|| SunTimes::compute(date, lat, lng))
    }

    /// Local sunrise and sunset hours for a place, date and UTC offset.
    pub fn local_hours(&mut self, lat: f64, lng: f64, date: NaiveDate, utc_offset: f64) -> (f64, f64) {
        self.sun_times(lat, lng, date).local_hours(utc_offset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
