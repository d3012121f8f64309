use chrono::{NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;
use tzf_rs::DefaultFinder;

use crate::error::{ProfileError, Result};
use crate::utils::coordinates::CoordinateKey;

/// Resolves the UTC offset (hours) in force at a coordinate.
pub trait TimezoneLookup {
    fn utc_offset(&self, lat: f64, lng: f64, at: NaiveDateTime) -> Result<f64>;
}

/// Offline lookup against the timezone polygons bundled with `tzf-rs`.
///
/// The finder is built on first use, so parses that never need a lookup do
/// not pay for loading it.
#[derive(Default)]
pub struct TzfTimezoneLookup {
    finder: OnceLock<DefaultFinder>,
}

impl TzfTimezoneLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// IANA timezone covering a coordinate.
    pub fn timezone(&self, lat: f64, lng: f64) -> Result<Tz> {
        let finder = self.finder.get_or_init(DefaultFinder::new);
        let name = finder.get_tz_name(lng, lat);
        if name.is_empty() {
            return Err(ProfileError::TimezoneLookup {
                lat,
                lng,
                message: "no timezone covers this coordinate".to_string(),
            });
        }

        name.parse::<Tz>().map_err(|e| ProfileError::TimezoneLookup {
            lat,
            lng,
            message: format!("unknown timezone '{}': {}", name, e),
        })
    }
}

impl TimezoneLookup for TzfTimezoneLookup {
    fn utc_offset(&self, lat: f64, lng: f64, at: NaiveDateTime) -> Result<f64> {
        let tz = self.timezone(lat, lng)?;
        let seconds = tz.offset_from_utc_datetime(&at).fix().local_minus_utc();
        Ok(seconds as f64 / 3600.0)
    }
}

/// Same offset everywhere; handy for tests and for callers that already know
/// the zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedOffsetLookup(pub f64);

impl TimezoneLookup for FixedOffsetLookup {
    fn utc_offset(&self, _lat: f64, _lng: f64, _at: NaiveDateTime) -> Result<f64> {
        Ok(self.0)
    }
}

/// Memoised UTC offsets, keyed by coordinate only.
///
/// The first timestamp seen at a coordinate fixes its offset for the rest of
/// the parse. A file spanning a daylight-saving transition therefore keeps a
/// single offset and no local hour is duplicated or skipped.
pub struct UtcOffsetCache {
    lookup: Box<dyn TimezoneLookup + Send>,
    offsets: HashMap<CoordinateKey, f64>,
}

impl UtcOffsetCache {
    pub fn new(lookup: Box<dyn TimezoneLookup + Send>) -> Self {
        Self {
            lookup,
            offsets: HashMap::new(),
        }
    }

    pub fn offset(&mut self, lat: f64, lng: f64, at: NaiveDateTime) -> Result<f64> {
        let key = CoordinateKey::new(lat, lng);
        if let Some(offset) = self.offsets.get(&key) {
            return Ok(*offset);
        }

        let offset = self.lookup.utc_offset(lat, lng, at)?;
        debug!("UTC offset for ({}, {}) resolved to {}", lat, lng, offset);
        self.offsets.insert(key, offset);
        Ok(offset)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingLookup {
        calls: Arc<AtomicUsize>,
    }

    impl TimezoneLookup for CountingLookup {
        fn utc_offset(&self, _lat: f64, lng: f64, _at: NaiveDateTime) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((lng / 15.0).round())
        }
    }

    fn at(month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_cache_ignores_date() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache = UtcOffsetCache::new(Box::new(CountingLookup {
            calls: Arc::clone(&calls),
        }));

        assert_eq!(cache.offset(37.0, -121.0, at(3, 8)).unwrap(), -8.0);
        assert_eq!(cache.offset(37.0, -121.0, at(3, 10)).unwrap(), -8.0);
        assert_eq!(cache.offset(37.5, -120.9, at(3, 10)).unwrap(), -8.0);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_fixed_offset_lookup() {
        let lookup = FixedOffsetLookup(-7.0);
        assert_eq!(lookup.utc_offset(0.0, 0.0, at(5, 29)).unwrap(), -7.0);
    }

    #[test]
    fn test_tzf_lookup_pacific_daylight_time() {
        let lookup = TzfTimezoneLookup::new();
        let offset = lookup.utc_offset(37.43, -120.40, at(5, 30)).unwrap();
        assert_eq!(offset, -7.0);
        let winter = lookup.utc_offset(37.43, -120.40, at(1, 15)).unwrap();
        assert_eq!(winter, -8.0);
    }
}
