use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProfileError, Result};

/// Time bounds of one parse, all UTC and on the hour.
///
/// `first` is the first hour represented in the file; `start` and `end`
/// bound (inclusively) the hours the caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseWindow {
    first: NaiveDateTime,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl ParseWindow {
    pub fn new(first: NaiveDateTime, start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        ensure_on_hour("first", first)?;
        ensure_on_hour("start", start)?;
        ensure_on_hour("end", end)?;

        if start > end {
            return Err(ProfileError::InvalidWindow { start, end });
        }

        Ok(Self { first, start, end })
    }

    /// Single-hour window at the epoch, for runs that never read the window.
    pub fn validation_only() -> Self {
        let epoch = NaiveDateTime::default();
        Self {
            first: epoch,
            start: epoch,
            end: epoch,
        }
    }

    pub fn first(&self) -> NaiveDateTime {
        self.first
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        time >= self.start && time <= self.end
    }

    /// Every hour from `start` to `end`, inclusive.
    pub fn hours(&self) -> impl Iterator<Item = NaiveDateTime> {
        let end = self.end;
        std::iter::successors(Some(self.start), |t| Some(*t + chrono::Duration::hours(1)))
            .take_while(move |t| *t <= end)
    }

    /// Hours elapsed since the file's first hour.
    pub fn hours_since_first(&self, time: NaiveDateTime) -> f64 {
        (time - self.first).num_seconds() as f64 / 3600.0
    }
}

fn ensure_on_hour(name: &'static str, time: NaiveDateTime) -> Result<()> {
    if time.minute() != 0 || time.second() != 0 || time.nanosecond() != 0 {
        return Err(ProfileError::MisalignedHour { name, time });
    }
    Ok(())
}

/// Caller-known location for single-location profile files.
///
/// When present, its coordinates replace the ones printed in the file, and a
/// supplied `utc_offset` skips the timezone lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct LocationContext {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: f64,

    pub utc_offset: Option<f64>,
}

impl LocationContext {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            utc_offset: None,
        }
    }

    pub fn with_utc_offset(mut self, utc_offset: f64) -> Self {
        self.utc_offset = Some(utc_offset);
        self
    }
}
