use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{ProfileError, Result};
use crate::models::{LocationContext, RawBlock};
use crate::utils::constants::{
    BULK_LOCATION_MARKER, HOUR_SEPARATOR, NEXT_SEPARATOR, PROFILE_TIME_MARKER,
    SINGLE_LOCATION_MARKER, TWO_DIGIT_YEAR_PIVOT,
};
use crate::utils::diagnostics::{Diagnostic, DiagnosticSink};
use crate::utils::timezone::UtcOffsetCache;

/// Location line of a block, as printed by the profiler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationMarker {
    pub ordinal: i64,
    pub lat: f64,
    pub lng: f64,
}

impl LocationMarker {
    pub fn index(&self) -> usize {
        (self.ordinal.unsigned_abs() as usize).saturating_sub(1)
    }

    pub fn is_out_of_grid(&self) -> bool {
        self.ordinal <= 0
    }
}

#[derive(Debug)]
struct PendingBlock {
    timestamp: NaiveDateTime,
    time_line: usize,
    location: Option<(LocationMarker, usize)>,
    lines: Vec<String>,
}

/// Splits profile text into per-location, per-hour blocks.
pub struct BlockScanner<'a> {
    context: Option<LocationContext>,
    offsets: &'a mut UtcOffsetCache,
    diagnostics: &'a dyn DiagnosticSink,
}

impl<'a> BlockScanner<'a> {
    pub fn new(offsets: &'a mut UtcOffsetCache, diagnostics: &'a dyn DiagnosticSink) -> Self {
        Self {
            context: None,
            offsets,
            diagnostics,
        }
    }

    pub fn with_location(mut self, context: Option<LocationContext>) -> Self {
        self.context = context;
        self
    }

    /// Scan the whole file, returning in-grid blocks that carry data.
    pub fn scan(&mut self, content: &str) -> Result<Vec<RawBlock>> {
        let mut pending: Vec<PendingBlock> = Vec::new();

        for (index, raw_line) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim_end();

            if line.contains(PROFILE_TIME_MARKER) {
                pending.push(PendingBlock {
                    timestamp: parse_timestamp(line, line_number)?,
                    time_line: line_number,
                    location: None,
                    lines: Vec::new(),
                });
            } else if line.trim_start().starts_with(BULK_LOCATION_MARKER)
                || line.contains(SINGLE_LOCATION_MARKER)
            {
                let block = pending.last_mut().ok_or_else(|| ProfileError::InvalidHeader {
                    line: line_number,
                    message: "location marker before any profile time".to_string(),
                })?;
                block.location = Some((parse_location(line, line_number)?, line_number));
            } else if line.contains(HOUR_SEPARATOR) || line.contains(NEXT_SEPARATOR) {
                continue;
            } else if let Some(block) = pending.last_mut() {
                block.lines.push(line.to_string());
            }
            // lines before the first profile time are file header
        }

        let total = pending.len();
        let mut blocks = Vec::with_capacity(total);
        for block in pending {
            if let Some(raw) = self.finish_block(block)? {
                blocks.push(raw);
            }
        }

        debug!("Scanned {} blocks, kept {}", total, blocks.len());
        Ok(blocks)
    }

    fn finish_block(&mut self, block: PendingBlock) -> Result<Option<RawBlock>> {
        if block.lines.iter().all(|line| line.trim().is_empty()) {
            debug!("Dropping empty block at line {}", block.time_line);
            return Ok(None);
        }

        let (marker, line_number) = block.location.ok_or(ProfileError::MissingLocation {
            line: block.time_line,
        })?;

        if marker.is_out_of_grid() {
            self.diagnostics.report(Diagnostic::OutOfGrid {
                timestamp: block.timestamp,
                ordinal: marker.ordinal,
                lat: marker.lat,
                lng: marker.lng,
                line: line_number,
            });
            return Ok(None);
        }

        let (lat, lng, utc_offset) = match self.context {
            Some(LocationContext {
                lat,
                lng,
                utc_offset: Some(offset),
            }) => (lat, lng, offset),
            Some(LocationContext { lat, lng, .. }) => {
                (lat, lng, self.offsets.offset(lat, lng, block.timestamp)?)
            }
            None => (
                marker.lat,
                marker.lng,
                self.offsets.offset(marker.lat, marker.lng, block.timestamp)?,
            ),
        };

        Ok(Some(RawBlock {
            timestamp: block.timestamp,
            location: marker.index(),
            lat,
            lng,
            utc_offset,
            line_number,
            lines: block.lines,
        }))
    }
}

/// Parse `Profile Time:  14  5 29 12  0` (year, month, day, hour, minute).
pub fn parse_timestamp(line: &str, line_number: usize) -> Result<NaiveDateTime> {
    let invalid = |message: String| ProfileError::InvalidHeader {
        line: line_number,
        message,
    };

    let fields = line
        .find(':')
        .map(|pos| &line[pos + 1..])
        .ok_or_else(|| invalid("missing ':' in profile time".to_string()))?;

    let numbers = fields
        .split_whitespace()
        .take(4)
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| invalid(format!("invalid profile time field '{}'", s)))
        })
        .collect::<Result<Vec<_>>>()?;

    if numbers.len() < 4 {
        return Err(invalid(format!("incomplete profile time '{}'", fields.trim())));
    }

    let year = if numbers[0] > TWO_DIGIT_YEAR_PIVOT {
        numbers[0]
    } else {
        2000 + numbers[0]
    };

    NaiveDate::from_ymd_opt(year, numbers[1] as u32, numbers[2] as u32)
        .and_then(|date| date.and_hms_opt(numbers[3] as u32, 0, 0))
        .ok_or_else(|| invalid(format!("profile time out of range '{}'", fields.trim())))
}

/// Parse either `Profile: <ordinal> <lat> <lng> (i,j)` or
/// `Profile Location: <lat> <lng> (i,j)`.
pub fn parse_location(line: &str, line_number: usize) -> Result<LocationMarker> {
    let invalid = |message: String| ProfileError::InvalidHeader {
        line: line_number,
        message,
    };
    let parts: Vec<&str> = line.split_whitespace().collect();
    let field = |index: usize, what: &str| {
        parts
            .get(index)
            .copied()
            .ok_or_else(|| invalid(format!("missing {} in location marker", what)))
    };

    let ordinal = if line.contains(SINGLE_LOCATION_MARKER) {
        1
    } else {
        let text = field(1, "ordinal")?;
        text.parse::<i64>()
            .map_err(|_| invalid(format!("invalid location ordinal '{}'", text)))?
    };

    let lat_text = field(2, "latitude")?;
    let lng_text = field(3, "longitude")?;
    let lat = lat_text
        .parse::<f64>()
        .map_err(|_| invalid(format!("invalid latitude '{}'", lat_text)))?;
    let lng = lng_text
        .parse::<f64>()
        .map_err(|_| invalid(format!("invalid longitude '{}'", lng_text)))?;

    Ok(LocationMarker { ordinal, lat, lng })
}
