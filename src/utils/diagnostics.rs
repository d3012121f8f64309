use chrono::NaiveDateTime;
use std::fmt;
use std::sync::Mutex;
use tracing::warn;

/// A degraded-but-recoverable condition met while parsing.
///
/// None of these abort a parse; the affected values come out as `null` or
/// are dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A run of asterisks whose length does not map to a known field count.
    AmbiguousMissingRun {
        timestamp: NaiveDateTime,
        location: usize,
        line: usize,
        run_length: usize,
    },
    /// A level row whose token count differs from the number of level names.
    RowLengthMismatch {
        timestamp: NaiveDateTime,
        location: usize,
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A surface values row with fewer tokens than surface names.
    ShortSurfaceRow {
        timestamp: NaiveDateTime,
        location: usize,
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A surface values row with more tokens than surface names.
    LongSurfaceRow {
        timestamp: NaiveDateTime,
        location: usize,
        line: usize,
        expected: usize,
        found: usize,
    },
    /// A location the profiler reported as outside the met grid.
    OutOfGrid {
        timestamp: NaiveDateTime,
        ordinal: i64,
        lat: f64,
        lng: f64,
        line: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::AmbiguousMissingRun {
                timestamp,
                location,
                line,
                run_length,
            } => write!(
                f,
                "{} location {}: line {} has an ambiguous run of {} asterisks",
                timestamp, location, line, run_length
            ),
            Diagnostic::RowLengthMismatch {
                timestamp,
                location,
                line,
                expected,
                found,
            } => write!(
                f,
                "{} location {}: line {} has {} values, expected {}; level set to null",
                timestamp, location, line, found, expected
            ),
            Diagnostic::ShortSurfaceRow {
                timestamp,
                location,
                line,
                expected,
                found,
            } => write!(
                f,
                "{} location {}: surface row on line {} has {} values, expected {}; surface set to null",
                timestamp, location, line, found, expected
            ),
            Diagnostic::LongSurfaceRow {
                timestamp,
                location,
                line,
                expected,
                found,
            } => write!(
                f,
                "{} location {}: surface row on line {} has {} values, expected {}; extra values ignored",
                timestamp, location, line, found, expected
            ),
            Diagnostic::OutOfGrid {
                timestamp,
                ordinal,
                lat,
                lng,
                line,
            } => write!(
                f,
                "{} profile {} at ({}, {}) on line {} is outside the met grid",
                timestamp, ordinal, lat, lng, line
            ),
        }
    }
}

/// Receiver for parse diagnostics.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: Diagnostic);
}

/// Logs every diagnostic as a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
    }
}

/// Keeps diagnostics in memory for later inspection.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    collected: Mutex<Vec<Diagnostic>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.collected
            .lock()
            .map(|collected| collected.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.collected.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut collected) = self.collected.lock() {
            collected.push(diagnostic);
        }
    }
}
