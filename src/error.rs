use chrono::NaiveDateTime;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProfileError>;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Profile file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Profile file is empty: {}", path.display())]
    EmptyFile { path: PathBuf },

    #[error("No profile blocks found in {}", path.display())]
    NoProfileData { path: PathBuf },

    #[error("{name} time {time} is not on the hour")]
    MisalignedHour { name: &'static str, time: NaiveDateTime },

    #[error("Invalid time window: start {start} is after end {end}")]
    InvalidWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Invalid header on line {line}: {message}")]
    InvalidHeader { line: usize, message: String },

    #[error("Block on line {line} has data but no location marker")]
    MissingLocation { line: usize },

    #[error("Unrecognized column layout for {timestamp} location {location}: {reason}")]
    UnrecognizedLayout {
        timestamp: NaiveDateTime,
        location: usize,
        reason: String,
    },

    #[error("Invalid numeric value '{value}'")]
    InvalidNumber { value: String },

    #[error("No hours within {start}..={end} to fill the window from")]
    NoDataInWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("{time} not in profile file {}", path.display())]
    MissingHour { time: NaiveDateTime, path: PathBuf },

    #[error("Timezone lookup failed for ({lat}, {lng}): {message}")]
    TimezoneLookup { lat: f64, lng: f64, message: String },

    #[error("Location {location} not present in parsed profile")]
    LocationNotFound { location: usize },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}
