pub mod cli;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod utils;
pub mod writers;

pub use error::{ProfileError, Result};
pub use models::{Field, HourlyProfile, LocalSeries, LocationContext, ParameterSet, ParseWindow, Value};
pub use processors::{ProfileParser, ValidationReport};
