pub mod constants;
pub mod coordinates;
pub mod diagnostics;
pub mod filename;
pub mod meteorology;
pub mod progress;
pub mod solar;
pub mod timezone;

pub use constants::*;
pub use coordinates::CoordinateKey;
pub use diagnostics::{CollectingDiagnostics, Diagnostic, DiagnosticSink, TracingDiagnostics};
pub use filename::json_filename_for;
pub use progress::ProgressReporter;
pub use solar::{SolarCache, SunTimes};
pub use timezone::{FixedOffsetLookup, TimezoneLookup, TzfTimezoneLookup, UtcOffsetCache};
