pub mod assembler;
pub mod below_ground;
pub mod coercion;
pub mod derived_fields;
pub mod first_hour;
pub mod gap_filler;
pub mod local_time;
pub mod parallel_processor;
pub mod pipeline;

pub use assembler::{BlockSummary, ProfileAssembler};
pub use below_ground::strip_below_ground_levels;
pub use coercion::coerce_numbers;
pub use derived_fields::DerivedFields;
pub use first_hour::fix_first_hour;
pub use gap_filler::fill_hourly_gaps;
pub use local_time::{reindex_to_local, to_local};
pub use parallel_processor::{load_manifest, BatchJob, BatchOutcome, ParallelProcessor};
pub use pipeline::{ProfileParser, ValidationReport};
