pub mod block;
pub mod dataset;
pub mod parameter_set;
pub mod value;
pub mod window;

pub use block::RawBlock;
pub use dataset::{HourlyProfile, LocalSeries, UtcDataset};
pub use parameter_set::ParameterSet;
pub use value::{Field, Value};
pub use window::{LocationContext, ParseWindow};
