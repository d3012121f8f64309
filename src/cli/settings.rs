use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::utils::constants::{CONFIG_ENV_PREFIX, DEFAULT_CONFIG_FILE};

/// CLI defaults, layered: built-in, then settings file, then
/// `ARL_PROFILER_*` environment variables. Command-line flags override all.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub max_workers: usize,
    pub use_mmap: bool,
    pub pretty: bool,
}

impl Settings {
    /// Load settings; an explicitly named file must exist
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let settings = Config::builder()
            .set_default("max_workers", num_cpus::get() as i64)?
            .set_default("use_mmap", false)?
            .set_default("pretty", false)?
            .add_source(File::from(file).required(path.is_some()))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
