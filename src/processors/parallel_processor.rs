use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::error::{ProfileError, Result};
use crate::models::{LocationContext, ParseWindow};
use crate::processors::pipeline::ProfileParser;
use crate::utils::diagnostics::{DiagnosticSink, TracingDiagnostics};
use crate::utils::filename::json_filename_for;
use crate::utils::progress::ProgressReporter;
use crate::writers::JsonWriter;

/// One profile file to parse, as listed in a batch manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BatchJob {
    pub file: PathBuf,
    pub first: NaiveDateTime,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,

    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub lng: Option<f64>,

    pub utc_offset: Option<f64>,

    /// Output path; defaults to `<output dir>/<file stem>.json`
    pub output: Option<PathBuf>,
}

impl BatchJob {
    pub fn window(&self) -> Result<ParseWindow> {
        ParseWindow::new(self.first, self.start, self.end)
    }

    pub fn location(&self) -> Option<LocationContext> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                let context = LocationContext::new(lat, lng);
                Some(match self.utc_offset {
                    Some(offset) => context.with_utc_offset(offset),
                    None => context,
                })
            }
            _ => None,
        }
    }
}

/// Read a JSON manifest: an array of jobs.
pub fn load_manifest(path: &Path) -> Result<Vec<BatchJob>> {
    if !path.exists() {
        return Err(ProfileError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let jobs: Vec<BatchJob> = serde_json::from_str(&content)?;
    for job in &jobs {
        job.validate()?;
    }
    Ok(jobs)
}

/// Result of one batch job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub file: PathBuf,
    pub output: Option<PathBuf>,
    pub locations: usize,
    pub hours: usize,
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs independent parses on a rayon pool, one parser per job.
pub struct ParallelProcessor {
    max_workers: usize,
    use_mmap: bool,
    pretty: bool,
    diagnostics: Arc<dyn DiagnosticSink + Send + Sync>,
}

impl ParallelProcessor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            use_mmap: false,
            pretty: false,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink + Send + Sync>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Parse every job and write its JSON output.
    ///
    /// A failing job is recorded in its outcome and does not stop the others.
    pub fn process_jobs(
        &self,
        jobs: &[BatchJob],
        output_dir: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<BatchOutcome>> {
        let total_jobs = jobs.len();
        let processed_count = Arc::new(AtomicUsize::new(0));

        if let Some(p) = progress {
            p.set_message(&format!("Parsing {} profile files...", total_jobs));
        }

        // Configure Rayon thread pool
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProfileError::ThreadPool(e.to_string()))?;

        let outcomes: Vec<BatchOutcome> = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let outcome = match self.process_single_job(job, output_dir) {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!("Failed to parse {}: {}", job.file.display(), e);
                            BatchOutcome {
                                file: job.file.clone(),
                                output: None,
                                locations: 0,
                                hours: 0,
                                error: Some(e.to_string()),
                            }
                        }
                    };

                    // Update progress
                    let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(p) = progress {
                        p.update(count as u64);
                    }

                    outcome
                })
                .collect()
        });

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!("Batch complete: {} succeeded, {} failed", total_jobs - failed, failed);

        if let Some(p) = progress {
            p.finish_with_message(&format!("Parsed {} profile files", total_jobs));
        }

        Ok(outcomes)
    }

    /// Parse a single job's file and write its output
    fn process_single_job(&self, job: &BatchJob, output_dir: &Path) -> Result<BatchOutcome> {
        job.validate()?;

        let mut parser = ProfileParser::new(&job.file, job.window()?)
            .with_mmap(self.use_mmap)
            .with_diagnostics(Arc::clone(&self.diagnostics));
        if let Some(location) = job.location() {
            parser = parser.with_location(location);
        }

        let profile = parser.parse()?;
        let output = job
            .output
            .clone()
            .unwrap_or_else(|| json_filename_for(&job.file, output_dir));
        JsonWriter::new()
            .with_pretty(self.pretty)
            .write(&profile, &output)?;

        Ok(BatchOutcome {
            file: job.file.clone(),
            output: Some(output),
            locations: profile.len(),
            hours: profile.values().map(|series| series.len()).sum(),
            error: None,
        })
    }
}
