use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::error::{ProfileError, Result};
use crate::models::{HourlyProfile, LocalSeries, LocationContext, ParseWindow, RawBlock};
use crate::processors::assembler::{BlockSummary, ProfileAssembler};
use crate::processors::below_ground::strip_below_ground_levels;
use crate::processors::coercion::coerce_numbers;
use crate::processors::derived_fields::DerivedFields;
use crate::processors::first_hour::fix_first_hour;
use crate::processors::gap_filler::fill_hourly_gaps;
use crate::processors::local_time::reindex_to_local;
use crate::readers::block_scanner::BlockScanner;
use crate::readers::column_mapper::LayoutKind;
use crate::readers::profile_reader::ProfileReader;
use crate::utils::diagnostics::{CollectingDiagnostics, Diagnostic, DiagnosticSink, TracingDiagnostics};
use crate::utils::timezone::{TimezoneLookup, TzfTimezoneLookup, UtcOffsetCache};

/// Parses one ARL profile file into hourly local-time profiles.
///
/// ```no_run
/// use arl_profiler::{ParseWindow, ProfileParser};
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2014, 5, 29).unwrap();
/// let window = ParseWindow::new(
///     day.and_hms_opt(12, 0, 0).unwrap(),
///     day.and_hms_opt(12, 0, 0).unwrap(),
///     day.and_hms_opt(23, 0, 0).unwrap(),
/// )?;
/// let profile = ProfileParser::new("profile.txt", window).parse()?;
/// # Ok::<(), arl_profiler::ProfileError>(())
/// ```
pub struct ProfileParser {
    path: PathBuf,
    window: ParseWindow,
    location: Option<LocationContext>,
    location_index: Option<usize>,
    use_mmap: bool,
    offsets: UtcOffsetCache,
    diagnostics: Arc<dyn DiagnosticSink + Send + Sync>,
}

impl ProfileParser {
    pub fn new(path: impl Into<PathBuf>, window: ParseWindow) -> Self {
        Self {
            path: path.into(),
            window,
            location: None,
            location_index: None,
            use_mmap: false,
            offsets: UtcOffsetCache::new(Box::new(TzfTimezoneLookup::new())),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Parser for [`ProfileParser::validate`], which never reads the window
    pub fn for_validation(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ParseWindow::validation_only())
    }

    /// Use caller-known coordinates (and optionally offset) for every block
    pub fn with_location(mut self, location: LocationContext) -> Self {
        self.location = Some(location);
        self
    }

    /// Location returned by [`ProfileParser::parse_single`]
    pub fn with_location_index(mut self, index: usize) -> Self {
        self.location_index = Some(index);
        self
    }

    pub fn with_timezone_lookup(mut self, lookup: Box<dyn TimezoneLookup + Send>) -> Self {
        self.offsets = UtcOffsetCache::new(lookup);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink + Send + Sync>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the full pipeline, keyed by location then local time
    pub fn parse(mut self) -> Result<HourlyProfile> {
        info!(
            "Parsing {} for {} to {}",
            self.path.display(),
            self.window.start(),
            self.window.end()
        );

        let diagnostics = Arc::clone(&self.diagnostics);
        let blocks = self.scan(diagnostics.as_ref())?;
        let dataset = ProfileAssembler::new(diagnostics.as_ref()).assemble(blocks)?;

        let dataset = fix_first_hour(dataset, self.window.first());
        let dataset = strip_below_ground_levels(dataset)?;
        let dataset = fill_hourly_gaps(dataset, &self.window)?;
        let dataset = coerce_numbers(dataset)?;
        let dataset = DerivedFields::new(self.window).apply(dataset)?;
        let profile = reindex_to_local(dataset, &self.window, &self.path)?;

        info!(
            "Parsed {} locations from {}",
            profile.len(),
            self.path.display()
        );
        Ok(profile)
    }

    /// Run the full pipeline and return one location's series
    pub fn parse_single(self) -> Result<LocalSeries> {
        let requested = self.location_index;
        let mut profile = self.parse()?;

        let index = match requested {
            Some(index) => index,
            None => {
                if profile.len() > 1 {
                    debug!(
                        "{} locations parsed, returning the first",
                        profile.len()
                    );
                }
                profile.keys().next().copied().unwrap_or(0)
            }
        };

        profile
            .remove(&index)
            .ok_or(ProfileError::LocationNotFound { location: index })
    }

    /// Scan and assemble only, reporting what was found
    pub fn validate(mut self) -> Result<ValidationReport> {
        let collected = CollectingDiagnostics::new();
        let blocks = self.scan(&collected)?;

        let mut assembler = ProfileAssembler::new(&collected);
        assembler.assemble(blocks)?;

        let diagnostics = collected.diagnostics();
        for diagnostic in &diagnostics {
            self.diagnostics.report(diagnostic.clone());
        }

        Ok(ValidationReport::new(
            self.path,
            assembler.summaries(),
            diagnostics,
        ))
    }

    fn scan(&mut self, diagnostics: &dyn DiagnosticSink) -> Result<Vec<RawBlock>> {
        if let Some(location) = &self.location {
            location.validate()?;
        }

        let content = ProfileReader::new()
            .with_mmap(self.use_mmap)
            .read_to_string(&self.path)?;

        let blocks = BlockScanner::new(&mut self.offsets, diagnostics)
            .with_location(self.location)
            .scan(&content)?;

        if blocks.is_empty() {
            return Err(ProfileError::NoProfileData {
                path: self.path.clone(),
            });
        }
        Ok(blocks)
    }
}

/// Outcome of a scan-and-assemble pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub blocks: usize,
    pub hours: usize,
    pub locations: usize,
    pub standard_layouts: usize,
    pub shifted_layouts: usize,
    pub rejected_rows: usize,
    pub rejected_surface_rows: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    fn new(path: PathBuf, summaries: &[BlockSummary], diagnostics: Vec<Diagnostic>) -> Self {
        let hours: BTreeSet<_> = summaries.iter().map(|s| s.timestamp).collect();
        let locations: BTreeSet<_> = summaries.iter().map(|s| s.location).collect();
        let shifted_layouts = summaries
            .iter()
            .filter(|s| s.layout == LayoutKind::ShiftedBySurfaceFields)
            .count();

        Self {
            path,
            blocks: summaries.len(),
            hours: hours.len(),
            locations: locations.len(),
            standard_layouts: summaries.len() - shifted_layouts,
            shifted_layouts,
            rejected_rows: summaries.iter().map(|s| s.rejected_rows).sum(),
            rejected_surface_rows: summaries.iter().filter(|s| s.surface_rejected).count(),
            diagnostics,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Profile Validation Report ===\n");
        summary.push_str(&format!("File: {}\n", self.path.display()));
        summary.push_str(&format!("Blocks: {}\n", self.blocks));
        summary.push_str(&format!("Hours: {}\n", self.hours));
        summary.push_str(&format!("Locations: {}\n", self.locations));
        summary.push_str(&format!(
            "Layouts: {} standard, {} shifted\n",
            self.standard_layouts, self.shifted_layouts
        ));
        summary.push_str(&format!("Rejected level rows: {}\n", self.rejected_rows));
        summary.push_str(&format!(
            "Rejected surface rows: {}\n",
            self.rejected_surface_rows
        ));
        summary.push_str(&format!("\nDiagnostics: {}\n", self.diagnostics.len()));

        if !self.diagnostics.is_empty() {
            summary.push_str("\nFirst 10 Diagnostics:\n");
            for (i, diagnostic) in self.diagnostics.iter().take(10).enumerate() {
                summary.push_str(&format!("  {}. {}\n", i + 1, diagnostic));
            }
        }

        summary
    }
}
