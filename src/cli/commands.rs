use crate::cli::args::{Cli, Commands};
use crate::cli::settings::Settings;
use crate::error::Result;
use crate::models::{LocationContext, ParseWindow};
use crate::processors::{load_manifest, ParallelProcessor, ProfileParser};
use crate::utils::progress::ProgressReporter;
use crate::writers::JsonWriter;

fn location_context(lat: Option<f64>, lng: Option<f64>, utc_offset: Option<f64>) -> Option<LocationContext> {
    let context = LocationContext::new(lat?, lng?);
    Some(match utc_offset {
        Some(offset) => context.with_utc_offset(offset),
        None => context,
    })
}

pub fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse {
            input,
            first,
            start,
            end,
            lat,
            lng,
            utc_offset,
            location,
            output,
            pretty,
            mmap,
        } => {
            let window = ParseWindow::new(first, start, end)?;
            let mut parser = ProfileParser::new(&input, window).with_mmap(mmap || settings.use_mmap);
            if let Some(context) = location_context(lat, lng, utc_offset) {
                parser = parser.with_location(context);
            }

            let writer = JsonWriter::new().with_pretty(pretty || settings.pretty);

            match (location, output) {
                (Some(index), Some(output)) => {
                    let series = parser.with_location_index(index).parse_single()?;
                    let size = writer.write(&series, &output)?;
                    println!("Wrote {} hours ({} bytes) to {}", series.len(), size, output.display());
                }
                (Some(index), None) => {
                    let series = parser.with_location_index(index).parse_single()?;
                    println!("{}", writer.to_json(&series)?);
                }
                (None, Some(output)) => {
                    let profile = parser.parse()?;
                    let size = writer.write(&profile, &output)?;
                    println!(
                        "Wrote {} locations ({} bytes) to {}",
                        profile.len(),
                        size,
                        output.display()
                    );
                }
                (None, None) => {
                    let profile = parser.parse()?;
                    println!("{}", writer.to_json(&profile)?);
                }
            }
        }

        Commands::Batch {
            manifest,
            output_dir,
            max_workers,
            pretty,
            mmap,
            quiet,
        } => {
            let jobs = load_manifest(&manifest)?;
            let max_workers = max_workers.unwrap_or(settings.max_workers);

            println!("Parsing {} profile files...", jobs.len());
            println!("Manifest: {}", manifest.display());
            println!("Output directory: {}", output_dir.display());
            println!("Workers: {}", max_workers);

            let progress = ProgressReporter::new(jobs.len() as u64, "Parsing profiles...", quiet);

            let processor = ParallelProcessor::new(max_workers)
                .with_mmap(mmap || settings.use_mmap)
                .with_pretty(pretty || settings.pretty);
            let outcomes = processor.process_jobs(&jobs, &output_dir, Some(&progress))?;

            let failed: Vec<_> = outcomes.iter().filter(|o| !o.is_success()).collect();
            for outcome in &outcomes {
                if let Some(output) = &outcome.output {
                    println!(
                        "  {} -> {} ({} locations, {} hours)",
                        outcome.file.display(),
                        output.display(),
                        outcome.locations,
                        outcome.hours
                    );
                }
            }

            if failed.is_empty() {
                println!("✅ All {} files parsed", outcomes.len());
            } else {
                println!("⚠️  {} of {} files failed:", failed.len(), outcomes.len());
                for outcome in failed {
                    println!(
                        "  {}: {}",
                        outcome.file.display(),
                        outcome.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
        }

        Commands::Validate {
            input,
            lat,
            lng,
            utc_offset,
            mmap,
        } => {
            println!("Validating profile file: {}", input.display());

            let mut parser = ProfileParser::for_validation(&input).with_mmap(mmap || settings.use_mmap);
            if let Some(context) = location_context(lat, lng, utc_offset) {
                parser = parser.with_location(context);
            }

            let report = parser.validate()?;
            println!("\n{}", report.summary());

            if report.is_clean() {
                println!("✅ No degraded rows found");
            } else {
                println!("⚠️  Found {} degraded rows", report.diagnostics.len());
            }
        }
    }

    Ok(())
}
