use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arl-profiler")]
#[command(about = "Parse ARL meteorological profile output into hourly local-time profiles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file [default: arl-profiler.toml]")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse one profile file
    Parse {
        #[arg(short, long, help = "Profile text file")]
        input: PathBuf,

        #[arg(long, value_parser = parse_hour, help = "First hour in the file (UTC)")]
        first: NaiveDateTime,

        #[arg(long, value_parser = parse_hour, help = "First hour to return (UTC)")]
        start: NaiveDateTime,

        #[arg(long, value_parser = parse_hour, help = "Last hour to return (UTC)")]
        end: NaiveDateTime,

        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        #[arg(long, allow_negative_numbers = true, help = "UTC offset in hours; skips the timezone lookup")]
        utc_offset: Option<f64>,

        #[arg(long, help = "Only output this location index")]
        location: Option<usize>,

        #[arg(short, long, help = "Output JSON file [default: stdout]")]
        output: Option<PathBuf>,

        #[arg(long, help = "Pretty-print JSON")]
        pretty: bool,

        #[arg(long, help = "Memory-map the input file")]
        mmap: bool,
    },

    /// Parse every profile file listed in a JSON manifest
    Batch {
        #[arg(short, long, help = "JSON array of {file, first, start, end, lat?, lng?, utc_offset?}")]
        manifest: PathBuf,

        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        #[arg(long)]
        max_workers: Option<usize>,

        #[arg(long, help = "Pretty-print JSON")]
        pretty: bool,

        #[arg(long, help = "Memory-map the input files")]
        mmap: bool,

        #[arg(short, long, help = "Hide the progress bar")]
        quiet: bool,
    },

    /// Scan and assemble a profile file without post-processing
    Validate {
        #[arg(short, long, help = "Profile text file")]
        input: PathBuf,

        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        utc_offset: Option<f64>,

        #[arg(long, help = "Memory-map the input file")]
        mmap: bool,
    },
}

/// Accepts `2014-05-29T12:00:00`, `2014-05-29T12:00`, `2014-05-29 12:00` or `2014052912`
pub fn parse_hour(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| compact_hour(value))
        .ok_or_else(|| format!("invalid time '{}', expected e.g. 2014-05-29T12:00:00", value))
}

// chrono will not parse a time without minutes, so YYYYMMDDHH is split by hand
fn compact_hour(value: &str) -> Option<NaiveDateTime> {
    if value.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(value.get(..8)?, "%Y%m%d").ok()?;
    let hour = value.get(8..)?.parse::<u32>().ok()?;
    date.and_hms_opt(hour, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hour_formats() {
        let expected = NaiveDate::from_ymd_opt(2014, 5, 29)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(parse_hour("2014-05-29T12:00:00").unwrap(), expected);
        assert_eq!(parse_hour("2014-05-29T12:00").unwrap(), expected);
        assert_eq!(parse_hour("2014-05-29 12:00").unwrap(), expected);
        assert_eq!(parse_hour("2014052912").unwrap(), expected);
        assert!(parse_hour("yesterday").is_err());
    }

    #[test]
    fn test_cli_parses_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "arl-profiler",
            "parse",
            "--input",
            "profile.txt",
            "--first",
            "2014052912",
            "--start",
            "2014052912",
            "--end",
            "2014052923",
            "--lat",
            "37.43",
            "--lng",
            "-120.40",
            "--utc-offset",
            "-7",
        ])
        .unwrap();

        match cli.command {
            Commands::Parse {
                lng, utc_offset, ..
            } => {
                assert_eq!(lng, Some(-120.40));
                assert_eq!(utc_offset, Some(-7.0));
            }
            _ => panic!("expected parse command"),
        }
    }
}
