use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "h5tracks")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract track metadata from HDF5 song files into a CSV table")]
#[command(
    long_about = "h5tracks walks a directory tree for HDF5 song files, reads the track id, \
                  artist name and title of each, and writes them to a single CSV table."
)]
#[command(after_help = "EXAMPLES:\n  \
    h5tracks MillionSongSubset/data\n  \
    h5tracks MillionSongSubset/data/A --output tracks_a.csv --verbose\n  \
    h5tracks data --delimiter ';' --skip-unopenable --report\n  \
    h5tracks data --config my-config.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Directory to search for song files
    #[arg(required_unless_present = "generate_config")]
    pub input_dir: Option<PathBuf>,

    /// Output CSV file (defaults to extracted_info.csv)
    #[arg(short, long, env = "H5TRACKS_OUTPUT")]
    pub output: Option<PathBuf>,

    /// File extensions to treat as song files (comma-separated)
    #[arg(short, long, help = "Song file extensions (e.g., h5,hdf5)")]
    pub extension: Option<String>,

    /// Field delimiter for the output table
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Maximum directory depth to descend
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Follow symbolic links while scanning
    #[arg(long)]
    pub follow_links: bool,

    /// Do not descend into directories whose name starts with a dot
    #[arg(long)]
    pub skip_hidden: bool,

    /// Skip files that cannot be opened instead of aborting
    #[arg(long, help = "Skip song files that fail to open instead of aborting the run")]
    pub skip_unopenable: bool,

    /// Row of the song tables to read from each file
    #[arg(long)]
    pub song_index: Option<usize>,

    /// Write a JSON run report next to the output table
    #[arg(long)]
    pub report: bool,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for console messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (list matching files without opening them)
    #[arg(long, help = "List the song files that would be processed without opening them")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_extensions(self.extension.clone())
            .with_max_depth(self.max_depth)
            .with_follow_links(self.follow_links)
            .with_skip_hidden(self.skip_hidden)
            .with_skip_unopenable(self.skip_unopenable)
            .with_song_index(self.song_index)
            .with_output_path(self.output.clone())
            .with_delimiter(self.delimiter)
            .with_write_report(self.report)
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "h5tracks=error";
        }

        match self.verbose {
            0 => "h5tracks=warn",
            1 => "h5tracks=info",
            2 => "h5tracks=debug",
            _ => "h5tracks=trace",
        }
    }
}
