pub mod accessor;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig, ScanConfig, SourceConfig};
pub use error::{FieldError, H5TracksError, Result, UserFriendlyError};

// Core functionality re-exports
pub use accessor::{Hdf5Accessor, OpenSong, SongAccessor, SongHandle, TrackField};
pub use extractor::{
    read_table, ExtractionOutcome, ExtractionProgress, ExtractionReport, FieldExtractor,
    FileFailure, TableWriter, TrackRecord,
};
pub use scanner::{FileFilter, SongScanner};
pub use ui::{OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Main library interface: scan, extract, write.
pub struct H5Tracks {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl H5Tracks {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(config, output_mode, cli_args.verbose, cli_args.quiet))
    }

    /// Extract the track table from every HDF5 song file under `root`.
    pub fn extract_tracks(&self, root: &Path) -> Result<ExtractionReport> {
        let accessor = Hdf5Accessor::new(self.config.source.song_index);
        self.extract_tracks_with(root, &accessor)
    }

    /// Same as [`H5Tracks::extract_tracks`], reading songs through `accessor`.
    pub fn extract_tracks_with<A: SongAccessor>(
        &self,
        root: &Path,
        accessor: &A,
    ) -> Result<ExtractionReport> {
        let start_time = Instant::now();
        let output_path = self.config.output.path.clone();
        let delimiter = self.config.delimiter_byte()?;

        tracing::info!(root = %root.display(), output = %output_path.display(), "starting extraction");

        // Step 1: Scan and open song files
        let scan = self.scan_songs(root, accessor)?;
        let files_found = scan.files_found();
        let mut failures = scan.failures;

        for failure in &failures {
            self.output_formatter.file_skipped(failure);
        }

        self.output_formatter
            .info(&format!("Found {} song files", files_found));

        // Step 2: Extract fields
        let outcome = self.extract_fields(scan.songs);
        failures.extend(outcome.failures);

        // Step 3: Write the table
        let writer = TableWriter::new(&output_path).with_delimiter(delimiter);
        let rows = writer.write(&outcome.records)?;

        // Step 4: Report
        let report = ExtractionReport::new(
            root,
            &output_path,
            files_found,
            rows,
            failures,
            start_time.elapsed(),
            &self.config,
        );

        self.output_formatter
            .success(&format!("Information saved to: {}", output_path.display()));

        // The table is complete at this point; a report that cannot be saved
        // does not fail the run.
        if self.config.output.write_report {
            let report_path = ExtractionReport::default_path(&output_path);
            match report.save_json(&report_path) {
                Ok(()) => self
                    .output_formatter
                    .info(&format!("Report saved to: {}", report_path.display())),
                Err(e) => {
                    tracing::warn!(path = %report_path.display(), error = %e, "run report not saved");
                    self.output_formatter.print_user_friendly_error(&e);
                }
            }
        }

        Ok(report)
    }

    /// Lists the song files a run would process, without opening them.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let scanner = SongScanner::new(&self.config.scan);
        let paths = scanner.discover(root)?;

        let stats = scanner.get_statistics(&paths);
        self.output_formatter.debug(&stats.display_summary());

        Ok(paths)
    }

    fn scan_songs<A: SongAccessor>(
        &self,
        root: &Path,
        accessor: &A,
    ) -> Result<scanner::ScanOutcome<A::Handle>> {
        self.output_formatter.start_operation("Scanning for song files");

        let spinner = self.progress_manager.create_spinner("Scanning directories...");
        let progress_callback = {
            let pb = spinner.clone();
            move |opened: usize, path: &Path| {
                ui::progress::update_scan_progress(&pb, opened, path);
            }
        };

        let scanner = SongScanner::new(&self.config.scan);
        let result = scanner.scan(root, accessor, Some(&progress_callback));

        match result {
            Ok(outcome) => {
                ui::progress::finish_progress_with_summary(
                    &spinner,
                    &format!("Opened {} song files", outcome.songs.len()),
                    spinner.elapsed(),
                );
                Ok(outcome)
            }
            Err(e) => {
                spinner.abandon();
                Err(e)
            }
        }
    }

    fn extract_fields<H: SongHandle>(&self, songs: Vec<OpenSong<H>>) -> ExtractionOutcome {
        self.output_formatter.start_operation("Extracting track fields");

        let file_progress = self.progress_manager.create_file_progress(songs.len() as u64);
        let progress_callback = {
            let pb = file_progress.clone();
            move |progress: &ExtractionProgress| {
                ui::progress::update_file_progress(&pb, progress);
            }
        };

        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));
        let failure_callback = |failure: &FileFailure| output.file_skipped(failure);

        let extractor = FieldExtractor::new().with_trim_fields(self.config.source.trim_fields);
        let outcome = extractor.extract_all(songs, Some(&progress_callback), Some(&failure_callback));

        ui::progress::finish_progress_with_summary(
            &file_progress,
            &format!("Extracted {} records", outcome.progress.records_extracted),
            outcome.progress.elapsed(),
        );

        outcome
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &H5TracksError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
