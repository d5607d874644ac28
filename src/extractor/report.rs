use crate::config::Config;
use crate::error::{H5TracksError, Result};
use crate::extractor::record::FileFailure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub source_root: PathBuf,
    pub output_file: PathBuf,
    pub extraction_time: DateTime<Utc>,
    pub summary: ExtractionSummary,
    pub failures: Vec<FileFailure>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub files_found: usize,
    pub records_written: usize,
    pub files_skipped: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub extensions: Vec<String>,
    pub max_depth: Option<usize>,
    pub skip_hidden: bool,
    pub skip_unopenable: bool,
    pub song_index: usize,
    pub delimiter: char,
}

impl From<&Config> for ConfigSnapshot {
    fn from(config: &Config) -> Self {
        Self {
            extensions: config.scan.extensions.clone(),
            max_depth: config.scan.max_depth,
            skip_hidden: config.scan.skip_hidden,
            skip_unopenable: config.scan.skip_unopenable,
            song_index: config.source.song_index,
            delimiter: config.output.delimiter,
        }
    }
}

impl ExtractionReport {
    pub fn new(
        source_root: &Path,
        output_file: &Path,
        files_found: usize,
        records_written: usize,
        failures: Vec<FileFailure>,
        duration: Duration,
        config: &Config,
    ) -> Self {
        Self {
            source_root: source_root.to_path_buf(),
            output_file: output_file.to_path_buf(),
            extraction_time: Utc::now(),
            summary: ExtractionSummary {
                files_found,
                records_written,
                files_skipped: failures.len(),
                duration,
            },
            failures,
            config_used: ConfigSnapshot::from(config),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// `<table stem>.report.json`, next to the table.
    pub fn default_path(output_file: &Path) -> PathBuf {
        let stem = output_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "extracted_info".to_string());
        output_file.with_file_name(format!("{}.report.json", stem))
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json_content = serde_json::to_string_pretty(self).map_err(|e| H5TracksError::Report {
            message: format!("Failed to serialize report to JSON: {}", e),
        })?;

        std::fs::write(path, json_content).map_err(|e| H5TracksError::Report {
            message: format!("Failed to write {}: {}", path.display(), e),
        })?;

        tracing::debug!(path = %path.display(), "saved extraction report");
        Ok(())
    }
}
