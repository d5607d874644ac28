use crate::error::{H5TracksError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub extensions: Vec<String>,
    /// Unlimited when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
    pub follow_links: bool,
    pub skip_hidden: bool,
    pub skip_unopenable: bool,
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub song_index: usize,
    pub trim_fields: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub delimiter: char,
    pub write_report: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["h5".to_string()],
            max_depth: None,
            follow_links: false,
            skip_hidden: false,
            skip_unopenable: false,
            exclude_dirs: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("extracted_info.csv"),
            delimiter: ',',
            write_report: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(H5TracksError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| H5TracksError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| H5TracksError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["h5tracks.toml", "h5tracks.config.toml", ".h5tracks.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, overrides: &CliOverrides) {
        if let Some(ref extensions) = overrides.extensions {
            self.scan.extensions = extensions
                .split(',')
                .map(normalize_extension)
                .filter(|s| !s.is_empty())
                .collect();
        }

        if overrides.max_depth.is_some() {
            self.scan.max_depth = overrides.max_depth;
        }

        if overrides.follow_links {
            self.scan.follow_links = true;
        }

        if overrides.skip_hidden {
            self.scan.skip_hidden = true;
        }

        if overrides.skip_unopenable {
            self.scan.skip_unopenable = true;
        }

        if let Some(song_index) = overrides.song_index {
            self.source.song_index = song_index;
        }

        if let Some(ref path) = overrides.output_path {
            self.output.path = path.clone();
        }

        if let Some(delimiter) = overrides.delimiter {
            self.output.delimiter = delimiter;
        }

        if overrides.write_report {
            self.output.write_report = true;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| H5TracksError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| H5TracksError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.extensions.iter().all(|e| normalize_extension(e).is_empty()) {
            return Err(H5TracksError::Config {
                message: "At least one file extension must be specified".to_string(),
            });
        }

        if self.scan.max_depth == Some(0) {
            return Err(H5TracksError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        for pattern in &self.scan.exclude_patterns {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(H5TracksError::Config {
                    message: format!("Invalid exclude pattern '{}': {}", pattern, e),
                });
            }
        }

        self.delimiter_byte()?;

        if self.output.path.as_os_str().is_empty() {
            return Err(H5TracksError::Config {
                message: "Output path must not be empty".to_string(),
            });
        }

        if let Some(parent) = self.output.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(H5TracksError::Config {
                    message: format!("Output directory does not exist: {}", parent.display()),
                });
            }
        }

        Ok(())
    }

    /// The delimiter as the single byte the table writer expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        let delimiter = self.output.delimiter;
        if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
            return Err(H5TracksError::Config {
                message: format!(
                    "Delimiter must be a single ASCII character other than a quote or newline, got {:?}",
                    delimiter
                ),
            });
        }
        Ok(delimiter as u8)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

/// Lowercases an extension and drops a leading dot, so `.H5` and `h5` match alike.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub extensions: Option<String>,
    pub max_depth: Option<usize>,
    pub follow_links: bool,
    pub skip_hidden: bool,
    pub skip_unopenable: bool,
    pub song_index: Option<usize>,
    pub output_path: Option<PathBuf>,
    pub delimiter: Option<char>,
    pub write_report: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(mut self, extensions: Option<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    pub fn with_skip_unopenable(mut self, skip: bool) -> Self {
        self.skip_unopenable = skip;
        self
    }

    pub fn with_song_index(mut self, song_index: Option<usize>) -> Self {
        self.song_index = song_index;
        self
    }

    pub fn with_output_path(mut self, path: Option<PathBuf>) -> Self {
        self.output_path = path;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Option<char>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_write_report(mut self, write_report: bool) -> Self {
        self.write_report = write_report;
        self
    }
}
