use crate::config::{normalize_extension, ScanConfig};
use regex::Regex;
use std::path::Path;

pub struct FileFilter {
    extensions: Vec<String>,
    skip_hidden: bool,
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl FileFilter {
    pub fn new(config: &ScanConfig) -> Self {
        // Invalid patterns are rejected by Config::validate before we get here.
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();

        let extensions = config
            .extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();

        Self {
            extensions,
            skip_hidden: config.skip_hidden,
            exclude_dirs: config.exclude_dirs.iter().map(|d| d.to_lowercase()).collect(),
            exclude_patterns,
        }
    }

    /// Suffix match on the file name, so a file named just `.h5` counts too.
    pub fn is_song_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();

        self.extensions.iter().any(|ext| {
            name.len() > ext.len()
                && name.ends_with(ext.as_str())
                && name[..name.len() - ext.len()].ends_with('.')
        })
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) else {
            return true;
        };

        if self.skip_hidden && dir_name.starts_with('.') && dir_name != "." && dir_name != ".." {
            return false;
        }

        let dir_name_lower = dir_name.to_lowercase();
        if self.exclude_dirs.iter().any(|exclude| *exclude == dir_name_lower) {
            return false;
        }

        let path_str = path.to_string_lossy();
        !self.exclude_patterns.iter().any(|pattern| pattern.is_match(&path_str))
    }

    pub fn get_extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}
