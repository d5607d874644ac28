use crate::accessor::{OpenSong, SongAccessor};
use crate::config::ScanConfig;
use crate::error::{H5TracksError, Result};
use crate::extractor::FileFailure;
use crate::scanner::file_filter::FileFilter;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Song files opened by a scan, in traversal order.
pub struct ScanOutcome<H: crate::accessor::SongHandle> {
    pub songs: Vec<OpenSong<H>>,
    /// Files that could not be opened. Only populated when
    /// `skip_unopenable` is set; otherwise the first such file aborts the scan.
    pub failures: Vec<FileFailure>,
}

impl<H: crate::accessor::SongHandle> ScanOutcome<H> {
    pub fn files_found(&self) -> usize {
        self.songs.len() + self.failures.len()
    }
}

pub struct SongScanner {
    filter: FileFilter,
    max_depth: Option<usize>,
    follow_links: bool,
    skip_unopenable: bool,
}

impl SongScanner {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            filter: FileFilter::new(config),
            max_depth: config.max_depth,
            follow_links: config.follow_links,
            skip_unopenable: config.skip_unopenable,
        }
    }

    pub fn with_skip_unopenable(mut self, skip: bool) -> Self {
        self.skip_unopenable = skip;
        self
    }

    /// Lists matching song files under `root` without opening them.
    ///
    /// Traversal is depth-first with the entries of every directory sorted
    /// by file name, so the order is stable for a given tree.
    pub fn discover<P: AsRef<Path>>(&self, root: P) -> Result<Vec<PathBuf>> {
        let root_path = root.as_ref();
        validate_root(root_path)?;

        let mut paths = Vec::new();

        let mut walkdir = WalkDir::new(root_path)
            .follow_links(self.follow_links)
            .sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walkdir = walkdir.max_depth(depth);
        }

        let walker = walkdir
            .into_iter()
            .filter_entry(|e| self.should_traverse(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.depth() == 0 {
                        return Err(H5TracksError::InvalidPath {
                            path: format!("{} is not readable: {}", root_path.display(), err),
                        });
                    }
                    // Unreadable subdirectories are skipped, not fatal.
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if entry.file_type().is_file() && self.filter.is_song_file(entry.path()) {
                tracing::debug!(path = %entry.path().display(), "found song file");
                paths.push(entry.into_path());
            }
        }

        tracing::info!(root = %root_path.display(), files = paths.len(), "discovery complete");
        Ok(paths)
    }

    /// Discovers song files under `root` and opens each through `accessor`.
    ///
    /// An open failure aborts the scan unless `skip_unopenable` is set.
    /// Handles opened before an abort are released when the partial
    /// result is dropped.
    pub fn scan<A: SongAccessor>(
        &self,
        root: &Path,
        accessor: &A,
        progress_callback: Option<&dyn Fn(usize, &Path)>,
    ) -> Result<ScanOutcome<A::Handle>> {
        let paths = self.discover(root)?;

        let mut songs = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();

        for (index, path) in paths.iter().enumerate() {
            if let Some(callback) = progress_callback {
                callback(index, path);
            }

            match OpenSong::open(accessor, path) {
                Ok(song) => songs.push(song),
                Err(e) if self.skip_unopenable => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unopenable song file");
                    failures.push(FileFailure::open(path.clone(), &e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(ScanOutcome { songs, failures })
    }

    fn should_traverse(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        self.filter.should_traverse_directory(entry.path())
    }

    pub fn get_statistics(&self, paths: &[PathBuf]) -> ScanStatistics {
        let total_size = paths
            .iter()
            .filter_map(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .sum();

        let directories: BTreeSet<&Path> = paths.iter().filter_map(|p| p.parent()).collect();

        ScanStatistics {
            total_files: paths.len(),
            total_size,
            directories: directories.len(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        self.filter.get_extensions()
    }
}

fn validate_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(H5TracksError::RootNotFound {
            path: root.display().to_string(),
        });
    }

    if !root.is_dir() {
        return Err(H5TracksError::InvalidPath {
            path: format!("{} is not a directory", root.display()),
        });
    }

    std::fs::read_dir(root).map_err(|e| H5TracksError::InvalidPath {
        path: format!("{} is not readable: {}", root.display(), e),
    })?;

    Ok(())
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub directories: usize,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        format!(
            "Scan Results:\n  Song files: {}\n  Total size: {}\n  Directories: {}\n",
            self.total_files,
            format_bytes(self.total_size),
            self.directories
        )
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::testing::{write_song, FakeAccessor};
    use std::fs;
    use tempfile::TempDir;

    fn scanner() -> SongScanner {
        SongScanner::new(&ScanConfig::default())
    }

    #[test]
    fn test_discover_is_recursive_and_ordered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        write_song(root, "B/b2.h5", "TR4", "a", "t");
        write_song(root, "A/B/ab.h5", "TR2", "a", "t");
        write_song(root, "A/a1.h5", "TR1", "a", "t");
        write_song(root, "B/b1.h5", "TR3", "a", "t");
        write_song(root, "top.h5", "TR5", "a", "t");
        fs::write(root.join("A/readme.txt"), "not a song").unwrap();

        let paths = scanner().discover(root).unwrap();
        let relative: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("A/B/ab.h5"),
                PathBuf::from("A/a1.h5"),
                PathBuf::from("B/b1.h5"),
                PathBuf::from("B/b2.h5"),
                PathBuf::from("top.h5"),
            ]
        );

        // Same tree, same order.
        assert_eq!(scanner().discover(root).unwrap(), paths);
    }

    #[test]
    fn test_discover_enters_hidden_directories_by_default() {
        let temp_dir = TempDir::new().unwrap();
        write_song(temp_dir.path(), ".collection/TR1.h5", "TR1", "a", "t");
        write_song(temp_dir.path(), "TR2.h5", "TR2", "a", "t");

        let paths = scanner().discover(temp_dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with(".collection/TR1.h5"));
    }

    #[test]
    fn test_discover_skips_hidden_directories_when_configured() {
        let temp_dir = TempDir::new().unwrap();
        write_song(temp_dir.path(), ".trash/old.h5", "TR0", "a", "t");
        write_song(temp_dir.path(), "keep.h5", "TR1", "a", "t");

        let config = ScanConfig {
            skip_hidden: true,
            ..ScanConfig::default()
        };
        let paths = SongScanner::new(&config).discover(temp_dir.path()).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("keep.h5"));
    }

    #[test]
    fn test_discover_has_no_default_depth_limit() {
        let temp_dir = TempDir::new().unwrap();
        let nested: PathBuf = std::iter::repeat("d").take(70).collect();
        let deep = write_song(temp_dir.path(), nested.join("deep.h5").to_str().unwrap(), "TR1", "a", "t");

        let paths = scanner().discover(temp_dir.path()).unwrap();
        assert_eq!(paths, vec![deep]);
    }

    #[test]
    fn test_discover_respects_configured_depth() {
        let temp_dir = TempDir::new().unwrap();
        write_song(temp_dir.path(), "top.h5", "TR1", "a", "t");
        write_song(temp_dir.path(), "A/B/deep.h5", "TR2", "a", "t");

        let config = ScanConfig {
            max_depth: Some(1),
            ..ScanConfig::default()
        };
        let paths = SongScanner::new(&config).discover(temp_dir.path()).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("top.h5"));
    }

    #[test]
    fn test_missing_root_is_structural() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let result = scanner().discover(&missing);
        assert!(matches!(result, Err(H5TracksError::RootNotFound { .. })));
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = write_song(temp_dir.path(), "song.h5", "TR1", "a", "t");

        let result = scanner().discover(&file);
        assert!(matches!(result, Err(H5TracksError::InvalidPath { .. })));
    }

    #[test]
    fn test_empty_tree() {
        let temp_dir = TempDir::new().unwrap();
        let accessor = FakeAccessor::new();

        let outcome = scanner().scan(temp_dir.path(), &accessor, None).unwrap();
        assert!(outcome.songs.is_empty());
        assert_eq!(outcome.files_found(), 0);
    }

    #[test]
    fn test_scan_opens_in_traversal_order() {
        let temp_dir = TempDir::new().unwrap();
        write_song(temp_dir.path(), "b.h5", "TR2", "a", "t");
        write_song(temp_dir.path(), "a.h5", "TR1", "a", "t");
        let accessor = FakeAccessor::new();

        let outcome = scanner().scan(temp_dir.path(), &accessor, None).unwrap();
        let opened: Vec<_> = outcome.songs.iter().map(|s| s.path().to_path_buf()).collect();
        assert_eq!(opened, accessor.ledger().open_order().to_vec());
        assert!(opened[0].ends_with("a.h5"));

        drop(outcome);
        assert!(accessor.ledger().all_closed_once());
    }

    #[test]
    fn test_open_failure_aborts_and_releases_handles() {
        let temp_dir = TempDir::new().unwrap();
        let first = write_song(temp_dir.path(), "a.h5", "TR1", "a", "t");
        fs::write(temp_dir.path().join("b.h5"), "unopenable").unwrap();
        write_song(temp_dir.path(), "c.h5", "TR3", "a", "t");
        let accessor = FakeAccessor::new();

        let result = scanner().scan(temp_dir.path(), &accessor, None);
        assert!(matches!(result, Err(H5TracksError::Open { .. })));

        let ledger = accessor.ledger();
        assert_eq!(ledger.opens(&first), 1);
        assert_eq!(ledger.closes(&first), 1);
        assert_eq!(ledger.open_order().len(), 1);
    }

    #[test]
    fn test_open_failure_skipped_when_configured() {
        let temp_dir = TempDir::new().unwrap();
        write_song(temp_dir.path(), "a.h5", "TR1", "a", "t");
        let broken = temp_dir.path().join("b.h5");
        fs::write(&broken, "unopenable").unwrap();
        write_song(temp_dir.path(), "c.h5", "TR3", "a", "t");
        let accessor = FakeAccessor::new();

        let scanner = scanner().with_skip_unopenable(true);
        let outcome = scanner.scan(temp_dir.path(), &accessor, None).unwrap();

        assert_eq!(outcome.songs.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].path, broken);
        assert_eq!(outcome.files_found(), 3);
    }

    #[test]
    fn test_scan_statistics() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.h5");
        let b = temp_dir.path().join("sub/b.h5");
        fs::create_dir_all(b.parent().unwrap()).unwrap();
        fs::write(&a, vec![0u8; 100]).unwrap();
        fs::write(&b, vec![0u8; 200]).unwrap();

        let stats = scanner().get_statistics(&[a, b]);
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.total_size, 300);
        assert_eq!(stats.directories, 2);
        assert!(stats.display_summary().contains("Song files: 2"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }
}
