pub mod file_filter;
pub mod song_scanner;

pub use file_filter::FileFilter;
pub use song_scanner::{ScanOutcome, ScanStatistics, SongScanner};
