use crate::extractor::ExtractionProgress;
use crate::ui::output::format_duration;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(120);
const EXTRACT_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} songs {msg}";
const SCAN_TEMPLATE: &str = "{spinner:.green} {msg} [{elapsed}]";

/// Terminal progress for the scan and extraction phases.
///
/// A disabled manager hands out hidden bars, so callers never branch on
/// quiet or non-human output themselves.
pub struct ProgressManager {
    bars: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            bars: MultiProgress::new(),
            enabled,
        }
    }

    /// Bar over the opened songs while fields are extracted.
    pub fn create_file_progress(&self, songs: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template(EXTRACT_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let pb = self.bars.add(ProgressBar::new(songs).with_style(style));
        pb.enable_steady_tick(TICK);
        pb
    }

    /// Spinner for the directory walk, where the total is not known up front.
    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::with_template(SCAN_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let pb = self.bars.add(ProgressBar::new_spinner().with_style(style));
        pb.set_message(message.to_string());
        pb.enable_steady_tick(TICK);
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.bars.suspend(f)
        } else {
            f()
        }
    }

    pub fn clear(&self) {
        if self.enabled {
            let _ = self.bars.clear();
        }
    }
}

pub fn update_scan_progress(pb: &ProgressBar, opened: usize, current: &Path) {
    let name = current.file_name().unwrap_or_default().to_string_lossy();
    pb.set_message(format!("Opening song {} ({})", opened + 1, name));
}

pub fn update_file_progress(pb: &ProgressBar, progress: &ExtractionProgress) {
    pb.set_position(progress.files_processed as u64);

    let Some(current) = progress.current_file.as_deref() else {
        return;
    };

    let remaining = progress.estimated_remaining();
    if remaining.as_secs() > 0 {
        pb.set_message(format!("{} (ETA {})", current, format_duration(remaining)));
    } else {
        pb.set_message(current.to_string());
    }
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    pb.finish_with_message(format!("{} in {}", message, format_duration(duration)));
}
