use crate::error::{H5TracksError, UserFriendlyError};
use crate::extractor::{ExtractionReport, FileFailure};
use console::{style, Emoji, StyledObject, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static SAVED: Emoji = Emoji("✅ ", "✓ ");
static FAILED: Emoji = Emoji("❌ ", "✗ ");
static NOTE: Emoji = Emoji("ℹ️  ", "i ");
static SKIPPED: Emoji = Emoji("⚠️  ", "! ");
static STEP: Emoji = Emoji("🎵 ", "> ");

/// Kinds of console line. Each knows its verbosity threshold and stream.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Line {
    Success,
    Error,
    Suggestion,
    Skipped,
    Step,
    Info,
    Debug,
}

impl Line {
    /// `None` means the line is printed even in quiet mode.
    fn min_verbosity(self) -> Option<u8> {
        match self {
            Line::Error | Line::Suggestion | Line::Skipped => None,
            Line::Success | Line::Step => Some(0),
            Line::Info => Some(1),
            Line::Debug => Some(2),
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Line::Error | Line::Suggestion | Line::Skipped)
    }

    fn tag(self) -> &'static str {
        match self {
            Line::Success => "success",
            Line::Error => "error",
            Line::Suggestion => "suggestion",
            Line::Skipped => "skipped",
            Line::Step => "step",
            Line::Info => "info",
            Line::Debug => "debug",
        }
    }

    fn emoji(self) -> &'static Emoji<'static, 'static> {
        match self {
            Line::Success => &SAVED,
            Line::Error => &FAILED,
            Line::Skipped => &SKIPPED,
            Line::Step => &STEP,
            Line::Suggestion | Line::Info | Line::Debug => &NOTE,
        }
    }

    fn paint(self, message: &str) -> StyledObject<&str> {
        let styled = style(message);
        match self {
            Line::Success => styled.green().bold(),
            Line::Error => styled.red().bold(),
            Line::Skipped => styled.yellow(),
            Line::Step => styled.bold(),
            Line::Suggestion | Line::Info => styled.cyan(),
            Line::Debug => styled.dim(),
        }
    }
}

/// Operator-facing console output. Diagnostics go through `tracing` instead.
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = mode == OutputMode::Human
            && !quiet
            && Term::stdout().features().colors_supported();

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        self.emit(Line::Success, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Line::Error, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Line::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(Line::Debug, message);
    }

    pub fn start_operation(&self, operation: &str) {
        self.emit(Line::Step, operation);
    }

    /// `Error processing file <path>: <cause>`, one per skipped song.
    pub fn file_skipped(&self, failure: &FileFailure) {
        if self.mode == OutputMode::Json {
            self.print_json(&serde_json::json!({
                "type": Line::Skipped.tag(),
                "path": failure.path.display().to_string(),
                "stage": failure.stage,
                "field": failure.field,
                "reason": failure.reason,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }));
            return;
        }

        self.emit(Line::Skipped, &failure.display_message());
    }

    pub fn print_user_friendly_error(&self, error: &H5TracksError) {
        self.emit(Line::Error, &error.user_message());

        if let Some(suggestion) = error.suggestion() {
            self.emit(Line::Suggestion, &format!("Suggestion: {}", suggestion));
        }
    }

    pub fn print_extraction_report(&self, report: &ExtractionReport) {
        if self.quiet {
            return;
        }

        if self.mode == OutputMode::Json {
            match serde_json::to_string(report) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!(error = %e, "could not serialize run report"),
            }
            return;
        }

        let summary = &report.summary;
        let mut rows = vec![
            ("Source", report.source_root.display().to_string()),
            ("Table", report.output_file.display().to_string()),
            ("Song files", summary.files_found.to_string()),
            ("Rows written", summary.records_written.to_string()),
            ("Files skipped", summary.files_skipped.to_string()),
            ("Time taken", format_duration(summary.duration)),
        ];
        if self.mode == OutputMode::Human {
            rows.push((
                "Extracted at",
                report.extraction_time.format("%Y-%m-%d %H:%M UTC").to_string(),
            ));
        }

        self.print_separator();
        for (label, value) in rows {
            match self.mode {
                OutputMode::Plain => println!("{}: {}", label, value),
                _ if self.use_colors => println!("  {:<14} {}", label, style(value).cyan().bold()),
                _ => println!("  {:<14} {}", label, value),
            }
        }

        if report.has_failures() && self.verbose_level >= 1 {
            println!();
            for failure in &report.failures {
                println!("  - {}: {}", failure.path.display(), failure.reason);
            }
        }
        self.print_separator();
    }

    pub fn print_separator(&self) {
        if self.quiet || self.mode == OutputMode::Json {
            return;
        }

        if self.use_colors {
            println!("{}", style("─".repeat(60)).dim());
        } else {
            println!("{}", "-".repeat(60));
        }
    }

    fn should_show(&self, line: Line) -> bool {
        match line.min_verbosity() {
            None => true,
            Some(level) => !self.quiet && self.verbose_level >= level,
        }
    }

    fn emit(&self, line: Line, message: &str) {
        if !self.should_show(line) {
            return;
        }

        let text = match self.mode {
            OutputMode::Json => {
                self.print_json(&serde_json::json!({
                    "type": line.tag(),
                    "message": message,
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }));
                return;
            }
            OutputMode::Plain => format!("{}: {}", line.tag().to_uppercase(), message),
            OutputMode::Human if self.use_colors => {
                format!("{}{}", line.emoji(), line.paint(message))
            }
            OutputMode::Human => format!("{}{}", line.emoji(), message),
        };

        if line.to_stderr() {
            eprintln!("{}", text);
        } else {
            println!("{}", text);
        }
    }

    fn print_json(&self, value: &serde_json::Value) {
        println!("{}", value);
    }
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

/// Prints through the formatter without tearing active progress bars.
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn file_skipped(&self, failure: &FileFailure) {
        match self.progress_manager {
            Some(pm) => pm.suspend(|| self.formatter.file_skipped(failure)),
            None => self.formatter.file_skipped(failure),
        }
    }
}
