use crate::accessor::{OpenSong, SongHandle, TrackField};
use crate::error::FieldError;
use crate::extractor::record::{FileFailure, TrackRecord};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub records_extracted: usize,
    pub current_file: Option<String>,
    pub start_time: Instant,
}

impl ExtractionProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            files_processed: 0,
            total_files,
            records_extracted: 0,
            current_file: None,
            start_time: Instant::now(),
        }
    }

    pub fn update_file(&mut self, filename: String, extracted: bool) {
        self.files_processed += 1;
        if extracted {
            self.records_extracted += 1;
        }
        self.current_file = Some(filename);
    }

    pub fn files_skipped(&self) -> usize {
        self.files_processed - self.records_extracted
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.files_processed as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn estimated_remaining(&self) -> Duration {
        if self.files_processed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.elapsed();
        let rate = self.files_processed as f64 / elapsed.as_secs_f64();
        let remaining_files = self.total_files.saturating_sub(self.files_processed);

        if rate > 0.0 {
            Duration::from_secs_f64(remaining_files as f64 / rate)
        } else {
            Duration::from_secs(0)
        }
    }
}

#[derive(Debug)]
pub struct ExtractionOutcome {
    pub records: Vec<TrackRecord>,
    pub failures: Vec<FileFailure>,
    pub progress: ExtractionProgress,
}

pub struct FieldExtractor {
    trim_fields: bool,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self { trim_fields: false }
    }

    pub fn with_trim_fields(mut self, trim: bool) -> Self {
        self.trim_fields = trim;
        self
    }

    /// Extracts one record per song, in input order.
    ///
    /// A song whose fields cannot be read or decoded is skipped and
    /// recorded as a failure. Every handle is released before the next
    /// song is touched, whatever the outcome.
    pub fn extract_all<H: SongHandle>(
        &self,
        songs: Vec<OpenSong<H>>,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
        failure_callback: Option<&dyn Fn(&FileFailure)>,
    ) -> ExtractionOutcome {
        let mut progress = ExtractionProgress::new(songs.len());
        let mut records = Vec::with_capacity(songs.len());
        let mut failures = Vec::new();

        for mut song in songs {
            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            let result = self.extract_record(&mut *song);
            let path = song.path().to_path_buf();
            let filename = song.display_path();

            if let Err(e) = song.release() {
                tracing::warn!(path = %path.display(), error = %e, "failed to release song file");
            }

            match result {
                Ok(record) => {
                    tracing::debug!(path = %path.display(), track_id = %record.track_id, "extracted record");
                    records.push(record);
                    progress.update_file(filename, true);
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping song file");
                    let failure = FileFailure::field(path, &e);
                    if let Some(callback) = failure_callback {
                        callback(&failure);
                    }
                    failures.push(failure);
                    progress.update_file(filename, false);
                }
            }
        }

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        ExtractionOutcome {
            records,
            failures,
            progress,
        }
    }

    /// Reads artist, track id and title from one open song.
    pub fn extract_record<H: SongHandle>(
        &self,
        song: &mut H,
    ) -> std::result::Result<TrackRecord, FieldError> {
        let artist = self.decode(TrackField::ArtistName, song.artist_name()?)?;
        let track_id = self.decode(TrackField::TrackId, song.track_id()?)?;
        let title = self.decode(TrackField::Title, song.title()?)?;

        Ok(TrackRecord {
            track_id,
            artist,
            title,
        })
    }

    fn decode(&self, field: TrackField, bytes: Vec<u8>) -> std::result::Result<String, FieldError> {
        let text = String::from_utf8(bytes).map_err(|source| FieldError::Decode { field, source })?;

        if self.trim_fields {
            Ok(text.trim().to_string())
        } else {
            Ok(text)
        }
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}
