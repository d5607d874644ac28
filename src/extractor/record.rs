use crate::accessor::TrackField;
use crate::error::{FieldError, H5TracksError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One row of the output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub track_id: String,
    pub artist: String,
    pub title: String,
}

impl TrackRecord {
    pub fn new<S: Into<String>>(track_id: S, artist: S, title: S) -> Self {
        Self {
            track_id: track_id.into(),
            artist: artist.into(),
            title: title.into(),
        }
    }

    pub fn as_row(&self) -> [&str; 3] {
        [&self.track_id, &self.artist, &self.title]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Open,
    Read,
    Decode,
}

/// A song file that produced no row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub stage: FailureStage,
    pub field: Option<String>,
    pub reason: String,
}

impl FileFailure {
    pub fn open(path: PathBuf, error: &H5TracksError) -> Self {
        Self {
            path,
            stage: FailureStage::Open,
            field: None,
            reason: error.to_string(),
        }
    }

    pub fn field(path: PathBuf, error: &FieldError) -> Self {
        let stage = match error {
            FieldError::Read { .. } => FailureStage::Read,
            FieldError::Decode { .. } => FailureStage::Decode,
        };

        Self {
            path,
            stage,
            field: Some(error.field().as_str().to_string()),
            reason: error.to_string(),
        }
    }

    pub fn failed_field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn display_message(&self) -> String {
        format!("Error processing file {}: {}", self.path.display(), self.reason)
    }
}
