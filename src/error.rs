use crate::accessor::TrackField;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum H5TracksError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Input directory not found: {path}")]
    RootNotFound { path: String },

    #[error("Failed to open song file {path}: {message}")]
    Open { path: String, message: String },

    #[error("Failed to close song file {path}: {message}")]
    Close { path: String, message: String },

    #[error("Failed to write table {path}: {source}")]
    OutputWrite {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("CSV operation failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write report: {message}")]
    Report { message: String },
}

/// Failure while pulling a single field out of an open song file.
///
/// These never abort a run; the file that produced one is skipped.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("failed to read {field}: {message}")]
    Read { field: TrackField, message: String },

    #[error("{field} is not valid UTF-8: {source}")]
    Decode {
        field: TrackField,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

impl FieldError {
    pub fn read<S: Into<String>>(field: TrackField, message: S) -> Self {
        FieldError::Read {
            field,
            message: message.into(),
        }
    }

    pub fn field(&self) -> TrackField {
        match self {
            FieldError::Read { field, .. } | FieldError::Decode { field, .. } => *field,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for H5TracksError {
    fn user_message(&self) -> String {
        match self {
            H5TracksError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            H5TracksError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            H5TracksError::RootNotFound { path } => {
                format!("Input directory does not exist: {}", path)
            }
            H5TracksError::Open { path, message } => {
                format!("Could not open {}: {}", path, message)
            }
            H5TracksError::Close { path, message } => {
                format!("Could not close {}: {}", path, message)
            }
            H5TracksError::OutputWrite { path, source } => {
                format!("Could not write output table {}: {}", path, source)
            }
            H5TracksError::Report { message } => {
                format!("Could not write report: {}", message)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            H5TracksError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            H5TracksError::InvalidPath { .. } | H5TracksError::RootNotFound { .. } => Some(
                "Pass an existing, readable directory as INPUT_DIR.".to_string()
            ),
            H5TracksError::Open { .. } => Some(
                "The file may be corrupt or not an HDF5 file. Use --skip-unopenable to skip such files.".to_string()
            ),
            H5TracksError::OutputWrite { .. } => Some(
                "Ensure the output directory exists and you have write permission, or choose another path with --output.".to_string()
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, H5TracksError>;
