//! Song files in the Million Song Dataset HDF5 layout.
//!
//! Each file holds compound tables with one row per song. Artist and title
//! live in `/metadata/songs`; the track identifier lives in `/analysis/songs`.

use super::{SongAccessor, SongHandle, TrackField};
use crate::error::{FieldError, H5TracksError, Result};
use hdf5::types::FixedAscii;
use hdf5::H5Type;
use std::path::{Path, PathBuf};

pub const METADATA_TABLE: &str = "metadata/songs";
pub const ANALYSIS_TABLE: &str = "analysis/songs";

// Memory layouts name only the columns we need. HDF5 matches compound
// members by name, so the remaining columns are left out of the read.
#[derive(H5Type, Clone, Debug)]
#[repr(C)]
struct MetadataColumns {
    artist_name: FixedAscii<1024>,
    title: FixedAscii<1024>,
}

#[derive(H5Type, Clone, Debug)]
#[repr(C)]
struct AnalysisColumns {
    track_id: FixedAscii<1024>,
}

pub struct Hdf5Accessor {
    song_index: usize,
}

impl Hdf5Accessor {
    pub fn new(song_index: usize) -> Self {
        Self { song_index }
    }
}

impl Default for Hdf5Accessor {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SongAccessor for Hdf5Accessor {
    type Handle = Hdf5Song;

    fn open(&self, path: &Path) -> Result<Hdf5Song> {
        let file = hdf5::File::open(path).map_err(|e| H5TracksError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::trace!(path = %path.display(), "opened song file");

        Ok(Hdf5Song {
            file,
            path: path.to_path_buf(),
            song_index: self.song_index,
        })
    }
}

pub struct Hdf5Song {
    file: hdf5::File,
    path: PathBuf,
    song_index: usize,
}

impl Hdf5Song {
    fn read_row<T: H5Type>(&self, table: &str, field: TrackField) -> std::result::Result<T, FieldError> {
        let dataset = self
            .file
            .dataset(table)
            .map_err(|e| FieldError::read(field, format!("table /{}: {}", table, e)))?;

        let rows: Vec<T> = dataset
            .read_raw::<T>()
            .map_err(|e| FieldError::read(field, format!("table /{}: {}", table, e)))?;

        let row_count = rows.len();
        rows.into_iter().nth(self.song_index).ok_or_else(|| {
            FieldError::read(
                field,
                format!(
                    "song index {} out of range (/{} has {} rows)",
                    self.song_index, table, row_count
                ),
            )
        })
    }
}

impl SongHandle for Hdf5Song {
    fn read_field(&mut self, field: TrackField) -> std::result::Result<Vec<u8>, FieldError> {
        let value = match field {
            TrackField::ArtistName => self.read_row::<MetadataColumns>(METADATA_TABLE, field)?.artist_name,
            TrackField::Title => self.read_row::<MetadataColumns>(METADATA_TABLE, field)?.title,
            TrackField::TrackId => self.read_row::<AnalysisColumns>(ANALYSIS_TABLE, field)?.track_id,
        };

        Ok(strip_padding(value.as_bytes()).to_vec())
    }

    fn close(self) -> Result<()> {
        let path = self.path;
        self.file.close().map_err(|e| H5TracksError::Close {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::trace!(path = %path.display(), "closed song file");
        Ok(())
    }
}

// Fixed-width columns are NUL padded on disk.
fn strip_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}
