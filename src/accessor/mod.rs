pub mod h5_song;
#[cfg(test)]
pub(crate) mod testing;

pub use h5_song::{Hdf5Accessor, Hdf5Song};

use crate::error::{FieldError, Result};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

/// The scalar fields pulled out of every song file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackField {
    TrackId,
    ArtistName,
    Title,
}

impl TrackField {
    /// Column name inside the song file.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackField::TrackId => "track_id",
            TrackField::ArtistName => "artist_name",
            TrackField::Title => "title",
        }
    }
}

impl fmt::Display for TrackField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opens song files for reading.
pub trait SongAccessor {
    type Handle: SongHandle;

    fn open(&self, path: &Path) -> Result<Self::Handle>;
}

/// An open song file. Fields come back as the raw stored bytes.
pub trait SongHandle {
    fn read_field(&mut self, field: TrackField) -> std::result::Result<Vec<u8>, FieldError>;

    fn close(self) -> Result<()>;

    fn artist_name(&mut self) -> std::result::Result<Vec<u8>, FieldError> {
        self.read_field(TrackField::ArtistName)
    }

    fn track_id(&mut self) -> std::result::Result<Vec<u8>, FieldError> {
        self.read_field(TrackField::TrackId)
    }

    fn title(&mut self) -> std::result::Result<Vec<u8>, FieldError> {
        self.read_field(TrackField::Title)
    }
}

/// A handle paired with the path it was opened from.
///
/// The handle is closed exactly once: either through [`OpenSong::release`],
/// which reports close failures, or on drop, which logs them.
pub struct OpenSong<H: SongHandle> {
    handle: Option<H>,
    path: PathBuf,
}

impl<H: SongHandle> OpenSong<H> {
    pub fn new(handle: H, path: PathBuf) -> Self {
        Self {
            handle: Some(handle),
            path,
        }
    }

    pub fn open<A>(accessor: &A, path: &Path) -> Result<Self>
    where
        A: SongAccessor<Handle = H>,
    {
        let handle = accessor.open(path)?;
        Ok(Self::new(handle, path.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    pub fn release(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => handle.close(),
            None => Ok(()),
        }
    }
}

impl<H: SongHandle> Deref for OpenSong<H> {
    type Target = H;

    fn deref(&self) -> &H {
        // Only `release` and `drop` take the handle, and both consume the guard.
        self.handle.as_ref().expect("song handle already released")
    }
}

impl<H: SongHandle> DerefMut for OpenSong<H> {
    fn deref_mut(&mut self) -> &mut H {
        self.handle.as_mut().expect("song handle already released")
    }
}

impl<H: SongHandle> Drop for OpenSong<H> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.close() {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to close song file");
            }
        }
    }
}

impl<H: SongHandle> fmt::Debug for OpenSong<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenSong")
            .field("path", &self.path)
            .field("open", &self.handle.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{write_song, FakeAccessor};
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_track_field_names() {
        assert_eq!(TrackField::TrackId.as_str(), "track_id");
        assert_eq!(TrackField::ArtistName.to_string(), "artist_name");
        assert_eq!(TrackField::Title.to_string(), "title");
    }

    #[test]
    fn test_release_closes_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_song(temp_dir.path(), "a.h5", "TR1", "Artist", "Title");
        let accessor = FakeAccessor::new();

        let mut song = OpenSong::open(&accessor, &path).unwrap();
        assert_eq!(song.title().unwrap(), b"Title".to_vec());
        song.release().unwrap();

        assert_eq!(accessor.ledger().opens(&path), 1);
        assert_eq!(accessor.ledger().closes(&path), 1);
    }

    #[test]
    fn test_drop_closes_unreleased_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_song(temp_dir.path(), "a.h5", "TR1", "Artist", "Title");
        let accessor = FakeAccessor::new();

        {
            let _song = OpenSong::open(&accessor, &path).unwrap();
        }

        assert_eq!(accessor.ledger().closes(&path), 1);
    }

    #[test]
    fn test_open_failure_yields_no_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.h5");
        std::fs::write(&path, "unopenable").unwrap();
        let accessor = FakeAccessor::new();

        let result = OpenSong::open(&accessor, &path);
        assert!(result.is_err());
        assert_eq!(accessor.ledger().opens(&path), 0);
        assert_eq!(accessor.ledger().closes(&path), 0);
    }
}
