//! In-memory stand-in for the HDF5 accessor.
//!
//! Song files are small text files with one `field=value` line per field.
//! A file whose content starts with `unopenable` fails to open.

use super::{SongAccessor, SongHandle, TrackField};
use crate::error::{FieldError, H5TracksError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct HandleLedger {
    opens: HashMap<PathBuf, usize>,
    closes: HashMap<PathBuf, usize>,
    open_order: Vec<PathBuf>,
}

impl HandleLedger {
    pub fn opens(&self, path: &Path) -> usize {
        self.opens.get(path).copied().unwrap_or(0)
    }

    pub fn closes(&self, path: &Path) -> usize {
        self.closes.get(path).copied().unwrap_or(0)
    }

    pub fn open_order(&self) -> &[PathBuf] {
        &self.open_order
    }

    pub fn all_closed_once(&self) -> bool {
        self.opens.iter().all(|(path, opens)| *opens == 1 && self.closes(path) == 1)
            && self.closes.keys().all(|path| self.opens(path) == 1)
    }
}

#[derive(Clone, Default)]
pub struct FakeAccessor {
    ledger: Rc<RefCell<HandleLedger>>,
}

impl FakeAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> std::cell::Ref<'_, HandleLedger> {
        self.ledger.borrow()
    }
}

impl SongAccessor for FakeAccessor {
    type Handle = FakeSong;

    fn open(&self, path: &Path) -> Result<FakeSong> {
        let content = std::fs::read(path)?;
        if content.starts_with(b"unopenable") {
            return Err(H5TracksError::Open {
                path: path.display().to_string(),
                message: "file signature not found".to_string(),
            });
        }

        let mut fields = HashMap::new();
        for line in content.split(|b| *b == b'\n') {
            if let Some(pos) = line.iter().position(|b| *b == b'=') {
                let key = String::from_utf8_lossy(&line[..pos]).to_string();
                fields.insert(key, line[pos + 1..].to_vec());
            }
        }

        let mut ledger = self.ledger.borrow_mut();
        *ledger.opens.entry(path.to_path_buf()).or_insert(0) += 1;
        ledger.open_order.push(path.to_path_buf());

        Ok(FakeSong {
            path: path.to_path_buf(),
            fields,
            ledger: Rc::clone(&self.ledger),
        })
    }
}

pub struct FakeSong {
    path: PathBuf,
    fields: HashMap<String, Vec<u8>>,
    ledger: Rc<RefCell<HandleLedger>>,
}

impl SongHandle for FakeSong {
    fn read_field(&mut self, field: TrackField) -> std::result::Result<Vec<u8>, FieldError> {
        self.fields
            .get(field.as_str())
            .cloned()
            .ok_or_else(|| FieldError::read(field, "column not found"))
    }

    fn close(self) -> Result<()> {
        let mut ledger = self.ledger.borrow_mut();
        *ledger.closes.entry(self.path.clone()).or_insert(0) += 1;
        Ok(())
    }
}

pub fn write_song(dir: &Path, name: &str, track_id: &str, artist: &str, title: &str) -> PathBuf {
    write_raw_song(
        dir,
        name,
        &[
            ("track_id", track_id.as_bytes()),
            ("artist_name", artist.as_bytes()),
            ("title", title.as_bytes()),
        ],
    )
}

pub fn write_raw_song(dir: &Path, name: &str, fields: &[(&str, &[u8])]) -> PathBuf {
    let mut content = Vec::new();
    for (key, value) in fields {
        content.extend_from_slice(key.as_bytes());
        content.push(b'=');
        content.extend_from_slice(value);
        content.push(b'\n');
    }

    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
