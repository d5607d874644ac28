use crate::error::{H5TracksError, Result};
use crate::extractor::record::TrackRecord;
use std::path::{Path, PathBuf};

pub const TABLE_HEADER: [&str; 3] = ["Track Id", "Artist", "Title"];

pub struct TableWriter {
    path: PathBuf,
    delimiter: u8,
}

impl TableWriter {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates or truncates the table and writes the header plus one row
    /// per record. Returns the number of data rows written.
    pub fn write(&self, records: &[TrackRecord]) -> Result<usize> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_path(&self.path)
            .map_err(|e| self.write_error(e))?;

        writer.write_record(TABLE_HEADER).map_err(|e| self.write_error(e))?;

        for record in records {
            writer
                .write_record(record.as_row())
                .map_err(|e| self.write_error(e))?;
        }

        writer
            .flush()
            .map_err(|e| self.write_error(csv::Error::from(e)))?;

        tracing::info!(path = %self.path.display(), rows = records.len(), "wrote track table");
        Ok(records.len())
    }

    fn write_error(&self, source: csv::Error) -> H5TracksError {
        H5TracksError::OutputWrite {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Parses a table written by [`TableWriter`] back into records.
pub fn read_table<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<TrackRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_path(path.as_ref())?;

    let headers = reader.headers()?.clone();
    if headers.iter().ne(TABLE_HEADER.iter().copied()) {
        return Err(H5TracksError::InvalidPath {
            path: format!(
                "{} does not have the expected header {}",
                path.as_ref().display(),
                TABLE_HEADER.join(",")
            ),
        });
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(TrackRecord {
            track_id: row.get(0).unwrap_or_default().to_string(),
            artist: row.get(1).unwrap_or_default().to_string(),
            title: row.get(2).unwrap_or_default().to_string(),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_records() -> Vec<TrackRecord> {
        vec![
            TrackRecord::new("TRAAAAW128F429D538", "Casual", "I Didn't Mean To"),
            TrackRecord::new("TRAAABD128F429CF47", "The Box Tops", "Soul Deep"),
            TrackRecord::new("TRAAADZ128F9348C2E", "Sonora Santanera", "Amor De Cabaret"),
            TrackRecord::new("TRAAAEF128F4273421", "Adam Ant", "Something Girls"),
            TrackRecord::new("TRAAAFD128F92F423A", "Gob", "Face the Ashes"),
            TrackRecord::new("TRAAAMO128F1481E7F", "Sigur Rós", "Við spilum endalaust"),
        ]
    }

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracks.csv");
        let records = sample_records();

        let written = TableWriter::new(&path).write(&records).unwrap();
        assert_eq!(written, records.len());

        let parsed = read_table(&path, b',').unwrap();
        assert_eq!(parsed, records);
    }

    #[test]
    fn test_header_only_for_empty_input() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.csv");

        TableWriter::new(&path).write(&[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Track Id,Artist,Title\n");
        assert!(read_table(&path, b',').unwrap().is_empty());
    }

    #[test]
    fn test_quoting_of_special_characters() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("quoted.csv");
        let records = vec![
            TrackRecord::new("TR1", "Crosby, Stills & Nash", "Suite: Judy Blue Eyes"),
            TrackRecord::new("TR2", "Artist", "The \"Quoted\" Title, Part 2"),
            TrackRecord::new("TR3", "Artist", "Line one\nline two"),
        ];

        TableWriter::new(&path).write(&records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Crosby, Stills & Nash\""));
        assert!(content.contains("\"The \"\"Quoted\"\" Title, Part 2\""));

        assert_eq!(read_table(&path, b',').unwrap(), records);
    }

    #[test]
    fn test_custom_delimiter() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracks.tsv");
        let records = vec![TrackRecord::new("TR1", "Tab\tArtist", "Title")];

        TableWriter::new(&path).with_delimiter(b'\t').write(&records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Track Id\tArtist\tTitle\n"));
        assert_eq!(read_table(&path, b'\t').unwrap(), records);
    }

    #[test]
    fn test_truncates_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracks.csv");
        std::fs::write(&path, "stale content that is much longer than the new table\n".repeat(10)).unwrap();

        TableWriter::new(&path).write(&sample_records()[..1]).unwrap();

        assert_eq!(read_table(&path, b',').unwrap().len(), 1);
    }

    #[test]
    fn test_unwritable_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("tracks.csv");

        let result = TableWriter::new(&path).write(&sample_records());
        assert!(matches!(result, Err(H5TracksError::OutputWrite { .. })));
    }

    #[test]
    fn test_read_rejects_foreign_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("other.csv");
        std::fs::write(&path, "a,b,c\n1,2,3\n").unwrap();

        assert!(read_table(&path, b',').is_err());
    }
}
