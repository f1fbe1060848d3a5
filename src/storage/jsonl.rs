//! JSONL (JSON Lines) storage.
//!
//! Observation streams can be kept as JSONL, one observation per line,
//! already ordered by portal and newest first.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use super::StorageError;
use crate::models::Observation;

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    /// Create a new JSONL writer for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Ensure the parent directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write entities, replacing the entire file.
    pub fn write_all(&self, entities: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut count = 0;

        for entity in entities {
            let json = serde_json::to_string(entity)?;
            writeln!(writer, "{}", json)?;
            count += 1;
        }

        writer.flush()?;
        info!("Wrote {} entities to {:?}", count, self.path);

        Ok(count)
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    /// Create a new JSONL reader for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Check if the file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every entity. A line that fails to parse fails the read.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        let entities = self.iter()?.collect::<Result<Vec<T>, _>>()?;
        debug!("Read {} entities from {:?}", entities.len(), self.path);
        Ok(entities)
    }

    /// Create an iterator over the file.
    pub fn iter(&self) -> Result<JsonlIterator<T>, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::PathNotFound(self.path.clone()));
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        Ok(JsonlIterator {
            path: self.path.clone(),
            reader,
            line_num: 0,
            _marker: PhantomData,
        })
    }
}

/// Iterator over JSONL file entries.
pub struct JsonlIterator<T> {
    path: PathBuf,
    reader: BufReader<File>,
    line_num: usize,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> Iterator for JsonlIterator<T> {
    type Item = Result<T, StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();

        loop {
            line.clear();
            self.line_num += 1;
            match self.reader.read_line(&mut line) {
                Ok(0) => return None, // EOF
                Ok(_) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(&line).map_err(|source| {
                        StorageError::JsonLine {
                            path: self.path.clone(),
                            line: self.line_num,
                            source,
                        }
                    }));
                }
                Err(e) => return Some(Err(StorageError::Io(e))),
            }
        }
    }
}

/// Read an observation stream.
pub fn read_observations(path: &Path) -> Result<Vec<Observation>, StorageError> {
    JsonlReader::new(path.to_path_buf()).read_all()
}

/// Write an observation stream, replacing the file.
pub fn write_observations(path: &Path, observations: &[Observation]) -> Result<usize, StorageError> {
    JsonlWriter::new(path.to_path_buf()).write_all(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Faction;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample() -> Vec<Observation> {
        vec![
            Observation::new("p1", Utc.timestamp_opt(300, 0).unwrap(), Faction(1))
                .with_level(3)
                .with_health(75)
                .with_links(2),
            Observation::new("p1", Utc.timestamp_millis_opt(199_999).unwrap(), Faction(0))
                .with_health(0),
        ]
    }

    #[test]
    fn test_observations_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("observations.jsonl");

        let count = write_observations(&path, &sample()).unwrap();
        assert_eq!(count, 2);

        let read = read_observations(&path).unwrap();
        assert_eq!(read, sample());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.jsonl");

        let reader: JsonlReader<Observation> = JsonlReader::new(path);
        assert!(!reader.exists());
        assert!(matches!(
            reader.read_all(),
            Err(StorageError::PathNotFound(_))
        ));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blank.jsonl");
        fs::write(
            &path,
            "{\"portal_id\":\"a\",\"timestamp\":\"2019-01-01T00:00:00Z\",\"owner\":1}\n\n   \n",
        )
        .unwrap();

        let read = read_observations(&path).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].health, 100);
    }

    #[test]
    fn test_bad_line_reports_position() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.jsonl");
        fs::write(
            &path,
            "{\"portal_id\":\"a\",\"timestamp\":\"2019-01-01T00:00:00Z\",\"owner\":1}\nnot json\n",
        )
        .unwrap();

        match read_observations(&path) {
            Err(StorageError::JsonLine { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected JsonLine error, got {:?}", other.map(|v| v.len())),
        }
    }
}
