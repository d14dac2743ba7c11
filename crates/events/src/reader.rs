//! Journal reader - replays day files in chronological order

use crate::error::EventError;
use crate::record::JournalRecord;
use crate::store::DAY_FILE_EXT;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

pub struct EventReader {
    day_files: Vec<PathBuf>,
}

impl EventReader {
    /// Collect the day files under `dir`. A missing directory is an empty journal.
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, EventError> {
        let dir = dir.as_ref();
        let mut day_files = Vec::new();

        if dir.exists() {
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                if path.extension().is_some_and(|ext| ext == DAY_FILE_EXT) {
                    day_files.push(path);
                }
            }
        }
        day_files.sort();

        Ok(Self { day_files })
    }

    /// Every record, oldest first
    pub fn read_all(&self) -> Result<Vec<JournalRecord>, EventError> {
        let mut records = Vec::new();
        for path in &self.day_files {
            records.extend(read_day_file(path)?);
        }
        Ok(records)
    }

    /// The chain head to continue appending after. Empty day files are
    /// skipped, so a day whose first append failed does not hide earlier days.
    pub fn last_record(&self) -> Result<Option<JournalRecord>, EventError> {
        for path in self.day_files.iter().rev() {
            if let Some(record) = read_day_file(path)?.pop() {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

fn read_day_file(path: &Path) -> Result<Vec<JournalRecord>, EventError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            records.push(serde_json::from_str(&line)?);
        }
    }
    Ok(records)
}
