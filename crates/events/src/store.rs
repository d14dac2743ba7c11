//! Day-file writer for the journal

use crate::error::EventError;
use crate::record::JournalRecord;
use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub(crate) const DAY_FILE_EXT: &str = "jsonl";

/// `YYYY-MM-DD.jsonl`; lexical order of these names is chronological
pub(crate) fn day_file_name(day: NaiveDate) -> String {
    format!("{}.{}", day.format("%Y-%m-%d"), DAY_FILE_EXT)
}

/// Appends records to the file of the UTC day they were sealed on.
///
/// Each record is written with one unbuffered write. A failed append is rolled
/// back to the previous file length, so the file never holds a record the
/// caller was told did not commit.
pub struct EventStore {
    dir: PathBuf,
    open_day: Option<(NaiveDate, File)>,
}

impl EventStore {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, EventError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, open_day: None })
    }

    pub fn append(&mut self, record: &JournalRecord) -> Result<(), EventError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let day = record.timestamp.date_naive();

        let file = match &mut self.open_day {
            Some((open, file)) if *open == day => file,
            slot => &mut slot.insert((day, Self::open_file(&self.dir, day)?)).1,
        };

        let committed_len = file.metadata()?.len();
        if let Err(e) = file
            .write_all(line.as_bytes())
            .and_then(|()| file.sync_data())
        {
            if let Err(rollback) = file.set_len(committed_len) {
                tracing::error!(
                    sequence = record.sequence,
                    error = %rollback,
                    "failed to roll back partial journal write"
                );
            }
            self.open_day = None;
            return Err(e.into());
        }
        Ok(())
    }

    fn open_file(dir: &Path, day: NaiveDate) -> Result<File, EventError> {
        let path = dir.join(day_file_name(day));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::debug!(path = %path.display(), "journal day file opened");
        Ok(file)
    }
}
