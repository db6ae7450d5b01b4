//! JSONL file-backed plan history.
//!
//! Each [`HistoryEntry`] is one JSON line tagged with its `kind`. The file is
//! append-only; existing lines are loaded into memory on open so queries
//! never touch the disk.

use async_trait::async_trait;
use pact_application::ports::history::{
    AdaptationRecord, HistoryEntry, HistoryError, HistoryStore, ReassignmentRecord,
    adaptations_for, reassignments_for,
};
use pact_domain::{IntentId, MissionId};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Append-only JSONL history store.
///
/// Writes go through `Mutex<BufWriter<File>>` and are flushed per entry.
pub struct JsonlHistoryStore {
    writer: Mutex<BufWriter<File>>,
    entries: RwLock<Vec<HistoryEntry>>,
    path: PathBuf,
}

impl JsonlHistoryStore {
    /// Open (or create) the history file at `path`, loading prior entries.
    ///
    /// Lines that fail to parse are skipped with a warning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            Self::read_entries(path)?
        } else {
            Vec::new()
        };
        debug!(
            "Loaded {} history entries from {}",
            entries.len(),
            path.display()
        );

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            entries: RwLock::new(entries),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(path: &Path) -> Result<Vec<HistoryEntry>, HistoryError> {
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    "Skipping malformed history line {} in {}: {}",
                    n + 1,
                    path.display(),
                    e
                ),
            }
        }
        Ok(entries)
    }

    fn write_line(&self, line: &str) -> Result<(), HistoryError> {
        let Ok(mut writer) = self.writer.lock() else {
            return Err(HistoryError::Unavailable(
                "history writer lock poisoned".to_string(),
            ));
        };
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonlHistoryStore {
    async fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let line = serde_json::to_string(&entry)?;
        let mut entries = self.entries.write().await;
        self.write_line(&line)?;
        entries.push(entry);
        Ok(())
    }

    async fn reassignments(
        &self,
        mission: &MissionId,
    ) -> Result<Vec<ReassignmentRecord>, HistoryError> {
        Ok(reassignments_for(self.entries.read().await.iter(), mission))
    }

    async fn adaptations(&self, intent: &IntentId) -> Result<Vec<AdaptationRecord>, HistoryError> {
        Ok(adaptations_for(self.entries.read().await.iter(), intent))
    }

    async fn len(&self) -> Result<usize, HistoryError> {
        Ok(self.entries.read().await.len())
    }
}

impl Drop for JsonlHistoryStore {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
