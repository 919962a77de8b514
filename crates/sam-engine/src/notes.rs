//! Notes kept as a pretty-printed JSON array on disk.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("notes file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub timestamp: String,
    pub content: String,
}

impl Note {
    /// A note stamped with the current local time.
    pub fn now(content: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoteStore {
    path: PathBuf,
}

impl NoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// All notes in insertion order. A missing file is an empty list.
    pub async fn list(&self) -> Result<Vec<Note>, NoteError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn append(&self, content: &str) -> Result<Note, NoteError> {
        let note = Note::now(content);
        self.push(note.clone()).await?;
        Ok(note)
    }

    /// Append an already-stamped note.
    pub async fn push(&self, note: Note) -> Result<(), NoteError> {
        let mut notes = self.list().await?;
        notes.push(note);
        self.write_all(&notes).await?;
        debug!(path = %self.path.display(), count = notes.len(), "notes written");
        Ok(())
    }

    async fn write_all(&self, notes: &[Note]) -> Result<(), NoteError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(notes)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let note = Note::now("x");
        assert!(chrono::NaiveDateTime::parse_from_str(&note.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_serialized_field_names() {
        let note = Note {
            timestamp: "2024-01-02 03:04:05".to_string(),
            content: "buy milk".to_string(),
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"timestamp": "2024-01-02 03:04:05", "content": "buy milk"})
        );
    }
}
