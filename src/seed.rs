//! JSON snapshot of every in-memory collection
//!
//! The CLI loads the snapshot into the memory stores on start and writes it
//! back after each mutating command, so the in-memory backend behaves like a
//! small local database.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::{Comment, TestCase, Ticket, User};
use crate::error::{BugHiveError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeedData {
    pub users: Vec<User>,
    pub tickets: Vec<Ticket>,
    pub test_cases: Vec<TestCase>,
    pub comments: Vec<Comment>,
    /// Id counters, so ids of deleted records stay retired across runs
    pub next_ids: NextIds,
}

/// First id each collection may hand out. Zero means "derive from the records".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NextIds {
    pub users: u64,
    pub tickets: u64,
    pub test_cases: u64,
    pub comments: u64,
}

impl SeedData {
    /// Read a snapshot. A missing file is an empty snapshot.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no seed file, starting empty");
                return Ok(SeedData::default());
            }
            Err(e) => {
                return Err(BugHiveError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read seed data at {}: {}", path.display(), e),
                )));
            }
        };
        if content.trim().is_empty() {
            return Ok(SeedData::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the snapshot through a temp file in the same directory, so the
    /// target is never left half-written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        let json = serde_json::to_string_pretty(self)?;
        temp.write_all(json.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.persist(path).map_err(|e| BugHiveError::Io(e.error))?;

        debug!(path = %path.display(), tickets = self.tickets.len(), "saved seed data");
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
            && self.tickets.is_empty()
            && self.test_cases.is_empty()
            && self.comments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, TicketDraft};
    use crate::types::{EntityId, Timestamp};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let data = SeedData::load(&dir.path().join("none.json")).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("bughive.json");
        let ticket = Ticket::from_draft(
            EntityId::new("1"),
            TicketDraft {
                title: "Broken link".to_string(),
                ..Default::default()
            },
            Timestamp::UNIX_EPOCH,
        );
        let data = SeedData {
            tickets: vec![ticket],
            ..Default::default()
        };
        data.save(&path).unwrap();
        assert_eq!(SeedData::load(&path).unwrap(), data);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bughive.json");
        fs::write(&path, r#"{"users": []}"#).unwrap();
        assert!(SeedData::load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_next_ids_round_trip_and_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bughive.json");
        let data = SeedData {
            next_ids: NextIds {
                tickets: 7,
                ..Default::default()
            },
            ..Default::default()
        };
        data.save(&path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\"nextIds\""));
        assert_eq!(SeedData::load(&path).unwrap().next_ids.tickets, 7);

        fs::write(&path, r#"{"tickets": []}"#).unwrap();
        assert_eq!(SeedData::load(&path).unwrap().next_ids, NextIds::default());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bughive.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(SeedData::load(&path), Err(BugHiveError::Json(_))));
    }
}
