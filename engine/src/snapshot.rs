//! Snapshot format for persisting a library.
//!
//! Snapshots are the bridge between the in-memory [`Library`] and the file
//! on disk. Record order is preserved so reference numbers survive a
//! save/load cycle.

use crate::{error::Result, Error, Library, Record};
use serde::{Deserialize, Serialize};

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// A point-in-time copy of a library's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySnapshot {
    /// Snapshot format version
    pub format_version: u32,
    /// Records in reference-number order
    #[serde(default)]
    pub records: Vec<Record>,
}

impl LibrarySnapshot {
    /// Capture the records of a library.
    pub fn capture(library: &Library) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            records: library.records().to_vec(),
        }
    }

    /// Turn the snapshot back into a library with a clean change log.
    pub fn restore(self) -> Result<Library> {
        Library::from_records(self.records)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))?;

        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::UnsupportedFormat(snapshot.format_version));
        }

        Ok(snapshot)
    }
}
