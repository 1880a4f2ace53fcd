//! Library - the ordered, in-memory collection of records.
//!
//! Positions are 1-based reference numbers. The library enforces that no
//! two records share a DOI and records one [`ChangeTag`] per mutation made
//! through its mutating methods.

use crate::{
    changes::{ChangeLog, ChangeTag},
    error::Result,
    sort::SortMode,
    Error, Position, Record, Timestamp,
};

/// Ordered records plus the log of unsaved mutations.
#[derive(Debug, Clone, Default)]
pub struct Library {
    records: Vec<Record>,
    changes: ChangeLog,
}

impl Library {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from already-persisted records.
    ///
    /// The change log starts empty. Fails if two records share a DOI.
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let mut library = Self::new();
        for record in records {
            if library.position_of(&record.doi).is_some() {
                return Err(Error::DuplicateIdentifier(record.doi));
            }
            library.records.push(record);
        }
        Ok(library)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in reference-number order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Get the record at a 1-based position.
    pub fn get(&self, position: Position) -> Option<&Record> {
        position
            .checked_sub(1)
            .and_then(|index| self.records.get(index))
    }

    /// Get a mutable record at a 1-based position.
    ///
    /// Changes made this way are not logged.
    pub fn get_mut(&mut self, position: Position) -> Option<&mut Record> {
        position
            .checked_sub(1)
            .and_then(|index| self.records.get_mut(index))
    }

    /// Position of the record with this DOI.
    pub fn position_of(&self, doi: &str) -> Option<Position> {
        self.records
            .iter()
            .position(|r| r.doi == doi)
            .map(|index| index + 1)
    }

    /// Check that `position` names an existing record.
    pub fn check_position(&self, position: Position) -> Result<()> {
        if position == 0 || position > self.len() {
            return Err(Error::PositionOutOfRange {
                position,
                len: self.len(),
            });
        }
        Ok(())
    }

    /// Append a new record. Returns its position.
    pub fn append(&mut self, record: Record) -> Result<Position> {
        if self.position_of(&record.doi).is_some() {
            return Err(Error::DuplicateIdentifier(record.doi));
        }
        self.records.push(record);
        self.changes.push(ChangeTag::Add);
        Ok(self.records.len())
    }

    /// Replace the record at `position`, returning the old one.
    pub fn replace(&mut self, position: Position, record: Record) -> Result<Record> {
        self.check_position(position)?;
        if let Some(other) = self.position_of(&record.doi) {
            if other != position {
                return Err(Error::DuplicateIdentifier(record.doi));
            }
        }
        let old = std::mem::replace(&mut self.records[position - 1], record);
        self.changes.push(ChangeTag::Update);
        Ok(old)
    }

    /// Remove the record at `position`.
    ///
    /// Later records shift down by one, so callers removing several
    /// positions must go from highest to lowest.
    pub fn remove(&mut self, position: Position) -> Result<Record> {
        self.check_position(position)?;
        let removed = self.records.remove(position - 1);
        self.changes.push(ChangeTag::Delete);
        Ok(removed)
    }

    /// Stamp the record at `position` as opened at `now`.
    pub fn mark_opened(&mut self, position: Position, now: Timestamp) -> Result<()> {
        self.check_position(position)?;
        self.records[position - 1].time_opened = Some(now);
        self.changes.push(ChangeTag::Open);
        Ok(())
    }

    /// Sort in place. Logs a change only if the order moved.
    pub fn sort(&mut self, mode: SortMode) -> bool {
        if self.records.is_empty() {
            return false;
        }
        let before: Vec<String> = self.records.iter().map(|r| r.doi.clone()).collect();
        mode.sort(&mut self.records);
        let changed = self
            .records
            .iter()
            .zip(&before)
            .any(|(record, doi)| record.doi != *doi);
        if changed {
            self.changes.push(ChangeTag::Sort);
        }
        changed
    }

    /// Unsaved mutations.
    pub fn changes(&self) -> &ChangeLog {
        &self.changes
    }

    /// Whether there are unsaved mutations.
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Mark the library as saved.
    pub fn mark_saved(&mut self) {
        self.changes.clear();
    }
}
