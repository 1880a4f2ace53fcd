//! Field-level differences between two records.

use crate::record::{FieldValue, Record};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Old and new value of one differing field. `None` means absent.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub old: Option<FieldValue>,
    pub new: Option<FieldValue>,
}

/// Every field that differs between two records, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    changes: BTreeMap<String, FieldChange>,
}

impl Diff {
    /// Number of differing fields. Zero means there is nothing to merge.
    pub fn count(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Names of the differing fields, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.changes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Lines for display: `-` for the old value, `+` for the new one.
    pub fn lines(&self) -> Vec<DiffLine> {
        let mut lines = Vec::new();
        for (field, change) in &self.changes {
            if let Some(old) = &change.old {
                lines.push(DiffLine::Removed(format!("{}: {}", field, old)));
            }
            if let Some(new) = &change.new {
                lines.push(DiffLine::Added(format!("{}: {}", field, new)));
            }
        }
        lines
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// One rendered line of a [`Diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Removed(String),
    Added(String),
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::Removed(text) => write!(f, "- {}", text),
            DiffLine::Added(text) => write!(f, "+ {}", text),
        }
    }
}

/// Compare `old` (or nothing, for a new record) against `new`.
///
/// The union of both records' fields is compared. Bookkeeping timestamps
/// are never part of the result.
pub fn diff(old: Option<&Record>, new: &Record) -> Diff {
    let old_fields = old.map(Record::fields).unwrap_or_default();
    let new_fields = new.fields();

    let names: BTreeSet<&String> = old_fields.keys().chain(new_fields.keys()).collect();
    let mut changes = BTreeMap::new();
    for name in names {
        let before = old_fields.get(name);
        let after = new_fields.get(name);
        if before != after {
            changes.insert(
                name.clone(),
                FieldChange {
                    old: before.cloned(),
                    new: after.cloned(),
                },
            );
        }
    }
    Diff { changes }
}
