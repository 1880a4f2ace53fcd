//! Key-based sorting of the whole library.

use crate::Record;
use std::cmp::Ordering;
use std::str::FromStr;

/// What to sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Year, then journal, then first author's family name
    #[default]
    YearJournalAuthor,
    /// Time last opened
    TimeOpened,
    /// Time added to the library
    TimeAdded,
}

/// A sort key plus direction. Oldest first unless reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortMode {
    pub key: SortKey,
    pub reverse: bool,
}

impl SortMode {
    pub fn new(key: SortKey, reverse: bool) -> Self {
        Self { key, reverse }
    }

    /// Compare two records under this mode.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match self.key {
            SortKey::YearJournalAuthor => a
                .year
                .cmp(&b.year)
                .then_with(|| a.journal.cmp(&b.journal))
                .then_with(|| a.first_author().cmp(b.first_author())),
            SortKey::TimeOpened => a.time_opened.cmp(&b.time_opened),
            SortKey::TimeAdded => a.time_added.cmp(&b.time_added),
        };
        if self.reverse {
            ordering.reverse()
        } else {
            ordering
        }
    }

    /// Stable sort of `records` in place.
    pub fn sort(&self, records: &mut [Record]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

/// Error for an unknown sort mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort mode '{0}'")]
pub struct ParseSortModeError(pub String);

impl FromStr for SortMode {
    type Err = ParseSortModeError;

    /// Parse a mode name. A leading capital letter reverses the order,
    /// so `Y` sorts newest first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reverse = s.chars().next().is_some_and(char::is_uppercase);
        let key = match s.to_lowercase().as_str() {
            "y" | "yja" | "year" => SortKey::YearJournalAuthor,
            "o" | "op" | "open" | "opened" | "timeopened" => SortKey::TimeOpened,
            "a" | "ad" | "add" | "added" | "timeadded" => SortKey::TimeAdded,
            _ => return Err(ParseSortModeError(s.to_string())),
        };
        Ok(Self { key, reverse })
    }
}
