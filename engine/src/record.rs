//! Record types for bibliographic entries.

use crate::{Identifier, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One author of a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Author {
    /// Family name (surname)
    pub family: String,
    /// Given names, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given: Option<String>,
}

impl Author {
    pub fn new(family: impl Into<String>, given: Option<&str>) -> Self {
        Self {
            family: family.into(),
            given: given.map(str::to_string),
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.given {
            Some(given) => write!(f, "{} {}", given, self.family),
            None => f.write_str(&self.family),
        }
    }
}

/// A field value, typed for comparison.
///
/// Equality is per type: strings compare as strings, author lists compare
/// positionally, integers compare numerically.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Authors(Vec<Author>),
    Json(serde_json::Value),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Authors(authors) => {
                let names: Vec<String> = authors.iter().map(Author::to_string).collect();
                f.write_str(&names.join(", "))
            }
            FieldValue::Json(v) => write!(f, "{}", v),
        }
    }
}

/// Names of the lifecycle bookkeeping fields.
///
/// These are never compared and never overwritten by a merge.
pub const BOOKKEEPING_FIELDS: [&str; 2] = ["timeAdded", "timeOpened"];

/// One bibliographic entry.
///
/// Identity is the `doi` field. The reference number shown to users is a
/// view of the record's position in the [`Library`](crate::Library) and is
/// never stored here. Unknown fields from the lookup service survive a
/// round-trip through `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique identifier (DOI)
    pub doi: Identifier,
    /// Title; absent on a failed lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Ordered author list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Full journal name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    /// Abbreviated journal name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
    /// When the record entered the library
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_added: Option<Timestamp>,
    /// When the record's document was last opened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_opened: Option<Timestamp>,
    /// Fields this version does not model
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Record {
    /// Create a record with only an identifier and a title.
    pub fn new(doi: impl Into<Identifier>, title: impl Into<String>) -> Self {
        Self {
            doi: doi.into(),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Builder-style author list.
    pub fn with_authors(mut self, authors: Vec<Author>) -> Self {
        self.authors = authors;
        self
    }

    /// Builder-style year.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Builder-style journal name.
    pub fn with_journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = Some(journal.into());
        self
    }

    /// Whether the lookup service returned usable metadata.
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Family name of the first author, or an empty string.
    pub fn first_author(&self) -> &str {
        self.authors.first().map(|a| a.family.as_str()).unwrap_or("")
    }

    /// Copy the bookkeeping timestamps from `old` into `self`.
    pub fn carry_bookkeeping(&mut self, old: &Record) {
        self.time_added = old.time_added;
        self.time_opened = old.time_opened;
    }

    /// Stamp both bookkeeping timestamps with `now`.
    pub fn stamp(&mut self, now: Timestamp) {
        self.time_added = Some(now);
        self.time_opened = Some(now);
    }

    /// All comparable fields, keyed by serialized name.
    ///
    /// Absent fields are omitted. Bookkeeping fields are excluded.
    pub fn fields(&self) -> BTreeMap<String, FieldValue> {
        let mut fields = BTreeMap::new();
        let mut text = |name: &str, value: &Option<String>| {
            if let Some(v) = value {
                fields.insert(name.to_string(), FieldValue::Text(v.clone()));
            }
        };
        text("title", &self.title);
        text("journal", &self.journal);
        text("journalShort", &self.journal_short);
        text("volume", &self.volume);
        text("issue", &self.issue);
        text("pages", &self.pages);

        if !self.doi.is_empty() {
            fields.insert("doi".into(), FieldValue::Text(self.doi.clone()));
        }
        if !self.authors.is_empty() {
            fields.insert("authors".into(), FieldValue::Authors(self.authors.clone()));
        }
        if let Some(year) = self.year {
            fields.insert("year".into(), FieldValue::Int(year.into()));
        }
        for (name, value) in &self.extra {
            if BOOKKEEPING_FIELDS.contains(&name.as_str()) {
                continue;
            }
            fields.insert(name.clone(), FieldValue::Json(value.clone()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sample() -> Record {
        Record::new("10.1021/jacs.0c01234", "Ultrafast things")
            .with_authors(vec![
                Author::new("Yong", Some("Jonathan")),
                Author::new("Smith", None),
            ])
            .with_year(2020)
            .with_journal("J. Am. Chem. Soc.")
    }

    #[test]
    fn fields_skip_absent_values() {
        let record = sample();
        let fields = record.fields();

        assert_eq!(
            fields.get("title"),
            Some(&FieldValue::Text("Ultrafast things".into()))
        );
        assert_eq!(fields.get("year"), Some(&FieldValue::Int(2020)));
        assert!(!fields.contains_key("volume"));
        assert!(!fields.contains_key("timeAdded"));
    }

    #[test]
    fn carry_bookkeeping_copies_timestamps() {
        let mut old = sample();
        old.time_added = Some(Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap());
        old.time_opened = Some(Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap());

        let mut new = sample();
        new.stamp(Utc::now());
        new.carry_bookkeeping(&old);

        assert_eq!(new.time_added, old.time_added);
        assert_eq!(new.time_opened, old.time_opened);
    }

    #[test]
    fn unknown_fields_survive_serialization() {
        let raw = json!({
            "doi": "10.1/abc",
            "title": "A",
            "publisher": "ACS",
            "timeAdded": "2020-01-01T00:00:00Z"
        });

        let record: Record = serde_json::from_value(raw).unwrap();
        assert_eq!(record.extra.get("publisher"), Some(&json!("ACS")));
        assert!(record.time_added.is_some());
        assert!(record.fields().contains_key("publisher"));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["publisher"], json!("ACS"));
        assert_eq!(back["timeAdded"], json!("2020-01-01T00:00:00Z"));
    }

    #[test]
    fn missing_title_is_failure_signal() {
        let mut record = sample();
        assert!(record.has_title());
        record.title = None;
        assert!(!record.has_title());
        record.title = Some(String::new());
        assert!(!record.has_title());
    }

    #[test]
    fn author_display() {
        assert_eq!(Author::new("Yong", Some("J. R. J.")).to_string(), "J. R. J. Yong");
        assert_eq!(Author::new("Plato", None).to_string(), "Plato");
    }
}
