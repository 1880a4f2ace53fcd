//! Change log: counts unsaved mutations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation recorded in the [`ChangeLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeTag {
    Add,
    Update,
    Delete,
    Sort,
    /// A document or web page of a record was opened
    Open,
}

impl ChangeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeTag::Add => "add",
            ChangeTag::Update => "update",
            ChangeTag::Delete => "delete",
            ChangeTag::Sort => "sort",
            ChangeTag::Open => "open",
        }
    }
}

impl fmt::Display for ChangeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tag per accepted mutation since the last successful save.
///
/// Persistence treats a non-empty log as dirty and clears it only after
/// the library has been written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLog {
    tags: Vec<ChangeTag>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one tag.
    pub fn push(&mut self, tag: ChangeTag) {
        self.tags.push(tag);
    }

    /// Number of unsaved mutations.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Number of unsaved mutations of one kind.
    pub fn count(&self, tag: ChangeTag) -> usize {
        self.tags.iter().filter(|t| **t == tag).count()
    }

    pub fn tags(&self) -> &[ChangeTag] {
        &self.tags
    }

    /// Forget all tags. Call only after a successful save.
    pub fn clear(&mut self) {
        self.tags.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_tag() {
        let mut log = ChangeLog::new();
        assert!(log.is_empty());

        log.push(ChangeTag::Add);
        log.push(ChangeTag::Add);
        log.push(ChangeTag::Delete);

        assert_eq!(log.len(), 3);
        assert_eq!(log.count(ChangeTag::Add), 2);
        assert_eq!(log.count(ChangeTag::Update), 0);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn tag_names() {
        assert_eq!(ChangeTag::Update.to_string(), "update");
        assert_eq!(
            serde_json::to_string(&ChangeTag::Sort).unwrap(),
            "\"sort\""
        );
        assert_eq!(
            serde_json::to_string(&ChangeTag::Open).unwrap(),
            "\"open\""
        );
    }
}
