//! Merge coordination: turns lookup results into accepted mutations.
//!
//! This is the sequential half of a sync. Lookups fan out concurrently,
//! but everything after them runs one item at a time:
//!
//! 1. Resolve the selection and build one request per identifier
//! 2. Dispatch all requests and collect completions in any order
//! 3. Correlate completions with requests by identifier, then order the
//!    pairs by ascending position
//! 4. For each pair, diff against the current record (or nothing)
//! 5. Skip empty diffs; otherwise show the diff and ask yes/no
//! 6. Apply accepted records; the library logs one change per mutation
//!
//! Rejection and cancellation are the same outcome and never touch the
//! library.

use crate::{
    collaborators::{confirm, Answer, Console, DocumentKind, Documents, Lookup},
    diff::diff,
    dispatch::{correlate, dispatch, LookupRequest, LookupResult},
    error::Result,
    progress::Progress,
    report::BatchReport,
    selection, Error, Library, Position,
};
use std::collections::BTreeSet;

/// One interactive sync over a library.
///
/// Holds the library exclusively for its lifetime, so nothing else can
/// mutate it while a batch is in flight.
pub struct Session<'a, L, D, C> {
    pub(crate) library: &'a mut Library,
    pub(crate) lookup: &'a L,
    pub(crate) documents: &'a D,
    pub(crate) console: &'a mut C,
}

impl<'a, L, D, C> Session<'a, L, D, C>
where
    L: Lookup,
    D: Documents,
    C: Console,
{
    pub fn new(library: &'a mut Library, lookup: &'a L, documents: &'a D, console: &'a mut C) -> Self {
        Self {
            library,
            lookup,
            documents,
            console,
        }
    }

    /// Add new DOIs to the library.
    ///
    /// DOIs already present are rejected before any lookup is made. Each
    /// fetched record is shown in full and added only if accepted.
    pub async fn add(&mut self, dois: &[String]) -> Result<BatchReport> {
        if dois.is_empty() {
            return Err(Error::EmptySelection);
        }
        let mut report = BatchReport::new("added");

        let mut requests: Vec<LookupRequest> = Vec::new();
        for doi in dois.iter().map(|d| d.trim()).filter(|d| !d.is_empty()) {
            if let Some(position) = self.library.position_of(doi) {
                self.console.warn(&format!(
                    "add: DOI '{}' already in library. Use 'update {}' to refresh metadata.",
                    doi, position
                ));
                report.failed += 1;
            } else if requests.iter().any(|r| r.identifier == doi) {
                self.console
                    .warn(&format!("add: DOI '{}' given more than once", doi));
                report.failed += 1;
            } else {
                requests.push(LookupRequest::new_identifier(doi));
            }
        }

        if !requests.is_empty() {
            let results = self.fetch_metadata(&requests).await;
            let now = chrono::Utc::now();

            for (request, completion) in correlate(requests, results)? {
                let doi = request.identifier;
                let mut record = match completion.outcome {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::warn!(doi = %doi, error = %e, "lookup failed");
                        self.console
                            .warn(&format!("add: invalid DOI '{}': {}", doi, e));
                        report.failed += 1;
                        continue;
                    }
                };
                if record.doi.is_empty() {
                    record.doi = doi.clone();
                }
                record.stamp(now);

                self.console.show_diff(&diff(None, &record));
                let question = format!("add: accept new data for DOI '{}' (y/n)? ", doi);
                if !confirm(&mut *self.console, &question, Answer::Yes).await.accepted() {
                    self.console.say(&format!("add: DOI '{}' not added", doi));
                    report.rejected += 1;
                    continue;
                }

                match self.library.append(record) {
                    Ok(position) => {
                        tracing::info!(doi = %doi, position, "record added");
                        self.console
                            .say(&format!("add: added DOI '{}' as ref {}", doi, position));
                        report.succeeded += 1;
                    }
                    Err(e) => {
                        self.console.warn(&format!("add: {}", e));
                        report.failed += 1;
                    }
                }
            }
        }

        self.console.say(&format!("add: {}", report));
        Ok(report)
    }

    /// Refresh existing records from the lookup service.
    ///
    /// Bookkeeping timestamps of each record are kept. Records whose
    /// metadata is unchanged are skipped without a prompt.
    pub async fn update(&mut self, selection: &str) -> Result<BatchReport> {
        let positions = self.select(selection)?;
        let mut report = BatchReport::new("updated");

        let mut requests = Vec::with_capacity(positions.len());
        for &position in &positions {
            if let Some(record) = self.library.get(position) {
                requests.push(LookupRequest::existing(record.doi.clone(), position));
            }
        }

        let results = self.fetch_metadata(&requests).await;

        for (request, completion) in correlate(requests, results)? {
            let Some(position) = request.position else {
                continue;
            };
            let Some(old) = self.library.get(position).cloned() else {
                continue;
            };

            let mut record = match completion.outcome {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(doi = %old.doi, position, error = %e, "lookup failed");
                    self.console.warn(&format!(
                        "update: ref {} has an invalid DOI '{}': {}",
                        position, old.doi, e
                    ));
                    report.failed += 1;
                    continue;
                }
            };
            if record.doi.is_empty() {
                record.doi = old.doi.clone();
            }
            record.carry_bookkeeping(&old);

            let changes = diff(Some(&old), &record);
            if changes.is_empty() {
                self.console.say(&format!(
                    "update: no new data for ref {} found on lookup",
                    position
                ));
                report.unchanged += 1;
                continue;
            }

            self.console.show_diff(&changes);
            let question = format!("update: accept new data for ref {} (y/n)? ", position);
            if !confirm(&mut *self.console, &question, Answer::Yes).await.accepted() {
                self.console
                    .say(&format!("update: rejected changes for ref {}", position));
                report.rejected += 1;
                continue;
            }

            match self.library.replace(position, record) {
                Ok(_) => {
                    tracing::info!(doi = %old.doi, position, fields = changes.count(), "record updated");
                    self.console
                        .say(&format!("update: successfully updated ref {}", position));
                    report.succeeded += 1;
                }
                Err(e) => {
                    self.console.warn(&format!("update: ref {}: {}", position, e));
                    report.failed += 1;
                }
            }
        }

        self.console.say(&format!("update: {}", report));
        Ok(report)
    }

    /// Delete records and their documents after one confirmation.
    ///
    /// An empty answer declines. Records are removed from the highest
    /// position down so earlier removals never shift later targets.
    pub async fn delete(&mut self, selection: &str) -> Result<BatchReport> {
        let positions = self.select(selection)?;
        let mut report = BatchReport::new("deleted");

        let listed: Vec<String> = positions.iter().map(Position::to_string).collect();
        let question = format!(
            "delete: really delete ref{} {} (y/n)? ",
            if positions.len() == 1 { "" } else { "s" },
            listed.join(", ")
        );
        if !confirm(&mut *self.console, &question, Answer::No).await.accepted() {
            self.console.say("delete: no refs deleted");
            report.rejected = positions.len();
            return Ok(report);
        }

        for &position in positions.iter().rev() {
            let Some(doi) = self.library.get(position).map(|r| r.doi.clone()) else {
                continue;
            };
            self.purge_documents(&doi);
            self.library.remove(position)?;
            tracing::info!(doi = %doi, position, "record deleted");
            report.succeeded += 1;
        }

        self.console.say(&format!("delete: {}", report));
        Ok(report)
    }

    /// Resolve a selection into unique positions, ascending.
    pub(crate) fn select(&self, selection: &str) -> Result<BTreeSet<Position>> {
        if self.library.is_empty() {
            return Err(Error::EmptyLibrary);
        }
        let positions = selection::resolve(selection, self.library.len())?;
        Ok(positions.into_iter().collect())
    }

    /// Remove every stored document for a DOI without asking.
    pub(crate) fn purge_documents(&mut self, doi: &str) {
        for kind in DocumentKind::ALL {
            if let Err(e) = self.documents.remove(doi, kind) {
                tracing::warn!(doi = %doi, kind = %kind, error = %e, "could not remove document");
                self.console
                    .warn(&format!("delete: could not remove {} for '{}': {}", kind, doi, e));
            }
        }
    }

    async fn fetch_metadata(&mut self, requests: &[LookupRequest]) -> Vec<LookupResult> {
        let progress = Progress::new(requests.len());
        self.console.start_progress("Fetching metadata", &progress);
        let results = dispatch(self.lookup, requests, &progress).await;
        self.console.stop_progress().await;
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collaborators::{DocumentError, DocumentSource, Input, LookupError, OpenTarget},
        diff::Diff,
        Record,
    };
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    struct MapLookup(HashMap<String, Record>);

    impl Lookup for MapLookup {
        async fn lookup(&self, doi: &str) -> std::result::Result<Record, LookupError> {
            self.0
                .get(doi)
                .cloned()
                .ok_or_else(|| LookupError::NotFound(doi.into()))
        }
    }

    #[derive(Default)]
    struct NoDocuments {
        removed: RefCell<Vec<String>>,
    }

    impl Documents for NoDocuments {
        fn exists(&self, _doi: &str, _kind: DocumentKind) -> bool {
            false
        }

        async fn locate(&self, doi: &str) -> std::result::Result<String, DocumentError> {
            Err(DocumentError::NotFound(doi.into()))
        }

        async fn store(
            &self,
            _source: DocumentSource,
            doi: &str,
            _kind: DocumentKind,
        ) -> std::result::Result<(), DocumentError> {
            Err(DocumentError::NotFound(doi.into()))
        }

        fn remove(&self, doi: &str, _kind: DocumentKind) -> std::result::Result<bool, DocumentError> {
            self.removed.borrow_mut().push(doi.into());
            Ok(false)
        }

        fn open(&self, doi: &str, _target: OpenTarget) -> std::result::Result<(), DocumentError> {
            Err(DocumentError::NotFound(doi.into()))
        }
    }

    #[derive(Default)]
    struct Script {
        replies: VecDeque<Input>,
        prompts: Vec<String>,
        diffs: Vec<Diff>,
    }

    impl Script {
        fn replying(replies: &[&str]) -> Self {
            Self {
                replies: replies.iter().map(|r| Input::Line(r.to_string())).collect(),
                ..Self::default()
            }
        }
    }

    impl Console for Script {
        fn say(&mut self, _line: &str) {}
        fn warn(&mut self, _line: &str) {}
        fn show_diff(&mut self, diff: &Diff) {
            self.diffs.push(diff.clone());
        }
        async fn read_line(&mut self, prompt: &str) -> Input {
            self.prompts.push(prompt.to_string());
            self.replies.pop_front().unwrap_or(Input::EndOfInput)
        }
        fn start_progress(&mut self, _label: &str, _progress: &Progress) {}
        async fn stop_progress(&mut self) {}
    }

    fn lookup_of(records: &[Record]) -> MapLookup {
        MapLookup(records.iter().map(|r| (r.doi.clone(), r.clone())).collect())
    }

    #[tokio::test]
    async fn add_accepts_by_default() {
        let mut library = Library::new();
        let lookup = lookup_of(&[Record::new("10.1/a", "A")]);
        let documents = NoDocuments::default();
        let mut console = Script::replying(&[""]);

        let report = Session::new(&mut library, &lookup, &documents, &mut console)
            .add(&["10.1/a".to_string()])
            .await
            .unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(library.len(), 1);
        assert!(library.get(1).unwrap().time_added.is_some());
        assert_eq!(console.diffs[0].count(), 2);
    }

    #[tokio::test]
    async fn add_conflict_makes_no_request() {
        let mut library = Library::from_records(vec![Record::new("10.1/a", "A")]).unwrap();
        let lookup = lookup_of(&[]);
        let documents = NoDocuments::default();
        let mut console = Script::default();

        let report = Session::new(&mut library, &lookup, &documents, &mut console)
            .add(&["10.1/a".to_string()])
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert!(console.prompts.is_empty());
        assert!(!library.is_dirty());
    }

    #[tokio::test]
    async fn update_without_changes_skips_prompt() {
        let record = Record::new("10.1/a", "A");
        let mut library = Library::from_records(vec![record.clone()]).unwrap();
        let lookup = lookup_of(&[record]);
        let documents = NoDocuments::default();
        let mut console = Script::default();

        let report = Session::new(&mut library, &lookup, &documents, &mut console)
            .update("1")
            .await
            .unwrap();

        assert_eq!(report.unchanged, 1);
        assert!(console.prompts.is_empty());
        assert!(!library.is_dirty());
    }

    #[tokio::test]
    async fn update_cancelled_is_rejection() {
        let mut library = Library::from_records(vec![Record::new("10.1/a", "Old")]).unwrap();
        let lookup = lookup_of(&[Record::new("10.1/a", "New")]);
        let documents = NoDocuments::default();
        let mut console = Script {
            replies: VecDeque::from([Input::Interrupted]),
            ..Script::default()
        };

        let report = Session::new(&mut library, &lookup, &documents, &mut console)
            .update("1")
            .await
            .unwrap();

        assert_eq!(report.rejected, 1);
        assert_eq!(library.get(1).unwrap().title.as_deref(), Some("Old"));
        assert!(!library.is_dirty());
    }

    #[tokio::test]
    async fn delete_defaults_to_no() {
        let mut library = Library::from_records(vec![Record::new("10.1/a", "A")]).unwrap();
        let lookup = lookup_of(&[]);
        let documents = NoDocuments::default();
        let mut console = Script::replying(&[""]);

        let report = Session::new(&mut library, &lookup, &documents, &mut console)
            .delete("1")
            .await
            .unwrap();

        assert_eq!(report.succeeded, 0);
        assert_eq!(library.len(), 1);
        assert!(documents.removed.borrow().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_documents_too() {
        let mut library = Library::from_records(vec![Record::new("10.1/a", "A")]).unwrap();
        let lookup = lookup_of(&[]);
        let documents = NoDocuments::default();
        let mut console = Script::replying(&["y"]);

        Session::new(&mut library, &lookup, &documents, &mut console)
            .delete("1")
            .await
            .unwrap();

        assert!(library.is_empty());
        assert_eq!(*documents.removed.borrow(), vec!["10.1/a", "10.1/a"]);
    }

    #[tokio::test]
    async fn selection_errors_escape_before_io() {
        let mut library = Library::from_records(vec![Record::new("10.1/a", "A")]).unwrap();
        let lookup = lookup_of(&[]);
        let documents = NoDocuments::default();
        let mut console = Script::default();
        let mut session = Session::new(&mut library, &lookup, &documents, &mut console);

        assert_eq!(
            session.update("2").await.unwrap_err(),
            Error::PositionOutOfRange { position: 2, len: 1 }
        );
        assert_eq!(session.delete("x").await.unwrap_err(), Error::InvalidToken("x".into()));
        assert!(console.prompts.is_empty());
    }

    #[tokio::test]
    async fn empty_library_precondition() {
        let mut library = Library::new();
        let lookup = lookup_of(&[]);
        let documents = NoDocuments::default();
        let mut console = Script::default();

        let err = Session::new(&mut library, &lookup, &documents, &mut console)
            .update("1")
            .await
            .unwrap_err();
        assert_eq!(err, Error::EmptyLibrary);
    }
}
