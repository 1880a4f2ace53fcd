//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use refshelf_engine::{
    Console, Diff, DocumentError, DocumentKind, DocumentSource, Documents, Input, Lookup,
    LookupError, OpenTarget, Progress, Record,
};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::time::Duration;

/// Lookup backed by a map, with an optional delay per DOI.
#[derive(Default)]
pub struct FakeLookup {
    pub records: HashMap<String, Record>,
    pub delays: HashMap<String, u64>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeLookup {
    pub fn with(records: &[Record]) -> Self {
        Self {
            records: records.iter().map(|r| (r.doi.clone(), r.clone())).collect(),
            ..Self::default()
        }
    }

    pub fn delay(mut self, doi: &str, millis: u64) -> Self {
        self.delays.insert(doi.to_string(), millis);
        self
    }
}

impl Lookup for FakeLookup {
    async fn lookup(&self, doi: &str) -> Result<Record, LookupError> {
        self.calls.borrow_mut().push(doi.to_string());
        let delay = self.delays.get(doi).copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.records
            .get(doi)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(doi.to_string()))
    }
}

/// Document store kept in a set of (doi, kind) pairs.
#[derive(Default)]
pub struct FakeDocuments {
    pub stored: RefCell<BTreeSet<(String, DocumentKind)>>,
    pub urls: HashMap<String, String>,
    pub sources: RefCell<Vec<DocumentSource>>,
    pub locate_calls: Cell<usize>,
    pub opened: RefCell<Vec<(String, OpenTarget)>>,
}

impl FakeDocuments {
    pub fn holding(pairs: &[(&str, DocumentKind)]) -> Self {
        let docs = Self::default();
        for (doi, kind) in pairs {
            docs.stored.borrow_mut().insert((doi.to_string(), *kind));
        }
        docs
    }

    pub fn has(&self, doi: &str, kind: DocumentKind) -> bool {
        self.stored.borrow().contains(&(doi.to_string(), kind))
    }
}

impl Documents for FakeDocuments {
    fn exists(&self, doi: &str, kind: DocumentKind) -> bool {
        self.has(doi, kind)
    }

    async fn locate(&self, doi: &str) -> Result<String, DocumentError> {
        self.locate_calls.set(self.locate_calls.get() + 1);
        self.urls
            .get(doi)
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(doi.to_string()))
    }

    async fn store(
        &self,
        source: DocumentSource,
        doi: &str,
        kind: DocumentKind,
    ) -> Result<(), DocumentError> {
        if let DocumentSource::Path(path) = &source {
            if path.to_string_lossy().contains("missing") {
                return Err(DocumentError::Io(format!("{} not found", path.display())));
            }
        }
        self.sources.borrow_mut().push(source);
        self.stored.borrow_mut().insert((doi.to_string(), kind));
        Ok(())
    }

    fn remove(&self, doi: &str, kind: DocumentKind) -> Result<bool, DocumentError> {
        Ok(self.stored.borrow_mut().remove(&(doi.to_string(), kind)))
    }

    /// Stored documents and web pages open; anything else is not found.
    fn open(&self, doi: &str, target: OpenTarget) -> Result<(), DocumentError> {
        if let OpenTarget::Document(kind) = target {
            if !self.has(doi, kind) {
                return Err(DocumentError::NotFound(doi.to_string()));
            }
        }
        self.opened.borrow_mut().push((doi.to_string(), target));
        Ok(())
    }
}

/// Console that replays scripted input and records everything shown.
#[derive(Default)]
pub struct ScriptedConsole {
    pub replies: VecDeque<Input>,
    pub prompts: Vec<String>,
    pub lines: Vec<String>,
    pub warnings: Vec<String>,
    pub diffs: Vec<Diff>,
    pub progress_started: usize,
    pub progress_stopped: usize,
}

impl ScriptedConsole {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| Input::Line(r.to_string())).collect(),
            ..Self::default()
        }
    }

    pub fn then(mut self, input: Input) -> Self {
        self.replies.push_back(input);
        self
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn warn(&mut self, line: &str) {
        self.warnings.push(line.to_string());
    }

    fn show_diff(&mut self, diff: &Diff) {
        self.diffs.push(diff.clone());
    }

    async fn read_line(&mut self, prompt: &str) -> Input {
        self.prompts.push(prompt.to_string());
        self.replies.pop_front().unwrap_or(Input::EndOfInput)
    }

    fn start_progress(&mut self, _label: &str, _progress: &Progress) {
        self.progress_started += 1;
    }

    async fn stop_progress(&mut self) {
        self.progress_stopped += 1;
    }
}

/// A record with a numbered DOI.
pub fn numbered(i: usize) -> Record {
    Record::new(format!("10.1000/{:02}", i), format!("Paper {}", i)).with_year(2000 + i as i32)
}
