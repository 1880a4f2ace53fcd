//! Interfaces to the world outside the engine.
//!
//! The engine never touches the network, the filesystem or the terminal
//! itself. Hosts implement these traits; tests implement them in memory.

use crate::{diff::Diff, progress::Progress, Record};
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;

/// Why a metadata lookup failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(String),

    #[error("DOI not found: {0}")]
    NotFound(String),

    #[error("malformed metadata: {0}")]
    Malformed(String),

    #[error("no title in metadata for {0}")]
    MissingTitle(String),
}

/// Remote metadata service.
pub trait Lookup {
    /// Fetch metadata for one DOI.
    ///
    /// Many calls may be in flight at once on the same task.
    fn lookup(&self, doi: &str) -> impl Future<Output = Result<Record, LookupError>>;
}

/// Kind of document stored next to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    /// Full text
    Pdf,
    /// Supporting information
    Si,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Pdf, DocumentKind::Si];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Si => "si",
        }
    }

    /// Parse a kind name or its one-letter abbreviation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pdf" | "p" => Some(DocumentKind::Pdf),
            "si" | "s" => Some(DocumentKind::Si),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something of a record that can be opened for reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpenTarget {
    Document(DocumentKind),
    /// The publisher page behind the DOI
    Web,
}

impl OpenTarget {
    /// Parse a document kind, `web`, or `w`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "web" | "w" => Some(OpenTarget::Web),
            other => DocumentKind::parse(other).map(OpenTarget::Document),
        }
    }
}

impl fmt::Display for OpenTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenTarget::Document(kind) => kind.fmt(f),
            OpenTarget::Web => f.write_str("web"),
        }
    }
}

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Path(PathBuf),
    Url(String),
}

impl DocumentSource {
    /// Interpret user input: http(s) URLs are downloaded, anything else is
    /// a local path. Surrounding quotes (from drag-and-drop) are stripped.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim().trim_matches(|c| c == '\'' || c == '"');
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DocumentSource::Url(trimmed.to_string())
        } else {
            DocumentSource::Path(PathBuf::from(trimmed))
        }
    }
}

/// Why a document could not be located, fetched or stored.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("network error: {0}")]
    Network(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("no document found for {0}")]
    NotFound(String),

    #[error("content from {0} is not a PDF")]
    NotPdf(String),

    #[error("{kind} for {doi} already stored")]
    AlreadyStored { doi: String, kind: DocumentKind },
}

/// Document storage and transfer.
pub trait Documents {
    /// Whether a document of this kind is stored for the DOI.
    fn exists(&self, doi: &str, kind: DocumentKind) -> bool;

    /// Find a downloadable URL for the full text.
    fn locate(&self, doi: &str) -> impl Future<Output = Result<String, DocumentError>>;

    /// Copy or download `source` into storage.
    fn store(
        &self,
        source: DocumentSource,
        doi: &str,
        kind: DocumentKind,
    ) -> impl Future<Output = Result<(), DocumentError>>;

    /// Delete a stored document. Returns whether a file was removed.
    fn remove(&self, doi: &str, kind: DocumentKind) -> Result<bool, DocumentError>;

    /// Hand a stored document, or the DOI's web page, to a viewer.
    fn open(&self, doi: &str, target: OpenTarget) -> Result<(), DocumentError>;
}

/// A line read from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// End of input (Ctrl-D)
    EndOfInput,
    /// Interrupt (Ctrl-C)
    Interrupted,
}

/// Outcome of a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Cancelled,
}

impl Answer {
    /// Interpret a reply. An empty line means `default`.
    pub fn from_input(input: &Input, default: Answer) -> Answer {
        match input {
            Input::Line(line) => match line.trim().to_lowercase().as_str() {
                "" => default,
                "y" | "yes" => Answer::Yes,
                _ => Answer::No,
            },
            Input::EndOfInput | Input::Interrupted => Answer::Cancelled,
        }
    }

    /// Only an explicit or default yes accepts; cancellation rejects.
    pub fn accepted(&self) -> bool {
        matches!(self, Answer::Yes)
    }
}

/// The user's terminal.
pub trait Console {
    /// Print an informational line.
    fn say(&mut self, line: &str);

    /// Print an error line.
    fn warn(&mut self, line: &str);

    /// Show the changes a merge would make.
    fn show_diff(&mut self, diff: &Diff);

    /// Prompt and wait for one line.
    fn read_line(&mut self, prompt: &str) -> impl Future<Output = Input>;

    /// Start rendering progress for a batch.
    fn start_progress(&mut self, label: &str, progress: &Progress);

    /// Stop rendering progress. Must not return until nothing more will
    /// be drawn, so later output is not interleaved.
    fn stop_progress(&mut self) -> impl Future<Output = ()>;
}

/// Ask a yes/no question.
pub async fn confirm<C: Console>(console: &mut C, question: &str, default: Answer) -> Answer {
    let input = console.read_line(question).await;
    Answer::from_input(&input, default)
}
