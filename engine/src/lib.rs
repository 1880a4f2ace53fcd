//! # refshelf engine
//!
//! Record synchronization for a personal reference library.
//!
//! The engine takes a batch of DOIs (or existing records), looks them up
//! concurrently against a metadata service, pairs each result with the
//! record it was requested for regardless of completion order, computes a
//! field-level diff, and walks the user through accepting or rejecting
//! each change one at a time.
//!
//! ## Design Principles
//!
//! - **No IO**: network, files and terminal are reached only through the
//!   [`Lookup`], [`Documents`] and [`Console`] traits
//! - **Deterministic order**: prompts and mutations follow library
//!   position, never network timing
//! - **Partial failure**: one failed item never aborts its batch
//! - **Runtime-agnostic**: fan-out uses `futures`, not a specific executor
//!
//! ## Core Concepts
//!
//! ### Records and the Library
//!
//! A [`Record`] is one bibliographic entry identified by its DOI. The
//! [`Library`] is the ordered collection; a record's reference number is
//! its 1-based position. Every mutation through the library appends a
//! [`ChangeTag`] to its [`ChangeLog`], which persistence uses to decide
//! when to save.
//!
//! ### Selections
//!
//! [`selection::resolve`] turns text like `4, 9 21-24` or `all` into
//! positions.
//!
//! ### Dispatch and correlation
//!
//! [`dispatch()`] starts every lookup at once and returns results in
//! completion order. [`correlate`] sorts requests and results by
//! identifier, zips them, and orders the pairs by position.
//!
//! ### Merging
//!
//! [`Session`] drives `add`, `update` and `delete`, plus the document
//! flows in [`documents`]. [`cite`] formats records as citations.
//!
//! ## Quick Start
//!
//! ```rust
//! use refshelf_engine::{diff, Library, Record};
//!
//! let mut library = Library::new();
//! library.append(Record::new("10.1021/x", "Old title")).unwrap();
//!
//! let fetched = Record::new("10.1021/x", "New title");
//! let changes = diff(library.get(1), &fetched);
//! assert_eq!(changes.count(), 1);
//!
//! library.replace(1, fetched).unwrap();
//! assert_eq!(library.changes().len(), 2);
//! ```

pub mod changes;
pub mod cite;
pub mod collaborators;
pub mod diff;
pub mod dispatch;
pub mod documents;
pub mod error;
pub mod library;
pub mod progress;
pub mod record;
pub mod report;
pub mod selection;
pub mod snapshot;
pub mod sort;
pub mod sync;

// Re-export main types at crate root
pub use changes::{ChangeLog, ChangeTag};
pub use collaborators::{
    confirm, Answer, Console, DocumentError, DocumentKind, DocumentSource, Documents, Input,
    Lookup, LookupError, OpenTarget,
};
pub use cite::{citations, CiteFormat};
pub use diff::{diff, Diff, DiffLine, FieldChange};
pub use dispatch::{correlate, dispatch, fan_out, Completion, LookupRequest, LookupResult};
pub use error::Error;
pub use library::Library;
pub use progress::Progress;
pub use record::{Author, FieldValue, Record};
pub use report::BatchReport;
pub use snapshot::{LibrarySnapshot, SNAPSHOT_FORMAT_VERSION};
pub use sort::{SortKey, SortMode};
pub use sync::Session;

/// Type aliases for clarity
pub type Identifier = String;
/// 1-based reference number
pub type Position = usize;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
