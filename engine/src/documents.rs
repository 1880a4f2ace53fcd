//! Document flows: fetching, attaching, opening and deleting PDFs for
//! records.

use crate::{
    collaborators::{Console, DocumentKind, DocumentSource, Documents, Input, Lookup, OpenTarget},
    dispatch::{correlate, fan_out, LookupRequest},
    error::Result,
    progress::Progress,
    report::BatchReport,
    sync::Session,
    Error, Position, Record,
};

/// One-line header naming a record, e.g. `(3) Yong 2020: Title`.
pub fn header(position: Position, record: &Record) -> String {
    format!(
        "({}) {} {}: {}",
        position,
        record.first_author(),
        record.year.map(|y| y.to_string()).unwrap_or_default(),
        record.title.as_deref().unwrap_or("")
    )
}

/// Parse a list of document kinds such as `pdf si`, `p,s` or `ps`.
///
/// Returns `None` if any part is not a kind or the list is empty.
pub fn parse_kinds(input: &str) -> Option<Vec<DocumentKind>> {
    parse_list(input, DocumentKind::parse)
}

/// Parse a list of open targets such as `pdf web` or `pw`.
pub fn parse_targets(input: &str) -> Option<Vec<OpenTarget>> {
    parse_list(input, OpenTarget::parse)
}

/// Comma/space separated names, or runs of one-letter abbreviations.
/// Sorted and deduplicated.
fn parse_list<T: Ord>(input: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    let mut items = Vec::new();
    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match parse(token) {
            Some(item) => items.push(item),
            None => {
                for c in token.chars() {
                    items.push(parse(&c.to_string())?);
                }
            }
        }
    }
    items.sort();
    items.dedup();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

impl<L, D, C> Session<'_, L, D, C>
where
    L: Lookup,
    D: Documents,
    C: Console,
{
    /// Download full-text PDFs for records that lack one.
    ///
    /// URLs are located concurrently; downloads then run one at a time.
    pub async fn fetch_documents(&mut self, selection: &str) -> Result<BatchReport> {
        let positions = self.select(selection)?;
        let mut report = BatchReport::new("fetched");

        let mut requests = Vec::new();
        for &position in &positions {
            let Some(record) = self.library.get(position) else {
                continue;
            };
            if self.documents.exists(&record.doi, DocumentKind::Pdf) {
                self.console.say(&format!(
                    "fetch: PDF for ref {} already in library",
                    position
                ));
                report.unchanged += 1;
            } else {
                requests.push(LookupRequest::existing(record.doi.clone(), position));
            }
        }

        if !requests.is_empty() {
            let documents = self.documents;
            let progress = Progress::new(requests.len());
            self.console.start_progress("Obtaining URLs", &progress);
            let located = fan_out(
                requests.iter().map(|r| r.identifier.as_str()),
                &progress,
                |doi| documents.locate(doi),
            )
            .await;
            self.console.stop_progress().await;

            for (request, completion) in correlate(requests, located)? {
                let position = request.position.unwrap_or_default();
                let doi = request.identifier;
                let url = match completion.outcome {
                    Ok(url) => url,
                    Err(e) => {
                        tracing::warn!(doi = %doi, error = %e, "no PDF located");
                        self.console
                            .warn(&format!("fetch: ref {}: {}", position, e));
                        report.failed += 1;
                        continue;
                    }
                };

                match documents
                    .store(DocumentSource::Url(url), &doi, DocumentKind::Pdf)
                    .await
                {
                    Ok(()) => {
                        tracing::info!(doi = %doi, position, "PDF fetched");
                        self.console
                            .say(&format!("fetch: saved PDF for ref {}", position));
                        report.succeeded += 1;
                    }
                    Err(e) => {
                        self.console
                            .warn(&format!("fetch: ref {}: {}", position, e));
                        report.failed += 1;
                    }
                }
            }
        }

        self.console.say(&format!("fetch: {}", report));
        Ok(report)
    }

    /// Ask for a path or URL for each missing document of each record.
    ///
    /// An empty answer or end-of-input skips one document. An interrupt
    /// stops the whole loop; documents already stored stay stored.
    pub async fn attach_documents(&mut self, selection: &str) -> Result<BatchReport> {
        let positions = self.select(selection)?;
        let mut report = BatchReport::new("added");

        'records: for (i, &position) in positions.iter().enumerate() {
            let Some(record) = self.library.get(position).cloned() else {
                continue;
            };
            if i != 0 {
                self.console.say("");
            }
            self.console.say(&header(position, &record));
            let missing = self.show_availability(&record.doi);

            if missing.is_empty() {
                self.console.say("Both PDF and SI found.");
                report.unchanged += 1;
                continue;
            }

            for kind in missing {
                let prompt = format!(
                    "add-pdf: provide path to {} (leave empty to skip): ",
                    kind.as_str().to_uppercase()
                );
                let line = match self.console.read_line(&prompt).await {
                    Input::Line(line) if !line.trim().is_empty() => line,
                    Input::Line(_) | Input::EndOfInput => continue,
                    Input::Interrupted => {
                        tracing::debug!(position, "document prompts interrupted");
                        break 'records;
                    }
                };

                match self
                    .documents
                    .store(DocumentSource::parse(&line), &record.doi, kind)
                    .await
                {
                    Ok(()) => {
                        tracing::info!(doi = %record.doi, kind = %kind, "document stored");
                        report.succeeded += 1;
                    }
                    Err(e) => {
                        self.console.warn(&format!("add-pdf: {}", e));
                        report.failed += 1;
                    }
                }
            }
        }

        self.console.say(&format!("add-pdf: {}", report));
        Ok(report)
    }

    /// Delete stored documents, asking which kinds for each record.
    pub async fn remove_documents(&mut self, selection: &str) -> Result<BatchReport> {
        let positions = self.select(selection)?;
        let mut report = BatchReport::new("deleted");

        for (i, &position) in positions.iter().enumerate() {
            let Some(record) = self.library.get(position).cloned() else {
                continue;
            };
            if i != 0 {
                self.console.say("");
            }
            self.console.say(&header(position, &record));
            let missing = self.show_availability(&record.doi);
            let available: Vec<DocumentKind> = DocumentKind::ALL
                .into_iter()
                .filter(|k| !missing.contains(k))
                .collect();

            if available.is_empty() {
                self.console
                    .say(&format!("No documents for ref {} found.", position));
                report.unchanged += 1;
                continue;
            }

            let prompt = "delete-pdf: confirm deletion by typing formats to be deleted: ";
            let kinds = match self.console.read_line(prompt).await {
                Input::Line(line) => parse_kinds(&line),
                Input::EndOfInput | Input::Interrupted => {
                    report.rejected += 1;
                    continue;
                }
            };
            let Some(kinds) = kinds.filter(|ks| ks.iter().all(|k| available.contains(k))) else {
                self.console
                    .warn("delete-pdf: invalid response, no documents deleted");
                report.rejected += 1;
                continue;
            };

            for kind in kinds {
                match self.documents.remove(&record.doi, kind) {
                    Ok(true) => report.succeeded += 1,
                    Ok(false) => {}
                    Err(e) => {
                        self.console.warn(&format!("delete-pdf: {}", e));
                        report.failed += 1;
                    }
                }
            }
        }

        self.console.say(&format!("delete-pdf: {}", report));
        Ok(report)
    }

    /// Open documents or web pages of records; `formats` empty means the PDF.
    ///
    /// Every successful open stamps the record's open time. A failed open
    /// changes nothing.
    pub fn open_documents(&mut self, selection: &str, formats: &str) -> Result<BatchReport> {
        let positions = self.select(selection)?;
        let targets = if formats.trim().is_empty() {
            vec![OpenTarget::Document(DocumentKind::Pdf)]
        } else {
            parse_targets(formats).ok_or_else(|| Error::InvalidFormat(formats.trim().to_string()))?
        };
        let mut report = BatchReport::new("opened");
        let now = chrono::Utc::now();

        for &position in &positions {
            let Some(doi) = self.library.get(position).map(|r| r.doi.clone()) else {
                continue;
            };
            for &target in &targets {
                match self.documents.open(&doi, target) {
                    Ok(()) => {
                        self.library.mark_opened(position, now)?;
                        tracing::info!(doi = %doi, position, format = %target, "opened");
                        report.succeeded += 1;
                    }
                    Err(e) => {
                        self.console
                            .warn(&format!("open: ref {} ({}): {}", position, target, e));
                        report.failed += 1;
                    }
                }
            }
        }

        self.console.say(&format!("open: {}", report));
        Ok(report)
    }

    /// Print a tick or cross per kind. Returns the kinds not stored.
    fn show_availability(&mut self, doi: &str) -> Vec<DocumentKind> {
        let mut missing = Vec::new();
        for kind in DocumentKind::ALL {
            if self.documents.exists(doi, kind) {
                self.console.say(&format!(" \u{2714} {}", kind));
            } else {
                self.console.say(&format!(" \u{2718} {}", kind));
                missing.push(kind);
            }
        }
        missing
    }
}
