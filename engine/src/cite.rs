//! Citation text for records: bare DOI, BibLaTeX, and ACS-style Markdown.

use crate::{error::Result, Author, Error, Library, Position, Record};
use std::fmt::Write;

/// Output format of a citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CiteFormat {
    /// The DOI alone
    Doi,
    /// A BibLaTeX `@article` entry
    Bib,
    /// Short ACS style: authors, journal, year, volume, pages
    Markdown,
    /// Long ACS style: adds the title and issue
    MarkdownLong,
}

impl CiteFormat {
    /// Parse a format name or its one-letter abbreviation.
    ///
    /// `m`/`markdown` and `M`/`Markdown` differ by case only.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "d" | "doi" => Some(CiteFormat::Doi),
            "b" | "bib" => Some(CiteFormat::Bib),
            "m" | "markdown" => Some(CiteFormat::Markdown),
            "M" | "Markdown" => Some(CiteFormat::MarkdownLong),
            _ => None,
        }
    }

    /// Parse `bib doi`, `b,d` or `bd`. Order is kept; repeats are dropped.
    pub fn parse_list(input: &str) -> Result<Vec<Self>> {
        let invalid = || Error::InvalidFormat(input.trim().to_string());
        let mut formats = Vec::new();
        for token in input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let parsed = match Self::parse(token) {
                Some(format) => vec![format],
                None => token
                    .chars()
                    .map(|c| Self::parse(&c.to_string()))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(invalid)?,
            };
            for format in parsed {
                if !formats.contains(&format) {
                    formats.push(format);
                }
            }
        }
        if formats.is_empty() {
            return Err(invalid());
        }
        Ok(formats)
    }

    /// Blank lines between multi-line entries, a newline after a DOI.
    fn separator(&self) -> &'static str {
        match self {
            CiteFormat::Doi => "\n",
            _ => "\n\n",
        }
    }
}

/// Cite one record.
pub fn cite(record: &Record, format: CiteFormat) -> String {
    match format {
        CiteFormat::Doi => record.doi.clone(),
        CiteFormat::Bib => biblatex(record),
        CiteFormat::Markdown => acs_markdown(record, false),
        CiteFormat::MarkdownLong => acs_markdown(record, true),
    }
}

/// Cite each position in every format, position by position.
pub fn citations(library: &Library, positions: &[Position], formats: &[CiteFormat]) -> Result<String> {
    let mut out = String::new();
    let mut separator = "";
    for &position in positions {
        let record = library.get(position).ok_or(Error::PositionOutOfRange {
            position,
            len: library.len(),
        })?;
        for &format in formats {
            out.push_str(separator);
            out.push_str(&cite(record, format));
            separator = format.separator();
        }
    }
    Ok(out)
}

/// First author, year, and journal (abbreviated when known), with
/// everything but letters and digits removed: `Yong2019JAmChemSoc`.
pub fn bib_key(record: &Record) -> String {
    let journal = record
        .journal_short
        .as_deref()
        .or(record.journal.as_deref())
        .unwrap_or("");
    let year = record.year.map(|y| y.to_string()).unwrap_or_default();
    [record.first_author(), year.as_str(), journal]
        .concat()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

fn biblatex(record: &Record) -> String {
    let mut fields: Vec<(&str, String)> = vec![("doi", record.doi.clone())];
    if !record.authors.is_empty() {
        let names: Vec<String> = record.authors.iter().map(bib_name).collect();
        fields.push(("author", names.join(" and ")));
    }
    if let Some(journal) = record.journal.as_deref().or(record.journal_short.as_deref()) {
        fields.push(("journaltitle", journal.to_string()));
    }
    if let Some(title) = &record.title {
        fields.push(("title", format!("{{{}}}", title)));
    }
    if let Some(year) = record.year {
        fields.push(("year", year.to_string()));
    }
    if let Some(volume) = &record.volume {
        fields.push(("volume", volume.clone()));
    }
    if let Some(issue) = &record.issue {
        fields.push(("number", issue.clone()));
    }
    if let Some(pages) = &record.pages {
        fields.push(("pages", pages.replace('-', "--")));
    }

    let mut entry = format!("@article{{{},", bib_key(record));
    for (name, value) in fields {
        let _ = write!(entry, "\n    {} = {{{}}},", name, value);
    }
    entry.push_str("\n}");
    entry
}

fn bib_name(author: &Author) -> String {
    match &author.given {
        Some(given) => format!("{}, {}", author.family, given),
        None => author.family.clone(),
    }
}

/// `Jun-Hyun Ann` becomes `J.-H. A.`
fn initials(given: &str) -> String {
    given
        .split_whitespace()
        .map(|word| {
            word.split('-')
                .filter_map(|part| part.chars().next())
                .map(|c| format!("{}.", c.to_uppercase()))
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn acs_markdown(record: &Record, long: bool) -> String {
    let mut parts = Vec::new();

    let authors: Vec<String> = record
        .authors
        .iter()
        .map(|a| match a.given.as_deref().map(initials) {
            Some(init) if !init.is_empty() => format!("{}, {}", a.family, init),
            _ => a.family.clone(),
        })
        .collect();
    if !authors.is_empty() {
        parts.push(with_stop(authors.join("; ")));
    }
    if long {
        if let Some(title) = &record.title {
            parts.push(with_stop(title.clone()));
        }
    }
    if let Some(journal) = record.journal_short.as_deref().or(record.journal.as_deref()) {
        parts.push(format!("*{}*", journal));
    }

    // (text, emphasis, parenthesised suffix); commas between, a stop last
    let mut numbers: Vec<(String, &str, Option<&str>)> = Vec::new();
    if let Some(year) = record.year {
        numbers.push((year.to_string(), "**", None));
    }
    if let Some(volume) = &record.volume {
        let issue = record.issue.as_deref().filter(|_| long);
        numbers.push((volume.clone(), "*", issue));
    }
    if let Some(pages) = &record.pages {
        numbers.push((pages.replace('-', "\u{2013}"), "", None));
    }
    let last = numbers.len().saturating_sub(1);
    for (i, (text, em, suffix)) in numbers.into_iter().enumerate() {
        let punct = if i == last { "." } else { "," };
        parts.push(match suffix {
            Some(suffix) => format!("{em}{text}{em} ({suffix}){punct}"),
            None => format!("{em}{text}{punct}{em}"),
        });
    }

    let text = parts.join(" ");
    if text.ends_with('.') || text.ends_with(".*") || text.ends_with(".**") {
        text
    } else {
        with_stop(text)
    }
}

fn with_stop(mut text: String) -> String {
    if !text.ends_with(['.', '?', '!']) {
        text.push('.');
    }
    text
}
