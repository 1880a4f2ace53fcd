//! Plain listing of library records.

use refshelf_engine::{DocumentKind, Documents, Library, Position};

/// Render one line per position: ref, first author, year, title, DOI and
/// which documents are stored.
pub fn render<D: Documents>(library: &Library, positions: &[Position], documents: &D) -> Vec<String> {
    let width = library.len().to_string().len();
    positions
        .iter()
        .filter_map(|&position| {
            let record = library.get(position)?;
            let stored: Vec<&str> = DocumentKind::ALL
                .into_iter()
                .filter(|kind| documents.exists(&record.doi, *kind))
                .map(|kind| kind.as_str())
                .collect();
            Some(format!(
                "{:>width$}  {:<16} {:>4}  {}  [{}]{}",
                position,
                truncate(record.first_author(), 16),
                record.year.map(|y| y.to_string()).unwrap_or_default(),
                record.title.as_deref().unwrap_or(""),
                record.doi,
                if stored.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", stored.join(", "))
                },
                width = width,
            ))
        })
        .collect()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max - 1).collect();
        short.push('.');
        short
    }
}
