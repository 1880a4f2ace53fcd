//! refshelf - a reference library kept in sync with Crossref.
//!
//! Loads the library file, runs one command through the sync engine, and
//! saves the library again if the command changed it.

mod config;
mod console;
mod crossref;
mod documents;
mod error;
mod list;
mod progress;
mod storage;

use crate::config::Config;
use crate::console::TerminalConsole;
use crate::crossref::Crossref;
use crate::documents::FileDocuments;
use crate::error::Result;
use crate::storage::LibraryFile;
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use refshelf_engine::{citations, selection, CiteFormat, Error, Session, SortMode};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(version, about = "Reference library synced against Crossref")]
struct Cli {
    /// Library file, or a directory containing db.json
    #[arg(short, long, global = true)]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Reference numbers are given like `4, 9 21-24` or `all`.
#[derive(Subcommand)]
enum Command {
    /// Look up DOIs and add them to the library
    Add {
        #[arg(required = true)]
        dois: Vec<String>,
    },
    /// Refresh metadata of existing references
    Update {
        #[arg(required = true)]
        refs: Vec<String>,
    },
    /// Delete references and their documents
    Delete {
        #[arg(required = true)]
        refs: Vec<String>,
    },
    /// Download full-text PDFs
    Fetch {
        #[arg(required = true)]
        refs: Vec<String>,
    },
    /// Attach PDF or SI documents from a path or URL
    AddPdf {
        #[arg(required = true)]
        refs: Vec<String>,
    },
    /// Delete stored PDF or SI documents
    DeletePdf {
        #[arg(required = true)]
        refs: Vec<String>,
    },
    /// Open stored documents or the DOI's web page
    Open {
        #[arg(required = true)]
        refs: Vec<String>,
        /// pdf (p), si (s) or web (w); several may be given, e.g. `pw`
        #[arg(short, long, default_value = "pdf")]
        format: String,
    },
    /// Print citations
    Cite {
        #[arg(required = true)]
        refs: Vec<String>,
        /// bib (b), doi (d), markdown (m) or long Markdown (M)
        #[arg(short, long, default_value = "bib")]
        format: String,
    },
    /// List references (all by default)
    List { refs: Vec<String> },
    /// Sort by year (y), time added (a) or time opened (o); capitalise to reverse
    Sort { mode: Option<String> },
}

const DEFAULT_LOG_FILTER: &str = "refshelf=warn,refshelf_engine=warn";

/// Load `.env` (the given file, or the first one found upward) and build
/// the log filter from the resulting environment.
fn load_env(env_file: Option<&Path>) -> EnvFilter {
    let _ = match env_file {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Load .env first so RUST_LOG from it applies; stdout is reserved for prompts
    tracing_subscriber::registry()
        .with(load_env(None))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(library) = cli.library {
        config.library = library;
    }

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("{}", e.to_string().red());
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let file = LibraryFile::resolve(&config.library);
    let mut library = file.load()?;
    tracing::debug!(path = %file.path().display(), records = library.len(), "library ready");

    let crossref = Crossref::new(config)?;
    let documents =
        FileDocuments::new(file.dir(), crossref.clone()).with_opener(config.opener.clone());
    let mut console = TerminalConsole::new();

    match command {
        Command::Add { dois } => {
            Session::new(&mut library, &crossref, &documents, &mut console)
                .add(&dois)
                .await?;
            library.sort(SortMode::default());
        }
        Command::Update { refs } => {
            Session::new(&mut library, &crossref, &documents, &mut console)
                .update(&refs.join(","))
                .await?;
        }
        Command::Delete { refs } => {
            Session::new(&mut library, &crossref, &documents, &mut console)
                .delete(&refs.join(","))
                .await?;
        }
        Command::Fetch { refs } => {
            Session::new(&mut library, &crossref, &documents, &mut console)
                .fetch_documents(&refs.join(","))
                .await?;
        }
        Command::AddPdf { refs } => {
            Session::new(&mut library, &crossref, &documents, &mut console)
                .attach_documents(&refs.join(","))
                .await?;
        }
        Command::DeletePdf { refs } => {
            Session::new(&mut library, &crossref, &documents, &mut console)
                .remove_documents(&refs.join(","))
                .await?;
        }
        Command::Open { refs, format } => {
            Session::new(&mut library, &crossref, &documents, &mut console)
                .open_documents(&refs.join(","), &format)?;
        }
        Command::Cite { refs, format } => {
            if library.is_empty() {
                return Err(Error::EmptyLibrary.into());
            }
            let formats = CiteFormat::parse_list(&format)?;
            let positions = selection::resolve_args(&refs, library.len())?;
            println!("{}", citations(&library, &positions, &formats)?);
        }
        Command::List { refs } => {
            if library.is_empty() {
                return Err(Error::EmptyLibrary.into());
            }
            let positions = if refs.is_empty() {
                (1..=library.len()).collect()
            } else {
                selection::resolve_args(&refs, library.len())?
            };
            for line in list::render(&library, &positions, &documents) {
                println!("{}", line);
            }
        }
        Command::Sort { mode } => {
            let mode: SortMode = mode.as_deref().unwrap_or("year").parse()?;
            if library.sort(mode) {
                println!("sort: library sorted");
            } else {
                println!("sort: already in order");
            }
        }
    }

    if library.is_dirty() {
        file.save(&mut library)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_comes_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "RUST_LOG=refshelf=trace\n").unwrap();
        std::env::remove_var("RUST_LOG");

        let filter = load_env(Some(&env_file));
        std::env::remove_var("RUST_LOG");

        assert_eq!(filter.to_string(), "refshelf=trace");
    }
}
