//! Filesystem document store next to the library file.
//!
//! Documents live at `<root>/<kind>/<doi>.pdf` with every `/` in the DOI
//! replaced by `#`. Opening hands a file or URL to the desktop's opener.

use crate::crossref::Crossref;
use refshelf_engine::{DocumentError, DocumentKind, DocumentSource, Documents, OpenTarget};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Documents stored under a library directory.
#[derive(Debug, Clone)]
pub struct FileDocuments {
    root: PathBuf,
    crossref: Crossref,
    opener: Option<String>,
}

impl FileDocuments {
    pub fn new(root: impl Into<PathBuf>, crossref: Crossref) -> Self {
        Self {
            root: root.into(),
            crossref,
            opener: None,
        }
    }

    /// Open with `program` instead of the platform default.
    pub fn with_opener(mut self, program: Option<String>) -> Self {
        self.opener = program;
        self
    }

    /// Where a document of `kind` for `doi` is kept.
    pub fn path_for(&self, doi: &str, kind: DocumentKind) -> PathBuf {
        self.root
            .join(kind.as_str())
            .join(format!("{}.pdf", doi.replace('/', "#")))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, DocumentError> {
        let network = |e: reqwest::Error| DocumentError::Network(e.to_string());
        let response = self
            .crossref
            .http()
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(network)?;
        let bytes = response.bytes().await.map_err(network)?;
        if !bytes.starts_with(b"%PDF") {
            return Err(DocumentError::NotPdf(url.to_string()));
        }
        Ok(bytes.to_vec())
    }
}

/// `open` on macOS, `start` on Windows, `xdg-open` elsewhere.
fn platform_opener() -> Command {
    if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    }
}

fn io_error(path: &Path, e: std::io::Error) -> DocumentError {
    DocumentError::Io(format!("{}: {}", path.display(), e))
}

impl Documents for FileDocuments {
    fn exists(&self, doi: &str, kind: DocumentKind) -> bool {
        self.path_for(doi, kind).is_file()
    }

    async fn locate(&self, doi: &str) -> Result<String, DocumentError> {
        self.crossref.pdf_url(doi).await
    }

    async fn store(
        &self,
        source: DocumentSource,
        doi: &str,
        kind: DocumentKind,
    ) -> Result<(), DocumentError> {
        let target = self.path_for(doi, kind);
        if target.is_file() {
            return Err(DocumentError::AlreadyStored {
                doi: doi.to_string(),
                kind,
            });
        }
        if let Some(dir) = target.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error(dir, e))?;
        }

        match source {
            DocumentSource::Path(path) => {
                if !path.is_file() {
                    return Err(DocumentError::NotFound(path.display().to_string()));
                }
                tokio::fs::copy(&path, &target)
                    .await
                    .map_err(|e| io_error(&path, e))?;
            }
            DocumentSource::Url(url) => {
                let bytes = self.download(&url).await?;
                tokio::fs::write(&target, bytes)
                    .await
                    .map_err(|e| io_error(&target, e))?;
            }
        }

        tracing::debug!(path = %target.display(), "document written");
        Ok(())
    }

    fn remove(&self, doi: &str, kind: DocumentKind) -> Result<bool, DocumentError> {
        let path = self.path_for(doi, kind);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn open(&self, doi: &str, target: OpenTarget) -> Result<(), DocumentError> {
        let what: OsString = match target {
            OpenTarget::Document(kind) => {
                let path = self.path_for(doi, kind);
                if !path.is_file() {
                    return Err(DocumentError::NotFound(doi.to_string()));
                }
                path.into_os_string()
            }
            OpenTarget::Web => format!("https://doi.org/{}", doi).into(),
        };

        let mut command = match &self.opener {
            Some(program) => Command::new(program),
            None => platform_opener(),
        };
        let program = command.get_program().to_os_string();
        let status = command
            .arg(&what)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| DocumentError::Io(format!("{:?}: {}", program, e)))?;
        if !status.success() {
            return Err(DocumentError::Io(format!("{:?} {:?}: {}", program, what, status)));
        }

        tracing::debug!(what = ?what, "opened");
        Ok(())
    }
}
