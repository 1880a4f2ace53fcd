//! The library file on disk.

use crate::error::{AppError, Result};
use refshelf_engine::{Library, LibrarySnapshot};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name used when the library path is a directory.
pub const DEFAULT_FILE_NAME: &str = "db.json";

/// Location of a library file and its document directory.
#[derive(Debug, Clone)]
pub struct LibraryFile {
    path: PathBuf,
}

impl LibraryFile {
    /// A directory means `db.json` inside it.
    pub fn resolve(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let path = if path.is_dir() {
            path.join(DEFAULT_FILE_NAME)
        } else {
            path.to_path_buf()
        };
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the library file and its documents.
    pub fn dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Load the library. A missing file is an empty library.
    pub fn load(&self) -> Result<Library> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no library file yet, starting empty");
                return Ok(Library::new());
            }
            Err(e) => return Err(e.into()),
        };

        let library = LibrarySnapshot::from_json(&json)
            .and_then(LibrarySnapshot::restore)
            .map_err(|source| AppError::Load {
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!(path = %self.path.display(), records = library.len(), "library loaded");
        Ok(library)
    }

    /// Write the library atomically and clear its change log.
    ///
    /// On failure the change log is left as it was.
    pub fn save(&self, library: &mut Library) -> Result<()> {
        let json = LibrarySnapshot::capture(library).to_json_pretty()?;

        let dir = self.dir();
        std::fs::create_dir_all(&dir)?;
        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = write_synced(&tmp, json.as_bytes())
            .and_then(|()| std::fs::rename(&tmp, &self.path))
        {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        tracing::info!(
            path = %self.path.display(),
            records = library.len(),
            changes = library.changes().len(),
            "library saved"
        );
        library.mark_saved();
        Ok(())
    }
}

/// Write `bytes` and flush them to disk before returning.
fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}
