use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Fixed identifier the snapshot blob is keyed by.
const SAVE_FILE_NAME: &str = "player.save.json";

/// Opaque blob store for the flat key-to-number player snapshot. The store
/// never interprets the blob; callers own the schema and the all-or-nothing
/// load contract.
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to read save '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write save '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SaveStore {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(SAVE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn read_blob(&self) -> Result<String, SaveError> {
        fs::read_to_string(&self.path).map_err(|source| SaveError::Read {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes via a sibling temp file and rename so a crash mid-write never
    /// leaves a truncated snapshot behind.
    pub fn write_blob(&self, blob: &str) -> Result<(), SaveError> {
        let write_error = |source| SaveError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, blob).map_err(write_error)?;

        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                let _ = fs::remove_file(&tmp_path);
                return Err(write_error(error));
            }
        }
        if let Err(error) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_error(error));
        }
        debug!(path = %self.path.display(), bytes = blob.len(), "save_blob_written");
        Ok(())
    }
}
