//! Filesystem save target

use crate::error::{Error, Result};
use crate::export::{SaveTarget, SavedFile};
use std::fs;
use std::path::{Path, PathBuf};

/// Writes downloads into a directory, creating it on first use
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Save into `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveTarget for DirectorySink {
    fn save(&self, file_name: &str, contents: &[u8]) -> Result<SavedFile> {
        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory {}: {e}", self.dir.display()),
                ))
            })?;
        }

        let path = self.dir.join(file_name);
        fs::write(&path, contents).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write {}: {e}", path.display()),
            ))
        })?;

        Ok(SavedFile {
            file_name: file_name.to_string(),
            path: Some(path),
            bytes: contents.len(),
        })
    }
}
