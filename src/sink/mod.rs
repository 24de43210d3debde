//! Report persistence.
//!
//! Finished documents arrive here as complete strings; this module only
//! writes them at the requested paths. No handles are kept and no atomicity
//! is promised.

use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to create report directory `{path}`: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write report `{path}`: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

pub fn persist(path: &Path, document: &str) -> Result<(), SinkError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| SinkError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }

    fs::write(path, document).map_err(|source| SinkError::Write {
        path: path.display().to_string(),
        source,
    })
}
