use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;
use crate::hardware::Category;

/// Failure of a single hardware probe.
///
/// The `Display` text is what lands in the snapshot's `Errors` object.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("unable to read {}: {source}", path.display())]
    Unreadable { path: PathBuf, source: io::Error },
    #[error("unable to parse {}: {reason}", path.display())]
    Unparseable { path: PathBuf, reason: String },
    #[error("{0}")]
    Proc(#[from] procfs::ProcError),
    #[error("{0}")]
    Unavailable(String),
}

impl ProbeError {
    pub fn unreadable(source: io::Error, path: impl AsRef<Path>) -> Self {
        Self::Unreadable {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn unparseable(reason: impl ToString, path: impl AsRef<Path>) -> Self {
        Self::Unparseable {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Errors that end the process with a non-zero exit code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{category} probe failed: {source}")]
    Probe {
        category: Category,
        source: ProbeError,
    },
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to serialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}
