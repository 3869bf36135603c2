// Error types for release fetching and install reconciliation

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a release lookup produced no data.
///
/// None of these ever reach the host: the checker logs them and reports
/// "no update available" for the rest of the cache window.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("API returned status code {0}")]
    Status(u16),

    #[error("empty response body")]
    EmptyBody,

    #[error("invalid JSON response: {0}")]
    InvalidJson(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// Filesystem reconciliation failure during an install.
///
/// Surfaced to the administrator; the install must not continue with the
/// package under the wrong directory name.
#[derive(Debug, Error)]
pub enum InstallError {
    #[error(
        "Unable to rename the update to match the existing plugin directory ({from} -> {to}): {source}"
    )]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to remove the previous plugin directory {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to move the installed plugin ({from} -> {to}): {source}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    /// Stable machine-readable code shown alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            InstallError::RenameFailed { .. } => "rename_failed",
            InstallError::DeleteFailed { .. } => "delete_failed",
            InstallError::MoveFailed { .. } => "move_failed",
        }
    }
}
