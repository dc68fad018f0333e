//! Error types for active-config.

use std::path::{Path, PathBuf};

/// Result type alias for active-config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while binding configuration to a file.
///
/// Every variant is handled at the boundary of the component that detects
/// it: watch setup failures surface at registration, everything else is
/// reported through the [`HookRegistry`](crate::watch::HookRegistry) so a
/// broken file never takes the hosting application down with it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A watch could not be established for a file's parent directory.
    ///
    /// Fatal to the one binding being registered; other bindings are
    /// unaffected.
    #[error("failed to set up watch on {path}: {reason}")]
    WatchSetup {
        /// The path that could not be watched.
        path: PathBuf,
        /// What the file-event backend reported.
        reason: String,
    },

    /// The event backend failed after the watch had been established.
    ///
    /// Reported through the hook registry; terminates that file's watch
    /// loop once the configured restart budget is exhausted.
    #[error("watch loop for {path} failed: {reason}")]
    WatchLoop {
        /// The file whose watch loop failed.
        path: PathBuf,
        /// What the file-event backend reported.
        reason: String,
    },

    /// The file's contents could not be parsed into a configuration
    /// document.
    ///
    /// The merge for that change is skipped and the live instance keeps
    /// its previous values.
    #[error("failed to decode {path}: {reason}")]
    Decode {
        /// The file that failed to decode.
        path: PathBuf,
        /// The parse failure.
        reason: String,
    },

    /// A decoded document does not match the target type's shape.
    ///
    /// The merge is aborted with the live instance fully unmodified.
    #[error("decoded configuration does not match the target shape: {0}")]
    ShapeMismatch(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Build a [`ConfigError::WatchSetup`] from any displayable cause.
    pub fn watch_setup(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::WatchSetup {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`ConfigError::WatchLoop`] from any displayable cause.
    pub fn watch_loop(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::WatchLoop {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`ConfigError::Decode`] from any displayable cause.
    pub fn decode(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
