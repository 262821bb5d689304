use planner::split::error::SplitError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating transport settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// One entry per rejected setting.
    #[error("Invalid settings: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    #[error("Splitter configuration error: {0}")]
    Split(#[from] SplitError),
}
