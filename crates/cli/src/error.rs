use engine_config::settings::SettingsError;
use engine_core::error::RepositoryError;
use planner::split::error::SplitError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to load settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to split work: {0}")]
    Split(#[from] SplitError),

    #[error("Failed to open chunk repository at {path}: {reason}")]
    StateStore { path: String, reason: String },

    #[error("Failed to read chunk records: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid execution id '{value}': {reason}")]
    InvalidExecutionId { value: String, reason: String },

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
