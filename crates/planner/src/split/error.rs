use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Invalid range bound '{value}': {reason}")]
    InvalidBound { value: String, reason: String },

    #[error("Precision must be between 1 and {max} digits, got {got}")]
    InvalidPrecision { got: u64, max: u64 },
}
