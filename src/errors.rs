use thiserror::Error;

/// Errors raised while building directory paths or preparing a connection context.
#[derive(Debug, Error)]
pub enum AdsError {
    // The output buffer could not be reserved
    #[error("allocation failure: {0}")]
    Allocation(String),

    // A required input was empty or missing
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // The path capacity computation does not fit in usize
    #[error("path would be truncated: {0}")]
    Truncation(String),

    // The policy source could not supply a value
    #[error("policy error: {0}")]
    Policy(String),
}

pub type Result<T> = std::result::Result<T, AdsError>;
