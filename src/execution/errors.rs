use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FundingError {
    /// Empty or malformed arguments to the selector or the allocator.
    InvalidInput(String),
}

impl fmt::Display for FundingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FundingError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for FundingError {}
