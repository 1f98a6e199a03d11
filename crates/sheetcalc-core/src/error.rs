use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error sentinels shown in place of a display value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellError {
    /// #ERROR! - Evaluation failure, malformed address or library failure
    Error,
    /// #UNKNOWN_FUNCTION - Unrecognized function name
    UnknownFunction,
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::Error => write!(f, "#ERROR!"),
            CellError::UnknownFunction => write!(f, "#UNKNOWN_FUNCTION"),
        }
    }
}

/// Errors returned by operations that take caller input
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    #[error("Address {0} is outside the {1}x{2} grid")]
    OutOfBounds(String, u32, u32),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl SheetError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            SheetError::InvalidAddress(_) => "INVALID_ADDRESS",
            SheetError::OutOfBounds(..) => "OUT_OF_BOUNDS",
            SheetError::Serialization(_) => "SERIALIZATION",
            SheetError::Config(_) => "CONFIG",
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(CellError::Error.to_string(), "#ERROR!");
        assert_eq!(CellError::UnknownFunction.to_string(), "#UNKNOWN_FUNCTION");
    }

    #[test]
    fn test_error_codes() {
        let err = SheetError::InvalidAddress("A0".to_string());
        assert_eq!(err.code(), "INVALID_ADDRESS");
        assert_eq!(err.to_string(), "Invalid cell address: A0");

        let err = SheetError::OutOfBounds("Z99".to_string(), 50, 26);
        assert_eq!(err.code(), "OUT_OF_BOUNDS");
        assert_eq!(err.to_string(), "Address Z99 is outside the 50x26 grid");
    }
}
