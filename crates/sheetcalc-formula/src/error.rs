use sheetcalc_core::{CellCoord, CellError};
use thiserror::Error;

use crate::parser::ParseError;

/// Why a formula could not be evaluated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid cell address '{0}'")]
    InvalidAddress(String),

    #[error("{0} is outside the grid")]
    OutOfBounds(CellCoord),

    #[error("circular reference through {0}")]
    Circular(CellCoord),

    #[error("reference chain deeper than {0}")]
    DepthExceeded(usize),

    #[error("unknown function {0}")]
    UnknownFunction(String),

    #[error("invalid pattern: {0}")]
    Pattern(String),

    #[error("{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("result is not a finite number")]
    NotFinite,
}

impl EvalError {
    /// Fatal errors abort every formula on the current reference chain
    /// instead of being shown as the value of the referenced cell.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EvalError::Circular(_) | EvalError::DepthExceeded(_))
    }

    /// The sentinel displayed for this error
    pub fn sentinel(&self) -> CellError {
        match self {
            EvalError::UnknownFunction(_) => CellError::UnknownFunction,
            _ => CellError::Error,
        }
    }
}

impl From<regex::Error> for EvalError {
    fn from(err: regex::Error) -> Self {
        EvalError::Pattern(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
