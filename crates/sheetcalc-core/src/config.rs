use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

use crate::range::MAX_COLS;

/// Upper bound on `max_eval_depth`
pub const MAX_EVAL_DEPTH: usize = 256;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Rows in a new sheet, and the minimum after import
    pub default_rows: u32,
    /// Columns in a new sheet, and the minimum after import
    pub default_cols: u32,
    /// Maximum number of undo levels
    pub history_limit: usize,
    /// Maximum nesting of cell references during one evaluation
    pub max_eval_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_rows: 50,
            default_cols: MAX_COLS,
            history_limit: 100,
            max_eval_depth: MAX_EVAL_DEPTH,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid number: '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

impl EngineConfig {
    /// Load configuration from `SHEETCALC_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            default_rows: env_or("SHEETCALC_ROWS", defaults.default_rows)?,
            default_cols: env_or("SHEETCALC_COLS", defaults.default_cols)?,
            history_limit: env_or("SHEETCALC_HISTORY_LIMIT", defaults.history_limit)?,
            max_eval_depth: env_or("SHEETCALC_MAX_EVAL_DEPTH", defaults.max_eval_depth)?,
        };
        config.validate()
    }

    /// Reject zero sizes, clamp columns to the addressable `A`..=`Z` and
    /// the evaluation depth to [`MAX_EVAL_DEPTH`]
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.default_rows == 0 {
            return Err(ConfigError::Zero("default_rows"));
        }
        if self.default_cols == 0 {
            return Err(ConfigError::Zero("default_cols"));
        }
        if self.max_eval_depth == 0 {
            return Err(ConfigError::Zero("max_eval_depth"));
        }
        if self.max_eval_depth > MAX_EVAL_DEPTH {
            tracing::warn!(
                requested = self.max_eval_depth,
                max = MAX_EVAL_DEPTH,
                "clamping evaluation depth"
            );
            self.max_eval_depth = MAX_EVAL_DEPTH;
        }
        if self.default_cols > MAX_COLS {
            tracing::warn!(
                requested = self.default_cols,
                max = MAX_COLS,
                "clamping default column count"
            );
            self.default_cols = MAX_COLS;
        }
        Ok(self)
    }
}

fn env_or<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        Err(_) => Ok(default),
    }
}
