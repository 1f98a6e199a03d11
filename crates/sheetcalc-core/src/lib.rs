pub mod cell;
pub mod config;
pub mod error;
pub mod format;
pub mod range;
pub mod sheet;

pub use cell::CellValue;
pub use config::{ConfigError, EngineConfig, MAX_EVAL_DEPTH};
pub use error::{CellError, Result, SheetError};
pub use format::{CellStyle, Color, HorizontalAlign, ResolvedStyle, StyleChange};
pub use range::{format_name, parse_name, parse_range, CellCoord, CellRange, MAX_COLS};
pub use sheet::{Sheet, Snapshot};
