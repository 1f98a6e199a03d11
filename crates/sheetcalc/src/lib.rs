//! A single-sheet calculation engine.
//!
//! [`SpreadsheetEngine`] owns the cell store and its undo history. Cells are
//! addressed by name (`A1`..`Z<n>`); formulas start with `=` and are evaluated
//! on demand whenever a display value is requested.
//!
//! ```
//! use sheetcalc::SpreadsheetEngine;
//!
//! let mut engine = SpreadsheetEngine::new();
//! engine.set_content("A1", "5").unwrap();
//! engine.set_content("B1", "=A1+3").unwrap();
//! assert_eq!(engine.get_display_value("B1"), "8");
//!
//! engine.move_cell("A1", "C1").unwrap();
//! assert_eq!(engine.content("B1").unwrap(), "=C1+3");
//! assert_eq!(engine.get_display_value("B1"), "8");
//! ```

pub mod engine;
pub mod exchange;

pub use engine::SpreadsheetEngine;
pub use exchange::{ExportCell, SheetExport, SheetImport};

pub use sheetcalc_core::{
    CellCoord, CellRange, CellStyle, CellValue, Color, EngineConfig, HorizontalAlign, SheetError,
    StyleChange,
};
