pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod reference_shifter;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::EvalError;
pub use evaluator::Evaluator;
pub use parser::{ParseError, Parser};
pub use reference_shifter::{
    offset_references, rewrite_references, shift_references, swap_references, StructuralShift,
    REF_ERROR,
};

use sheetcalc_core::{CellCoord, Sheet};

/// Display value of a single cell
///
/// ```
/// use sheetcalc_core::{CellCoord, Sheet};
///
/// let mut sheet = Sheet::new(50, 26);
/// sheet.set_content(CellCoord::new(0, 0), "5");
/// sheet.set_content(CellCoord::new(0, 1), "=A1+3");
/// assert_eq!(sheetcalc_formula::display_value(&sheet, CellCoord::new(0, 1)), "8");
/// ```
pub fn display_value(sheet: &Sheet, coord: CellCoord) -> String {
    Evaluator::new(sheet).display_value(coord)
}

