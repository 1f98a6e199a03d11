use sheetcalc_core::{CellCoord, Sheet, MAX_COLS};
use sheetcalc_formula::{shift_references, StructuralShift};

use crate::command::Command;

/// Insert or delete a row or column.
///
/// Cells move with their styles, and every formula in the sheet is rewritten
/// so its references follow the cells they pointed at.
#[derive(Debug)]
pub struct StructuralCommand {
    shift: StructuralShift,
}

impl StructuralCommand {
    pub fn new(shift: StructuralShift) -> Self {
        Self { shift }
    }

    pub fn insert_row(index: u32) -> Self {
        Self::new(StructuralShift::InsertRow(index))
    }

    pub fn delete_row(index: u32) -> Self {
        Self::new(StructuralShift::DeleteRow(index))
    }

    pub fn insert_col(index: u32) -> Self {
        Self::new(StructuralShift::InsertCol(index))
    }

    pub fn delete_col(index: u32) -> Self {
        Self::new(StructuralShift::DeleteCol(index))
    }
}

impl Command for StructuralCommand {
    fn is_applicable(&self, sheet: &Sheet) -> bool {
        let (rows, cols) = (sheet.num_rows(), sheet.num_cols());
        match self.shift {
            StructuralShift::InsertRow(at) => at < rows && rows < u32::MAX,
            // Never shrink below one row or column
            StructuralShift::DeleteRow(at) => at < rows && rows > 1,
            StructuralShift::InsertCol(at) => at < cols && cols < MAX_COLS,
            StructuralShift::DeleteCol(at) => at < cols && cols > 1,
        }
    }

    fn execute(&mut self, sheet: &mut Sheet) -> Vec<CellCoord> {
        let shift = self.shift;

        sheet.relocate(|coord| shift.map_coord(coord).filter(|c| c.col < MAX_COLS));
        sheet.rewrite_formulas(|formula| Some(shift_references(formula, shift)));

        let (rows, cols) = (sheet.num_rows(), sheet.num_cols());
        match shift {
            StructuralShift::InsertRow(_) => sheet.resize(rows + 1, cols),
            StructuralShift::DeleteRow(_) => sheet.resize(rows - 1, cols),
            StructuralShift::InsertCol(_) => sheet.resize(rows, cols + 1),
            StructuralShift::DeleteCol(_) => sheet.resize(rows, cols - 1),
        }

        sheet.cells().map(|(coord, _)| coord).collect()
    }

    fn description(&self) -> &str {
        self.shift.description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcalc_core::CellStyle;

    fn coord(name: &str) -> CellCoord {
        CellCoord::from_name(name).unwrap()
    }

    fn run(sheet: &mut Sheet, mut cmd: StructuralCommand) -> bool {
        if !cmd.is_applicable(sheet) {
            return false;
        }
        cmd.execute(sheet);
        true
    }

    #[test]
    fn test_insert_row_moves_cells_and_formulas() {
        let mut sheet = Sheet::new(50, 26);
        sheet.set_content(coord("A1"), "1");
        sheet.set_content(coord("A2"), "2");
        sheet.set_style(coord("A2"), CellStyle::new().with_bold(true));
        sheet.set_content(coord("B1"), "=A1+A2");

        assert!(run(&mut sheet, StructuralCommand::insert_row(0)));

        assert_eq!(sheet.num_rows(), 51);
        assert_eq!(sheet.content(coord("A1")), "1");
        assert_eq!(sheet.content(coord("A2")), "");
        assert_eq!(sheet.content(coord("A3")), "2");
        assert!(sheet.style(coord("A3")).unwrap().bold);
        assert!(sheet.style(coord("A2")).is_none());
        assert_eq!(sheet.content(coord("B1")), "=A1+A3");
    }

    #[test]
    fn test_delete_row_drops_cells_and_breaks_references() {
        let mut sheet = Sheet::new(50, 26);
        sheet.set_content(coord("A1"), "=A2+A3");
        sheet.set_content(coord("A2"), "gone");
        sheet.set_content(coord("A3"), "3");

        assert!(run(&mut sheet, StructuralCommand::delete_row(1)));

        assert_eq!(sheet.num_rows(), 49);
        assert_eq!(sheet.content(coord("A2")), "3");
        assert_eq!(sheet.content(coord("A3")), "");
        assert_eq!(sheet.content(coord("A1")), "=#REF!+A2");
    }

    #[test]
    fn test_column_edits() {
        let mut sheet = Sheet::new(10, 5);
        sheet.set_content(coord("B1"), "b");
        sheet.set_content(coord("C1"), "=B1");

        assert!(run(&mut sheet, StructuralCommand::insert_col(0)));
        assert_eq!(sheet.num_cols(), 6);
        assert_eq!(sheet.content(coord("C1")), "b");
        assert_eq!(sheet.content(coord("D1")), "=C1");

        assert!(run(&mut sheet, StructuralCommand::delete_col(1)));
        assert_eq!(sheet.num_cols(), 5);
        assert_eq!(sheet.content(coord("B1")), "b");
        assert_eq!(sheet.content(coord("C1")), "=B1");
    }

    #[test]
    fn test_never_below_one_row_or_column() {
        let mut sheet = Sheet::new(1, 1);
        sheet.set_content(coord("A1"), "x");

        assert!(!run(&mut sheet, StructuralCommand::delete_row(0)));
        assert!(!run(&mut sheet, StructuralCommand::delete_col(0)));
        assert_eq!((sheet.num_rows(), sheet.num_cols()), (1, 1));
        assert_eq!(sheet.content(coord("A1")), "x");
    }

    #[test]
    fn test_column_limit() {
        let mut sheet = Sheet::new(5, 26);
        assert!(!run(&mut sheet, StructuralCommand::insert_col(3)));
        assert_eq!(sheet.num_cols(), 26);
    }

    #[test]
    fn test_out_of_grid_index_is_noop() {
        let mut sheet = Sheet::new(5, 5);
        assert!(!run(&mut sheet, StructuralCommand::delete_row(5)));
        assert!(!run(&mut sheet, StructuralCommand::insert_col(7)));
    }
}
