use sheetcalc_core::{
    CellCoord, CellError, CellRange, CellStyle, CellValue, EngineConfig, Result, Sheet,
    SheetError, StyleChange,
};
use sheetcalc_formula::Evaluator;
use sheetcalc_history::{
    ApplyStyleCommand, CommandBox, FillCommand, HistoryManager, MoveCellCommand,
    SetCellContentCommand, SetCellStyleCommand, StructuralCommand,
};

use crate::exchange::{ImportCommand, SheetExport, SheetImport};

/// A spreadsheet session: one sheet, its undo history and its configuration.
///
/// Every mutation goes through the history, so any edit can be undone.
#[derive(Debug)]
pub struct SpreadsheetEngine {
    sheet: Sheet,
    history: HistoryManager,
    config: EngineConfig,
}

impl Default for SpreadsheetEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SpreadsheetEngine {
    /// Create an engine with the default 50x26 grid
    pub fn new() -> Self {
        Self::from_config(EngineConfig::default())
    }

    /// Create an engine from a configuration, validating it first
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        Ok(Self::from_config(config.validate()?))
    }

    /// Create an engine configured from `SHEETCALC_*` environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(EngineConfig::from_env()?))
    }

    fn from_config(config: EngineConfig) -> Self {
        Self {
            sheet: Sheet::new(config.default_rows, config.default_cols),
            history: HistoryManager::new(config.history_limit),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only view of the cell store
    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn num_rows(&self) -> u32 {
        self.sheet.num_rows()
    }

    pub fn num_cols(&self) -> u32 {
        self.sheet.num_cols()
    }

    /// Bounding box from A1 to the last used row and column
    pub fn used_range(&self) -> Option<CellRange> {
        self.sheet.used_range()
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.sheet).with_max_depth(self.config.max_eval_depth)
    }

    /// Resolve a cell name to a coordinate inside the grid
    fn locate(&self, name: &str) -> Result<CellCoord> {
        let coord = CellCoord::from_name(name.trim())
            .ok_or_else(|| SheetError::InvalidAddress(name.to_string()))?;
        if !self.sheet.contains(coord) {
            return Err(SheetError::OutOfBounds(
                name.to_string(),
                self.sheet.num_rows(),
                self.sheet.num_cols(),
            ));
        }
        Ok(coord)
    }

    fn locate_range(&self, range: &str) -> Result<CellRange> {
        let parsed = CellRange::parse(range)
            .ok_or_else(|| SheetError::InvalidAddress(range.to_string()))?;
        for corner in [parsed.start, parsed.end] {
            if !self.sheet.contains(corner) {
                return Err(SheetError::OutOfBounds(
                    range.to_string(),
                    self.sheet.num_rows(),
                    self.sheet.num_cols(),
                ));
            }
        }
        Ok(parsed)
    }

    fn run(&mut self, command: CommandBox) -> Option<Vec<CellCoord>> {
        self.history.execute(command, &mut self.sheet)
    }

    // --- Cell content ---

    /// Raw content of a cell ("" when empty)
    pub fn content(&self, name: &str) -> Result<&str> {
        let coord = self.locate(name)?;
        Ok(self.sheet.content(coord))
    }

    /// Text shown for a cell: literals verbatim, formulas evaluated.
    ///
    /// Never fails; a malformed name or one outside the grid displays as `#ERROR!`.
    pub fn get_display_value(&self, name: &str) -> String {
        match CellCoord::from_name(name.trim()).filter(|c| self.sheet.contains(*c)) {
            Some(coord) => self.evaluator().display_value(coord),
            None => CellError::Error.to_string(),
        }
    }

    /// Evaluated value of a cell, before display formatting
    pub fn evaluate(&self, name: &str) -> Result<CellValue> {
        let coord = self.locate(name)?;
        Ok(self.evaluator().evaluate_cell(coord))
    }

    /// Set a cell's raw content; an empty string clears the cell.
    ///
    /// Returns the affected cells.
    pub fn set_content(&mut self, name: &str, value: &str) -> Result<Vec<CellCoord>> {
        let coord = self.locate(name)?;
        Ok(self
            .run(Box::new(SetCellContentCommand::new(coord, value)))
            .unwrap_or_default())
    }

    pub fn clear_cell(&mut self, name: &str) -> Result<Vec<CellCoord>> {
        self.set_content(name, "")
    }

    // --- Styles ---

    pub fn style(&self, name: &str) -> Result<CellStyle> {
        let coord = self.locate(name)?;
        Ok(self.sheet.style(coord).cloned().unwrap_or_default())
    }

    /// Apply one toolbar edit (bold toggle, colour, alignment, ...) to a cell
    pub fn apply_style(&mut self, name: &str, change: StyleChange) -> Result<()> {
        let coord = self.locate(name)?;
        self.run(Box::new(ApplyStyleCommand::new(coord, change)));
        Ok(())
    }

    /// Replace a cell's whole style record
    pub fn set_style(&mut self, name: &str, style: CellStyle) -> Result<()> {
        let coord = self.locate(name)?;
        self.run(Box::new(SetCellStyleCommand::new(coord, style)));
        Ok(())
    }

    // --- Structure ---

    /// Insert an empty row below the 0-based `index`. Returns `false` for a no-op.
    pub fn insert_row(&mut self, index: u32) -> bool {
        self.run(Box::new(StructuralCommand::insert_row(index))).is_some()
    }

    /// Delete the 0-based row `index`. The last remaining row cannot be deleted.
    pub fn delete_row(&mut self, index: u32) -> bool {
        self.run(Box::new(StructuralCommand::delete_row(index))).is_some()
    }

    /// Insert an empty column right of the 0-based `index`
    pub fn insert_col(&mut self, index: u32) -> bool {
        self.run(Box::new(StructuralCommand::insert_col(index))).is_some()
    }

    /// Delete the 0-based column `index`. The last remaining column cannot be deleted.
    pub fn delete_col(&mut self, index: u32) -> bool {
        self.run(Box::new(StructuralCommand::delete_col(index))).is_some()
    }

    // --- Move & fill ---

    /// Swap two cells and every reference to them.
    ///
    /// Returns `Ok(false)` when `from` and `to` are the same cell.
    pub fn move_cell(&mut self, from: &str, to: &str) -> Result<bool> {
        let from = self.locate(from)?;
        let to = self.locate(to)?;
        Ok(self.run(Box::new(MoveCellCommand::new(from, to))).is_some())
    }

    /// Fill the rectangle spanning `source` and `target` from the source cell.
    ///
    /// `target` is a cell name or an `A1:B2` range.
    pub fn fill(&mut self, source: &str, target: &str) -> Result<bool> {
        let source = self.locate(source)?;
        let target = self.locate_range(target)?;
        Ok(self.run(Box::new(FillCommand::new(source, target))).is_some())
    }

    // --- Exchange ---

    /// Display values and resolved styles up to the last used row and column
    pub fn export(&self) -> SheetExport {
        SheetExport::from_sheet(&self.sheet, &self.evaluator())
    }

    /// Replace the sheet with imported data as one undoable edit.
    ///
    /// The grid grows to fit the data but never below the configured size.
    pub fn import(&mut self, data: SheetImport) -> Vec<CellCoord> {
        let command = ImportCommand::new(data, self.config.default_rows, self.config.default_cols);
        self.run(Box::new(command)).unwrap_or_default()
    }

    pub fn import_json(&mut self, json: &str) -> Result<Vec<CellCoord>> {
        let data = SheetImport::from_json(json)?;
        Ok(self.import(data))
    }

    // --- Undo/Redo ---

    /// Undo the last edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.sheet)
    }

    /// Redo the last undone edit. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.sheet)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    /// Clear undo/redo history
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
