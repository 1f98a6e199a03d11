use sheetcalc_core::{CellCoord, CellStyle, Sheet, StyleChange};

/// Type alias for boxed commands
pub type CommandBox = Box<dyn Command>;

/// A sheet mutation recorded in the history.
///
/// Undo restores a snapshot taken before `execute`, so commands only need to
/// know how to apply themselves.
pub trait Command: std::fmt::Debug + Send + Sync {
    /// Whether executing would change anything. Inapplicable commands are
    /// skipped without touching the history.
    fn is_applicable(&self, _sheet: &Sheet) -> bool {
        true
    }

    /// Execute the command, returning affected cell coordinates
    fn execute(&mut self, sheet: &mut Sheet) -> Vec<CellCoord>;

    /// Get a description of this command (for UI display)
    fn description(&self) -> &str;
}

/// Set a single cell's raw content
#[derive(Debug)]
pub struct SetCellContentCommand {
    coord: CellCoord,
    content: String,
}

impl SetCellContentCommand {
    pub fn new(coord: CellCoord, content: impl Into<String>) -> Self {
        Self {
            coord,
            content: content.into(),
        }
    }
}

impl Command for SetCellContentCommand {
    fn is_applicable(&self, sheet: &Sheet) -> bool {
        sheet.contains(self.coord)
    }

    fn execute(&mut self, sheet: &mut Sheet) -> Vec<CellCoord> {
        sheet.set_content(self.coord, self.content.as_str());
        vec![self.coord]
    }

    fn description(&self) -> &str {
        if self.content.is_empty() {
            "Clear cell"
        } else {
            "Set cell value"
        }
    }
}

/// Apply one toolbar edit to a cell's style
#[derive(Debug)]
pub struct ApplyStyleCommand {
    coord: CellCoord,
    change: StyleChange,
}

impl ApplyStyleCommand {
    pub fn new(coord: CellCoord, change: StyleChange) -> Self {
        Self { coord, change }
    }
}

impl Command for ApplyStyleCommand {
    fn is_applicable(&self, sheet: &Sheet) -> bool {
        sheet.contains(self.coord)
    }

    fn execute(&mut self, sheet: &mut Sheet) -> Vec<CellCoord> {
        let mut style = sheet.style(self.coord).cloned().unwrap_or_default();
        style.apply(&self.change);
        sheet.set_style(self.coord, style);
        vec![self.coord]
    }

    fn description(&self) -> &str {
        self.change.description()
    }
}

/// Replace a cell's whole style record
#[derive(Debug)]
pub struct SetCellStyleCommand {
    coord: CellCoord,
    style: CellStyle,
}

impl SetCellStyleCommand {
    pub fn new(coord: CellCoord, style: CellStyle) -> Self {
        Self { coord, style }
    }
}

impl Command for SetCellStyleCommand {
    fn is_applicable(&self, sheet: &Sheet) -> bool {
        sheet.contains(self.coord)
    }

    fn execute(&mut self, sheet: &mut Sheet) -> Vec<CellCoord> {
        sheet.set_style(self.coord, self.style.clone());
        vec![self.coord]
    }

    fn description(&self) -> &str {
        "Set cell format"
    }
}
