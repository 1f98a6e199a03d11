use sheetcalc_core::{CellCoord, CellRange, Sheet};
use sheetcalc_formula::{offset_references, swap_references};

use crate::command::Command;

/// Swap two cells (content and style) and exchange every formula reference to them
#[derive(Debug)]
pub struct MoveCellCommand {
    from: CellCoord,
    to: CellCoord,
}

impl MoveCellCommand {
    pub fn new(from: CellCoord, to: CellCoord) -> Self {
        Self { from, to }
    }
}

impl Command for MoveCellCommand {
    fn is_applicable(&self, sheet: &Sheet) -> bool {
        self.from != self.to && sheet.contains(self.from) && sheet.contains(self.to)
    }

    fn execute(&mut self, sheet: &mut Sheet) -> Vec<CellCoord> {
        let (from, to) = (self.from, self.to);
        sheet.swap(from, to);
        sheet.rewrite_formulas(|formula| Some(swap_references(formula, from, to)));
        vec![from, to]
    }

    fn description(&self) -> &str {
        "Move cell"
    }
}

/// How a fill propagates the source content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    /// All-digit literal: each target gets source + distance along the fill axis
    Sequence,
    /// Formula: references shift by the source-to-target offset
    Formula,
    /// Anything else is copied verbatim
    Copy,
}

impl FillPolicy {
    pub fn for_content(content: &str) -> Self {
        if !content.is_empty() && content.bytes().all(|b| b.is_ascii_digit()) {
            FillPolicy::Sequence
        } else if content.starts_with('=') {
            FillPolicy::Formula
        } else {
            FillPolicy::Copy
        }
    }
}

/// Propagate a source cell over the rectangle spanning it and a target range.
///
/// The source style is copied to every target; the source itself is left as is.
#[derive(Debug)]
pub struct FillCommand {
    source: CellCoord,
    target: CellRange,
}

impl FillCommand {
    pub fn new(source: CellCoord, target: CellRange) -> Self {
        Self { source, target }
    }

    /// The full rectangle being filled, source included
    pub fn area(&self) -> CellRange {
        self.target.including(self.source)
    }

    /// Cells receiving a numeric sequence: the source's column when the
    /// area is a single column, otherwise the source's row.
    fn sequence_targets(&self) -> Vec<CellCoord> {
        let area = self.area();
        let source = self.source;
        if area.col_count() == 1 {
            (area.start.row..=area.end.row)
                .map(|row| CellCoord::new(row, source.col))
                .filter(|c| *c != source)
                .collect()
        } else {
            (area.start.col..=area.end.col)
                .map(|col| CellCoord::new(source.row, col))
                .filter(|c| *c != source)
                .collect()
        }
    }

    /// Content for `target`, or `None` to fall back to a plain copy
    fn sequence_value(&self, start: &str, target: CellCoord) -> Option<String> {
        let start: u128 = start.parse().ok()?;
        let step = if self.area().col_count() == 1 {
            target.row.abs_diff(self.source.row)
        } else {
            target.col.abs_diff(self.source.col)
        };
        start.checked_add(u128::from(step)).map(|v| v.to_string())
    }
}

impl Command for FillCommand {
    fn is_applicable(&self, sheet: &Sheet) -> bool {
        sheet.contains(self.source)
            && sheet.contains(self.target.start)
            && sheet.contains(self.target.end)
            && !self.area().is_single_cell()
    }

    fn execute(&mut self, sheet: &mut Sheet) -> Vec<CellCoord> {
        let source = self.source;
        let content = sheet.content(source).to_string();
        let style = sheet.style(source).cloned();
        let (rows, cols) = (sheet.num_rows(), sheet.num_cols());

        let policy = FillPolicy::for_content(&content);
        let targets: Vec<CellCoord> = match policy {
            FillPolicy::Sequence => self.sequence_targets(),
            _ => self.area().iter().filter(|c| *c != source).collect(),
        };

        for &target in &targets {
            let value = match policy {
                FillPolicy::Sequence => self
                    .sequence_value(&content, target)
                    .unwrap_or_else(|| content.clone()),
                FillPolicy::Formula => {
                    let d_row = i64::from(target.row) - i64::from(source.row);
                    let d_col = i64::from(target.col) - i64::from(source.col);
                    offset_references(&content, d_row, d_col, rows, cols)
                }
                FillPolicy::Copy => content.clone(),
            };
            sheet.set_content(target, value);

            if let Some(style) = &style {
                sheet.set_style(target, style.clone());
            }
        }

        targets
    }

    fn description(&self) -> &str {
        "Fill cells"
    }
}
