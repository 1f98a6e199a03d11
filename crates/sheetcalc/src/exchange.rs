//! Workbook exchange: the values and styles handed to, and received from,
//! a spreadsheet file library.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sheetcalc_core::{CellCoord, CellStyle, ResolvedStyle, Sheet, MAX_COLS};
use sheetcalc_formula::Evaluator;
use sheetcalc_history::Command;

/// One exported cell: its display value and fully resolved style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCell {
    pub value: String,
    pub style: ResolvedStyle,
}

/// Every cell from A1 to the maximum used row and column, row by row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetExport {
    pub rows: Vec<Vec<ExportCell>>,
}

impl SheetExport {
    /// Collect display values and styles; formulas are exported as their results
    pub fn from_sheet(sheet: &Sheet, evaluator: &Evaluator<'_>) -> Self {
        let Some(used) = sheet.used_range() else {
            return Self::default();
        };

        let rows = (used.start.row..=used.end.row)
            .map(|row| {
                (used.start.col..=used.end.col)
                    .map(|col| {
                        let coord = CellCoord::new(row, col);
                        ExportCell {
                            value: evaluator.display_value(coord),
                            style: sheet.style(coord).map(CellStyle::resolve).unwrap_or_default(),
                        }
                    })
                    .collect()
            })
            .collect();

        Self { rows }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Literal values and style hints read from a workbook file.
///
/// ```
/// use sheetcalc::SheetImport;
///
/// let import: SheetImport = serde_json::from_str(
///     r#"{"rows": [["a", 1, null]], "styles": {"A1": {"bold": true}}}"#,
/// ).unwrap();
/// assert_eq!(import.width(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetImport {
    /// Row-major values; `null` marks an empty cell
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    /// Style hints keyed by cell name
    #[serde(default)]
    pub styles: HashMap<String, CellStyle>,
}

impl SheetImport {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Build an import from plain strings, as read from a text grid
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|s| Value::String(s.into())).collect())
                .collect(),
            styles: HashMap::new(),
        }
    }

    pub fn with_style(mut self, name: impl Into<String>, style: CellStyle) -> Self {
        self.styles.insert(name.into(), style);
        self
    }

    /// Number of rows in the payload
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the widest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Cell content for an imported value, `None` for an empty cell
fn literal(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Replace the whole sheet with an imported payload
#[derive(Debug)]
pub(crate) struct ImportCommand {
    data: SheetImport,
    min_rows: u32,
    min_cols: u32,
}

impl ImportCommand {
    pub(crate) fn new(data: SheetImport, min_rows: u32, min_cols: u32) -> Self {
        Self {
            data,
            min_rows,
            min_cols,
        }
    }
}

impl Command for ImportCommand {
    fn execute(&mut self, sheet: &mut Sheet) -> Vec<CellCoord> {
        let width = to_u32(self.data.width());
        if width > MAX_COLS {
            tracing::warn!(
                width,
                max = MAX_COLS,
                "import wider than the grid; extra columns dropped"
            );
        }

        let rows = self.min_rows.max(to_u32(self.data.height()));
        let cols = self.min_cols.max(width).min(MAX_COLS);
        sheet.clear();
        sheet.resize(rows, cols);

        let mut affected = Vec::new();
        for (row, values) in self.data.rows.iter().enumerate() {
            for (col, value) in values.iter().enumerate().take(MAX_COLS as usize) {
                if let Some(content) = literal(value) {
                    let coord = CellCoord::new(to_u32(row), to_u32(col));
                    sheet.set_content(coord, content);
                    affected.push(coord);
                }
            }
        }

        for (name, style) in &self.data.styles {
            match CellCoord::from_name(name).filter(|c| sheet.contains(*c)) {
                Some(coord) => sheet.set_style(coord, style.clone()),
                None => tracing::debug!(cell = %name, "ignoring style for cell outside the grid"),
            }
        }

        affected
    }

    fn description(&self) -> &str {
        "Import sheet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coord(name: &str) -> CellCoord {
        CellCoord::from_name(name).unwrap()
    }

    #[test]
    fn test_export_uses_display_values() {
        let mut sheet = Sheet::new(50, 26);
        sheet.set_content(coord("A1"), "2");
        sheet.set_content(coord("B2"), "=A1*3");
        sheet.set_style(coord("A1"), CellStyle::new().with_bold(true));

        let export = SheetExport::from_sheet(&sheet, &Evaluator::new(&sheet));

        assert_eq!(export.rows.len(), 2);
        assert_eq!(export.rows[0].len(), 2);
        assert_eq!(export.rows[0][0].value, "2");
        assert!(export.rows[0][0].style.bold);
        assert_eq!(export.rows[0][1].value, "");
        assert_eq!(export.rows[0][1].style, ResolvedStyle::default());
        assert_eq!(export.rows[1][1].value, "6");
    }

    #[test]
    fn test_export_reaches_styled_empty_cells() {
        let mut sheet = Sheet::new(50, 26);
        sheet.set_content(coord("A1"), "x");
        sheet.set_style(coord("C4"), CellStyle::new().with_italic(true));

        let export = SheetExport::from_sheet(&sheet, &Evaluator::new(&sheet));

        assert_eq!(export.rows.len(), 4);
        assert_eq!(export.rows[3].len(), 3);
        assert_eq!(export.rows[3][2].value, "");
        assert!(export.rows[3][2].style.italic);
    }

    #[test]
    fn test_export_empty_sheet() {
        let sheet = Sheet::new(5, 5);
        let export = SheetExport::from_sheet(&sheet, &Evaluator::new(&sheet));
        assert!(export.rows.is_empty());
        assert_eq!(export.to_json().unwrap(), r#"{"rows":[]}"#);
    }

    #[test]
    fn test_literal_conversion() {
        assert_eq!(literal(&json!(null)), None);
        assert_eq!(literal(&json!("")), None);
        assert_eq!(literal(&json!("x")), Some("x".to_string()));
        assert_eq!(literal(&json!(42)), Some("42".to_string()));
        assert_eq!(literal(&json!(1.5)), Some("1.5".to_string()));
        assert_eq!(literal(&json!(true)), Some("true".to_string()));
    }

    #[test]
    fn test_import_grows_but_never_shrinks() {
        let mut sheet = Sheet::new(50, 26);
        sheet.set_content(coord("Z50"), "old");

        let data = SheetImport::from_strings(vec![vec!["a", "b"], vec!["", "=A1"]]);
        ImportCommand::new(data, 10, 5).execute(&mut sheet);

        assert_eq!((sheet.num_rows(), sheet.num_cols()), (10, 5));
        assert_eq!(sheet.content(coord("A1")), "a");
        assert_eq!(sheet.content(coord("B2")), "=A1");
        assert_eq!(sheet.content(coord("A2")), "");
        assert_eq!(sheet.cell_count(), 3);

        let tall: Vec<Vec<&str>> = (0..12).map(|_| vec!["x"]).collect();
        ImportCommand::new(SheetImport::from_strings(tall), 10, 5).execute(&mut sheet);
        assert_eq!(sheet.num_rows(), 12);
    }

    #[test]
    fn test_import_drops_columns_past_z() {
        let mut sheet = Sheet::new(5, 5);
        let wide: Vec<String> = (0..30).map(|i| i.to_string()).collect();

        ImportCommand::new(SheetImport::from_strings(vec![wide]), 5, 5).execute(&mut sheet);

        assert_eq!(sheet.num_cols(), MAX_COLS);
        assert_eq!(sheet.content(coord("Z1")), "25");
        assert_eq!(sheet.cell_count(), 26);
    }

    #[test]
    fn test_import_styles() {
        let mut sheet = Sheet::new(5, 5);
        let data = SheetImport::from_strings(vec![vec!["a"]])
            .with_style("A1", CellStyle::new().with_italic(true))
            .with_style("not a cell", CellStyle::new().with_bold(true))
            .with_style("A99", CellStyle::new().with_bold(true));

        ImportCommand::new(data, 5, 5).execute(&mut sheet);

        assert!(sheet.style(coord("A1")).unwrap().italic);
        assert_eq!(sheet.styles().count(), 1);
    }
}
