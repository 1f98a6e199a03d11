use regex::{Captures, Regex};
use std::sync::OnceLock;

use sheetcalc_core::{parse_name, CellCoord, MAX_COLS};

/// Replacement text for a reference whose target no longer exists
pub const REF_ERROR: &str = "#REF!";

fn cell_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[A-Z][0-9]+\b").expect("cell reference regex must compile"))
}

/// Rewrite every cell reference in a formula in a single pass.
///
/// `replace` is called once per reference found outside quoted text and
/// returns the new text for it, or `None` to keep it. Content that does not
/// start with `=` is returned unchanged.
///
/// # Examples
///
/// ```
/// use sheetcalc_formula::rewrite_references;
///
/// let result = rewrite_references("=A1+B2&\"A1\"", |c| {
///     (c.col == 0).then(|| "C9".to_string())
/// });
/// assert_eq!(result, "=C9+B2&\"A1\"");
/// ```
pub fn rewrite_references<F>(formula: &str, mut replace: F) -> String
where
    F: FnMut(CellCoord) -> Option<String>,
{
    if !formula.starts_with('=') {
        return formula.to_string();
    }

    let mut out = String::with_capacity(formula.len());
    let mut quote: Option<char> = None;
    let mut segment_start = 0;

    for (i, c) in formula.char_indices() {
        match quote {
            Some(q) if c == q => {
                // Quoted text is copied verbatim, closing quote included
                let end = i + c.len_utf8();
                out.push_str(&formula[segment_start..end]);
                segment_start = end;
                quote = None;
            }
            Some(_) => {}
            None if c == '"' || c == '\'' => {
                rewrite_segment(&formula[segment_start..i], &mut replace, &mut out);
                segment_start = i;
                quote = Some(c);
            }
            None => {}
        }
    }

    let tail = &formula[segment_start..];
    if quote.is_some() {
        out.push_str(tail);
    } else {
        rewrite_segment(tail, &mut replace, &mut out);
    }

    out
}

fn rewrite_segment<F>(segment: &str, replace: &mut F, out: &mut String)
where
    F: FnMut(CellCoord) -> Option<String>,
{
    let rewritten = cell_ref_re().replace_all(segment, |caps: &Captures| {
        let name = &caps[0];
        parse_name(name)
            .and_then(|coord| replace(coord))
            .unwrap_or_else(|| name.to_string())
    });
    out.push_str(&rewritten);
}

/// Exchange references to two cells, as done when a cell is dragged onto another.
///
/// ```
/// use sheetcalc_core::CellCoord;
/// use sheetcalc_formula::swap_references;
///
/// let a = CellCoord::new(0, 0); // A1
/// let b = CellCoord::new(0, 1); // B1
/// assert_eq!(swap_references("=A1*2+B1", a, b), "=B1*2+A1");
/// ```
pub fn swap_references(formula: &str, a: CellCoord, b: CellCoord) -> String {
    let a_name = a.to_name();
    let b_name = b.to_name();
    rewrite_references(formula, |coord| {
        if coord == a {
            b_name.clone()
        } else if coord == b {
            a_name.clone()
        } else {
            None
        }
    })
}

/// Shift every reference by a (row, col) delta.
///
/// A reference that would land outside `[0, rows) x [0, cols)` is left as it was.
///
/// ```
/// use sheetcalc_formula::offset_references;
///
/// assert_eq!(offset_references("=B1+1", 0, 1, 50, 26), "=C1+1");
/// // Z1 has nowhere to go, so it stays
/// assert_eq!(offset_references("=A1+Z1", 0, 1, 50, 26), "=B1+Z1");
/// ```
pub fn offset_references(formula: &str, d_row: i64, d_col: i64, rows: u32, cols: u32) -> String {
    rewrite_references(formula, |coord| {
        coord.offset(d_row, d_col, rows, cols)?.to_name()
    })
}

/// A row or column insertion/deletion at a 0-based index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralShift {
    /// A new row after `index`; rows below it move down
    InsertRow(u32),
    /// Row `index` is removed; rows below it move up
    DeleteRow(u32),
    /// A new column after `index`; columns right of it move right
    InsertCol(u32),
    /// Column `index` is removed; columns right of it move left
    DeleteCol(u32),
}

impl StructuralShift {
    /// Where a cell ends up, or `None` when it is deleted
    pub fn map_coord(&self, coord: CellCoord) -> Option<CellCoord> {
        let CellCoord { row, col } = coord;
        match *self {
            StructuralShift::InsertRow(at) if row > at => Some(CellCoord::new(row + 1, col)),
            StructuralShift::DeleteRow(at) if row == at => None,
            StructuralShift::DeleteRow(at) if row > at => Some(CellCoord::new(row - 1, col)),
            StructuralShift::InsertCol(at) if col > at => Some(CellCoord::new(row, col + 1)),
            StructuralShift::DeleteCol(at) if col == at => None,
            StructuralShift::DeleteCol(at) if col > at => Some(CellCoord::new(row, col - 1)),
            _ => Some(coord),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StructuralShift::InsertRow(_) => "Insert row",
            StructuralShift::DeleteRow(_) => "Delete row",
            StructuralShift::InsertCol(_) => "Insert column",
            StructuralShift::DeleteCol(_) => "Delete column",
        }
    }
}

/// Rewrite references for a structural edit.
///
/// References into a deleted row or column, or pushed past column `Z`,
/// become `#REF!`.
///
/// Insert rows:
/// ```
/// use sheetcalc_formula::{shift_references, StructuralShift};
///
/// let result = shift_references("=A1+B3", StructuralShift::InsertRow(1));
/// assert_eq!(result, "=A1+B4");
/// ```
///
/// Delete columns:
/// ```
/// use sheetcalc_formula::{shift_references, StructuralShift};
///
/// let result = shift_references("=A1+B1+C1", StructuralShift::DeleteCol(1));
/// assert_eq!(result, "=A1+#REF!+B1");
/// ```
pub fn shift_references(formula: &str, shift: StructuralShift) -> String {
    rewrite_references(formula, |coord| {
        let moved = shift.map_coord(coord);
        if moved == Some(coord) {
            return None;
        }
        Some(
            moved
                .filter(|c| c.col < MAX_COLS)
                .and_then(|c| c.to_name())
                .unwrap_or_else(|| REF_ERROR.to_string()),
        )
    })
}
