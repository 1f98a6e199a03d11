use regex::Regex;
use std::sync::OnceLock;

use crate::ast::{Expr, UnaryOp};
use crate::error::{EvalError, Result};
use crate::functions;
use crate::parser::Parser;
use sheetcalc_core::{
    parse_name, parse_range, CellCoord, CellRange, CellValue, Sheet, MAX_EVAL_DEPTH,
};

/// Expression nesting allowed across one whole chain of references
pub const NESTING_BUDGET: usize = 512;

/// `NAME(args)` spanning the whole expression
fn function_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*([A-Za-z_][A-Za-z0-9_]*)\s*\((.*)\)\s*$")
            .expect("function call regex must compile")
    })
}

fn single_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][0-9]+$").expect("cell reference regex must compile"))
}

fn range_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Z][0-9]+\s*:\s*[A-Z][0-9]+$").expect("range regex must compile")
    })
}

/// Cells currently being evaluated, and the expression nesting they hold open
#[derive(Debug, Default)]
struct Trail {
    cells: Vec<CellCoord>,
    nesting: usize,
}

impl Trail {
    /// Reserve `amount` of the nesting budget
    fn reserve(&mut self, amount: usize) -> Result<()> {
        if self.nesting + amount > NESTING_BUDGET {
            return Err(EvalError::DepthExceeded(NESTING_BUDGET));
        }
        self.nesting += amount;
        Ok(())
    }
}

/// Evaluates cell contents against a sheet.
///
/// Evaluation is read-only and recomputes referenced cells on every call.
pub struct Evaluator<'a> {
    sheet: &'a Sheet,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(sheet: &'a Sheet) -> Self {
        Self {
            sheet,
            max_depth: MAX_EVAL_DEPTH,
        }
    }

    /// Limit reference hops, clamped to `1..=MAX_EVAL_DEPTH`
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.clamp(1, MAX_EVAL_DEPTH);
        self
    }

    /// Display value of a cell. Never fails; failures render as sentinels.
    pub fn display_value(&self, coord: CellCoord) -> String {
        self.evaluate_cell(coord).display()
    }

    /// Evaluate a cell's content to a value
    pub fn evaluate_cell(&self, coord: CellCoord) -> CellValue {
        let mut trail = Trail::default();
        match self.evaluate_in(coord, &mut trail) {
            Ok(value) => value,
            Err(err) => {
                tracing::trace!(cell = %coord, error = %err, "formula evaluation failed");
                CellValue::Error(err.sentinel())
            }
        }
    }

    /// Evaluate `coord` as part of the reference `trail` currently being computed.
    ///
    /// Only fatal errors are returned; any other failure becomes the cell's value.
    fn evaluate_in(&self, coord: CellCoord, trail: &mut Trail) -> Result<CellValue> {
        let content = self.sheet.content(coord);
        let Some(expression) = content.strip_prefix('=') else {
            return Ok(CellValue::text(content));
        };

        if trail.cells.contains(&coord) {
            return Err(EvalError::Circular(coord));
        }
        if trail.cells.len() >= self.max_depth {
            return Err(EvalError::DepthExceeded(self.max_depth));
        }

        trail.cells.push(coord);
        let result = self.evaluate_expression(expression, coord, trail);
        trail.cells.pop();

        match result {
            Err(err) if !err.is_fatal() => {
                tracing::trace!(cell = %coord, error = %err, "formula evaluation failed");
                Ok(CellValue::Error(err.sentinel()))
            }
            other => other,
        }
    }

    fn evaluate_expression(
        &self,
        expression: &str,
        origin: CellCoord,
        trail: &mut Trail,
    ) -> Result<CellValue> {
        let Some(caps) = function_call_re().captures(expression) else {
            return self.evaluate_arithmetic(expression, origin, trail);
        };

        let name = caps[1].to_uppercase();
        let args = caps.get(2).map_or("", |m| m.as_str());

        if let Some(function) = functions::aggregate(&name) {
            let values = self.gather_numbers(args.trim(), origin, trail)?;
            return Ok(CellValue::Number(function(&values)));
        }

        if let Some(function) = functions::text(&name) {
            let values = functions::split_args(args)
                .into_iter()
                .map(|arg| self.resolve_text_arg(arg, origin, trail))
                .collect::<Result<Vec<_>>>()?;
            return function(&values);
        }

        Err(EvalError::UnknownFunction(name))
    }

    fn evaluate_arithmetic(
        &self,
        expression: &str,
        origin: CellCoord,
        trail: &mut Trail,
    ) -> Result<CellValue> {
        let parser = Parser::new();
        // Checked before parsing so the parser never recurses past the budget
        if trail.nesting + parser.nesting(expression) > NESTING_BUDGET {
            return Err(EvalError::DepthExceeded(NESTING_BUDGET));
        }
        let ast = parser.parse(expression)?;

        let cost = ast.depth();
        trail.reserve(cost)?;
        let result = self.evaluate_ast(&ast, origin, trail);
        trail.nesting -= cost;

        let result = result?;
        if result.is_finite() {
            Ok(CellValue::Number(result))
        } else {
            Err(EvalError::NotFinite)
        }
    }

    fn evaluate_ast(&self, expr: &Expr, origin: CellCoord, trail: &mut Trail) -> Result<f64> {
        match expr {
            Expr::Number(n) => Ok(*n),
            Expr::CellRef { row, col } => {
                let coord = CellCoord::new(*row, *col);
                // A cell referring to itself contributes 0
                if coord == origin {
                    return Ok(0.0);
                }
                let value = self.referenced_value(coord, trail)?;
                Ok(value.as_number().unwrap_or(0.0))
            }
            Expr::Binary { .. } => {
                // Left operands are walked in a loop; only right operands recurse
                let mut rights = Vec::new();
                let mut node = expr;
                while let Expr::Binary { left, op, right } = node {
                    rights.push((*op, right.as_ref()));
                    node = left.as_ref();
                }
                let mut acc = self.evaluate_ast(node, origin, trail)?;
                for (op, right) in rights.into_iter().rev() {
                    let b = self.evaluate_ast(right, origin, trail)?;
                    acc = op.apply(acc, b);
                }
                Ok(acc)
            }
            Expr::Unary { op, operand } => {
                let value = self.evaluate_ast(operand, origin, trail)?;
                Ok(match op {
                    UnaryOp::Neg => -value,
                    UnaryOp::Pos => value,
                })
            }
            Expr::Grouped(inner) => self.evaluate_ast(inner, origin, trail),
        }
    }

    /// Display value of another cell, as text, for use inside a formula
    fn referenced_value(&self, coord: CellCoord, trail: &mut Trail) -> Result<CellValue> {
        if !self.sheet.contains(coord) {
            return Err(EvalError::OutOfBounds(coord));
        }
        let value = self.evaluate_in(coord, trail)?;
        Ok(CellValue::Text(value.display()))
    }

    /// Parse and bounds-check a range argument
    fn parse_range_arg(&self, range: &str) -> Result<CellRange> {
        let (start, end) = parse_range(range);
        let start = parse_name(start).ok_or_else(|| EvalError::InvalidAddress(start.to_string()))?;
        let end = parse_name(end).ok_or_else(|| EvalError::InvalidAddress(end.to_string()))?;
        for coord in [start, end] {
            if !self.sheet.contains(coord) {
                return Err(EvalError::OutOfBounds(coord));
            }
        }
        Ok(CellRange::new(start, end))
    }

    /// Display values of every cell in a range except the evaluating cell
    fn gather_values(
        &self,
        range: &str,
        origin: CellCoord,
        trail: &mut Trail,
    ) -> Result<Vec<CellValue>> {
        let range = self.parse_range_arg(range)?;
        let mut values = Vec::new();
        for coord in range.iter().filter(|c| *c != origin) {
            values.push(self.referenced_value(coord, trail)?);
        }
        Ok(values)
    }

    /// Numbers scanned from a range; non-numeric cells are skipped
    fn gather_numbers(
        &self,
        range: &str,
        origin: CellCoord,
        trail: &mut Trail,
    ) -> Result<Vec<f64>> {
        Ok(self
            .gather_values(range, origin, trail)?
            .iter()
            .filter_map(CellValue::as_number)
            .collect())
    }

    fn resolve_text_arg(
        &self,
        arg: &str,
        origin: CellCoord,
        trail: &mut Trail,
    ) -> Result<CellValue> {
        if range_ref_re().is_match(arg) {
            return Ok(CellValue::List(self.gather_values(arg, origin, trail)?));
        }
        if single_ref_re().is_match(arg) {
            let coord = parse_name(arg).ok_or_else(|| EvalError::InvalidAddress(arg.to_string()))?;
            if coord == origin {
                return Ok(CellValue::text(""));
            }
            return self.referenced_value(coord, trail);
        }
        Ok(CellValue::text(functions::unquote(arg)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with(cells: &[(&str, &str)]) -> Sheet {
        let mut sheet = Sheet::new(50, 26);
        for (name, content) in cells {
            sheet.set_content(CellCoord::from_name(name).unwrap(), *content);
        }
        sheet
    }

    fn display(sheet: &Sheet, name: &str) -> String {
        Evaluator::new(sheet).display_value(CellCoord::from_name(name).unwrap())
    }

    #[test]
    fn test_literal_pass_through() {
        let sheet = sheet_with(&[("A1", "hello"), ("A2", "3.14159"), ("A3", " 7 ")]);
        assert_eq!(display(&sheet, "A1"), "hello");
        assert_eq!(display(&sheet, "A2"), "3.14159");
        assert_eq!(display(&sheet, "A3"), " 7 ");
        assert_eq!(display(&sheet, "B9"), "");
    }

    #[test]
    fn test_arithmetic_with_references() {
        let sheet = sheet_with(&[("A1", "5"), ("B1", "=A1+3"), ("C1", "=B1*2-1")]);
        assert_eq!(display(&sheet, "B1"), "8");
        assert_eq!(display(&sheet, "C1"), "15");
    }

    #[test]
    fn test_number_formatting() {
        let sheet = sheet_with(&[("A1", "=1/3"), ("A2", "=10/4"), ("A3", "=2*3")]);
        assert_eq!(display(&sheet, "A1"), "0.33");
        assert_eq!(display(&sheet, "A2"), "2.50");
        assert_eq!(display(&sheet, "A3"), "6");
    }

    #[test]
    fn test_referenced_values_use_display_text() {
        // B1 displays "0.33", so C1 sees 0.33 rather than 1/3
        let sheet = sheet_with(&[("B1", "=1/3"), ("C1", "=B1*3")]);
        assert_eq!(display(&sheet, "C1"), "0.99");
    }

    #[test]
    fn test_non_numeric_reference_is_zero() {
        let sheet = sheet_with(&[("A1", "abc"), ("B1", "=A1+1"), ("C1", "=Z40+2")]);
        assert_eq!(display(&sheet, "B1"), "1");
        assert_eq!(display(&sheet, "C1"), "2");
    }

    #[test]
    fn test_self_reference_is_zero() {
        let sheet = sheet_with(&[("A1", "=A1+1")]);
        assert_eq!(display(&sheet, "A1"), "1");
    }

    #[test]
    fn test_multi_hop_cycle_is_error() {
        let sheet = sheet_with(&[("A1", "=B1+1"), ("B1", "=A1+1"), ("C1", "=A1")]);
        assert_eq!(display(&sheet, "A1"), "#ERROR!");
        assert_eq!(display(&sheet, "B1"), "#ERROR!");
        assert_eq!(display(&sheet, "C1"), "#ERROR!");
    }

    #[test]
    fn test_depth_limit() {
        let mut sheet = Sheet::new(50, 26);
        sheet.set_content(CellCoord::new(0, 0), "1");
        for row in 1..20 {
            sheet.set_content(CellCoord::new(row, 0), format!("=A{}+1", row));
        }
        let coord = CellCoord::new(19, 0);
        assert_eq!(Evaluator::new(&sheet).display_value(coord), "20");
        assert_eq!(
            Evaluator::new(&sheet).with_max_depth(5).display_value(coord),
            "#ERROR!"
        );
    }

    /// Cell `i` of a long chain, laid out down the columns of a 50-row grid
    fn chain_cell(i: u32) -> CellCoord {
        CellCoord::new(i % 50, i / 50)
    }

    #[test]
    fn test_nested_chain_exhausts_budget_without_overflow() {
        let mut sheet = Sheet::new(50, 26);
        sheet.set_content(chain_cell(0), "1");
        for i in 1..255 {
            let inner = chain_cell(i - 1).to_string();
            sheet.set_content(
                chain_cell(i),
                format!("={}{}{}+1", "(".repeat(40), inner, ")".repeat(40)),
            );
        }

        let evaluator = Evaluator::new(&sheet);
        assert_eq!(evaluator.display_value(chain_cell(5)), "6");
        assert_eq!(evaluator.display_value(chain_cell(254)), "#ERROR!");
    }

    #[test]
    fn test_long_plain_chain_still_evaluates() {
        let mut sheet = Sheet::new(50, 26);
        sheet.set_content(chain_cell(0), "1");
        for i in 1..255 {
            sheet.set_content(chain_cell(i), format!("=({})+1", chain_cell(i - 1).to_string()));
        }
        assert_eq!(Evaluator::new(&sheet).display_value(chain_cell(254)), "255");
    }

    #[test]
    fn test_long_flat_sum() {
        let formula = format!("={}", vec!["1"; 2_000].join("+"));
        let sheet = sheet_with(&[("A1", formula.as_str())]);
        assert_eq!(display(&sheet, "A1"), "2000");
    }

    #[test]
    fn test_max_depth_is_capped() {
        let mut sheet = Sheet::new(50, 26);
        sheet.set_content(chain_cell(0), "1");
        for i in 1..300 {
            sheet.set_content(chain_cell(i), format!("={}+1", chain_cell(i - 1).to_string()));
        }
        let evaluator = Evaluator::new(&sheet).with_max_depth(usize::MAX);
        assert_eq!(evaluator.display_value(chain_cell(255)), "256");
        assert_eq!(evaluator.display_value(chain_cell(299)), "#ERROR!");
    }

    #[test]
    fn test_malformed_expressions() {
        let sheet = sheet_with(&[
            ("A1", "=1+"),
            ("A2", "=A0+1"),
            ("A3", "=1/0"),
            ("A4", "="),
            ("A5", "=Z99+1"),
        ]);
        for name in ["A1", "A2", "A3", "A4", "A5"] {
            assert_eq!(display(&sheet, name), "#ERROR!", "{}", name);
        }
    }

    #[test]
    fn test_error_in_referenced_cell_counts_as_zero() {
        let sheet = sheet_with(&[("A1", "=1+"), ("B1", "=A1+4")]);
        assert_eq!(display(&sheet, "B1"), "4");
    }

    #[test]
    fn test_aggregate_functions() {
        let sheet = sheet_with(&[
            ("A2", "1"),
            ("A3", "2"),
            ("A4", "3"),
            ("A1", "=SUM(A2:A4)"),
            ("B1", "=average(A2:A4)"),
            ("C1", "=MAX(A4:A2)"),
            ("D1", "=MIN(A2:A4)"),
            ("E1", "=COUNT(A2:A4)"),
        ]);
        assert_eq!(display(&sheet, "A1"), "6");
        assert_eq!(display(&sheet, "B1"), "2");
        assert_eq!(display(&sheet, "C1"), "3");
        assert_eq!(display(&sheet, "D1"), "1");
        assert_eq!(display(&sheet, "E1"), "3");
    }

    #[test]
    fn test_aggregate_skips_text_and_self() {
        let sheet = sheet_with(&[
            ("A1", "=SUM(A1:A4)"),
            ("A2", "1"),
            ("A3", "x"),
            ("A4", "3"),
        ]);
        assert_eq!(display(&sheet, "A1"), "4");
    }

    #[test]
    fn test_aggregate_empty_range() {
        let sheet = sheet_with(&[
            ("A1", "=SUM(B1:B5)"),
            ("A2", "=AVERAGE(B1:B5)"),
            ("A3", "=MAX(B1:B5)"),
            ("A4", "=MIN(B1:B5)"),
        ]);
        for name in ["A1", "A2", "A3", "A4"] {
            assert_eq!(display(&sheet, name), "0");
        }
    }

    #[test]
    fn test_aggregate_bad_ranges() {
        let sheet = sheet_with(&[("A1", "=SUM(A2:A0)"), ("A2", "=SUM(A1:Z99)"), ("A3", "=SUM()")]);
        assert_eq!(display(&sheet, "A1"), "#ERROR!");
        assert_eq!(display(&sheet, "A2"), "#ERROR!");
        assert_eq!(display(&sheet, "A3"), "#ERROR!");
    }

    #[test]
    fn test_unknown_function() {
        let sheet = sheet_with(&[("A1", "=FOO(A2:A3)")]);
        assert_eq!(display(&sheet, "A1"), "#UNKNOWN_FUNCTION");
    }

    #[test]
    fn test_text_functions() {
        let sheet = sheet_with(&[
            ("A1", "  Mixed Case  "),
            ("B1", "=TRIM(A1)"),
            ("B2", "=UPPER(A1)"),
            ("B3", "=lower(\"ABC\")"),
            ("B4", "=UPPER(A1:A3)"),
        ]);
        assert_eq!(display(&sheet, "B1"), "Mixed Case");
        assert_eq!(display(&sheet, "B2"), "  MIXED CASE  ");
        assert_eq!(display(&sheet, "B3"), "abc");
        assert_eq!(display(&sheet, "B4"), "  MIXED CASE  ");
    }

    #[test]
    fn test_text_range_functions() {
        let sheet = sheet_with(&[
            ("A1", "x"),
            ("A2", "y"),
            ("A3", "x"),
            ("B1", "=REMOVE_DUPLICATES(A1:A3)"),
            ("B2", "=FIND_AND_REPLACE(A1:A3, \"x\", \"z\")"),
            ("B3", "=FIND_AND_REPLACE(A2, 'y', \",\")"),
        ]);
        assert_eq!(display(&sheet, "B1"), "x,y");
        assert_eq!(display(&sheet, "B2"), "z,y,z");
        assert_eq!(display(&sheet, "B3"), ",");
    }

    #[test]
    fn test_text_self_reference_is_empty() {
        let sheet = sheet_with(&[("A1", "=UPPER(A1)")]);
        assert_eq!(display(&sheet, "A1"), "");
    }

    #[test]
    fn test_text_function_evaluates_referenced_formula() {
        let sheet = sheet_with(&[("A1", "=2*3"), ("B1", "=LOWER(A1)")]);
        assert_eq!(display(&sheet, "B1"), "6");
    }

    #[test]
    fn test_arithmetic_around_function_is_not_a_call() {
        let sheet = sheet_with(&[("A2", "2"), ("A1", "=1+SUM(A2:A3)"), ("B1", "=2*SUM(A2:A3)")]);
        assert_eq!(display(&sheet, "A1"), "#ERROR!");
        assert_eq!(display(&sheet, "B1"), "#ERROR!");
    }
}
