use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::error::CellError;

/// Longest numeric prefix, after leading whitespace
fn number_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
            .expect("number prefix regex must compile")
    })
}

/// The result of evaluating a cell's content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Number(f64),
    Text(String),
    /// Values gathered from a range argument
    List(Vec<CellValue>),
    Error(CellError),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Text(String::new())
    }
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Try to get the value as a number.
    ///
    /// Text yields the number at its start, so `"12abc"` is 12 and `"abc"` is
    /// not a number. `inf`/`NaN` spellings and overflowing literals are not numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Render for display.
    ///
    /// Whole numbers print without a fraction, other numbers with exactly two
    /// decimals. Lists join their elements with `,`.
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::List(items) => items
                .iter()
                .map(CellValue::display)
                .collect::<Vec<_>>()
                .join(","),
            CellValue::Error(e) => e.to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Parse the leading number of display text, ignoring whatever follows it
pub fn parse_number(text: &str) -> Option<f64> {
    let prefix = number_prefix_re().find(text.trim_start())?;
    prefix
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return CellError::Error.to_string();
    }
    if n.fract() == 0.0 {
        // Avoid printing "-0"
        let n = if n == 0.0 { 0.0 } else { n };
        format!("{}", n)
    } else {
        format!("{:.2}", round_half_away(n))
    }
}

/// Resolve exact two-decimal ties away from zero, so 0.125 shows as "0.13".
///
/// Only odd multiples of 1/8 sit exactly on such a tie.
fn round_half_away(n: f64) -> f64 {
    let eighths = n * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        (n * 100.0).round() / 100.0
    } else {
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        assert_eq!(CellValue::Number(8.0).display(), "8");
        assert_eq!(CellValue::Number(-3.0).display(), "-3");
        assert_eq!(CellValue::Number(-0.0).display(), "0");
        assert_eq!(CellValue::Number(2.5).display(), "2.50");
        assert_eq!(CellValue::Number(1.0 / 3.0).display(), "0.33");
        assert_eq!(CellValue::Number(f64::INFINITY).display(), "#ERROR!");
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(CellValue::Number(0.125).display(), "0.13");
        assert_eq!(CellValue::Number(0.625).display(), "0.63");
        assert_eq!(CellValue::Number(-0.125).display(), "-0.13");
        assert_eq!(CellValue::Number(2.375).display(), "2.38");
        // Not an exact tie in binary
        assert_eq!(CellValue::Number(2.675).display(), "2.67");
        assert_eq!(CellValue::Number(0.25).display(), "0.25");
    }

    #[test]
    fn test_list_display() {
        let list = CellValue::List(vec![CellValue::text("a"), CellValue::Number(2.0)]);
        assert_eq!(list.display(), "a,2");
    }

    #[test]
    fn test_as_number() {
        assert_eq!(CellValue::text("42").as_number(), Some(42.0));
        assert_eq!(CellValue::text(" 1.5 ").as_number(), Some(1.5));
        assert_eq!(CellValue::text("1e3").as_number(), Some(1000.0));
        assert_eq!(CellValue::text("12abc").as_number(), Some(12.0));
        assert_eq!(CellValue::text("5 apples").as_number(), Some(5.0));
        assert_eq!(CellValue::text("-.5kg").as_number(), Some(-0.5));
        assert_eq!(CellValue::text("3.e2x").as_number(), Some(300.0));
        assert_eq!(CellValue::text("7e").as_number(), Some(7.0));
        assert_eq!(CellValue::text("abc12").as_number(), None);
        assert_eq!(CellValue::text("1e999").as_number(), None);
        assert_eq!(CellValue::text("inf").as_number(), None);
        assert_eq!(CellValue::text("").as_number(), None);
        assert_eq!(CellValue::Error(CellError::Error).as_number(), None);
    }
}
