//! Built-in function libraries.
//!
//! Aggregate functions take the numbers scanned from a range; text functions
//! take positional arguments already resolved to values.

pub mod aggregate;
pub mod text;

use sheetcalc_core::CellValue;

use crate::error::Result;

pub type AggregateFn = fn(&[f64]) -> f64;
pub type TextFn = fn(&[CellValue]) -> Result<CellValue>;

/// Look up an aggregate (range) function by upper-case name
pub fn aggregate(name: &str) -> Option<AggregateFn> {
    match name {
        "SUM" => Some(aggregate::sum),
        "AVERAGE" => Some(aggregate::average),
        "MAX" => Some(aggregate::max),
        "MIN" => Some(aggregate::min),
        "COUNT" => Some(aggregate::count),
        _ => None,
    }
}

/// Look up a text function by upper-case name
pub fn text(name: &str) -> Option<TextFn> {
    match name {
        "TRIM" => Some(text::trim),
        "UPPER" => Some(text::upper),
        "LOWER" => Some(text::lower),
        "REMOVE_DUPLICATES" => Some(text::remove_duplicates),
        "FIND_AND_REPLACE" => Some(text::find_and_replace),
        _ => None,
    }
}

/// Split an argument list on commas that are outside quotes and parentheses.
///
/// Each piece is trimmed. An empty list yields a single empty argument.
pub fn split_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in args.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(args[start..].trim());

    parts
}

/// Strip one leading and one trailing quote character, if present
pub fn unquote(arg: &str) -> &str {
    const QUOTES: &[char] = &['"', '\''];
    let arg = arg.strip_prefix(QUOTES).unwrap_or(arg);
    arg.strip_suffix(QUOTES).unwrap_or(arg)
}
