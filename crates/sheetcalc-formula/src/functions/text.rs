use regex::Regex;
use sheetcalc_core::CellValue;

use crate::error::{EvalError, Result};

/// The first argument, or the first element when it is a range
fn first_value<'a>(name: &'static str, args: &'a [CellValue]) -> Result<&'a CellValue> {
    match args.first() {
        Some(CellValue::List(items)) => items.first().ok_or(EvalError::MissingArgument(name)),
        Some(value) => Ok(value),
        None => Err(EvalError::MissingArgument(name)),
    }
}

/// TRIM - Remove leading/trailing whitespace
pub fn trim(args: &[CellValue]) -> Result<CellValue> {
    let value = first_value("TRIM", args)?;
    Ok(CellValue::text(value.display().trim()))
}

/// UPPER - Convert to uppercase
pub fn upper(args: &[CellValue]) -> Result<CellValue> {
    let value = first_value("UPPER", args)?;
    Ok(CellValue::text(value.display().to_uppercase()))
}

/// LOWER - Convert to lowercase
pub fn lower(args: &[CellValue]) -> Result<CellValue> {
    let value = first_value("LOWER", args)?;
    Ok(CellValue::text(value.display().to_lowercase()))
}

/// Comparison key for de-duplication; nested rows compare element by element
fn row_key(value: &CellValue) -> String {
    match value {
        CellValue::List(items) => items
            .iter()
            .map(CellValue::display)
            .collect::<Vec<_>>()
            .join("|"),
        other => other.display(),
    }
}

/// REMOVE_DUPLICATES - Keep the first occurrence of each value in a range
pub fn remove_duplicates(args: &[CellValue]) -> Result<CellValue> {
    match args.first() {
        Some(CellValue::List(items)) => {
            let mut seen = std::collections::HashSet::new();
            let unique = items
                .iter()
                .filter(|item| seen.insert(row_key(item)))
                .cloned()
                .collect();
            Ok(CellValue::List(unique))
        }
        Some(other) => Ok(other.clone()),
        None => Err(EvalError::MissingArgument("REMOVE_DUPLICATES")),
    }
}

/// FIND_AND_REPLACE - Replace every match of the `find` pattern.
///
/// `replace` defaults to the empty string. A range is replaced element-wise.
pub fn find_and_replace(args: &[CellValue]) -> Result<CellValue> {
    let text = args
        .first()
        .ok_or(EvalError::MissingArgument("FIND_AND_REPLACE"))?;
    let find = args.get(1).map(CellValue::display).unwrap_or_default();
    let replace = args.get(2).map(CellValue::display).unwrap_or_default();

    if find.is_empty() || text.display().is_empty() {
        return Ok(text.clone());
    }

    let pattern = Regex::new(&find)?;
    let apply = |value: &CellValue| {
        CellValue::text(pattern.replace_all(&value.display(), replace.as_str()))
    };

    Ok(match text {
        CellValue::List(items) => CellValue::List(items.iter().map(apply).collect()),
        scalar => apply(scalar),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> CellValue {
        CellValue::List(items.iter().map(|s| CellValue::text(*s)).collect())
    }

    #[test]
    fn test_case_and_trim() {
        assert_eq!(trim(&[CellValue::text("  hi  ")]), Ok(CellValue::text("hi")));
        assert_eq!(upper(&[CellValue::text("abc")]), Ok(CellValue::text("ABC")));
        assert_eq!(lower(&[CellValue::text("AbC")]), Ok(CellValue::text("abc")));
    }

    #[test]
    fn test_range_uses_first_element_only() {
        let range = list(&["one", "two"]);
        assert_eq!(upper(&[range]), Ok(CellValue::text("ONE")));
        assert!(trim(&[list(&[])]).is_err());
        assert!(trim(&[]).is_err());
    }

    #[test]
    fn test_remove_duplicates() {
        let range = list(&["a", "b", "a", "c", "b"]);
        assert_eq!(remove_duplicates(&[range]), Ok(list(&["a", "b", "c"])));

        let scalar = CellValue::text("a");
        assert_eq!(remove_duplicates(&[scalar.clone()]), Ok(scalar));
    }

    #[test]
    fn test_remove_duplicate_rows() {
        let rows = CellValue::List(vec![list(&["1", "2"]), list(&["1", "2"]), list(&["1", "3"])]);
        assert_eq!(
            remove_duplicates(&[rows]),
            Ok(CellValue::List(vec![list(&["1", "2"]), list(&["1", "3"])]))
        );
    }

    #[test]
    fn test_find_and_replace() {
        let args = [CellValue::text("a-b-c"), CellValue::text("-"), CellValue::text("+")];
        assert_eq!(find_and_replace(&args), Ok(CellValue::text("a+b+c")));

        // Replacement defaults to empty
        let args = [CellValue::text("a-b-c"), CellValue::text("-")];
        assert_eq!(find_and_replace(&args), Ok(CellValue::text("abc")));

        // Pattern syntax is honoured
        let args = [CellValue::text("a1b22"), CellValue::text("[0-9]+"), CellValue::text("#")];
        assert_eq!(find_and_replace(&args), Ok(CellValue::text("a#b#")));
    }

    #[test]
    fn test_find_and_replace_edge_cases() {
        let args = [CellValue::text("abc"), CellValue::text("")];
        assert_eq!(find_and_replace(&args), Ok(CellValue::text("abc")));

        let args = [CellValue::text("abc"), CellValue::text("(")];
        assert!(matches!(find_and_replace(&args), Err(EvalError::Pattern(_))));

        let args = [list(&["xa", "ax"]), CellValue::text("x"), CellValue::text("y")];
        assert_eq!(find_and_replace(&args), Ok(list(&["ya", "ay"])));
    }
}
