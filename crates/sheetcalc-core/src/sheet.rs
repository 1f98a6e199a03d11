use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::format::CellStyle;
use crate::range::{CellCoord, CellRange};

/// A single sheet: raw content plus a parallel style map, both sparse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    num_rows: u32,
    num_cols: u32,
    /// Raw content by cell; empty cells are not stored
    #[serde(default, with = "name_keyed")]
    cells: HashMap<CellCoord, String>,
    #[serde(default, with = "name_keyed")]
    styles: HashMap<CellCoord, CellStyle>,
}

/// Immutable copy of a sheet's state, used by undo/redo
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    num_rows: u32,
    num_cols: u32,
    cells: HashMap<CellCoord, String>,
    styles: HashMap<CellCoord, CellStyle>,
}

impl Snapshot {
    pub fn num_rows(&self) -> u32 {
        self.num_rows
    }

    pub fn num_cols(&self) -> u32 {
        self.num_cols
    }

    pub fn content(&self, coord: CellCoord) -> Option<&str> {
        self.cells.get(&coord).map(String::as_str)
    }
}

/// Serialize coordinate maps keyed by cell name ("A1") for JSON compatibility
mod name_keyed {
    use super::*;
    use serde::ser::SerializeMap;
    use serde::{de, Deserializer, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, V>(map: &HashMap<CellCoord, V>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_by_key(|(coord, _)| **coord);

        let mut out = serializer.serialize_map(Some(entries.len()))?;
        for (coord, value) in entries {
            out.serialize_entry(&coord.to_string(), value)?;
        }
        out.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<HashMap<CellCoord, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct NameVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> de::Visitor<'de> for NameVisitor<V> {
            type Value = HashMap<CellCoord, V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map with cell name keys")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: de::MapAccess<'de>,
            {
                let mut map = HashMap::new();

                while let Some(key) = access.next_key::<String>()? {
                    let value: V = access.next_value()?;
                    // Unparsable names are dropped
                    if let Some(coord) = CellCoord::from_name(&key) {
                        map.insert(coord, value);
                    }
                }

                Ok(map)
            }
        }

        deserializer.deserialize_map(NameVisitor(PhantomData))
    }
}

impl Sheet {
    /// Create an empty sheet of the given size (at least 1x1)
    pub fn new(num_rows: u32, num_cols: u32) -> Self {
        Self {
            num_rows: num_rows.max(1),
            num_cols: num_cols.max(1),
            cells: HashMap::new(),
            styles: HashMap::new(),
        }
    }

    pub fn num_rows(&self) -> u32 {
        self.num_rows
    }

    pub fn num_cols(&self) -> u32 {
        self.num_cols
    }

    /// Change the grid size, never below 1x1. Stored cells are untouched.
    pub fn resize(&mut self, num_rows: u32, num_cols: u32) {
        self.num_rows = num_rows.max(1);
        self.num_cols = num_cols.max(1);
    }

    /// Check whether `coord` lies inside the grid
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.is_valid(self.num_rows, self.num_cols)
    }

    /// Raw content of a cell ("" for an empty cell)
    pub fn content(&self, coord: CellCoord) -> &str {
        self.cells.get(&coord).map(String::as_str).unwrap_or("")
    }

    /// Set a cell's raw content; an empty string clears it
    pub fn set_content(&mut self, coord: CellCoord, content: impl Into<String>) {
        let content = content.into();
        if content.is_empty() {
            self.cells.remove(&coord);
        } else {
            self.cells.insert(coord, content);
        }
    }

    pub fn style(&self, coord: CellCoord) -> Option<&CellStyle> {
        self.styles.get(&coord)
    }

    /// Set a cell's style; the default style is stored as no style
    pub fn set_style(&mut self, coord: CellCoord, style: CellStyle) {
        if style == CellStyle::default() {
            self.styles.remove(&coord);
        } else {
            self.styles.insert(coord, style);
        }
    }

    /// Exchange content and style of two cells
    pub fn swap(&mut self, a: CellCoord, b: CellCoord) {
        if a == b {
            return;
        }
        let a_content = self.cells.remove(&a);
        let b_content = self.cells.remove(&b);
        if let Some(content) = a_content {
            self.cells.insert(b, content);
        }
        if let Some(content) = b_content {
            self.cells.insert(a, content);
        }

        let a_style = self.styles.remove(&a);
        let b_style = self.styles.remove(&b);
        if let Some(style) = a_style {
            self.styles.insert(b, style);
        }
        if let Some(style) = b_style {
            self.styles.insert(a, style);
        }
    }

    /// Move every stored cell to `target(coord)`; cells mapped to `None` are dropped.
    ///
    /// Content and style of a cell always travel together.
    pub fn relocate(&mut self, target: impl Fn(CellCoord) -> Option<CellCoord>) {
        self.cells = std::mem::take(&mut self.cells)
            .into_iter()
            .filter_map(|(coord, content)| target(coord).map(|to| (to, content)))
            .collect();
        self.styles = std::mem::take(&mut self.styles)
            .into_iter()
            .filter_map(|(coord, style)| target(coord).map(|to| (to, style)))
            .collect();
    }

    /// Replace the content of every formula cell with `rewrite(content)` when it returns `Some`
    pub fn rewrite_formulas(&mut self, mut rewrite: impl FnMut(&str) -> Option<String>) -> usize {
        let mut changed = 0;
        for content in self.cells.values_mut() {
            if !content.starts_with('=') {
                continue;
            }
            if let Some(updated) = rewrite(content) {
                if updated != *content {
                    *content = updated;
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Remove all content and styles, keeping the grid size
    pub fn clear(&mut self) {
        self.cells.clear();
        self.styles.clear();
    }

    /// Iterate over non-empty cells
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, &str)> + '_ {
        self.cells.iter().map(|(coord, content)| (*coord, content.as_str()))
    }

    /// Iterate over styled cells
    pub fn styles(&self) -> impl Iterator<Item = (CellCoord, &CellStyle)> + '_ {
        self.styles.iter().map(|(coord, style)| (*coord, style))
    }

    /// Get the number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the sheet has no content
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bounding box from A1 to the maximum used row and column.
    ///
    /// A cell counts as used when it has content or a style.
    pub fn used_range(&self) -> Option<CellRange> {
        let used = || self.cells.keys().chain(self.styles.keys());
        let max_row = used().map(|c| c.row).max()?;
        let max_col = used().map(|c| c.col).max()?;
        Some(CellRange::new(
            CellCoord::new(0, 0),
            CellCoord::new(max_row, max_col),
        ))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            num_rows: self.num_rows,
            num_cols: self.num_cols,
            cells: self.cells.clone(),
            styles: self.styles.clone(),
        }
    }

    /// Replace the current state with `snapshot`, returning the state it replaced
    pub fn restore(&mut self, snapshot: Snapshot) -> Snapshot {
        Snapshot {
            num_rows: std::mem::replace(&mut self.num_rows, snapshot.num_rows),
            num_cols: std::mem::replace(&mut self.num_cols, snapshot.num_cols),
            cells: std::mem::replace(&mut self.cells, snapshot.cells),
            styles: std::mem::replace(&mut self.styles, snapshot.styles),
        }
    }
}
