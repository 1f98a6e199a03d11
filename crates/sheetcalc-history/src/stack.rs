use crate::command::CommandBox;
use sheetcalc_core::{CellCoord, Sheet, Snapshot};

/// Default number of undo levels kept
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A sheet state together with the label of the edit that left it
#[derive(Debug)]
struct HistoryEntry {
    snapshot: Snapshot,
    description: String,
}

/// Manages undo/redo history for sheet operations.
///
/// Each executed command records the sheet as it was before the edit. Undo
/// and redo swap whole snapshots with the live sheet, so history is linear:
/// a new edit after an undo discards the redo stack.
pub struct HistoryManager {
    /// States that can be returned to with undo
    undo_stack: Vec<HistoryEntry>,
    /// States that can be returned to with redo
    redo_stack: Vec<HistoryEntry>,
    /// Maximum number of undo levels
    max_size: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl HistoryManager {
    /// Create a new history manager with the specified max undo levels
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Execute a command and record the prior state.
    ///
    /// Returns `None`, leaving sheet and history untouched, when the command
    /// does not apply to the current sheet.
    pub fn execute(&mut self, mut command: CommandBox, sheet: &mut Sheet) -> Option<Vec<CellCoord>> {
        if !command.is_applicable(sheet) {
            tracing::debug!(command = command.description(), "skipping inapplicable command");
            return None;
        }

        let snapshot = sheet.snapshot();
        let affected = command.execute(sheet);

        self.redo_stack.clear();
        self.undo_stack.push(HistoryEntry {
            snapshot,
            description: command.description().to_string(),
        });

        if self.undo_stack.len() > self.max_size {
            let excess = self.undo_stack.len() - self.max_size;
            self.undo_stack.drain(..excess);
        }

        tracing::debug!(
            command = command.description(),
            affected = affected.len(),
            undo_depth = self.undo_stack.len(),
            "executed command"
        );
        Some(affected)
    }

    /// Undo the last command. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, sheet: &mut Sheet) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        let current = sheet.restore(entry.snapshot);
        tracing::debug!(command = %entry.description, "undo");
        self.redo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description,
        });
        true
    }

    /// Redo the last undone command. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, sheet: &mut Sheet) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        let current = sheet.restore(entry.snapshot);
        tracing::debug!(command = %entry.description, "redo");
        self.undo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description,
        });
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the description of the command that would be undone
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|e| e.description.as_str())
    }

    /// Get the description of the command that would be redone
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|e| e.description.as_str())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl std::fmt::Debug for HistoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryManager")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_size", &self.max_size)
            .finish()
    }
}
