pub mod command;
pub mod stack;
pub mod structure;
pub mod transfer;

pub use command::{ApplyStyleCommand, Command, CommandBox, SetCellContentCommand, SetCellStyleCommand};
pub use stack::HistoryManager;
pub use structure::StructuralCommand;
pub use transfer::{FillCommand, FillPolicy, MoveCellCommand};
