mod reader;
mod types;
mod writer;

pub use reader::{read_history, validate_for_revert};
pub use types::*;
pub use writer::{write_history, write_history_file, HistoryError};
