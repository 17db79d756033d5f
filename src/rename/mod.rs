mod name_builder;
mod session;
mod types;

pub use name_builder::{format_name, sanitize_filename, FormatError};
pub use session::{
    execute_renames, fetch_catalog_cached, plan_renames, select_series, RenameError,
    RenameOptions,
};
pub use types::{RenameOperation, RenameResult, ResolvedRename, SkipReason, SkippedFile};
