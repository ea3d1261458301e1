//! Process-output parsing and event correlation for Scoopdeck.

mod correlator;
mod error;
mod favorites;
mod lines;
mod parser;
mod paths;
mod process;
mod sanitize;
mod table;

pub use correlator::{Correlator, DispatchHandle, Dispatcher};
pub use error::ScoopError;
pub use favorites::{FavoriteBucket, FavoriteStore};
pub use lines::LineSplitter;
pub use parser::{extract, ExtractMode, Record, DEFAULT_BUCKET, LOCAL_BUCKET_LABEL};
pub use paths::{default_interpreter, default_scoop_root, ScoopPaths};
pub use process::{CommandHandle, CommandOutcome, CommandRunner, ProcessEvent};
pub use sanitize::sanitize;
pub use table::AppTable;

/// Result type for Scoopdeck operations.
pub type Result<T> = std::result::Result<T, ScoopError>;
