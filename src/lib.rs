//! Plain-text Exhibition Visitor Log
//!
//! Visit records are kept in memory and persisted to a comma-delimited text
//! file, which is rewritten in full after every change.

pub mod domain;
pub use domain::{Config, DailyTotal, EmptyInputError, ExhibitionRecord, RecordError};

/// Backing file format and the record store.
pub mod storage;
pub use storage::{LoadError, Opened, RecordStore, SaveError, StoreError};
