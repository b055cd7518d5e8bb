//! Domain models for the exhibition log.
//!
//! This module contains the record type, the aggregate queries over
//! sequences of records, and configuration.

/// Exhibition visit records and field parsing.
pub mod record;
pub use record::{ExhibitionRecord, RecordError};

mod config;
pub use config::Config;

/// Aggregate queries over records.
pub mod query;
pub use query::{DailyTotal, EmptyInputError};
