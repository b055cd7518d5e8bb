/// The delimited text format of the backing file.
pub mod delimited;
mod store;

pub use delimited::{LoadError, MalformedRecord, SaveError};
pub use store::{Opened, RecordStore, StoreError};
