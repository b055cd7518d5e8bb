//! A file-backed store of exhibition records
//!
//! The [`RecordStore`] owns the in-memory sequence of records and rewrites
//! the backing file in full after every change. Records are addressed by
//! their position in the sequence; deleting a record shifts every later
//! record down by one.

use std::path::{Path, PathBuf};

use crate::{
    domain::{DailyTotal, EmptyInputError, ExhibitionRecord, query},
    storage::delimited::{self, LoadError, SaveError},
};

/// What was found when opening a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opened {
    /// The backing file existed and this many records were read from it.
    Existing {
        /// The number of records loaded.
        records: usize,
    },
    /// There was no backing file. The store starts empty.
    Missing,
}

/// An ordered collection of records persisted to a delimited text file.
///
/// Mutations take `&mut self`, so a store has at most one writer at a time.
/// To share one across threads, wrap it in a single `Mutex` held for the
/// whole mutate-and-save.
#[derive(Debug)]
pub struct RecordStore {
    /// The backing file.
    path: PathBuf,
    records: Vec<ExhibitionRecord>,
}

impl RecordStore {
    /// Open the store backed by the file at `path`.
    ///
    /// A missing file is not an error: the store starts empty and
    /// [`Opened::Missing`] is returned. Nothing is written until the first
    /// mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or if any of
    /// its lines is malformed. No records are loaded in that case.
    pub fn open(path: impl Into<PathBuf>) -> Result<(Self, Opened), LoadError> {
        let path = path.into();

        let Some(records) = delimited::load(&path)? else {
            tracing::warn!("No database found at {}", path.display());
            let records = Vec::new();
            return Ok((Self { path, records }, Opened::Missing));
        };

        let opened = Opened::Existing {
            records: records.len(),
        };
        Ok((Self { path, records }, opened))
    }

    /// The path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, in order.
    #[must_use]
    pub fn records(&self) -> &[ExhibitionRecord] {
        &self.records
    }

    /// The record at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ExhibitionRecord> {
        self.records.get(index)
    }

    /// The number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write every record to the backing file, replacing its content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written. The records in memory
    /// are unaffected.
    pub fn save(&self) -> Result<(), SaveError> {
        delimited::save(&self.path, &self.records)
    }

    /// Append a record and persist the store.
    ///
    /// Returns the index of the new record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be persisted. The record is not
    /// added in that case.
    pub fn add(&mut self, record: ExhibitionRecord) -> Result<usize, SaveError> {
        let index = self.records.len();
        self.records.push(record);

        if let Err(e) = self.save() {
            self.records.pop();
            return Err(e);
        }

        tracing::info!("Added record {index}");
        Ok(index)
    }

    /// Replace the record at `index` and persist the store.
    ///
    /// Returns the record that was replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range, or if the store cannot be
    /// persisted. The store is unchanged in either case.
    pub fn edit(
        &mut self,
        index: usize,
        record: ExhibitionRecord,
    ) -> Result<ExhibitionRecord, StoreError> {
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        let previous = std::mem::replace(slot, record);

        if let Err(e) = self.save() {
            self.records[index] = previous;
            return Err(e.into());
        }

        tracing::info!("Edited record {index}");
        Ok(previous)
    }

    /// Remove the record at `index` and persist the store.
    ///
    /// Every record after `index` moves down one position. Returns the
    /// removed record.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range, or if the store cannot be
    /// persisted. The store is unchanged in either case.
    pub fn delete(&mut self, index: usize) -> Result<ExhibitionRecord, StoreError> {
        let len = self.records.len();
        if index >= len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        let removed = self.records.remove(index);

        if let Err(e) = self.save() {
            self.records.insert(index, removed);
            return Err(e.into());
        }

        tracing::info!("Deleted record {index}");
        Ok(removed)
    }

    /// The sum of the visitor counts of all records.
    #[must_use]
    pub fn total_visitors(&self) -> u64 {
        query::total_visitors(&self.records)
    }

    /// The calendar day with the fewest visitors in total.
    ///
    /// See [`query::least_visited_day`] for how ties are broken.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is empty.
    pub fn least_visited_day(&self) -> Result<DailyTotal, EmptyInputError> {
        query::least_visited_day(&self.records)
    }

    /// The comments containing `keyword`, in record order.
    #[must_use]
    pub fn comments_containing(&self, keyword: &str) -> Vec<&str> {
        query::comments_containing(&self.records, keyword)
    }
}

/// Errors raised by index-addressed store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record exists at the given index.
    #[error("no record at index {index} (store holds {len} records)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of records in the store.
        len: usize,
    },

    /// The store could not be persisted.
    #[error(transparent)]
    Save(#[from] SaveError),
}
