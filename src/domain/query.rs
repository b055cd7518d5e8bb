//! Aggregate queries over a sequence of records.
//!
//! All queries are linear scans and leave the records untouched.

use std::collections::HashMap;

use chrono::NaiveDate;
use nonempty::NonEmpty;

use crate::domain::ExhibitionRecord;

/// The summed visitor count for a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTotal {
    /// The calendar day.
    pub day: NaiveDate,
    /// The sum of the visitor counts of every record on that day.
    pub visitors: u64,
}

/// The sum of the visitor counts of all records.
///
/// Returns 0 for an empty sequence.
#[must_use]
pub fn total_visitors(records: &[ExhibitionRecord]) -> u64 {
    records.iter().map(|r| u64::from(r.visitors())).sum()
}

/// Sum visitor counts per calendar day.
///
/// Days are returned in the order in which they first appear in `records`.
#[must_use]
pub fn daily_totals(records: &[ExhibitionRecord]) -> Vec<DailyTotal> {
    let mut positions: HashMap<NaiveDate, usize> = HashMap::new();
    let mut totals: Vec<DailyTotal> = Vec::new();

    for record in records {
        let day = record.visit_day();
        let visitors = u64::from(record.visitors());
        let next = totals.len();
        let i = *positions.entry(day).or_insert(next);
        if i == next {
            totals.push(DailyTotal { day, visitors });
        } else {
            totals[i].visitors += visitors;
        }
    }

    totals
}

/// Find the calendar day with the fewest visitors in total.
///
/// Records are grouped by the date portion of their visit date. When several
/// days share the smallest total, the day that first appears in `records`
/// wins.
///
/// # Errors
///
/// Returns an error if `records` is empty.
pub fn least_visited_day(records: &[ExhibitionRecord]) -> Result<DailyTotal, EmptyInputError> {
    let totals = NonEmpty::from_vec(daily_totals(records)).ok_or(EmptyInputError)?;

    // A strict comparison keeps the first of equal minima.
    let least = totals.tail.iter().fold(totals.head, |least, total| {
        if total.visitors < least.visitors {
            *total
        } else {
            least
        }
    });

    Ok(least)
}

/// The comments containing `keyword`, in record order.
///
/// Matching is a case-sensitive substring test. An empty keyword matches
/// every record.
#[must_use]
pub fn comments_containing<'a>(records: &'a [ExhibitionRecord], keyword: &str) -> Vec<&'a str> {
    records
        .iter()
        .map(ExhibitionRecord::comment)
        .filter(|comment| comment.contains(keyword))
        .collect()
}

/// An aggregate was requested over an empty sequence of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no records to aggregate")]
pub struct EmptyInputError;
