use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use non_empty_string::NonEmptyString;

/// Format used when writing a visit date to the backing file.
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date-time layouts accepted when reading a visit date.
const DATE_TIME_FORMATS: &[&str] = &[
    STORAGE_DATE_FORMAT,
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

/// Date-only layouts accepted when reading a visit date. These resolve to
/// midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// One entry in the exhibition visitor log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExhibitionRecord {
    exhibition: NonEmptyString,
    artist: NonEmptyString,
    visit_date: NaiveDateTime,
    visitors: u32,
    comment: String,
}

impl ExhibitionRecord {
    /// Construct a new record.
    ///
    /// # Errors
    ///
    /// Returns an error if the exhibition name or the artist surname is
    /// empty.
    pub fn new(
        exhibition: impl Into<String>,
        artist: impl Into<String>,
        visit_date: NaiveDateTime,
        visitors: u32,
        comment: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let exhibition =
            NonEmptyString::new(exhibition.into()).map_err(|_| RecordError::EmptyExhibition)?;
        let artist = NonEmptyString::new(artist.into()).map_err(|_| RecordError::EmptyArtist)?;

        Ok(Self {
            exhibition,
            artist,
            visit_date,
            visitors,
            comment: comment.into(),
        })
    }

    /// The name of the exhibition.
    #[must_use]
    pub fn exhibition(&self) -> &str {
        self.exhibition.as_str()
    }

    /// The surname of the exhibiting artist.
    #[must_use]
    pub fn artist(&self) -> &str {
        self.artist.as_str()
    }

    /// When the visit took place.
    ///
    /// Only the date portion is meaningful for aggregation.
    #[must_use]
    pub const fn visit_date(&self) -> NaiveDateTime {
        self.visit_date
    }

    /// The calendar day of the visit, with any time-of-day discarded.
    #[must_use]
    pub const fn visit_day(&self) -> NaiveDate {
        self.visit_date.date()
    }

    /// The number of visitors recorded.
    #[must_use]
    pub const fn visitors(&self) -> u32 {
        self.visitors
    }

    /// Free-form comment. May be empty.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }
}

impl fmt::Display for ExhibitionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}), {}: {} visitors",
            self.exhibition(),
            self.artist(),
            self.visit_date.date(),
            self.visitors
        )
    }
}

/// Parse a visit date.
///
/// Accepts ISO-style dates with or without a time component, as well as the
/// day-first `dd.MM.yyyy` rendering found in older log files. A bare date
/// resolves to midnight.
///
/// # Errors
///
/// Returns an error if the input matches none of the accepted layouts.
pub fn parse_visit_date(input: &str) -> Result<NaiveDateTime, RecordError> {
    let input = input.trim();

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| RecordError::InvalidDate(input.to_string()))
}

/// Parse a visitor count.
///
/// # Errors
///
/// Returns an error if the input is not a non-negative integer.
pub fn parse_visitors(input: &str) -> Result<u32, RecordError> {
    let input = input.trim();
    input
        .parse()
        .map_err(|_| RecordError::InvalidVisitors(input.to_string()))
}

/// Errors raised when a record field fails validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    /// The exhibition name was empty.
    #[error("exhibition name must not be empty")]
    EmptyExhibition,

    /// The artist surname was empty.
    #[error("artist surname must not be empty")]
    EmptyArtist,

    /// The visit date could not be parsed.
    #[error("invalid date '{0}', expected yyyy-MM-dd")]
    InvalidDate(String),

    /// The visitor count was not a non-negative integer.
    #[error("invalid visitor count '{0}', expected a non-negative integer")]
    InvalidVisitors(String),
}
