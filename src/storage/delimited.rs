//! The comma-delimited backing file format.
//!
//! One record per line, no header, five fields in a fixed order: exhibition
//! name, artist surname, visit date, visitor count, comment. Fields that
//! contain a comma, a double quote, or a line break are wrapped in double
//! quotes with embedded quotes doubled; all other fields are written bare.

use std::{
    fs::{self, File},
    io,
    path::Path,
};

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tempfile::NamedTempFile;

use crate::domain::{
    ExhibitionRecord, RecordError,
    record::{STORAGE_DATE_FORMAT, parse_visit_date, parse_visitors},
};

const FIELD_COUNT: usize = 5;

/// Reads every record from `reader`.
///
/// Blank lines are skipped. The first malformed line aborts the read.
///
/// # Errors
///
/// Returns an error if the input cannot be read or is not UTF-8, or if any
/// line does not hold a valid record.
pub fn read<R: io::Read>(mut reader: R) -> Result<Vec<ExhibitionRecord>, LoadError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut rows = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut row = StringRecord::new();
    let mut records = Vec::new();
    while rows.read_record(&mut row)? {
        let (line, start) = row.position().map_or((0, 0), |p| (p.line(), p.byte()));
        let raw = raw_row(&text, start, rows.position().byte());
        let record = check_quoting(raw)
            .and_then(|()| parse_row(&row))
            .map_err(|reason| LoadError::Malformed { line, reason })?;
        records.push(record);
    }

    Ok(records)
}

/// The source text of the row spanning `start..end`, without its terminator.
fn raw_row(text: &str, start: u64, end: u64) -> &str {
    let span = usize::try_from(start).ok().zip(usize::try_from(end).ok());
    span.and_then(|(start, end)| text.get(start..end))
        .unwrap_or_default()
        .trim_matches(['\r', '\n'])
}

/// Rejects a row whose quoted field does not close right before a delimiter
/// or the end of the line.
///
/// The reader accepts `"Best" show ever` and silently drops the quotes, so
/// the check runs on the source text. A quote that does not open a field is
/// kept as part of the value.
fn check_quoting(raw: &str) -> Result<(), MalformedRecord> {
    let mut bytes = raw.bytes().peekable();
    loop {
        if bytes.next_if_eq(&b'"').is_some() {
            loop {
                match bytes.next() {
                    None => return Err(MalformedRecord::UnclosedQuote),
                    Some(b'"') if bytes.next_if_eq(&b'"').is_none() => break,
                    Some(_) => {}
                }
            }
            match bytes.next() {
                None => return Ok(()),
                Some(b',') => continue,
                Some(_) => return Err(MalformedRecord::UnclosedQuote),
            }
        }
        loop {
            match bytes.next() {
                None => return Ok(()),
                Some(b',') => break,
                Some(_) => {}
            }
        }
    }
}

fn parse_row(row: &StringRecord) -> Result<ExhibitionRecord, MalformedRecord> {
    if row.len() != FIELD_COUNT {
        return Err(MalformedRecord::FieldCount(row.len()));
    }

    let visit_date = parse_visit_date(&row[2])?;
    let visitors = parse_visitors(&row[3])?;
    let record = ExhibitionRecord::new(&row[0], &row[1], visit_date, visitors, &row[4])?;

    Ok(record)
}

/// Writes every record to `writer`, one per line.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write<W: io::Write>(writer: W, records: &[ExhibitionRecord]) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    for record in records {
        let visit_date = record.visit_date().format(STORAGE_DATE_FORMAT).to_string();
        let visitors = record.visitors().to_string();
        writer.write_record([
            record.exhibition(),
            record.artist(),
            visit_date.as_str(),
            visitors.as_str(),
            record.comment(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Loads the records stored at `path`.
///
/// Returns `None` if there is no file at `path`.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, or if any line in
/// it does not hold a valid record.
pub fn load(path: &Path) -> Result<Option<Vec<ExhibitionRecord>>, LoadError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(LoadError::Io(e)),
    };

    let records = read(file)?;
    tracing::debug!("Read {} records from {}", records.len(), path.display());
    Ok(Some(records))
}

/// Replaces the file at `path` with the given records.
///
/// The records are written to a temporary file in the same directory, which
/// is then renamed over `path`. On failure the previous content is left in
/// place. Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, or
/// if it cannot be moved into place.
pub fn save(path: &Path, records: &[ExhibitionRecord]) -> Result<(), SaveError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    write(&mut file, records)?;
    file.as_file().sync_all()?;
    file.persist(path)?;

    tracing::debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Errors that can occur when loading records.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The backing file exists but could not be opened or is not UTF-8.
    #[error("failed to open database: {0}")]
    Io(#[from] io::Error),

    /// The content could not be read as delimited text.
    #[error("failed to read database: {0}")]
    Csv(#[from] csv::Error),

    /// A line did not hold a valid record.
    #[error("malformed record on line {line}: {reason}")]
    Malformed {
        /// 1-based line number of the offending record.
        line: u64,
        /// What was wrong with it.
        reason: MalformedRecord,
    },
}

/// The reason a line could not be read as a record.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MalformedRecord {
    /// The line did not split into exactly five fields.
    #[error("expected {FIELD_COUNT} fields, found {0}")]
    FieldCount(usize),

    /// A quoted field did not close right before a delimiter or the end of
    /// the line.
    #[error("unclosed quote in a quoted field")]
    UnclosedQuote,

    /// One of the fields was invalid.
    #[error(transparent)]
    Field(#[from] RecordError),
}

/// Errors that can occur when saving records.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The temporary file could not be created or synced.
    #[error("failed to write database: {0}")]
    Io(#[from] io::Error),

    /// The records could not be encoded.
    #[error("failed to write database: {0}")]
    Csv(#[from] csv::Error),

    /// The temporary file could not replace the database.
    #[error("failed to replace database: {0}")]
    Persist(#[from] tempfile::PersistError),
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn record(comment: &str) -> ExhibitionRecord {
        ExhibitionRecord::new("Water Lilies", "Monet", at(2024, 1, 1, 10), 12, comment).unwrap()
    }

    fn written(records: &[ExhibitionRecord]) -> String {
        let mut out = Vec::new();
        write(&mut out, records).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn plain_records_are_written_unquoted() {
        let text = written(&[record("lovely"), record("")]);

        assert_eq!(
            text,
            "Water Lilies,Monet,2024-01-01 10:00:00,12,lovely\n\
             Water Lilies,Monet,2024-01-01 10:00:00,12,\n"
        );
    }

    #[test]
    fn comment_with_delimiter_is_quoted_and_survives() {
        let original = vec![record("bright, airy \"rooms\"")];

        let text = written(&original);
        assert_eq!(
            text,
            "Water Lilies,Monet,2024-01-01 10:00:00,12,\"bright, airy \"\"rooms\"\"\"\n"
        );

        let read_back = read(text.as_bytes()).unwrap();
        assert_eq!(read_back, original);
    }

    #[test]
    fn reads_legacy_day_first_dates() {
        let text = "Water Lilies,Monet,01.01.2024 10:00:00,12,lovely\n";

        let records = read(text.as_bytes()).unwrap();

        assert_eq!(records, vec![record("lovely")]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = "Water Lilies,Monet,2024-01-01 10:00:00,12,a\n\n\
                    Water Lilies,Monet,2024-01-01 10:00:00,12,b\n";

        let records = read(text.as_bytes()).unwrap();

        assert_eq!(records, vec![record("a"), record("b")]);
    }

    #[test]
    fn too_few_fields_aborts_with_line_number() {
        let text = "Water Lilies,Monet,2024-01-01 10:00:00,12,ok\n\
                    Water Lilies,Monet,2024-01-01\n";

        let error = read(text.as_bytes()).unwrap_err();

        assert!(matches!(
            error,
            LoadError::Malformed {
                line: 2,
                reason: MalformedRecord::FieldCount(3)
            }
        ));
    }

    #[test]
    fn unquoted_comma_in_comment_is_malformed() {
        let text = "Water Lilies,Monet,2024-01-01 10:00:00,12,bright, airy\n";

        let error = read(text.as_bytes()).unwrap_err();

        assert!(matches!(
            error,
            LoadError::Malformed {
                line: 1,
                reason: MalformedRecord::FieldCount(6)
            }
        ));
    }

    #[test]
    fn text_after_closing_quote_is_malformed() {
        let text = "Water Lilies,Monet,2024-01-01 10:00:00,12,ok\n\
                    Expo,Monet,2024-01-01 00:00:00,5,\"Best\" show ever\n";

        let error = read(text.as_bytes()).unwrap_err();

        assert!(matches!(
            error,
            LoadError::Malformed {
                line: 2,
                reason: MalformedRecord::UnclosedQuote
            }
        ));
    }

    #[test]
    fn quote_left_open_is_malformed() {
        let text = "Water Lilies,Monet,2024-01-01 10:00:00,12,\"never closed\n";

        let error = read(text.as_bytes()).unwrap_err();

        assert!(matches!(
            error,
            LoadError::Malformed {
                line: 1,
                reason: MalformedRecord::UnclosedQuote
            }
        ));
    }

    #[test]
    fn quote_inside_a_bare_comment_is_kept() {
        let text = "Water Lilies,Monet,2024-01-01 10:00:00,12,the \"blue\" room\n";

        let records = read(text.as_bytes()).unwrap();

        assert_eq!(records, vec![record("the \"blue\" room")]);
    }

    #[test]
    fn quoted_fields_on_crlf_lines_are_accepted() {
        let text = "\"Water Lilies\",Monet,2024-01-01 10:00:00,12,\"a, b\"\r\n\
                    Water Lilies,Monet,2024-01-01 10:00:00,12,c\r\n";

        let records = read(text.as_bytes()).unwrap();

        assert_eq!(records, vec![record("a, b"), record("c")]);
    }

    #[test]
    fn invalid_fields_are_reported() {
        let text = "A,B,someday,1,c\n";
        let bad_date = read(text.as_bytes()).unwrap_err();
        assert!(matches!(
            bad_date,
            LoadError::Malformed {
                reason: MalformedRecord::Field(RecordError::InvalidDate(_)),
                ..
            }
        ));

        let text = "A,B,2024-01-01,many,c\n";
        let bad_count = read(text.as_bytes()).unwrap_err();
        assert!(matches!(
            bad_count,
            LoadError::Malformed {
                reason: MalformedRecord::Field(RecordError::InvalidVisitors(_)),
                ..
            }
        ));

        let text = ",B,2024-01-01,1,c\n";
        let no_name = read(text.as_bytes()).unwrap_err();
        assert!(matches!(
            no_name,
            LoadError::Malformed {
                reason: MalformedRecord::Field(RecordError::EmptyExhibition),
                ..
            }
        ));
    }

    #[test]
    fn load_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();

        let loaded = load(&tmp.path().join("missing.txt")).unwrap();

        assert!(loaded.is_none());
    }

    #[test]
    fn save_empty_then_load_is_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db.txt");

        save(&path, &[]).unwrap();

        assert_eq!(load(&path).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn save_replaces_previous_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db.txt");

        save(&path, &[record("first"), record("second")]).unwrap();
        save(&path, &[record("third")]).unwrap();

        assert_eq!(load(&path).unwrap(), Some(vec![record("third")]));
    }

    #[test]
    fn save_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dir").join("db.txt");

        save(&path, &[record("x")]).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn save_leaves_no_temporary_files_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db.txt");

        save(&path, &[record("x")]).unwrap();

        let entries: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
