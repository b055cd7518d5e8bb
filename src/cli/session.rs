//! The interactive menu loop.

use std::{
    fmt::Write as _,
    io::{self, BufRead, Write},
};

use chrono::{NaiveDateTime, NaiveTime};
use exhibition_log::{
    EmptyInputError, ExhibitionRecord, Opened, RecordError, RecordStore, SaveError, StoreError,
    domain::record::{STORAGE_DATE_FORMAT, parse_visit_date, parse_visitors},
};
use tracing::instrument;

use crate::cli::{
    menu::Choice,
    terminal::{Colorize, rule},
};

/// A single interactive session over a record store.
///
/// Reads menu choices and field values line by line from `input` and writes
/// prompts and results to `output`. A failed operation is reported and the
/// session carries on; only end of input, a quit choice, or a terminal I/O
/// failure ends it.
pub struct Session<R, W> {
    input: R,
    output: W,
    store: RecordStore,
    date_format: String,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub const fn new(input: R, output: W, store: RecordStore, date_format: String) -> Self {
        Self {
            input,
            output,
            store,
            date_format,
        }
    }

    #[cfg(test)]
    pub fn into_store(self) -> RecordStore {
        self.store
    }

    /// Tell the user what was found when the store was opened.
    pub fn report_opened(&mut self, opened: Opened) -> io::Result<()> {
        let path = self.store.path().display().to_string();
        match opened {
            Opened::Missing => writeln!(
                self.output,
                "{}",
                format!("No database found at {path}. Starting with an empty log.").warning()
            ),
            Opened::Existing { records } => writeln!(
                self.output,
                "{}",
                format!("Loaded {records} records from {path}").dim()
            ),
        }
    }

    /// Run the menu loop until the user quits or input ends.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading from or writing to the terminal fails.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.render_menu()?;

            let Some(line) = self.read_line()? else {
                break;
            };

            let choice = match line.parse::<Choice>() {
                Ok(choice) => choice,
                Err(e) => {
                    writeln!(self.output, "{}", e.to_string().warning())?;
                    continue;
                }
            };

            if choice == Choice::Quit {
                writeln!(self.output, "Goodbye!")?;
                break;
            }

            match self.dispatch(choice) {
                Ok(()) => {}
                Err(ActionError::Eof) => break,
                Err(ActionError::Io(e)) => return Err(e),
                Err(e) => {
                    tracing::debug!("{choice:?} failed: {e}");
                    writeln!(self.output, "{}", e.to_string().warning())?;
                }
            }
        }

        Ok(())
    }

    fn dispatch(&mut self, choice: Choice) -> Result<(), ActionError> {
        match choice {
            Choice::Add => self.add(),
            Choice::Edit => self.edit(),
            Choice::Delete => self.delete(),
            Choice::List => self.list(),
            Choice::TotalVisitors => self.total_visitors(),
            Choice::LeastVisitedDay => self.least_visited_day(),
            Choice::SearchComments => self.search_comments(),
            Choice::Quit => Ok(()),
        }
    }

    fn render_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", "Menu:".info())?;
        for choice in Choice::ALL {
            writeln!(self.output, "  {choice}")?;
        }
        write!(self.output, "Choose an option: ")?;
        self.output.flush()
    }

    #[instrument(skip(self))]
    fn add(&mut self) -> Result<(), ActionError> {
        let record = self.read_record()?;
        let index = self.store.add(record)?;
        writeln!(
            self.output,
            "{}",
            format!("Record added at index {index}.").success()
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn edit(&mut self) -> Result<(), ActionError> {
        let index = self.read_index("Index of the record to edit")?;
        let record = self.read_record()?;
        self.store.edit(index, record)?;
        writeln!(
            self.output,
            "{}",
            format!("Record {index} updated.").success()
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete(&mut self) -> Result<(), ActionError> {
        let index = self.read_index("Index of the record to delete")?;
        let removed = self.store.delete(index)?;
        writeln!(
            self.output,
            "{}",
            format!("Record {index} deleted: {removed}").success()
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn list(&mut self) -> Result<(), ActionError> {
        if self.store.is_empty() {
            writeln!(self.output, "{}", "No records.".dim())?;
            return Ok(());
        }

        let rule = rule();
        for (index, record) in self.store.records().iter().enumerate() {
            let date = self.render_date(record.visit_date());
            writeln!(self.output, "{rule}")?;
            writeln!(self.output, "[{index}] Exhibition: {}", record.exhibition())?;
            writeln!(self.output, "    Artist:     {}", record.artist())?;
            writeln!(self.output, "    Visit date: {date}")?;
            writeln!(self.output, "    Visitors:   {}", record.visitors())?;
            writeln!(self.output, "    Comment:    {}", record.comment())?;
        }
        writeln!(self.output, "{rule}")?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn total_visitors(&mut self) -> Result<(), ActionError> {
        let total = self.store.total_visitors();
        writeln!(self.output, "Total visitors: {total}")?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn least_visited_day(&mut self) -> Result<(), ActionError> {
        let least = self.store.least_visited_day()?;
        let day = self.render_date(least.day.and_time(NaiveTime::MIN));
        writeln!(
            self.output,
            "Day with the fewest visitors: {day} ({} visitors)",
            least.visitors
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn search_comments(&mut self) -> Result<(), ActionError> {
        let keyword = self.prompt("Keyword to search for")?;
        let comments = self.store.comments_containing(&keyword);

        if comments.is_empty() {
            writeln!(
                self.output,
                "{}",
                format!("No comments containing '{keyword}'.").dim()
            )?;
            return Ok(());
        }

        writeln!(self.output, "Comments containing '{keyword}':")?;
        for comment in comments {
            writeln!(self.output, "  {comment}")?;
        }
        Ok(())
    }

    /// Collect the fields of a record. Aborts on the first invalid field.
    fn read_record(&mut self) -> Result<ExhibitionRecord, ActionError> {
        let exhibition = self.prompt("Exhibition name")?.trim().to_string();
        let artist = self.prompt("Artist surname")?.trim().to_string();
        let visit_date = parse_visit_date(&self.prompt("Visit date (yyyy-MM-dd)")?)?;
        let visitors = parse_visitors(&self.prompt("Number of visitors")?)?;
        let comment = self.prompt("Comment")?;

        Ok(ExhibitionRecord::new(
            exhibition, artist, visit_date, visitors, comment,
        )?)
    }

    /// Read an index and check it against the current store.
    fn read_index(&mut self, label: &str) -> Result<usize, ActionError> {
        let raw = self.prompt(label)?;
        let raw = raw.trim();
        let index: usize = raw
            .parse()
            .map_err(|_| ActionError::InvalidIndex(raw.to_string()))?;

        let len = self.store.len();
        if index >= len {
            return Err(StoreError::IndexOutOfRange { index, len }.into());
        }
        Ok(index)
    }

    fn prompt(&mut self, label: &str) -> Result<String, ActionError> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;
        self.read_line()?.ok_or(ActionError::Eof)
    }

    /// Read one line without its terminator. `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn render_date(&self, date: NaiveDateTime) -> String {
        let mut rendered = String::new();
        if write!(rendered, "{}", date.format(&self.date_format)).is_err() {
            // The configured format needs fields a plain date-time lacks.
            return date.format(STORAGE_DATE_FORMAT).to_string();
        }
        rendered
    }
}

/// Why a single menu action did not complete.
#[derive(Debug, thiserror::Error)]
enum ActionError {
    #[error("input ended")]
    Eof,

    #[error("invalid record index '{0}'")]
    InvalidIndex(String),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Empty(#[from] EmptyInputError),

    #[error(transparent)]
    Io(#[from] io::Error),
}
