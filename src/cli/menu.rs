use std::{fmt, str::FromStr};

/// An entry in the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Add,
    Edit,
    Delete,
    List,
    TotalVisitors,
    LeastVisitedDay,
    SearchComments,
    Quit,
}

impl Choice {
    /// Every entry, in the order shown.
    pub const ALL: [Self; 8] = [
        Self::Add,
        Self::Edit,
        Self::Delete,
        Self::List,
        Self::TotalVisitors,
        Self::LeastVisitedDay,
        Self::SearchComments,
        Self::Quit,
    ];

    /// The key that selects this entry.
    pub const fn key(self) -> char {
        match self {
            Self::Add => '1',
            Self::Edit => '2',
            Self::Delete => '3',
            Self::List => '4',
            Self::TotalVisitors => '5',
            Self::LeastVisitedDay => '6',
            Self::SearchComments => '7',
            Self::Quit => 'Q',
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Add => "Add a record",
            Self::Edit => "Edit a record",
            Self::Delete => "Delete a record",
            Self::List => "List records",
            Self::TotalVisitors => "Total number of visitors",
            Self::LeastVisitedDay => "Day with the fewest visitors",
            Self::SearchComments => "Search comments by keyword",
            Self::Quit => "Quit",
        }
    }

    fn from_key(key: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|choice| choice.key().eq_ignore_ascii_case(&key))
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.key(), self.label())
    }
}

impl FromStr for Choice {
    type Err = UnknownChoice;

    /// Parses a single key, ignoring surrounding whitespace and case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(key), None) => Self::from_key(key).ok_or_else(|| UnknownChoice(s.to_string())),
            _ => Err(UnknownChoice(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown menu option '{0}'")]
pub struct UnknownChoice(String);
