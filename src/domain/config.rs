use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

/// Configuration for the exhibition log.
///
/// Controls where records are persisted and how visit dates are shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The path of the backing file holding the records.
    ///
    /// Relative paths are resolved against the working directory.
    pub database: PathBuf,

    /// The `strftime` format used when displaying visit dates.
    ///
    /// Only affects display; the backing file always uses a fixed format.
    date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            date_format: default_date_format(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, if the TOML content is
    /// invalid, or if the date format is not a valid `strftime` string.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))?;

        if !is_valid_date_format(&config.date_format) {
            return Err(format!(
                "Invalid date_format '{}' in config file",
                config.date_format
            ));
        }

        Ok(config)
    }

    /// Loads the configuration if the file exists, falling back to the
    /// defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_or_default(path: &Path) -> Result<Self, String> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Returns the display format for visit dates.
    #[must_use]
    pub fn date_format(&self) -> &str {
        &self.date_format
    }
}

fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
}

fn default_database() -> PathBuf {
    PathBuf::from("exhibition_database.txt")
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_database")]
        database: PathBuf,

        #[serde(default = "default_date_format")]
        date_format: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                database,
                date_format,
            } => Self {
                database,
                date_format,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            database: config.database,
            date_format: config.date_format,
        }
    }
}
