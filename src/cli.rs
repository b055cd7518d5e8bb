use std::{io, path::PathBuf};

mod menu;
mod session;
mod terminal;

use clap::ArgAction;
use exhibition_log::{Config, RecordStore};
use session::Session;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// The path to the configuration file
    #[arg(short, long, default_value = "exhibitions.toml")]
    config: PathBuf,

    /// The path to the database file, overriding the configured one
    #[arg(short, long)]
    database: Option<PathBuf>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = Config::load_or_default(&self.config).map_err(|e| anyhow::anyhow!("{e}"))?;
        let path = self.database.unwrap_or_else(|| config.database.clone());

        let (store, opened) = RecordStore::open(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", path.display()))?;

        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut session = Session::new(
            stdin.lock(),
            stdout.lock(),
            store,
            config.date_format().to_string(),
        );
        session.report_opened(opened)?;
        session.run()?;

        Ok(())
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        // Logs go to stderr so they stay out of the menu.
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}
