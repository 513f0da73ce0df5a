// Scoutline entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Load config (copying defaults on first run)
// 3. Initialize tracing (log to file, not terminal)
// 4. Open the database when the command needs it
// 5. Run the command, writing results to stdout

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use scoutline_app::cli::{Cli, Command};
use scoutline_app::commands;
use scoutline_app::config::{self, Config};
use scoutline_store::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config().context("failed to load configuration")?;

    init_tracing(&config)?;
    info!("scoutline starting: {:?}", cli.command);

    let db = if cli.command.needs_database() {
        let db = Database::open(&config.database.path).context("failed to open database")?;
        info!("Database opened at {}", config.database.path);
        Some(db)
    } else {
        None
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = run(&cli.command, &config, db.as_ref(), &mut out).await;
    out.flush()?;

    if let Err(e) = &result {
        error!("command failed: {e:#}");
    }
    result
}

async fn run(
    command: &Command,
    config: &Config,
    db: Option<&Database>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::Score(args) => {
            commands::score(args, &config.scoring, db, out)?;
        }
        Command::Batch(args) => {
            commands::batch(args, &config.scoring, db, out)?;
        }
        Command::Report(args) => {
            let db = db.context("report requires a database")?;
            commands::report(args, db, out).await?;
        }
        Command::Tiers => commands::tiers(out)?,
    }
    Ok(())
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join(&config.logging.directory);
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("scoutline.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
