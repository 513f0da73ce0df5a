// Command-line surface.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use scoutline_core::AgeTier;

#[derive(Parser, Debug)]
#[command(
    name = "scoutline",
    about = "Score youth-baseball skill assessments by age tier",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score one assessment from a JSON object of metric values
    Score(ScoreArgs),
    /// Score one assessment per CSV row, printing one JSON line per row
    Batch(BatchArgs),
    /// Print a player's full-evaluation report from recorded results
    Report(ReportArgs),
    /// List every tier with its categories, ceilings and metric keys
    Tiers,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Age tier label, e.g. "10U", "U12" or "High School"
    #[arg(long, value_parser = parse_tier)]
    pub tier: AgeTier,
    /// JSON file holding one object of metric key -> value
    #[arg(long)]
    pub input: PathBuf,
    /// Player the assessment belongs to (required with --save)
    #[arg(long)]
    pub player: Option<String>,
    /// When the assessment was performed (RFC 3339); defaults to now
    #[arg(long, value_parser = parse_timestamp)]
    pub performed_at: Option<DateTime<Utc>>,
    /// Record the rating in the database
    #[arg(long)]
    pub save: bool,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    #[arg(long, value_parser = parse_tier)]
    pub tier: AgeTier,
    /// CSV file with a `player_id` column, an optional `performed_at`
    /// column, and one column per metric key
    #[arg(long)]
    pub input: PathBuf,
    /// Record every scored row in the database
    #[arg(long)]
    pub save: bool,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[arg(long)]
    pub player: String,
    #[arg(long, value_parser = parse_tier)]
    pub tier: AgeTier,
}

fn parse_tier(label: &str) -> Result<AgeTier, String> {
    label.parse::<AgeTier>().map_err(|e| e.to_string())
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(text)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {e}"))
}

impl Command {
    /// Whether the command reads or writes the database.
    pub fn needs_database(&self) -> bool {
        match self {
            Command::Score(args) => args.save,
            Command::Batch(args) => args.save,
            Command::Report(_) => true,
            Command::Tiers => false,
        }
    }
}
