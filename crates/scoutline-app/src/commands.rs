// Command implementations. Results go to the given writer as JSON; logs go
// through tracing.

use std::io::{Read, Write};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use scoutline_core::{
    evaluate_tier_rating, full_eval_report, AgeTier, MetricSnapshot, RatingResult,
};
use scoutline_store::Database;

use crate::cli::{BatchArgs, ReportArgs, ScoreArgs};
use crate::config::ScoringConfig;

const PLAYER_COLUMN: &str = "player_id";
const PERFORMED_AT_COLUMN: &str = "performed_at";

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Turn raw input into a snapshot, checking keys against the tier registry
/// when strict scoring is configured.
fn checked(snapshot: MetricSnapshot, tier: AgeTier, scoring: &ScoringConfig) -> Result<MetricSnapshot> {
    if scoring.strict_metric_keys {
        Ok(snapshot.validated_for(tier)?)
    } else {
        Ok(snapshot)
    }
}

/// Parse a JSON object of metric values.
pub fn snapshot_from_json(text: &str, tier: AgeTier, scoring: &ScoringConfig) -> Result<MetricSnapshot> {
    let value: serde_json::Value =
        serde_json::from_str(text).context("metric input is not valid JSON")?;
    if !value.is_object() {
        bail!("metric input must be a JSON object of metric key -> value");
    }
    checked(MetricSnapshot::from_json(&value), tier, scoring)
}

// ---------------------------------------------------------------------------
// score
// ---------------------------------------------------------------------------

pub fn score(
    args: &ScoreArgs,
    scoring: &ScoringConfig,
    db: Option<&Database>,
    out: &mut dyn Write,
) -> Result<RatingResult> {
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let snapshot = snapshot_from_json(&text, args.tier, scoring)?;
    let rating = evaluate_tier_rating(args.tier, &snapshot);

    if args.save {
        let Some(player) = args.player.as_deref() else {
            bail!("--save requires --player");
        };
        let db = db.context("--save requires a database")?;
        let performed_at = args.performed_at.unwrap_or_else(Utc::now);
        db.record_rating(player, performed_at, &rating, &snapshot)?;
    }

    serde_json::to_writer_pretty(&mut *out, &rating).context("failed to write rating")?;
    writeln!(out)?;
    Ok(rating)
}

// ---------------------------------------------------------------------------
// batch
// ---------------------------------------------------------------------------

/// One output line of a batch run.
#[derive(Debug, Serialize)]
pub struct BatchLine {
    /// 1-based data row number.
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<RatingResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn batch(
    args: &BatchArgs,
    scoring: &ScoringConfig,
    db: Option<&Database>,
    out: &mut dyn Write,
) -> Result<Vec<BatchLine>> {
    let file = std::fs::File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let save_to = if args.save {
        Some(db.context("--save requires a database")?)
    } else {
        None
    };
    score_csv(file, args.tier, scoring, save_to, out)
}

/// Score every row of a CSV stream. A bad row is reported on its own line
/// and does not stop the run.
pub fn score_csv<R: Read>(
    reader: R,
    tier: AgeTier,
    scoring: &ScoringConfig,
    save_to: Option<&Database>,
    out: &mut dyn Write,
) -> Result<Vec<BatchLine>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers().context("failed to read CSV header")?.clone();

    let mut lines = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let row = i + 1;
        let line = match record {
            Ok(record) => score_row(row, &headers, &record, tier, scoring, save_to),
            Err(e) => {
                warn!("skipping malformed CSV row {row}: {e}");
                BatchLine {
                    row,
                    player_id: None,
                    rating: None,
                    error: Some(e.to_string()),
                }
            }
        };
        serde_json::to_writer(&mut *out, &line).context("failed to write batch line")?;
        writeln!(out)?;
        lines.push(line);
    }

    info!("scored {} {} rows", lines.len(), tier);
    Ok(lines)
}

fn score_row(
    row: usize,
    headers: &csv::StringRecord,
    record: &csv::StringRecord,
    tier: AgeTier,
    scoring: &ScoringConfig,
    save_to: Option<&Database>,
) -> BatchLine {
    let mut player_id = None;
    let mut performed_at = None;
    let mut metrics = Vec::new();
    for (header, cell) in headers.iter().zip(record.iter()) {
        match header {
            PLAYER_COLUMN => player_id = Some(cell.to_string()).filter(|p| !p.is_empty()),
            PERFORMED_AT_COLUMN => performed_at = Some(cell),
            _ => metrics.push((header, cell)),
        }
    }

    let result = (|| -> Result<RatingResult> {
        let snapshot = checked(MetricSnapshot::from_text(metrics), tier, scoring)?;
        let rating = evaluate_tier_rating(tier, &snapshot);
        if let Some(db) = save_to {
            let Some(player) = player_id.as_deref() else {
                bail!("row has no {PLAYER_COLUMN}");
            };
            let at = parse_performed_at(performed_at)?;
            db.record_rating(player, at, &rating, &snapshot)?;
        }
        Ok(rating)
    })();

    match result {
        Ok(rating) => BatchLine {
            row,
            player_id,
            rating: Some(rating),
            error: None,
        },
        Err(e) => {
            warn!("row {row}: {e:#}");
            BatchLine {
                row,
                player_id,
                rating: None,
                error: Some(format!("{e:#}")),
            }
        }
    }
}

/// Blank or missing means now.
fn parse_performed_at(cell: Option<&str>) -> Result<DateTime<Utc>> {
    match cell.map(str::trim).filter(|c| !c.is_empty()) {
        Some(text) => Ok(DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("invalid {PERFORMED_AT_COLUMN} `{text}`"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

// ---------------------------------------------------------------------------
// report
// ---------------------------------------------------------------------------

/// Full-evaluation report for five-category tiers; for positional tiers,
/// which have no position composite, the latest recorded rating.
pub async fn report(args: &ReportArgs, db: &Database, out: &mut dyn Write) -> Result<serde_json::Value> {
    let value = if args.tier.profile().full_eval.is_some() {
        let report = full_eval_report(db, &args.player, args.tier).await?;
        info!(
            "full evaluation for player {} ({}): defense {:?}",
            args.player, args.tier, report.position_scores.defense_score
        );
        serde_json::to_value(&report)?
    } else {
        let stored = db.latest_rating(&args.player, args.tier)?;
        serde_json::json!({
            "player_id": args.player,
            "tier": args.tier,
            "performed_at": stored.as_ref().and_then(|s| s.performed_at),
            "rating": stored.map(|s| s.rating),
        })
    };

    serde_json::to_writer_pretty(&mut *out, &value).context("failed to write report")?;
    writeln!(out)?;
    Ok(value)
}

// ---------------------------------------------------------------------------
// tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct TierSummary {
    pub tier: AgeTier,
    pub full_evaluation: bool,
    pub categories: Vec<CategorySummary>,
    pub metric_keys: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub template_label: String,
    pub max_points: f64,
    pub tests: Vec<String>,
    pub derived: Vec<String>,
}

pub fn tier_summaries() -> Vec<TierSummary> {
    AgeTier::ALL
        .iter()
        .map(|tier| {
            let profile = tier.profile();
            TierSummary {
                tier: *tier,
                full_evaluation: profile.full_eval.is_some(),
                categories: profile
                    .categories
                    .iter()
                    .map(|c| CategorySummary {
                        category: c.kind.to_string(),
                        template_label: tier.template_label(c.kind),
                        max_points: c.max_points(),
                        tests: c.tests.iter().map(|t| t.name.to_string()).collect(),
                        derived: c.derived.iter().map(|d| d.name().to_string()).collect(),
                    })
                    .collect(),
                metric_keys: profile.metric_keys().into_iter().map(String::from).collect(),
            }
        })
        .collect()
}

pub fn tiers(out: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, &tier_summaries()).context("failed to write tiers")?;
    writeln!(out)?;
    Ok(())
}
