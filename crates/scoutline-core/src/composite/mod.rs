// Position-composite aggregator.
//
// Blends up to five previously-persisted category results (athletic,
// hitting, throwing, catching, fielding) into per-position ratings for the
// full-evaluation report. Category results are opaque JSON breakdowns here:
// the aggregator only reads the fields it needs and treats anything missing
// as absent.

pub mod source;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProfileError;
use crate::evaluator::CategoryResult;
use crate::numeric::{average, clamp, round1, round1_opt, sum};
use crate::position::{Position, INFIELD_POSITIONS, OUTFIELD_POSITIONS};
use crate::profile::{FullEvalProfile, PositionFormula, ScoreSource};
use crate::tier::{AgeTier, CategoryKind};

pub use source::{fetch_full_eval_inputs, full_eval_report, CategoryResultSource};

const OFFENSE_HITTING_WEIGHT: f64 = 0.8;
const OFFENSE_SPEED_WEIGHT: f64 = 0.2;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The latest persisted result of one category for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub score: Option<f64>,
    /// The category breakdown as stored: `{"tests": {..}, "<derived>": ..}`.
    pub breakdown: serde_json::Value,
    pub performed_at: Option<DateTime<Utc>>,
}

impl CategoryRecord {
    pub fn from_result(result: &CategoryResult, performed_at: Option<DateTime<Utc>>) -> Self {
        CategoryRecord {
            score: result.score,
            breakdown: serde_json::to_value(&result.breakdown).unwrap_or_default(),
            performed_at,
        }
    }

    /// Points of one test, read from `/tests/<test>/points`.
    pub fn test_points(&self, test: &str) -> Option<f64> {
        self.breakdown
            .get("tests")
            .and_then(|tests| tests.get(test))
            .and_then(|tp| tp.get("points"))
            .and_then(serde_json::Value::as_f64)
    }

    /// A derived value stored at the top level of the breakdown.
    pub fn derived(&self, name: &str) -> Option<f64> {
        self.breakdown.get(name).and_then(serde_json::Value::as_f64)
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Per-position ratings (0-50) and their roll-ups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionScoreSet {
    pub pitcher: Option<f64>,
    pub catcher: Option<f64>,
    pub first_base: Option<f64>,
    pub second_base: Option<f64>,
    pub third_base: Option<f64>,
    pub shortstop: Option<f64>,
    pub pitchers_helper: Option<f64>,
    pub left_field: Option<f64>,
    pub right_field: Option<f64>,
    pub center_field: Option<f64>,
    pub left_center: Option<f64>,
    pub right_center: Option<f64>,
    pub infield_score: Option<f64>,
    pub outfield_score: Option<f64>,
    pub defense_score: Option<f64>,
}

impl PositionScoreSet {
    fn slot(&mut self, position: Position) -> &mut Option<f64> {
        match position {
            Position::Pitcher => &mut self.pitcher,
            Position::Catcher => &mut self.catcher,
            Position::FirstBase => &mut self.first_base,
            Position::SecondBase => &mut self.second_base,
            Position::ThirdBase => &mut self.third_base,
            Position::ShortStop => &mut self.shortstop,
            Position::PitchersHelper => &mut self.pitchers_helper,
            Position::LeftField => &mut self.left_field,
            Position::RightField => &mut self.right_field,
            Position::CenterField => &mut self.center_field,
            Position::LeftCenter => &mut self.left_center,
            Position::RightCenter => &mut self.right_center,
        }
    }

    pub fn get(&self, position: Position) -> Option<f64> {
        match position {
            Position::Pitcher => self.pitcher,
            Position::Catcher => self.catcher,
            Position::FirstBase => self.first_base,
            Position::SecondBase => self.second_base,
            Position::ThirdBase => self.third_base,
            Position::ShortStop => self.shortstop,
            Position::PitchersHelper => self.pitchers_helper,
            Position::LeftField => self.left_field,
            Position::RightField => self.right_field,
            Position::CenterField => self.center_field,
            Position::LeftCenter => self.left_center,
            Position::RightCenter => self.right_center,
        }
    }

    fn average_of(&self, positions: &[Position]) -> Option<f64> {
        round1_opt(average(positions.iter().map(|p| self.get(*p))))
    }
}

/// Category-level figures reported next to the positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullEvalAggregates {
    pub athletic_score: Option<f64>,
    pub hitting_score: Option<f64>,
    pub throwing_score: Option<f64>,
    pub catching_score: Option<f64>,
    pub fielding_score: Option<f64>,
    pub speed_score: Option<f64>,
    pub offense_score: Option<f64>,
    pub pitching_score: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullEvalReport {
    pub player_id: String,
    pub tier: AgeTier,
    pub position_scores: PositionScoreSet,
    pub aggregates: FullEvalAggregates,
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// `numerator / denominator` clamped to `[0, 1]`, scaled to 0-50, one decimal.
pub fn ratio_to_score(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 || !numerator.is_finite() {
        return 0.0;
    }
    round1((numerator / denominator).clamp(0.0, 1.0) * 50.0)
}

/// Compose the full-evaluation report from whichever category records were
/// found. Missing categories simply leave their terms absent.
pub fn compose_full_eval(
    player_id: &str,
    tier: AgeTier,
    records: &BTreeMap<CategoryKind, CategoryRecord>,
) -> Result<FullEvalReport, ProfileError> {
    let profile = tier.profile();
    let full_eval = profile.full_eval()?;

    let mut positions = PositionScoreSet::default();
    for formula in &full_eval.positions {
        *positions.slot(formula.position) = position_score(formula, full_eval, records);
    }
    positions.infield_score = positions.average_of(INFIELD_POSITIONS);
    positions.outfield_score = positions.average_of(OUTFIELD_POSITIONS);
    positions.defense_score = positions.average_of(&Position::ALL);

    let score = |kind: CategoryKind| records.get(&kind).and_then(|r| r.score);
    let hitting_score = score(CategoryKind::Hitting);
    let throwing_score = score(CategoryKind::Throwing);
    let speed_score = records
        .get(&CategoryKind::Athletic)
        .and_then(|r| r.derived("speed_score"));
    let offense_score = match (hitting_score, speed_score) {
        (Some(hitting), Some(speed)) => Some(round1(
            OFFENSE_HITTING_WEIGHT * hitting + OFFENSE_SPEED_WEIGHT * speed,
        )),
        (hitting, _) => hitting,
    };
    let last_updated = records.values().filter_map(|r| r.performed_at).max();

    debug!(
        "full evaluation for player {} ({}): {} of {} categories found, defense {:?}",
        player_id,
        tier,
        records.len(),
        FullEvalProfile::CATEGORIES.len(),
        positions.defense_score
    );

    Ok(FullEvalReport {
        player_id: player_id.to_string(),
        tier,
        position_scores: positions,
        aggregates: FullEvalAggregates {
            athletic_score: score(CategoryKind::Athletic),
            hitting_score,
            throwing_score,
            catching_score: score(CategoryKind::Catching),
            fielding_score: score(CategoryKind::Fielding),
            speed_score,
            offense_score,
            pitching_score: throwing_score,
            last_updated,
        },
    })
}

/// Weighted blend of category scores and clamped sub-test points over the
/// formula's fixed denominator. `None` when every term is absent.
fn position_score(
    formula: &PositionFormula,
    full_eval: &FullEvalProfile,
    records: &BTreeMap<CategoryKind, CategoryRecord>,
) -> Option<f64> {
    let numerator = sum(formula.terms.iter().map(|term| {
        let value = match term.source {
            ScoreSource::Category(kind) => records.get(&kind).and_then(|r| r.score),
            ScoreSource::SubTest { category, test } => clamp(
                records.get(&category).and_then(|r| r.test_points(test)),
                0.0,
                full_eval.sub_test_cap,
            ),
        };
        value.map(|v| term.weight * v)
    }));
    numerator.map(|n| ratio_to_score(n, formula.denominator))
}
