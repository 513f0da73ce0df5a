// Tier rating composer: every category of a tier, then the roll-ups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::evaluator::{evaluate_category, CategoryBreakdown, CategoryResult};
use crate::numeric::{average, first_present, round1_opt};
use crate::profile::{CombinationRule, TierProfile};
use crate::snapshot::MetricSnapshot;
use crate::tier::{AgeTier, CategoryKind};

/// One full, independent evaluation of a snapshot against a tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingResult {
    pub tier: AgeTier,
    pub overall_score: Option<f64>,
    pub offense_score: Option<f64>,
    pub defense_score: Option<f64>,
    pub pitching_score: Option<f64>,
    /// Full category results; each carries its `breakdown` next to the score
    /// and point totals.
    pub categories: BTreeMap<CategoryKind, CategoryResult>,
}

impl RatingResult {
    pub fn category_score(&self, kind: CategoryKind) -> Option<f64> {
        self.categories.get(&kind).and_then(|c| c.score)
    }

    /// Category name -> breakdown, the shape persisted alongside the assessment.
    pub fn breakdown(&self) -> BTreeMap<CategoryKind, &CategoryBreakdown> {
        self.categories
            .iter()
            .map(|(kind, result)| (*kind, &result.breakdown))
            .collect()
    }
}

/// Evaluate `snapshot` against the built-in profile for `tier`.
pub fn evaluate_tier_rating(tier: AgeTier, snapshot: &MetricSnapshot) -> RatingResult {
    evaluate_profile(&tier.profile(), snapshot)
}

/// Evaluate `snapshot` against an explicit profile.
pub fn evaluate_profile(profile: &TierProfile, snapshot: &MetricSnapshot) -> RatingResult {
    let malformed: Vec<&str> = snapshot.malformed_keys().map(|k| k.as_str()).collect();
    if !malformed.is_empty() {
        warn!(
            "{} snapshot has non-numeric values treated as absent: {}",
            profile.tier,
            malformed.join(", ")
        );
    }

    let categories: BTreeMap<CategoryKind, CategoryResult> = profile
        .categories
        .iter()
        .map(|def| (def.kind, evaluate_category(def, snapshot)))
        .collect();

    let scores: BTreeMap<CategoryKind, Option<f64>> = categories
        .iter()
        .map(|(kind, result)| (*kind, result.score))
        .collect();

    let overall_score = combine(&profile.overall, &scores);
    let offense_score = combine(&profile.offense, &scores);
    let defense_score = combine(&profile.defense, &scores);
    let pitching_score = scores.get(&profile.pitching).copied().flatten();

    debug!(
        "{} rating: overall {:?}, offense {:?}, defense {:?}, pitching {:?}",
        profile.tier, overall_score, offense_score, defense_score, pitching_score
    );

    RatingResult {
        tier: profile.tier,
        overall_score,
        offense_score,
        defense_score,
        pitching_score,
        categories,
    }
}

/// Apply a roll-up rule to the category scores. Averages are re-rounded to
/// one decimal; a first-available pick is already rounded.
fn combine(rule: &CombinationRule, scores: &BTreeMap<CategoryKind, Option<f64>>) -> Option<f64> {
    let pick = |kinds: &[CategoryKind]| -> Vec<Option<f64>> {
        kinds
            .iter()
            .map(|k| scores.get(k).copied().flatten())
            .collect()
    };
    match rule {
        CombinationRule::AverageOf(kinds) => round1_opt(average(pick(kinds))),
        CombinationRule::FirstAvailable(kinds) => first_present(pick(kinds)),
    }
}
