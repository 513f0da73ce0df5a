// Category evaluator: one category definition applied to one snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::derived::evaluate_derived;
use crate::numeric::{round1, sum};
use crate::profile::CategoryDef;
use crate::snapshot::MetricSnapshot;
use crate::tier::CategoryKind;
use crate::transform::TestPoint;

/// Every raw value and point value computed for a category, plus its
/// derived percentages at the top level (`contact_score`, `speed_score`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub tests: BTreeMap<String, TestPoint>,
    #[serde(flatten)]
    pub derived: BTreeMap<String, Option<f64>>,
}

impl CategoryBreakdown {
    pub fn test_points(&self, test: &str) -> Option<f64> {
        self.tests.get(test).and_then(|tp| tp.points)
    }

    pub fn derived(&self, name: &str) -> Option<f64> {
        self.derived.get(name).copied().flatten()
    }
}

/// Scored category: points summed over present tests, scaled to 0-50 against
/// the fixed category ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: CategoryKind,
    pub score: Option<f64>,
    pub total_points: Option<f64>,
    pub max_points: f64,
    pub breakdown: CategoryBreakdown,
}

/// Evaluate one category.
///
/// `score = round1(total_points / max_points * 50)` where `max_points` is the
/// declared ceiling of every test, performed or not. A category with no
/// present test scores `None`.
pub fn evaluate_category(def: &CategoryDef, snapshot: &MetricSnapshot) -> CategoryResult {
    let tests: BTreeMap<String, TestPoint> = def
        .tests
        .iter()
        .map(|t| (t.name.to_string(), t.transform.evaluate(snapshot, t.max_points)))
        .collect();

    let total_points = sum(tests.values().map(|tp| tp.points));
    let max_points = def.max_points();
    let score = total_points
        .filter(|_| max_points > 0.0)
        .map(|total| round1(total / max_points * 50.0));

    let derived = def
        .derived
        .iter()
        .map(|f| (f.name().to_string(), evaluate_derived(f, def, &tests)))
        .collect();

    debug!(
        "evaluated {} category: {:?} of {} points -> score {:?}",
        def.kind, total_points, max_points, score
    );

    CategoryResult {
        category: def.kind,
        score,
        total_points,
        max_points,
        breakdown: CategoryBreakdown { tests, derived },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::TestDef;
    use crate::tier::AgeTier;
    use crate::transform::{direct, linear};

    fn hitting_6u() -> CategoryDef {
        AgeTier::U6
            .profile()
            .category(CategoryKind::Hitting)
            .cloned()
            .unwrap()
    }

    #[test]
    fn full_marks_score_fifty() {
        let snapshot = MetricSnapshot::from_numbers([
            ("tee_line_drive_points", 10.0),
            ("pitch_matrix_points", 20.0),
            ("bat_speed_mph", 45.0),
        ]);
        let result = evaluate_category(&hitting_6u(), &snapshot);
        assert_eq!(result.total_points, Some(39.0));
        assert_eq!(result.max_points, 39.0);
        assert_eq!(result.score, Some(50.0));
    }

    #[test]
    fn partial_battery_is_not_prorated() {
        let snapshot = MetricSnapshot::from_numbers([("bat_speed_mph", 25.0)]);
        let result = evaluate_category(&hitting_6u(), &snapshot);
        assert_eq!(result.total_points, Some(5.0));
        assert_eq!(result.max_points, 39.0);
        assert_eq!(result.score, Some(6.4));
        assert_eq!(result.breakdown.tests["tee_line_drive"].points, None);
    }

    #[test]
    fn empty_snapshot_scores_none() {
        let result = evaluate_category(&hitting_6u(), &MetricSnapshot::default());
        assert_eq!(result.total_points, None);
        assert_eq!(result.score, None);
        assert_eq!(result.breakdown.tests.len(), 3);
    }

    #[test]
    fn malformed_value_counts_as_absent() {
        let snapshot = MetricSnapshot::from_json(&serde_json::json!({
            "bat_speed_mph": "fast",
            "pitch_matrix_points": "12",
        }));
        let result = evaluate_category(&hitting_6u(), &snapshot);
        assert_eq!(result.breakdown.test_points("bat_speed"), None);
        assert_eq!(result.breakdown.test_points("pitch_matrix"), Some(12.0));
        assert_eq!(result.total_points, Some(12.0));
    }

    #[test]
    fn zero_points_are_present() {
        let def = CategoryDef::new(
            CategoryKind::Throwing,
            vec![
                TestDef::new("a", direct("a_points"), 10.0),
                TestDef::new("b", linear("b_mph", 2.0), 10.0),
            ],
        );
        let result = evaluate_category(&def, &MetricSnapshot::from_numbers([("a_points", 0.0)]));
        assert_eq!(result.total_points, Some(0.0));
        assert_eq!(result.score, Some(0.0));
    }

    #[test]
    fn breakdown_serializes_derived_at_top_level() {
        let def = AgeTier::U8.profile().category(CategoryKind::Hitting).cloned().unwrap();
        let snapshot = MetricSnapshot::from_numbers([
            ("tee_line_drive_points", 10.0),
            ("pitch_matrix_points", 10.0),
        ]);
        let result = evaluate_category(&def, &snapshot);
        let json = serde_json::to_value(&result.breakdown).unwrap();
        // (10 + 10) / 30 * 100
        assert_eq!(json["contact_score"], serde_json::json!(66.7));
        assert_eq!(json["tests"]["pitch_matrix"]["points"], serde_json::json!(10.0));

        let back: CategoryBreakdown = serde_json::from_value(json).unwrap();
        assert_eq!(back.derived("contact_score"), Some(66.7));
        assert_eq!(back.tests.len(), result.breakdown.tests.len());
    }
}
