// Integration tests for the scoring core.
//
// These drive the public API end to end: snapshot -> tier rating, and
// persisted category results -> full-evaluation report.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;

use scoutline_core::*;

// ===========================================================================
// Test helpers
// ===========================================================================

fn snapshot(values: &[(&str, f64)]) -> MetricSnapshot {
    MetricSnapshot::from_numbers(values.iter().copied())
}

/// A realistic 10U assessment with a few drills skipped.
fn ten_u_assessment() -> MetricSnapshot {
    snapshot(&[
        ("run_1b_seconds", 4.2),
        ("run_4b_seconds", 17.5),
        ("broad_jump_inches", 62.0),
        ("shuttle_seconds", 11.0),
        ("trunk_rotation_left_deg", 185.0),
        ("trunk_rotation_right_deg", 180.0),
        ("tee_line_drive_points", 7.0),
        ("pitch_matrix_points", 14.0),
        ("bat_speed_mph", 48.0),
        ("exit_velocity_mph", 55.0),
        ("pitch_velocity_mph", 44.0),
        ("pitch_strike_points", 12.0),
        ("long_toss_feet", 120.0),
        ("receiving_points", 6.0),
        ("blocking_points", 5.0),
        ("grounders_2b_rep_1", 3.0),
        ("grounders_2b_rep_2", 2.0),
        ("grounders_2b_rep_3", 3.0),
        ("fly_balls_cf_rep_1", 1.0),
        ("glove_transfer_seconds", 2.4),
    ])
}

fn all_scores(rating: &RatingResult) -> Vec<Option<f64>> {
    let mut scores = vec![
        rating.overall_score,
        rating.offense_score,
        rating.defense_score,
        rating.pitching_score,
    ];
    for result in rating.categories.values() {
        scores.push(result.score);
        scores.extend(result.breakdown.derived.values().copied());
    }
    scores
}

fn has_one_decimal(value: f64) -> bool {
    ((value * 10.0).round() - value * 10.0).abs() < 1e-6
}

// ===========================================================================
// Test: Category scoring
// ===========================================================================

#[test]
fn youngest_tier_full_hitting_scores_fifty() {
    let rating = evaluate_tier_rating(
        AgeTier::U6,
        &snapshot(&[
            ("tee_line_drive_points", 10.0),
            ("pitch_matrix_points", 20.0),
            ("bat_speed_mph", 45.0),
        ]),
    );
    let hitting = &rating.categories[&CategoryKind::Hitting];
    assert_eq!(hitting.total_points, Some(39.0));
    assert_eq!(hitting.score, Some(50.0));
    assert_eq!(rating.offense_score, Some(50.0));
}

#[test]
fn partial_hitting_uses_fixed_category_ceiling() {
    let rating = evaluate_tier_rating(AgeTier::U6, &snapshot(&[("bat_speed_mph", 25.0)]));
    let hitting = &rating.categories[&CategoryKind::Hitting];
    assert_eq!(hitting.total_points, Some(5.0));
    assert_eq!(hitting.max_points, 39.0);
    assert_eq!(hitting.score, Some(6.4));
}

#[test]
fn slow_first_base_run_clamps_to_zero() {
    let rating = evaluate_tier_rating(AgeTier::U6, &snapshot(&[("run_1b_seconds", 10.0)]));
    let athletic = &rating.categories[&CategoryKind::Athletic];
    let run = &athletic.breakdown.tests["run_1b"];
    assert_eq!(run.detail["feet_per_second"], Some(6.0));
    assert_eq!(run.points, Some(0.0));
    assert_eq!(athletic.score, Some(0.0));
}

#[test]
fn rotation_screen_thresholds() {
    for (deg, expected) in [(185.0, 3.0), (180.0, 1.0), (170.0, 0.0)] {
        let rating = evaluate_tier_rating(
            AgeTier::U12,
            &snapshot(&[("trunk_rotation_left_deg", deg)]),
        );
        let athletic = &rating.categories[&CategoryKind::Athletic];
        assert_eq!(
            athletic.breakdown.test_points("trunk_rotation_left"),
            Some(expected),
            "{deg} degrees"
        );
    }
}

#[test]
fn extreme_inputs_stay_within_test_ceilings() {
    let mut values: Vec<(String, f64)> = Vec::new();
    for key in AgeTier::HighSchool.profile().metric_keys() {
        values.push((key.to_string(), 1e9));
    }
    for sign in [1.0, -1.0] {
        let snap = MetricSnapshot::from_numbers(values.iter().map(|(k, v)| (k.as_str(), v * sign)));
        let profile = AgeTier::HighSchool.profile();
        let rating = evaluate_profile(&profile, &snap);
        for def in &profile.categories {
            let result = &rating.categories[&def.kind];
            for test in &def.tests {
                if let Some(points) = result.breakdown.test_points(test.name) {
                    assert!(
                        (0.0..=test.max_points).contains(&points),
                        "{} = {points}",
                        test.name
                    );
                }
            }
            if let Some(score) = result.score {
                assert!((0.0..=50.0).contains(&score));
            }
        }
    }
}

#[test]
fn strike_chance_stays_within_percent_bounds() {
    for tier in [AgeTier::U9, AgeTier::U12, AgeTier::U13, AgeTier::HighSchool] {
        let category = match tier.family() {
            TierFamily::Positional => CategoryKind::Pitching,
            _ => CategoryKind::Throwing,
        };
        for (mph, acc) in [(0.0, 0.0), (45.0, 10.0), (200.0, 99.0), (-30.0, -5.0)] {
            let rating = evaluate_tier_rating(
                tier,
                &snapshot(&[("pitch_velocity_mph", mph), ("pitch_strike_points", acc)]),
            );
            let chance = rating.categories[&category]
                .breakdown
                .derived("strike_chance_percent")
                .unwrap();
            assert!((0.0..=100.0).contains(&chance), "{tier}: {chance}");
        }
    }
}

#[test]
fn strike_chance_needs_speed_and_accuracy() {
    let rating = evaluate_tier_rating(AgeTier::U11, &snapshot(&[("pitch_velocity_mph", 50.0)]));
    let throwing = &rating.categories[&CategoryKind::Throwing];
    assert_eq!(throwing.breakdown.derived("strike_chance_percent"), None);
    assert!(throwing.score.is_some());
}

// ===========================================================================
// Test: Tier rating roll-ups
// ===========================================================================

#[test]
fn empty_snapshot_produces_all_null_rating() {
    for tier in AgeTier::ALL {
        let rating = evaluate_tier_rating(tier, &MetricSnapshot::default());
        assert!(all_scores(&rating).iter().all(Option::is_none), "{tier}");
        assert!(rating
            .categories
            .values()
            .all(|c| c.total_points.is_none()));
    }
}

#[test]
fn evaluation_is_deterministic() {
    let snap = ten_u_assessment();
    let first = evaluate_tier_rating(AgeTier::U10, &snap);
    let second = evaluate_tier_rating(AgeTier::U10, &snap);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn emitted_scores_have_at_most_one_decimal() {
    let rating = evaluate_tier_rating(AgeTier::U10, &ten_u_assessment());
    for score in all_scores(&rating).into_iter().flatten() {
        assert!(has_one_decimal(score), "{score}");
    }
}

#[test]
fn positional_overall_follows_declared_rule() {
    let snap = snapshot(&[
        ("sixty_yard_seconds", 7.2),
        ("grounders_ss_rep_1", 3.0),
        ("fly_balls_lf_rep_1", 3.0),
        ("fly_balls_lf_rep_2", 3.0),
    ]);

    // 14U averages every present category.
    let averaged = evaluate_tier_rating(AgeTier::U14, &snap);
    let present: Vec<f64> = averaged
        .categories
        .values()
        .filter_map(|c| c.score)
        .collect();
    assert_eq!(present.len(), 3);

    // 15U takes the first present category: no hitting, so infield.
    let ranked = evaluate_tier_rating(AgeTier::U15, &snap);
    assert_eq!(ranked.overall_score, ranked.category_score(CategoryKind::Infield));
    assert_eq!(ranked.defense_score, ranked.category_score(CategoryKind::Infield));
    assert_eq!(ranked.offense_score, ranked.category_score(CategoryKind::Athletic));
}

#[test]
fn eleven_u_overall_takes_first_present_category() {
    let mut values = vec![
        ("broad_jump_inches", 66.0),
        ("receiving_points", 6.0),
        ("pitch_velocity_mph", 45.0),
        ("grounders_2b_rep_1", 3.0),
    ];

    // No hitting: fielding comes next.
    let rating = evaluate_tier_rating(AgeTier::U11, &snapshot(&values));
    assert!(rating.category_score(CategoryKind::Fielding).is_some());
    assert_eq!(rating.overall_score, rating.category_score(CategoryKind::Fielding));

    values.push(("bat_speed_mph", 52.0));
    let rating = evaluate_tier_rating(AgeTier::U11, &snapshot(&values));
    assert_eq!(rating.overall_score, rating.category_score(CategoryKind::Hitting));

    // Without hitting and fielding, throwing outranks catching and athletic.
    let rating = evaluate_tier_rating(AgeTier::U11, &snapshot(&values[..3]));
    assert_eq!(rating.overall_score, rating.category_score(CategoryKind::Throwing));

    let rating = evaluate_tier_rating(AgeTier::U11, &snapshot(&values[..2]));
    assert_eq!(rating.overall_score, rating.category_score(CategoryKind::Catching));

    let rating = evaluate_tier_rating(AgeTier::U11, &snapshot(&values[..1]));
    assert_eq!(rating.overall_score, rating.category_score(CategoryKind::Athletic));
    assert!(rating.overall_score.is_some());
}

#[test]
fn strict_snapshot_rejects_unknown_keys() {
    let raw = json!({"bat_speed_mph": 40, "bat_sped_mph": 41});
    let err = MetricSnapshot::from_json(&raw)
        .validated_for(AgeTier::U8)
        .unwrap_err();
    assert_eq!(
        err,
        ProfileError::UnknownMetric {
            tier: "8U".into(),
            key: "bat_sped_mph".into(),
        }
    );

    let ok = MetricSnapshot::from_json(&json!({"bat_speed_mph": 40}))
        .validated_for(AgeTier::U8)
        .unwrap();
    assert_eq!(ok.len(), 1);
}

// ===========================================================================
// Test: Full evaluation
// ===========================================================================

/// In-memory lookup keyed by template label.
struct MemorySource(BTreeMap<String, CategoryRecord>);

#[async_trait]
impl CategoryResultSource for MemorySource {
    async fn latest_category_result(
        &self,
        _player_id: &str,
        template_label: &str,
    ) -> Result<Option<CategoryRecord>, LookupError> {
        Ok(self.0.get(template_label).cloned())
    }
}

#[test]
fn second_base_composite_for_coach_pitch() {
    let mut records = BTreeMap::new();
    records.insert(
        CategoryKind::Fielding,
        CategoryRecord {
            score: Some(40.0),
            breakdown: json!({"tests": {"grounders_2b": {"raw_value": 8.0, "points": 8.0}}}),
            performed_at: None,
        },
    );
    records.insert(
        CategoryKind::Catching,
        CategoryRecord {
            score: Some(30.0),
            breakdown: json!({"tests": {}}),
            performed_at: None,
        },
    );
    let report = compose_full_eval("player-1", AgeTier::U8, &records).unwrap();
    assert_eq!(report.position_scores.second_base, Some(35.1));
}

#[tokio::test]
async fn report_from_evaluated_ratings() {
    let tier = AgeTier::U10;
    let performed_at: DateTime<Utc> = "2026-04-11T16:00:00Z".parse().unwrap();
    let rating = evaluate_tier_rating(tier, &ten_u_assessment());

    let records = rating
        .categories
        .iter()
        .map(|(kind, result)| {
            (
                tier.template_label(*kind),
                CategoryRecord::from_result(result, Some(performed_at)),
            )
        })
        .collect();
    let source = MemorySource(records);

    let report = full_eval_report(&source, "player-9", tier).await.unwrap();
    let agg = &report.aggregates;
    assert_eq!(agg.hitting_score, rating.category_score(CategoryKind::Hitting));
    assert_eq!(agg.pitching_score, rating.category_score(CategoryKind::Throwing));
    assert_eq!(agg.last_updated, Some(performed_at));
    assert!(agg.speed_score.is_some());
    assert!(agg.offense_score.is_some());

    let ps = &report.position_scores;
    for pos in Position::ALL {
        let score = ps.get(pos).unwrap();
        assert!((0.0..=50.0).contains(&score) && has_one_decimal(score), "{pos}");
    }
    // Grounders at 2B (8 raw, capped 9 at 10U) lift 2B above 1B.
    assert!(ps.second_base > ps.first_base);
    assert!(ps.defense_score.is_some());
}

#[tokio::test]
async fn report_with_no_history_is_all_null() {
    let source = MemorySource(BTreeMap::new());
    let report = full_eval_report(&source, "nobody", AgeTier::U7).await.unwrap();
    assert_eq!(report.position_scores, PositionScoreSet::default());
    assert_eq!(report.aggregates, FullEvalAggregates::default());
}
