// Age-tier profiles: the declarative configuration driving the evaluator.
//
// A profile lists, per category, which metrics feed which test, the
// transform and its parameters, each test's ceiling, the derived
// percentages, and the tier's rules for rolling categories up into
// overall/offense/defense/pitching. The full-evaluation position formulas
// hang off the profile as well.

mod battery;
mod coach_pitch;
mod kid_pitch;
mod positional;

use std::collections::BTreeSet;

use crate::error::ProfileError;
use crate::position::Position;
use crate::tier::{AgeTier, CategoryKind, TierFamily};
use crate::transform::Transform;

// ---------------------------------------------------------------------------
// Tests and categories
// ---------------------------------------------------------------------------

/// One measured drill: a transform and its point ceiling.
#[derive(Debug, Clone, PartialEq)]
pub struct TestDef {
    pub name: &'static str,
    pub transform: Transform,
    pub max_points: f64,
}

impl TestDef {
    pub fn new(name: &'static str, transform: Transform, max_points: f64) -> Self {
        TestDef {
            name,
            transform,
            max_points,
        }
    }
}

/// Input to one term of a logistic model.
#[derive(Debug, Clone, PartialEq)]
pub enum LogisticInput {
    /// The test's raw speed, normalized against `[min_mph, max_mph]`.
    Speed {
        test: &'static str,
        min_mph: f64,
        max_mph: f64,
    },
    /// The test's points, normalized against the test's ceiling.
    Points { test: &'static str },
}

impl LogisticInput {
    pub fn test(&self) -> &'static str {
        match self {
            LogisticInput::Speed { test, .. } | LogisticInput::Points { test } => test,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogisticTerm {
    pub weight: f64,
    pub input: LogisticInput,
    /// A required term missing makes the whole probability absent; an
    /// optional term missing is simply left out of the sum.
    pub required: bool,
}

/// `probability = 100 / (1 + e^-(baseline + sum(weight * input)))`
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    pub name: &'static str,
    pub baseline: f64,
    pub terms: Vec<LogisticTerm>,
}

/// A named sub-percentage computed from a category's test points.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedFormula {
    /// Present points of `tests` over their combined ceilings, times `scale`.
    PointsRatio {
        name: &'static str,
        tests: Vec<&'static str>,
        scale: f64,
    },
    Logistic(LogisticModel),
}

impl DerivedFormula {
    pub fn name(&self) -> &'static str {
        match self {
            DerivedFormula::PointsRatio { name, .. } => name,
            DerivedFormula::Logistic(model) => model.name,
        }
    }

    /// Names of every test the formula reads.
    pub fn tests(&self) -> Vec<&'static str> {
        match self {
            DerivedFormula::PointsRatio { tests, .. } => tests.clone(),
            DerivedFormula::Logistic(model) => model.terms.iter().map(|t| t.input.test()).collect(),
        }
    }
}

/// One category's ordered test battery.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDef {
    pub kind: CategoryKind,
    pub tests: Vec<TestDef>,
    pub derived: Vec<DerivedFormula>,
}

impl CategoryDef {
    pub fn new(kind: CategoryKind, tests: Vec<TestDef>) -> Self {
        CategoryDef {
            kind,
            tests,
            derived: Vec::new(),
        }
    }

    pub fn with_derived(mut self, formula: DerivedFormula) -> Self {
        self.derived.push(formula);
        self
    }

    /// Fixed category ceiling: the sum of every declared test ceiling,
    /// independent of which tests an assessment actually performed.
    pub fn max_points(&self) -> f64 {
        self.tests.iter().map(|t| t.max_points).sum()
    }

    pub fn test(&self, name: &str) -> Option<&TestDef> {
        self.tests.iter().find(|t| t.name == name)
    }
}

// ---------------------------------------------------------------------------
// Roll-up rules
// ---------------------------------------------------------------------------

/// How several category scores fold into one summary score.
#[derive(Debug, Clone, PartialEq)]
pub enum CombinationRule {
    /// Null-skipping average of the listed categories.
    AverageOf(Vec<CategoryKind>),
    /// First non-null score in the listed priority order.
    FirstAvailable(Vec<CategoryKind>),
}

impl CombinationRule {
    pub fn categories(&self) -> &[CategoryKind] {
        match self {
            CombinationRule::AverageOf(kinds) | CombinationRule::FirstAvailable(kinds) => kinds,
        }
    }
}

// ---------------------------------------------------------------------------
// Full-evaluation position formulas
// ---------------------------------------------------------------------------

/// Where a position term reads its value from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreSource {
    /// A whole category score (0-50).
    Category(CategoryKind),
    /// One test's points from a category breakdown, clamped to the profile's
    /// sub-test cap.
    SubTest {
        category: CategoryKind,
        test: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionTerm {
    pub weight: f64,
    pub source: ScoreSource,
}

/// `score = ratio_to_score(sum(weight * value), denominator)`
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFormula {
    pub position: Position,
    pub terms: Vec<PositionTerm>,
    /// Fixed weighted denominator; not reduced when terms are absent.
    pub denominator: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FullEvalProfile {
    /// Ceiling applied to sub-test points read from a breakdown.
    pub sub_test_cap: f64,
    pub positions: Vec<PositionFormula>,
}

impl FullEvalProfile {
    /// The categories a full evaluation fetches.
    pub const CATEGORIES: [CategoryKind; 5] = [
        CategoryKind::Athletic,
        CategoryKind::Hitting,
        CategoryKind::Throwing,
        CategoryKind::Catching,
        CategoryKind::Fielding,
    ];

    pub fn formula(&self, position: Position) -> Option<&PositionFormula> {
        self.positions.iter().find(|f| f.position == position)
    }
}

/// Shorthand for a weighted category term.
pub(crate) fn cat(weight: f64, kind: CategoryKind) -> PositionTerm {
    PositionTerm {
        weight,
        source: ScoreSource::Category(kind),
    }
}

/// Shorthand for a weighted fielding sub-test term.
pub(crate) fn field_sub(weight: f64, test: &'static str) -> PositionTerm {
    PositionTerm {
        weight,
        source: ScoreSource::SubTest {
            category: CategoryKind::Fielding,
            test,
        },
    }
}

// ---------------------------------------------------------------------------
// Tier profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TierProfile {
    pub tier: AgeTier,
    pub categories: Vec<CategoryDef>,
    pub overall: CombinationRule,
    pub offense: CombinationRule,
    pub defense: CombinationRule,
    pub pitching: CategoryKind,
    pub full_eval: Option<FullEvalProfile>,
}

impl TierProfile {
    /// Build the profile for `tier`. Profiles are plain values; nothing is
    /// cached between calls.
    pub fn for_tier(tier: AgeTier) -> Self {
        match tier.family() {
            TierFamily::CoachPitch => coach_pitch::profile(tier),
            TierFamily::KidPitch => kid_pitch::profile(tier),
            TierFamily::Positional => positional::profile(tier),
        }
    }

    pub fn category(&self, kind: CategoryKind) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.kind == kind)
    }

    /// Registry of every metric key this tier reads.
    pub fn metric_keys(&self) -> BTreeSet<&str> {
        self.categories
            .iter()
            .flat_map(|c| c.tests.iter())
            .flat_map(|t| t.transform.metric_keys())
            .map(|k| k.as_str())
            .collect()
    }

    /// Check internal references: test names are unique per category, every
    /// derived formula and position sub-test names a declared test, and every
    /// roll-up names a declared category.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let tier = self.tier.label().to_string();

        for category in &self.categories {
            let mut seen = BTreeSet::new();
            for test in &category.tests {
                if !seen.insert(test.name) {
                    return Err(ProfileError::DuplicateTest {
                        tier,
                        category: category.kind.to_string(),
                        test: test.name.to_string(),
                    });
                }
            }
            for formula in &category.derived {
                if let Some(missing) = formula.tests().into_iter().find(|t| category.test(t).is_none()) {
                    return Err(ProfileError::UnresolvedTest {
                        tier,
                        category: category.kind.to_string(),
                        test: missing.to_string(),
                    });
                }
            }
        }

        let rules = [&self.overall, &self.offense, &self.defense];
        let rolled_up = rules
            .iter()
            .flat_map(|r| r.categories().iter().copied())
            .chain(std::iter::once(self.pitching));
        for kind in rolled_up {
            if self.category(kind).is_none() {
                return Err(ProfileError::UnresolvedTest {
                    tier,
                    category: kind.to_string(),
                    test: "<category>".to_string(),
                });
            }
        }

        if let Some(full_eval) = &self.full_eval {
            for term in full_eval.positions.iter().flat_map(|f| f.terms.iter()) {
                let (kind, test) = match term.source {
                    ScoreSource::Category(kind) => (kind, None),
                    ScoreSource::SubTest { category, test } => (category, Some(test)),
                };
                let resolved = self
                    .category(kind)
                    .is_some_and(|c| test.map_or(true, |t| c.test(t).is_some()));
                if !resolved {
                    return Err(ProfileError::UnresolvedTest {
                        tier,
                        category: kind.to_string(),
                        test: test.unwrap_or("<category>").to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// The full-evaluation position profile, or an error for tiers whose
    /// categories are already split by position.
    pub fn full_eval(&self) -> Result<&FullEvalProfile, ProfileError> {
        self.full_eval
            .as_ref()
            .ok_or_else(|| ProfileError::NoFullEvaluation(self.tier.label().to_string()))
    }
}

impl AgeTier {
    pub fn profile(&self) -> TierProfile {
        TierProfile::for_tier(*self)
    }
}

// ---------------------------------------------------------------------------
// Formula shorthands shared by the tier tables
// ---------------------------------------------------------------------------

/// Percentage of combined ceiling (0-100).
pub(crate) fn percent_of(name: &'static str, tests: &[&'static str]) -> DerivedFormula {
    DerivedFormula::PointsRatio {
        name,
        tests: tests.to_vec(),
        scale: 100.0,
    }
}

/// Sub-score on the common 0-50 scale.
pub(crate) fn sub_score(name: &'static str, tests: &[&'static str]) -> DerivedFormula {
    DerivedFormula::PointsRatio {
        name,
        tests: tests.to_vec(),
        scale: 50.0,
    }
}

pub(crate) fn required(weight: f64, input: LogisticInput) -> LogisticTerm {
    LogisticTerm {
        weight,
        input,
        required: true,
    }
}

pub(crate) fn optional(weight: f64, input: LogisticInput) -> LogisticTerm {
    LogisticTerm {
        weight,
        input,
        required: false,
    }
}

/// Contact and power percentages shared by every hitting battery that
/// measures exit velocity.
pub(crate) fn contact_and_power() -> [DerivedFormula; 2] {
    [
        percent_of("contact_score", &["tee_line_drive", "pitch_matrix"]),
        percent_of("power_score", &["exit_velocity", "pitch_matrix", "bat_speed"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{direct, linear};

    #[test]
    fn every_builtin_profile_validates() {
        for tier in AgeTier::ALL {
            let profile = tier.profile();
            assert_eq!(profile.tier, tier);
            profile
                .validate()
                .unwrap_or_else(|e| panic!("{tier} failed validation: {e}"));
        }
    }

    #[test]
    fn category_max_is_sum_of_test_maxima() {
        let profile = AgeTier::U6.profile();
        let hitting = profile.category(CategoryKind::Hitting).unwrap();
        assert_eq!(hitting.max_points(), 39.0);
    }

    #[test]
    fn validate_rejects_unresolved_derived_test() {
        let mut profile = AgeTier::U9.profile();
        let hitting = profile
            .categories
            .iter_mut()
            .find(|c| c.kind == CategoryKind::Hitting)
            .unwrap();
        hitting.derived.push(percent_of("typo_score", &["tee_line_driv"]));
        let err = profile.validate().unwrap_err();
        assert_eq!(
            err,
            ProfileError::UnresolvedTest {
                tier: "9U".into(),
                category: "hitting".into(),
                test: "tee_line_driv".into(),
            }
        );
    }

    #[test]
    fn validate_rejects_duplicate_tests() {
        let mut profile = AgeTier::U7.profile();
        profile.categories.push(CategoryDef::new(
            CategoryKind::Pitching,
            vec![
                TestDef::new("velo", linear("a", 1.0), 5.0),
                TestDef::new("velo", direct("b"), 5.0),
            ],
        ));
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::DuplicateTest { .. })
        ));
    }

    #[test]
    fn validate_rejects_unresolved_position_sub_test() {
        let mut profile = AgeTier::U8.profile();
        let full_eval = profile.full_eval.as_mut().unwrap();
        full_eval.positions[0].terms.push(field_sub(1.0, "grounders_dh"));
        assert!(matches!(
            profile.validate(),
            Err(ProfileError::UnresolvedTest { ref test, .. }) if test == "grounders_dh"
        ));
    }

    #[test]
    fn validate_rejects_roll_up_of_missing_category() {
        let mut profile = AgeTier::U13.profile();
        profile.defense = CombinationRule::AverageOf(vec![CategoryKind::Fielding]);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn full_eval_only_for_five_category_tiers() {
        assert!(AgeTier::U6.profile().full_eval().is_ok());
        assert!(AgeTier::U12.profile().full_eval().is_ok());
        assert_eq!(
            AgeTier::U13.profile().full_eval().unwrap_err(),
            ProfileError::NoFullEvaluation("13U".into())
        );
    }

    #[test]
    fn metric_registry_includes_every_rep_and_distance_key() {
        let profile = AgeTier::U11.profile();
        let keys = profile.metric_keys();
        assert!(keys.contains("grounders_ss_rep_4"));
        assert!(!keys.contains("grounders_ss_rep_5"));
        assert!(keys.contains("run_4b_distance_ft"));
        assert!(keys.contains("balance_left_seconds"));
        assert!(keys.contains("changeup_strike_points"));
    }

    #[test]
    fn profiles_are_rebuilt_identically() {
        assert_eq!(AgeTier::U15.profile(), AgeTier::U15.profile());
    }
}
