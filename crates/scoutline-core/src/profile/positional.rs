// Positional tiers (13U through high school): fielding is split into
// catcher, first base, infield, and outfield batteries, and both hitting and
// pitching carry probability models.

use crate::profile::battery;
use crate::profile::{
    contact_and_power, optional, required, sub_score, CategoryDef, CombinationRule,
    DerivedFormula, LogisticInput, LogisticModel, TestDef, TierProfile,
};
use crate::tier::{AgeTier, CategoryKind};
use crate::transform::{direct, inverse_time, linear, speed};

const SIXTY_YARDS_FT: f64 = 180.0;
const REPS_PER_GROUP: usize = 4;
const REP_CAP: f64 = 12.0;

const STRIKE_BASELINE: f64 = -2.0;
const STRIKE_SPEED_WEIGHT: f64 = 1.8;
const STRIKE_ACCURACY_WEIGHT: f64 = 3.2;
const STRIKE_SECONDARY_WEIGHT: f64 = 0.6;

const STRIKEOUT_BASELINE: f64 = 0.5;
const STRIKEOUT_MATRIX_WEIGHT: f64 = -2.5;
const STRIKEOUT_RECOGNITION_WEIGHT: f64 = -1.5;

/// Constants that differ between the positional tiers.
struct Constants {
    base_path_ft: f64,
    pro_agility_cap: f64,
    med_ball_divisor: f64,
    bat_speed_divisor: f64,
    exit_velocity_divisor: f64,
    strike_speed_bounds: (f64, f64),
    /// 15U and up rank categories for the overall score instead of averaging.
    ranked_overall: bool,
}

fn constants(tier: AgeTier) -> Constants {
    match tier {
        AgeTier::U13 => Constants {
            base_path_ft: 80.0,
            pro_agility_cap: 7.0,
            med_ball_divisor: 4.0,
            bat_speed_divisor: 7.0,
            exit_velocity_divisor: 8.0,
            strike_speed_bounds: (45.0, 70.0),
            ranked_overall: false,
        },
        AgeTier::U14 => Constants {
            base_path_ft: 90.0,
            pro_agility_cap: 7.0,
            med_ball_divisor: 4.0,
            bat_speed_divisor: 7.0,
            exit_velocity_divisor: 8.0,
            strike_speed_bounds: (50.0, 75.0),
            ranked_overall: false,
        },
        AgeTier::U15 => Constants {
            base_path_ft: 90.0,
            pro_agility_cap: 6.5,
            med_ball_divisor: 4.5,
            bat_speed_divisor: 7.5,
            exit_velocity_divisor: 8.5,
            strike_speed_bounds: (55.0, 80.0),
            ranked_overall: true,
        },
        AgeTier::U16 => Constants {
            base_path_ft: 90.0,
            pro_agility_cap: 6.5,
            med_ball_divisor: 4.5,
            bat_speed_divisor: 7.5,
            exit_velocity_divisor: 8.5,
            strike_speed_bounds: (58.0, 85.0),
            ranked_overall: true,
        },
        _ => Constants {
            base_path_ft: 90.0,
            pro_agility_cap: 6.5,
            med_ball_divisor: 4.5,
            bat_speed_divisor: 8.0,
            exit_velocity_divisor: 9.0,
            strike_speed_bounds: (60.0, 90.0),
            ranked_overall: true,
        },
    }
}

pub(crate) fn profile(tier: AgeTier) -> TierProfile {
    let c = constants(tier);

    let overall = if c.ranked_overall {
        CombinationRule::FirstAvailable(vec![
            CategoryKind::Hitting,
            CategoryKind::Infield,
            CategoryKind::Outfield,
            CategoryKind::Pitching,
            CategoryKind::Catcher,
            CategoryKind::FirstBase,
            CategoryKind::Athletic,
        ])
    } else {
        CombinationRule::AverageOf(vec![
            CategoryKind::Athletic,
            CategoryKind::Hitting,
            CategoryKind::Pitching,
            CategoryKind::Catcher,
            CategoryKind::FirstBase,
            CategoryKind::Infield,
            CategoryKind::Outfield,
        ])
    };

    TierProfile {
        tier,
        categories: vec![
            athletic(&c),
            hitting(&c),
            pitching(&c),
            catcher(),
            first_base(),
            infield(),
            outfield(),
        ],
        overall,
        offense: CombinationRule::FirstAvailable(vec![CategoryKind::Hitting, CategoryKind::Athletic]),
        defense: CombinationRule::FirstAvailable(vec![
            CategoryKind::Infield,
            CategoryKind::Outfield,
            CategoryKind::FirstBase,
            CategoryKind::Catcher,
            CategoryKind::Pitching,
        ]),
        pitching: CategoryKind::Pitching,
        full_eval: None,
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

fn athletic(c: &Constants) -> CategoryDef {
    let [rot_left, rot_right] = battery::rotation_screens();
    CategoryDef::new(
        CategoryKind::Athletic,
        vec![
            TestDef::new("run_1b", speed("run_1b", c.base_path_ft, 10.0, 3.0), 15.0),
            TestDef::new("run_2b", speed("run_2b", 2.0 * c.base_path_ft, 10.0, 2.0), 10.0),
            TestDef::new("sixty_yard", speed("sixty_yard", SIXTY_YARDS_FT, 12.0, 2.5), 10.0),
            battery::broad_jump(12.0),
            TestDef::new(
                "pro_agility",
                inverse_time("pro_agility_seconds", c.pro_agility_cap, 4.0),
                8.0,
            ),
            battery::med_ball_toss(c.med_ball_divisor),
            TestDef::new("vertical_jump", linear("vertical_jump_inches", 3.0), 8.0),
            rot_left,
            rot_right,
        ],
    )
    .with_derived(sub_score("speed_score", &["run_1b", "run_2b", "sixty_yard"]))
}

fn hitting(c: &Constants) -> CategoryDef {
    let mut tests: Vec<TestDef> = battery::contact_tests().into();
    tests.push(battery::bat_speed(c.bat_speed_divisor, 10.0));
    tests.push(battery::exit_velocity(c.exit_velocity_divisor, 12.0));
    tests.push(TestDef::new(
        "pitch_recognition",
        direct("pitch_recognition_points"),
        8.0,
    ));

    let strikeout = DerivedFormula::Logistic(LogisticModel {
        name: "strikeout_chance_percent",
        baseline: STRIKEOUT_BASELINE,
        terms: vec![
            required(
                STRIKEOUT_MATRIX_WEIGHT,
                LogisticInput::Points {
                    test: "pitch_matrix",
                },
            ),
            optional(
                STRIKEOUT_RECOGNITION_WEIGHT,
                LogisticInput::Points {
                    test: "pitch_recognition",
                },
            ),
        ],
    });

    let [contact, power] = contact_and_power();
    CategoryDef::new(CategoryKind::Hitting, tests)
        .with_derived(contact)
        .with_derived(power)
        .with_derived(strikeout)
}

fn pitching(c: &Constants) -> CategoryDef {
    let (min_mph, max_mph) = c.strike_speed_bounds;
    let strike_chance = DerivedFormula::Logistic(LogisticModel {
        name: "strike_chance_percent",
        baseline: STRIKE_BASELINE,
        terms: vec![
            required(
                STRIKE_SPEED_WEIGHT,
                LogisticInput::Speed {
                    test: "pitch_velocity",
                    min_mph,
                    max_mph,
                },
            ),
            required(
                STRIKE_ACCURACY_WEIGHT,
                LogisticInput::Points {
                    test: "pitch_accuracy",
                },
            ),
            optional(
                STRIKE_SECONDARY_WEIGHT,
                LogisticInput::Points {
                    test: "breaking_ball_accuracy",
                },
            ),
            optional(
                STRIKE_SECONDARY_WEIGHT,
                LogisticInput::Points {
                    test: "changeup_accuracy",
                },
            ),
        ],
    });

    CategoryDef::new(
        CategoryKind::Pitching,
        vec![
            battery::pitch_velocity(6.0, 15.0),
            battery::pitch_accuracy(),
            TestDef::new(
                "breaking_ball_accuracy",
                direct("breaking_ball_strike_points"),
                10.0,
            ),
            battery::changeup_accuracy(),
            TestDef::new("delivery_time", inverse_time("delivery_time_seconds", 2.0, 10.0), 5.0),
        ],
    )
    .with_derived(strike_chance)
}

fn catcher() -> CategoryDef {
    CategoryDef::new(
        CategoryKind::Catcher,
        vec![
            battery::receiving(),
            battery::blocking(10.0),
            battery::pop_time(3.0, 10.0),
            battery::framing(),
            TestDef::new(
                "catcher_throw_velocity",
                linear("catcher_throw_velocity_mph", 7.0),
                10.0,
            ),
        ],
    )
}

fn first_base() -> CategoryDef {
    CategoryDef::new(
        CategoryKind::FirstBase,
        vec![
            battery::rep_group("first_base_picks", REPS_PER_GROUP, REP_CAP),
            battery::rep_group("grounders_1b", REPS_PER_GROUP, REP_CAP),
            TestDef::new("first_base_stretch", direct("first_base_stretch_points"), 6.0),
        ],
    )
}

fn infield() -> CategoryDef {
    CategoryDef::new(
        CategoryKind::Infield,
        vec![
            battery::rep_group("grounders_2b", REPS_PER_GROUP, REP_CAP),
            battery::rep_group("grounders_ss", REPS_PER_GROUP, REP_CAP),
            battery::rep_group("grounders_3b", REPS_PER_GROUP, REP_CAP),
            TestDef::new(
                "double_play_feed",
                inverse_time("double_play_feed_seconds", 3.0, 3.0),
                6.0,
            ),
            TestDef::new(
                "infield_throw_velocity",
                linear("infield_throw_velocity_mph", 7.0),
                10.0,
            ),
            battery::glove_transfer(2.5, 3.0),
        ],
    )
}

fn outfield() -> CategoryDef {
    CategoryDef::new(
        CategoryKind::Outfield,
        vec![
            battery::rep_group("fly_balls_lf", REPS_PER_GROUP, REP_CAP),
            battery::rep_group("fly_balls_cf", REPS_PER_GROUP, REP_CAP),
            battery::rep_group("fly_balls_rf", REPS_PER_GROUP, REP_CAP),
            TestDef::new(
                "outfield_throw_velocity",
                linear("outfield_throw_velocity_mph", 7.0),
                12.0,
            ),
            TestDef::new("crow_hop_accuracy", direct("crow_hop_accuracy_points"), 8.0),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ceilings() {
        let profile = AgeTier::U14.profile();
        let max = |kind| profile.category(kind).unwrap().max_points();
        assert_eq!(max(CategoryKind::Athletic), 73.0);
        assert_eq!(max(CategoryKind::Hitting), 60.0);
        assert_eq!(max(CategoryKind::Pitching), 60.0);
        assert_eq!(max(CategoryKind::Catcher), 45.0);
        assert_eq!(max(CategoryKind::FirstBase), 30.0);
        assert_eq!(max(CategoryKind::Infield), 56.0);
        assert_eq!(max(CategoryKind::Outfield), 56.0);
    }

    #[test]
    fn positional_tiers_have_no_general_fielding() {
        for tier in [AgeTier::U13, AgeTier::U16, AgeTier::HighSchool] {
            let profile = tier.profile();
            assert!(profile.category(CategoryKind::Fielding).is_none());
            assert!(profile.category(CategoryKind::Throwing).is_none());
            assert_eq!(profile.categories.len(), 7);
        }
    }

    #[test]
    fn overall_rule_switches_at_15u() {
        assert!(matches!(
            AgeTier::U14.profile().overall,
            CombinationRule::AverageOf(_)
        ));
        assert!(matches!(
            AgeTier::U15.profile().overall,
            CombinationRule::FirstAvailable(_)
        ));
    }

    #[test]
    fn hitting_derives_three_values() {
        let profile = AgeTier::HighSchool.profile();
        let names: Vec<_> = profile
            .category(CategoryKind::Hitting)
            .unwrap()
            .derived
            .iter()
            .map(|d| d.name())
            .collect();
        assert_eq!(
            names,
            vec!["contact_score", "power_score", "strikeout_chance_percent"]
        );
    }
}
