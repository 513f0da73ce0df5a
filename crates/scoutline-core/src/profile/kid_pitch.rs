// Kid-pitch tiers (9U-12U): five general categories, pitching-based throwing
// battery with a strike-probability model.

use crate::position::Position;
use crate::profile::battery::{self, FIELDING_GROUPS};
use crate::profile::{
    cat, contact_and_power, field_sub, optional, required, sub_score, CategoryDef,
    CombinationRule, DerivedFormula, FullEvalProfile, LogisticInput, LogisticModel,
    PositionFormula, TestDef, TierProfile,
};
use crate::tier::{AgeTier, CategoryKind};
use crate::transform::{inverse_time, linear, speed};

const STRIKE_BASELINE: f64 = -1.5;
const STRIKE_SPEED_WEIGHT: f64 = 1.5;
const STRIKE_ACCURACY_WEIGHT: f64 = 3.0;
const STRIKE_CHANGEUP_WEIGHT: f64 = 0.75;

/// Constants that differ between the four kid-pitch tiers.
struct Constants {
    base_path_ft: f64,
    broad_jump_divisor: f64,
    bat_speed_divisor: f64,
    exit_velocity_divisor: f64,
    long_toss_divisor: f64,
    /// Pitch speed normalization bounds for the strike model (mph).
    strike_speed_bounds: (f64, f64),
    reps_per_group: usize,
    rep_cap: f64,
    /// 11U and 12U add the med-ball toss, changeup, and framing tests.
    upper: bool,
}

fn constants(tier: AgeTier) -> Constants {
    match tier {
        AgeTier::U9 => Constants {
            base_path_ft: 60.0,
            broad_jump_divisor: 10.0,
            bat_speed_divisor: 6.0,
            exit_velocity_divisor: 6.0,
            long_toss_divisor: 15.0,
            strike_speed_bounds: (30.0, 55.0),
            reps_per_group: 3,
            rep_cap: 9.0,
            upper: false,
        },
        AgeTier::U10 => Constants {
            base_path_ft: 60.0,
            broad_jump_divisor: 10.0,
            bat_speed_divisor: 6.0,
            exit_velocity_divisor: 6.0,
            long_toss_divisor: 15.0,
            strike_speed_bounds: (35.0, 58.0),
            reps_per_group: 3,
            rep_cap: 9.0,
            upper: false,
        },
        AgeTier::U11 => Constants {
            base_path_ft: 60.0,
            broad_jump_divisor: 11.0,
            bat_speed_divisor: 6.5,
            exit_velocity_divisor: 7.0,
            long_toss_divisor: 18.0,
            strike_speed_bounds: (38.0, 62.0),
            reps_per_group: 4,
            rep_cap: 12.0,
            upper: true,
        },
        _ => Constants {
            base_path_ft: 70.0,
            broad_jump_divisor: 12.0,
            bat_speed_divisor: 6.5,
            exit_velocity_divisor: 7.0,
            long_toss_divisor: 18.0,
            strike_speed_bounds: (40.0, 65.0),
            reps_per_group: 4,
            rep_cap: 12.0,
            upper: true,
        },
    }
}

pub(crate) fn profile(tier: AgeTier) -> TierProfile {
    let c = constants(tier);

    let overall = if c.upper {
        CombinationRule::FirstAvailable(vec![
            CategoryKind::Hitting,
            CategoryKind::Fielding,
            CategoryKind::Throwing,
            CategoryKind::Catching,
            CategoryKind::Athletic,
        ])
    } else {
        CombinationRule::AverageOf(vec![
            CategoryKind::Athletic,
            CategoryKind::Hitting,
            CategoryKind::Throwing,
            CategoryKind::Catching,
            CategoryKind::Fielding,
        ])
    };

    TierProfile {
        tier,
        categories: vec![
            athletic(&c),
            hitting(&c),
            throwing(&c),
            catching(&c),
            fielding(&c),
        ],
        overall,
        offense: CombinationRule::FirstAvailable(vec![CategoryKind::Hitting, CategoryKind::Athletic]),
        defense: CombinationRule::AverageOf(vec![
            CategoryKind::Fielding,
            CategoryKind::Catching,
            CategoryKind::Throwing,
        ]),
        pitching: CategoryKind::Throwing,
        full_eval: Some(full_eval(c.rep_cap)),
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

fn athletic(c: &Constants) -> CategoryDef {
    let [rot_left, rot_right] = battery::rotation_screens();
    let mut tests = vec![
        TestDef::new("run_1b", speed("run_1b", c.base_path_ft, 8.0, 3.0), 15.0),
        TestDef::new("run_4b", speed("run_4b", 4.0 * c.base_path_ft, 8.0, 2.0), 10.0),
        battery::broad_jump(c.broad_jump_divisor),
        TestDef::new("shuttle", inverse_time("shuttle_seconds", 13.0, 1.5), 6.0),
        rot_left,
        rot_right,
        battery::balance(),
    ];
    if c.upper {
        tests.push(battery::med_ball_toss(3.0));
    }
    CategoryDef::new(CategoryKind::Athletic, tests)
        .with_derived(sub_score("speed_score", &["run_1b", "run_4b"]))
}

fn hitting(c: &Constants) -> CategoryDef {
    let mut tests: Vec<TestDef> = battery::contact_tests().into();
    tests.push(battery::bat_speed(c.bat_speed_divisor, 10.0));
    tests.push(battery::exit_velocity(c.exit_velocity_divisor, 10.0));
    let [contact, power] = contact_and_power();
    CategoryDef::new(CategoryKind::Hitting, tests)
        .with_derived(contact)
        .with_derived(power)
}

fn throwing(c: &Constants) -> CategoryDef {
    let mut tests = vec![
        battery::pitch_velocity(5.0, 12.0),
        battery::pitch_accuracy(),
        TestDef::new("long_toss", linear("long_toss_feet", c.long_toss_divisor), 10.0),
    ];
    if c.upper {
        tests.push(battery::changeup_accuracy());
    }
    CategoryDef::new(CategoryKind::Throwing, tests).with_derived(strike_chance(c))
}

fn strike_chance(c: &Constants) -> DerivedFormula {
    let (min_mph, max_mph) = c.strike_speed_bounds;
    let mut terms = vec![
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
    ];
    if c.upper {
        terms.push(optional(
            STRIKE_CHANGEUP_WEIGHT,
            LogisticInput::Points {
                test: "changeup_accuracy",
            },
        ));
    }
    DerivedFormula::Logistic(LogisticModel {
        name: "strike_chance_percent",
        baseline: STRIKE_BASELINE,
        terms,
    })
}

fn catching(c: &Constants) -> CategoryDef {
    let mut tests = vec![
        battery::receiving(),
        battery::blocking(10.0),
        battery::pop_time(4.0, 5.0),
    ];
    if c.upper {
        tests.push(battery::framing());
    }
    CategoryDef::new(CategoryKind::Catching, tests)
}

fn fielding(c: &Constants) -> CategoryDef {
    let mut tests = battery::fielding_groups(c.reps_per_group, c.rep_cap);
    tests.push(battery::glove_transfer(3.0, 2.0));
    CategoryDef::new(CategoryKind::Fielding, tests)
}

// ---------------------------------------------------------------------------
// Full-evaluation positions
// ---------------------------------------------------------------------------

/// Kid-pitch weighting: pitcher and catcher lean harder on their own
/// category, and sub-test denominators track the tier's rep cap.
fn full_eval(rep_cap: f64) -> FullEvalProfile {
    use CategoryKind::{Athletic as A, Catching as C, Fielding as F, Throwing as T};

    let [g1b, g2b, gss, g3b, flf, fcf, frf] = FIELDING_GROUPS;
    let subs = 2.0 * rep_cap;

    let formula = |position, terms, denominator| PositionFormula {
        position,
        terms,
        denominator,
    };

    FullEvalProfile {
        sub_test_cap: rep_cap,
        positions: vec![
            formula(Position::Pitcher, vec![cat(3.0, T), cat(1.0, F)], 200.0),
            formula(Position::Catcher, vec![cat(3.0, C), cat(1.0, T)], 200.0),
            formula(
                Position::FirstBase,
                vec![cat(2.0, C), cat(1.0, F), field_sub(2.0, g1b)],
                150.0 + subs,
            ),
            formula(
                Position::SecondBase,
                vec![cat(2.0, F), cat(1.0, C), field_sub(2.0, g2b)],
                150.0 + subs,
            ),
            formula(
                Position::ThirdBase,
                vec![cat(2.0, F), cat(2.0, T), field_sub(2.0, g3b)],
                200.0 + subs,
            ),
            formula(
                Position::ShortStop,
                vec![cat(2.0, F), cat(2.0, T), cat(1.0, A), field_sub(2.0, gss)],
                250.0 + subs,
            ),
            formula(
                Position::PitchersHelper,
                vec![cat(2.0, F), cat(1.0, A), field_sub(1.0, g2b), field_sub(1.0, gss)],
                150.0 + subs,
            ),
            formula(
                Position::LeftField,
                vec![cat(2.0, F), cat(1.0, T), field_sub(2.0, flf)],
                150.0 + subs,
            ),
            formula(
                Position::RightField,
                vec![cat(2.0, F), cat(2.0, T), field_sub(2.0, frf)],
                200.0 + subs,
            ),
            formula(
                Position::CenterField,
                vec![cat(2.0, F), cat(2.0, A), field_sub(2.0, fcf)],
                200.0 + subs,
            ),
            formula(
                Position::LeftCenter,
                vec![cat(2.0, F), cat(1.0, A), field_sub(1.0, flf), field_sub(1.0, fcf)],
                150.0 + subs,
            ),
            formula(
                Position::RightCenter,
                vec![cat(2.0, F), cat(1.0, A), field_sub(1.0, frf), field_sub(1.0, fcf)],
                150.0 + subs,
            ),
        ],
    }
}
