// Coach-pitch tiers (6U, 7U, 8U): 60 ft base paths, five general categories.

use crate::position::Position;
use crate::profile::battery::{self, FIELDING_GROUPS};
use crate::profile::{
    cat, contact_and_power, field_sub, sub_score, CategoryDef, CombinationRule, FullEvalProfile,
    PositionFormula, TestDef, TierProfile,
};
use crate::tier::{AgeTier, CategoryKind};
use crate::transform::{direct, inverse_time, linear, speed};

const BASE_PATH_FT: f64 = 60.0;

/// Rep-group ceiling for every fielding group: three reps scored 0-2.
const REP_CAP: f64 = 6.0;
const REPS_PER_GROUP: usize = 3;

/// Denominator unit per weighted sub-test in the position formulas. Carried
/// over from the later tiers' 12-point groups rather than the 6-point cap
/// above; kept as-is until the rubric owners confirm a value.
const POSITION_SUB_UNIT: f64 = 12.0;

/// Constants that differ between the three coach-pitch tiers.
struct Constants {
    broad_jump_divisor: f64,
    shuttle_cap: f64,
    long_toss_divisor: f64,
    /// 8U adds exit velocity (and with it contact/power percentages).
    exit_velocity: bool,
    /// 8U adds a blocking drill to catching.
    blocking: bool,
}

fn constants(tier: AgeTier) -> Constants {
    match tier {
        AgeTier::U6 => Constants {
            broad_jump_divisor: 8.0,
            shuttle_cap: 15.0,
            long_toss_divisor: 10.0,
            exit_velocity: false,
            blocking: false,
        },
        AgeTier::U7 => Constants {
            broad_jump_divisor: 9.0,
            shuttle_cap: 15.0,
            long_toss_divisor: 12.0,
            exit_velocity: false,
            blocking: false,
        },
        _ => Constants {
            broad_jump_divisor: 10.0,
            shuttle_cap: 14.0,
            long_toss_divisor: 15.0,
            exit_velocity: true,
            blocking: true,
        },
    }
}

pub(crate) fn profile(tier: AgeTier) -> TierProfile {
    let c = constants(tier);
    let all = vec![
        CategoryKind::Athletic,
        CategoryKind::Hitting,
        CategoryKind::Throwing,
        CategoryKind::Catching,
        CategoryKind::Fielding,
    ];

    TierProfile {
        tier,
        categories: vec![
            athletic(&c),
            hitting(&c),
            throwing(&c),
            catching(&c),
            fielding(),
        ],
        overall: CombinationRule::AverageOf(all),
        offense: CombinationRule::FirstAvailable(vec![CategoryKind::Hitting, CategoryKind::Athletic]),
        defense: CombinationRule::AverageOf(vec![
            CategoryKind::Fielding,
            CategoryKind::Catching,
            CategoryKind::Throwing,
        ]),
        pitching: CategoryKind::Throwing,
        full_eval: Some(full_eval()),
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
            TestDef::new("run_1b", speed("run_1b", BASE_PATH_FT, 7.0, 3.0), 15.0),
            TestDef::new("run_4b", speed("run_4b", 4.0 * BASE_PATH_FT, 7.0, 2.0), 10.0),
            battery::broad_jump(c.broad_jump_divisor),
            TestDef::new("shuttle", inverse_time("shuttle_seconds", c.shuttle_cap, 1.0), 6.0),
            rot_left,
            rot_right,
            battery::balance(),
        ],
    )
    .with_derived(sub_score("speed_score", &["run_1b", "run_4b"]))
}

fn hitting(c: &Constants) -> CategoryDef {
    let mut tests: Vec<TestDef> = battery::contact_tests().into();
    tests.push(battery::bat_speed(5.0, 9.0));
    if !c.exit_velocity {
        return CategoryDef::new(CategoryKind::Hitting, tests);
    }

    tests.push(battery::exit_velocity(5.0, 10.0));
    let [contact, power] = contact_and_power();
    CategoryDef::new(CategoryKind::Hitting, tests)
        .with_derived(contact)
        .with_derived(power)
}

fn throwing(c: &Constants) -> CategoryDef {
    CategoryDef::new(
        CategoryKind::Throwing,
        vec![
            TestDef::new("throw_velocity", linear("throw_velocity_mph", 4.0), 10.0),
            TestDef::new("throw_accuracy", direct("throw_accuracy_points"), 10.0),
            TestDef::new("long_toss", linear("long_toss_feet", c.long_toss_divisor), 10.0),
        ],
    )
}

fn catching(c: &Constants) -> CategoryDef {
    let mut tests = vec![
        battery::receiving(),
        TestDef::new("pop_fly", direct("pop_fly_points"), 6.0),
    ];
    if c.blocking {
        tests.push(battery::blocking(6.0));
    }
    CategoryDef::new(CategoryKind::Catching, tests)
}

fn fielding() -> CategoryDef {
    let mut tests = battery::fielding_groups(REPS_PER_GROUP, REP_CAP);
    tests.push(battery::glove_transfer(3.0, 2.0));
    CategoryDef::new(CategoryKind::Fielding, tests)
}

// ---------------------------------------------------------------------------
// Full-evaluation positions
// ---------------------------------------------------------------------------

fn full_eval() -> FullEvalProfile {
    use CategoryKind::{Athletic as A, Catching as C, Fielding as F, Throwing as T};

    let [g1b, g2b, gss, g3b, flf, fcf, frf] = FIELDING_GROUPS;
    let with_subs = 150.0 + 2.0 * POSITION_SUB_UNIT;

    let formula = |position, terms, denominator| PositionFormula {
        position,
        terms,
        denominator,
    };

    FullEvalProfile {
        sub_test_cap: REP_CAP,
        positions: vec![
            formula(Position::Pitcher, vec![cat(2.0, T), cat(1.0, F)], 150.0),
            formula(Position::Catcher, vec![cat(2.0, C), cat(1.0, T)], 150.0),
            formula(
                Position::FirstBase,
                vec![cat(2.0, C), cat(1.0, F), field_sub(2.0, g1b)],
                with_subs,
            ),
            formula(
                Position::SecondBase,
                vec![cat(2.0, F), cat(1.0, C), field_sub(2.0, g2b)],
                with_subs,
            ),
            formula(
                Position::ThirdBase,
                vec![cat(2.0, F), cat(1.0, T), field_sub(2.0, g3b)],
                with_subs,
            ),
            formula(
                Position::ShortStop,
                vec![cat(2.0, F), cat(1.0, T), field_sub(2.0, gss)],
                with_subs,
            ),
            formula(
                Position::PitchersHelper,
                vec![cat(2.0, F), cat(1.0, A), field_sub(1.0, g2b), field_sub(1.0, gss)],
                with_subs,
            ),
            formula(
                Position::LeftField,
                vec![cat(2.0, F), cat(1.0, T), field_sub(2.0, flf)],
                with_subs,
            ),
            formula(
                Position::RightField,
                vec![cat(2.0, F), cat(1.0, T), field_sub(2.0, frf)],
                with_subs,
            ),
            formula(
                Position::CenterField,
                vec![cat(2.0, F), cat(1.0, A), field_sub(2.0, fcf)],
                with_subs,
            ),
            formula(
                Position::LeftCenter,
                vec![cat(2.0, F), cat(1.0, A), field_sub(1.0, flf), field_sub(1.0, fcf)],
                with_subs,
            ),
            formula(
                Position::RightCenter,
                vec![cat(2.0, F), cat(1.0, A), field_sub(1.0, frf), field_sub(1.0, fcf)],
                with_subs,
            ),
        ],
    }
}
