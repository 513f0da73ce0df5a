// Test definitions that recur across tier families with different constants.

use crate::profile::TestDef;
use crate::transform::{direct, inverse_time, linear, pair, reps, rotation, PairScoring, Scale};

/// Rep groups of the fielding battery, one per defensive direction.
pub(crate) const FIELDING_GROUPS: [&str; 7] = [
    "grounders_1b",
    "grounders_2b",
    "grounders_ss",
    "grounders_3b",
    "fly_balls_lf",
    "fly_balls_cf",
    "fly_balls_rf",
];

/// Left and right trunk rotation screens, 3 points each.
pub(crate) fn rotation_screens() -> [TestDef; 2] {
    [
        TestDef::new("trunk_rotation_left", rotation("trunk_rotation_left_deg"), 3.0),
        TestDef::new("trunk_rotation_right", rotation("trunk_rotation_right_deg"), 3.0),
    ]
}

/// Single-leg balance, left/right trials averaged, one point per 5 seconds.
pub(crate) fn balance() -> TestDef {
    TestDef::new(
        "balance",
        pair(
            "balance_left_seconds",
            "balance_right_seconds",
            PairScoring::Linear(Scale::Divide(5.0)),
        ),
        4.0,
    )
}

/// Tee line drives and the pitch matrix, both scored on the field.
pub(crate) fn contact_tests() -> [TestDef; 2] {
    [
        TestDef::new("tee_line_drive", direct("tee_line_drive_points"), 10.0),
        TestDef::new("pitch_matrix", direct("pitch_matrix_points"), 20.0),
    ]
}

pub(crate) fn bat_speed(divisor: f64, max_points: f64) -> TestDef {
    TestDef::new("bat_speed", linear("bat_speed_mph", divisor), max_points)
}

pub(crate) fn exit_velocity(divisor: f64, max_points: f64) -> TestDef {
    TestDef::new("exit_velocity", linear("exit_velocity_mph", divisor), max_points)
}

pub(crate) fn receiving() -> TestDef {
    TestDef::new("receiving", direct("receiving_points"), 10.0)
}

pub(crate) fn blocking(max_points: f64) -> TestDef {
    TestDef::new("blocking", direct("blocking_points"), max_points)
}

pub(crate) fn framing() -> TestDef {
    TestDef::new("framing", direct("framing_points"), 5.0)
}

pub(crate) fn pop_time(time_cap: f64, factor: f64) -> TestDef {
    TestDef::new("pop_time", inverse_time("pop_time_seconds", time_cap, factor), 10.0)
}

pub(crate) fn glove_transfer(time_cap: f64, factor: f64) -> TestDef {
    TestDef::new(
        "glove_transfer",
        inverse_time("glove_transfer_seconds", time_cap, factor),
        4.0,
    )
}

pub(crate) fn med_ball_toss(divisor: f64) -> TestDef {
    TestDef::new("med_ball_toss", linear("med_ball_toss_feet", divisor), 8.0)
}

pub(crate) fn broad_jump(divisor: f64) -> TestDef {
    TestDef::new("broad_jump", linear("broad_jump_inches", divisor), 8.0)
}

pub(crate) fn pitch_velocity(divisor: f64, max_points: f64) -> TestDef {
    TestDef::new("pitch_velocity", linear("pitch_velocity_mph", divisor), max_points)
}

pub(crate) fn pitch_accuracy() -> TestDef {
    TestDef::new("pitch_accuracy", direct("pitch_strike_points"), 20.0)
}

pub(crate) fn changeup_accuracy() -> TestDef {
    TestDef::new("changeup_accuracy", direct("changeup_strike_points"), 10.0)
}

/// A rep group summed and clamped to `cap`.
pub(crate) fn rep_group(group: &'static str, count: usize, cap: f64) -> TestDef {
    TestDef::new(group, reps(group, count), cap)
}

/// All seven fielding rep groups with the same rep count and cap.
pub(crate) fn fielding_groups(count: usize, cap: f64) -> Vec<TestDef> {
    FIELDING_GROUPS
        .iter()
        .map(|group| rep_group(group, count, cap))
        .collect()
}
