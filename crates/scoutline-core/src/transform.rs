// Point-conversion transforms: raw metric values -> test points.
//
// Every transform reads its own metric key(s) from the snapshot, so a test
// definition can never pair a transform with the wrong input shape. Points
// are always clamped to `[0, test_max]`; an absent raw input yields an
// absent test point rather than zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::numeric::{average, clamp, sum};
use crate::snapshot::{MetricKey, MetricSnapshot};

// ---------------------------------------------------------------------------
// Scalar rules
// ---------------------------------------------------------------------------

/// Linear conversion of a raw value into points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// `points = raw / divisor`
    Divide(f64),
    /// `points = raw * factor`
    Multiply(f64),
}

impl Scale {
    pub fn apply(&self, raw: f64) -> f64 {
        match *self {
            Scale::Divide(divisor) => raw / divisor,
            Scale::Multiply(factor) => raw * factor,
        }
    }
}

/// Faster-is-better bonus: `points = (time_cap - seconds) * factor`, floored at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBonus {
    pub time_cap: f64,
    pub factor: f64,
}

impl TimeBonus {
    pub fn apply(&self, seconds: f64) -> f64 {
        ((self.time_cap - seconds) * self.factor).max(0.0)
    }
}

/// Comparison used by one threshold step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    Above(f64),
    AtLeast(f64),
    Equal(f64),
    AtMost(f64),
    Below(f64),
}

impl Comparison {
    fn matches(&self, raw: f64) -> bool {
        match *self {
            Comparison::Above(bound) => raw > bound,
            Comparison::AtLeast(bound) => raw >= bound,
            Comparison::Equal(bound) => raw == bound,
            Comparison::AtMost(bound) => raw <= bound,
            Comparison::Below(bound) => raw < bound,
        }
    }
}

/// One row of a discrete step table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdStep {
    pub when: Comparison,
    pub points: f64,
}

/// Ordered step table; the first matching step wins, no match scores 0.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTable(pub Vec<ThresholdStep>);

impl StepTable {
    /// Trunk/shoulder rotation screen: past 180 degrees scores 3, exactly 180 scores 1.
    pub fn rotation() -> Self {
        StepTable(vec![
            ThresholdStep {
                when: Comparison::Above(180.0),
                points: 3.0,
            },
            ThresholdStep {
                when: Comparison::Equal(180.0),
                points: 1.0,
            },
        ])
    }

    pub fn apply(&self, raw: f64) -> f64 {
        self.0
            .iter()
            .find(|step| step.when.matches(raw))
            .map(|step| step.points)
            .unwrap_or(0.0)
    }
}

/// How an averaged pair of trials becomes points.
#[derive(Debug, Clone, PartialEq)]
pub enum PairScoring {
    Linear(Scale),
    InverseTime(TimeBonus),
    Threshold(StepTable),
    Direct,
}

impl PairScoring {
    fn apply(&self, raw: f64) -> f64 {
        match self {
            PairScoring::Linear(scale) => scale.apply(raw),
            PairScoring::InverseTime(bonus) => bonus.apply(raw),
            PairScoring::Threshold(steps) => steps.apply(raw),
            PairScoring::Direct => raw,
        }
    }
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// Reusable point-conversion algorithm bound to its metric key(s).
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    LinearScale {
        key: MetricKey,
        scale: Scale,
    },
    /// `fps = distance / seconds`, `points = (fps - baseline_fps) * factor`.
    SpeedFromDistanceTime {
        time_key: MetricKey,
        distance_key: MetricKey,
        default_distance_ft: f64,
        baseline_fps: f64,
        factor: f64,
    },
    InverseTimeBonus {
        key: MetricKey,
        bonus: TimeBonus,
    },
    DiscreteThreshold {
        key: MetricKey,
        steps: StepTable,
    },
    DirectPassthrough {
        key: MetricKey,
    },
    /// Null-safe mean of two trials, then `then`.
    AveragePair {
        left: MetricKey,
        right: MetricKey,
        then: PairScoring,
    },
    /// Null-safe sum of per-rep points.
    SumOfReps {
        keys: Vec<MetricKey>,
    },
}

impl Transform {
    /// Every metric key this transform may read.
    pub fn metric_keys(&self) -> Vec<&MetricKey> {
        match self {
            Transform::LinearScale { key, .. }
            | Transform::InverseTimeBonus { key, .. }
            | Transform::DiscreteThreshold { key, .. }
            | Transform::DirectPassthrough { key } => vec![key],
            Transform::SpeedFromDistanceTime {
                time_key,
                distance_key,
                ..
            } => vec![time_key, distance_key],
            Transform::AveragePair { left, right, .. } => vec![left, right],
            Transform::SumOfReps { keys } => keys.iter().collect(),
        }
    }

    /// The metric whose raw value is recorded as the test's raw value for
    /// single-input transforms.
    pub fn primary_key(&self) -> Option<&MetricKey> {
        match self {
            Transform::LinearScale { key, .. }
            | Transform::InverseTimeBonus { key, .. }
            | Transform::DiscreteThreshold { key, .. }
            | Transform::DirectPassthrough { key } => Some(key),
            Transform::SpeedFromDistanceTime { time_key, .. } => Some(time_key),
            Transform::AveragePair { .. } | Transform::SumOfReps { .. } => None,
        }
    }

    /// Apply the transform to a snapshot, clamping points to `[0, test_max]`.
    pub fn evaluate(&self, snapshot: &MetricSnapshot, test_max: f64) -> TestPoint {
        match self {
            Transform::LinearScale { key, scale } => {
                let raw = snapshot.get(key);
                TestPoint::single(raw, raw.map(|v| scale.apply(v)), test_max)
            }
            Transform::SpeedFromDistanceTime {
                time_key,
                distance_key,
                default_distance_ft,
                baseline_fps,
                factor,
            } => {
                let seconds = snapshot.get(time_key);
                let distance = snapshot.get(distance_key).unwrap_or(*default_distance_ft);
                let fps = seconds.map(|t| distance / t);
                let points = fps.map(|f| (f - baseline_fps) * factor);
                let mut detail = BTreeMap::new();
                detail.insert("distance_ft".to_string(), Some(distance));
                detail.insert("feet_per_second".to_string(), fps.filter(|f| f.is_finite()));
                TestPoint {
                    raw_value: seconds,
                    points: clamp(points, 0.0, test_max),
                    detail,
                }
            }
            Transform::InverseTimeBonus { key, bonus } => {
                let raw = snapshot.get(key);
                TestPoint::single(raw, raw.map(|v| bonus.apply(v)), test_max)
            }
            Transform::DiscreteThreshold { key, steps } => {
                let raw = snapshot.get(key);
                TestPoint::single(raw, raw.map(|v| steps.apply(v)), test_max)
            }
            Transform::DirectPassthrough { key } => {
                let raw = snapshot.get(key);
                TestPoint::single(raw, raw, test_max)
            }
            Transform::AveragePair { left, right, then } => {
                let l = snapshot.get(left);
                let r = snapshot.get(right);
                let raw = average([l, r]);
                let mut detail = BTreeMap::new();
                detail.insert(left.to_string(), l);
                detail.insert(right.to_string(), r);
                TestPoint {
                    raw_value: raw,
                    points: clamp(raw.map(|v| then.apply(v)), 0.0, test_max),
                    detail,
                }
            }
            Transform::SumOfReps { keys } => {
                let reps: Vec<(String, Option<f64>)> = keys
                    .iter()
                    .map(|k| (k.to_string(), snapshot.get(k)))
                    .collect();
                let raw = sum(reps.iter().map(|(_, v)| *v));
                TestPoint {
                    raw_value: raw,
                    points: clamp(raw, 0.0, test_max),
                    detail: reps.into_iter().collect(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Test points
// ---------------------------------------------------------------------------

/// Result of one transform: the raw value and its clamped points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPoint {
    pub raw_value: Option<f64>,
    pub points: Option<f64>,
    /// Per-input values for multi-input tests (trials, reps, distance).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub detail: BTreeMap<String, Option<f64>>,
}

impl TestPoint {
    fn single(raw: Option<f64>, points: Option<f64>, test_max: f64) -> Self {
        TestPoint {
            raw_value: raw,
            points: clamp(points, 0.0, test_max),
            detail: BTreeMap::new(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.points.is_some()
    }
}

// ---------------------------------------------------------------------------
// Constructors used by the tier tables
// ---------------------------------------------------------------------------

pub fn linear(key: &str, divisor: f64) -> Transform {
    Transform::LinearScale {
        key: key.into(),
        scale: Scale::Divide(divisor),
    }
}

/// Speed test over `<test>_seconds` with an optional `<test>_distance_ft` override.
pub fn speed(test: &str, default_distance_ft: f64, baseline_fps: f64, factor: f64) -> Transform {
    Transform::SpeedFromDistanceTime {
        time_key: MetricKey::new(format!("{test}_seconds")),
        distance_key: MetricKey::new(format!("{test}_distance_ft")),
        default_distance_ft,
        baseline_fps,
        factor,
    }
}

pub fn inverse_time(key: &str, time_cap: f64, factor: f64) -> Transform {
    Transform::InverseTimeBonus {
        key: key.into(),
        bonus: TimeBonus { time_cap, factor },
    }
}

pub fn rotation(key: &str) -> Transform {
    Transform::DiscreteThreshold {
        key: key.into(),
        steps: StepTable::rotation(),
    }
}

pub fn direct(key: &str) -> Transform {
    Transform::DirectPassthrough { key: key.into() }
}

pub fn pair(left: &str, right: &str, then: PairScoring) -> Transform {
    Transform::AveragePair {
        left: left.into(),
        right: right.into(),
        then,
    }
}

/// Rep group over `<group>_rep_1 ..= <group>_rep_<count>`.
pub fn reps(group: &str, count: usize) -> Transform {
    Transform::SumOfReps {
        keys: (1..=count)
            .map(|i| MetricKey::new(format!("{group}_rep_{i}")))
            .collect(),
    }
}
