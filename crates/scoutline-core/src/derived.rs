// Derived percentages computed from a category's test points.

use std::collections::BTreeMap;

use crate::numeric::{logistic_percent, normalize, round1, sum};
use crate::profile::{CategoryDef, DerivedFormula, LogisticInput, LogisticModel};
use crate::transform::TestPoint;

/// Evaluate one derived formula against the category's already-computed
/// test points. Returns `None` when the formula has nothing to work with.
pub fn evaluate_derived(
    formula: &DerivedFormula,
    category: &CategoryDef,
    points: &BTreeMap<String, TestPoint>,
) -> Option<f64> {
    match formula {
        DerivedFormula::PointsRatio { tests, scale, .. } => {
            points_ratio(tests, *scale, category, points)
        }
        DerivedFormula::Logistic(model) => logistic(model, category, points),
    }
}

/// Present points of `tests` over their combined ceilings, times `scale`.
/// Missing tests add nothing to the numerator but keep their ceiling in the
/// denominator.
fn points_ratio(
    tests: &[&'static str],
    scale: f64,
    category: &CategoryDef,
    points: &BTreeMap<String, TestPoint>,
) -> Option<f64> {
    let numerator = sum(tests
        .iter()
        .map(|name| points.get(*name).and_then(|tp| tp.points)));
    let denominator: f64 = tests
        .iter()
        .filter_map(|name| category.test(name))
        .map(|t| t.max_points)
        .sum();
    if denominator <= 0.0 {
        return None;
    }
    numerator.map(|n| round1(n / denominator * scale))
}

fn logistic(
    model: &LogisticModel,
    category: &CategoryDef,
    points: &BTreeMap<String, TestPoint>,
) -> Option<f64> {
    let mut x = model.baseline;
    for term in &model.terms {
        match logistic_input(&term.input, category, points) {
            Some(value) => x += term.weight * value,
            None if term.required => return None,
            None => {}
        }
    }
    Some(round1(logistic_percent(x)))
}

/// Normalized `[0, 1]` value of one logistic input.
fn logistic_input(
    input: &LogisticInput,
    category: &CategoryDef,
    points: &BTreeMap<String, TestPoint>,
) -> Option<f64> {
    let tp = points.get(input.test())?;
    match *input {
        LogisticInput::Speed {
            min_mph, max_mph, ..
        } => tp.raw_value.map(|mph| normalize(mph, min_mph, max_mph)),
        LogisticInput::Points { test } => {
            let max = category.test(test)?.max_points;
            tp.points.map(|p| normalize(p, 0.0, max))
        }
    }
}
