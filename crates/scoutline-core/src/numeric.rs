// Null-aware numeric primitives shared by every transform and formula.
//
// Absent values are `None` throughout. A sum or average of only absent values
// is absent; zero is a present value.

/// Bound `value` to `[min, max]`.
///
/// Returns `None` for an absent or non-finite input, so a division by a zero
/// time never leaks an infinity into a point total.
pub fn clamp(value: Option<f64>, min: f64, max: f64) -> Option<f64> {
    let v = value?;
    if !v.is_finite() {
        return None;
    }
    Some(v.max(min).min(max))
}

/// Sum of the present entries, or `None` when every entry is absent.
pub fn sum<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

/// Mean of the present entries, or `None` when every entry is absent.
pub fn average<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (total, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(total, count), v| (total + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}

/// Round to one decimal place, half away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `round1` lifted over an optional value.
pub fn round1_opt(value: Option<f64>) -> Option<f64> {
    value.map(round1)
}

/// Map `value` from `[min, max]` onto `[0, 1]`, clamping outside the range.
///
/// A degenerate range (`max <= min`) maps everything at or above `max` to 1.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max <= min {
        return if value >= max { 1.0 } else { 0.0 };
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Logistic function scaled to a percentage.
pub fn logistic_percent(x: f64) -> f64 {
    100.0 / (1.0 + (-x).exp())
}

/// First present value in the given order.
pub fn first_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds_and_rejects_non_finite() {
        assert_eq!(clamp(Some(12.0), 0.0, 9.0), Some(9.0));
        assert_eq!(clamp(Some(-3.0), 0.0, 9.0), Some(0.0));
        assert_eq!(clamp(Some(4.5), 0.0, 9.0), Some(4.5));
        assert_eq!(clamp(None, 0.0, 9.0), None);
        assert_eq!(clamp(Some(f64::INFINITY), 0.0, 9.0), None);
        assert_eq!(clamp(Some(f64::NAN), 0.0, 9.0), None);
    }

    #[test]
    fn sum_treats_zero_as_present() {
        assert_eq!(sum([None, Some(0.0), None]), Some(0.0));
        assert_eq!(sum([Some(2.0), None, Some(3.5)]), Some(5.5));
        assert_eq!(sum([None, None]), None);
        assert_eq!(sum(Vec::new()), None);
    }

    #[test]
    fn average_skips_absent_entries() {
        assert_eq!(average([Some(40.0), None, Some(20.0)]), Some(30.0));
        assert_eq!(average([Some(0.0)]), Some(0.0));
        assert_eq!(average([None, None]), None);
    }

    #[test]
    fn round1_is_half_away_from_zero() {
        assert_eq!(round1(6.25), 6.3);
        assert_eq!(round1(-6.25), -6.3);
        assert_eq!(round1(6.41025641), 6.4);
        assert_eq!(round1(50.0), 50.0);
    }

    #[test]
    fn normalize_clamps_to_unit_interval() {
        assert_eq!(normalize(30.0, 30.0, 55.0), 0.0);
        assert_eq!(normalize(55.0, 30.0, 55.0), 1.0);
        assert_eq!(normalize(80.0, 30.0, 55.0), 1.0);
        assert_eq!(normalize(10.0, 30.0, 55.0), 0.0);
        assert!((normalize(42.5, 30.0, 55.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn logistic_percent_is_bounded() {
        assert!((logistic_percent(0.0) - 50.0).abs() < 1e-12);
        assert!(logistic_percent(1000.0) <= 100.0);
        assert!(logistic_percent(-1000.0) >= 0.0);
    }

    #[test]
    fn first_present_respects_order() {
        assert_eq!(first_present([None, Some(3.0), Some(7.0)]), Some(3.0));
        assert_eq!(first_present([None, None]), None);
    }
}
