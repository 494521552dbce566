//! Numeric conversion helpers centralizing safe numeric casts and rounding.

use num_traits::cast::cast;

/// Coerce an arbitrary user-entered number into a count of at least 1.
///
/// Non-finite input yields 1. Finite input is truncated toward zero, raised to
/// 1 when smaller, and saturated at `u32::MAX`.
#[must_use]
pub fn coerce_count(value: f64) -> u32 {
    if !value.is_finite() {
        return 1;
    }
    let truncated = value.trunc();
    if truncated < 1.0 {
        return 1;
    }
    let max = cast::<u32, f64>(u32::MAX).unwrap_or(f64::MAX);
    cast::<f64, u32>(truncated.min(max)).unwrap_or(1)
}

/// Round to the nearest multiple of `step`, returning 0.0 for non-finite values.
#[must_use]
pub fn round_to_nearest(value: f64, step: f64) -> f64 {
    if !value.is_finite() || !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    (value / step).round() * step
}

/// Round to `digits` significant figures, returning 0.0 for zero or non-finite values.
#[must_use]
pub fn round_sig_figs(value: f64, digits: u32) -> f64 {
    if !value.is_finite() || value == 0.0 || digits == 0 {
        return 0.0;
    }
    let magnitude = value.abs().log10().floor();
    let digits = f64::from(digits);
    let exponent = digits - 1.0 - magnitude;
    let Some(exponent) = cast::<f64, i32>(exponent) else {
        return 0.0;
    };
    let rounded = if exponent >= 0 {
        let factor = 10_f64.powi(exponent);
        (value * factor).round() / factor
    } else {
        let factor = 10_f64.powi(-exponent);
        (value / factor).round() * factor
    };
    if rounded.is_finite() { rounded } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_count_floors_to_one() {
        assert_eq!(coerce_count(0.0), 1);
        assert_eq!(coerce_count(-5.0), 1);
        assert_eq!(coerce_count(f64::NAN), 1);
        assert_eq!(coerce_count(0.9), 1);
        assert_eq!(coerce_count(-0.5), 1);
        assert_eq!(coerce_count(f64::INFINITY), 1);
        assert_eq!(coerce_count(f64::NEG_INFINITY), 1);
    }

    #[test]
    fn coerce_count_truncates_and_saturates() {
        assert_eq!(coerce_count(3.7), 3);
        assert_eq!(coerce_count(12.0), 12);
        assert_eq!(coerce_count(1e12), u32::MAX);
    }

    #[test]
    fn nearest_step_rounding() {
        assert!((round_to_nearest(1_249.0, 100.0) - 1_200.0).abs() < f64::EPSILON);
        assert!((round_to_nearest(1_250.0, 100.0) - 1_300.0).abs() < f64::EPSILON);
        assert!((round_to_nearest(f64::NAN, 100.0)).abs() < f64::EPSILON);
        assert!((round_to_nearest(10.0, 0.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn significant_figures() {
        assert!((round_sig_figs(0.123_456, 3) - 0.123).abs() < 1e-12);
        assert!((round_sig_figs(98_765.0, 3) - 98_800.0).abs() < 1e-9);
        assert!((round_sig_figs(-4.5678, 3) - -4.57).abs() < 1e-12);
        assert!(round_sig_figs(0.0, 3).abs() < f64::EPSILON);
        assert!(round_sig_figs(f64::INFINITY, 3).abs() < f64::EPSILON);
    }
}
