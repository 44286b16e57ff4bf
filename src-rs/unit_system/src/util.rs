//! Floating point helpers

use std::num::FpCategory;

const TOLERANCE: f64 = 1e-10;

/// Returns `true` if two numbers differ by at most 1e-10, absolute or
/// relative to the smaller magnitude.
#[must_use]
pub const fn is_close(a: f64, b: f64) -> bool {
    #[expect(
        clippy::float_cmp,
        reason = "exact equality is the fast path of the tolerance comparison"
    )]
    if a == b {
        return true;
    }

    if a.is_infinite() || b.is_infinite() || a.is_nan() || b.is_nan() {
        return false;
    }

    let difference = (a - b).abs();
    let relative_tolerance = TOLERANCE * f64::min(a.abs(), b.abs());

    difference <= relative_tolerance || difference <= TOLERANCE
}

/// Returns `true` if every element of the iterator is exactly zero.
///
/// An empty iterator is not considered zero.
#[must_use]
pub fn all_zero<'a>(values: impl IntoIterator<Item = &'a f64>) -> bool {
    let mut values = values.into_iter().peekable();
    values.peek().is_some() && values.all(|value| value.classify() == FpCategory::Zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_values() {
        assert!(is_close(1.0, 1.0));
        assert!(is_close(1.0, 1.0 + 1e-12));
        assert!(is_close(0.1 + 0.2, 0.3));
        assert!(!is_close(1.0, 1.001));
        assert!(!is_close(f64::NAN, f64::NAN));
        assert!(!is_close(f64::INFINITY, 1.0));
    }

    #[test]
    fn zero_detection() {
        assert!(all_zero(&[0.0]));
        assert!(all_zero(&[0.0, -0.0]));
        assert!(!all_zero(&[0.0, 1.0]));
        assert!(!all_zero(&[] as &[f64]));
        assert!(!all_zero(&[f64::MIN_POSITIVE / 2.0]));
        assert!(!all_zero(&[f64::NAN]));
    }
}
