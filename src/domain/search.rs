//! Float tolerance helpers and bisection search.
//!
//! All matching comparisons go through these helpers so that the preview
//! path and the authoritative path agree on every edge.

/// Absolute tolerance for amount and probability comparisons.
pub const EPSILON: f64 = 1e-8;

pub fn floating_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

pub fn floating_greater_equal(a: f64, b: f64) -> bool {
    a + EPSILON >= b
}

pub fn floating_lesser_equal(a: f64, b: f64) -> bool {
    a - EPSILON <= b
}

/// Bisects `(min, max)` for a root of a monotonically increasing
/// `comparator`.
///
/// A positive comparison moves `max` down, a negative one moves `min` up.
/// Stops on an exact zero or once the midpoint can no longer be
/// distinguished from either bound (full f64 precision).
pub fn binary_search<E>(
    mut min: f64,
    mut max: f64,
    mut comparator: impl FnMut(f64) -> Result<f64, E>,
) -> Result<f64, E> {
    let mut mid;
    loop {
        mid = min + (max - min) / 2.0;
        if mid == min || mid == max {
            break;
        }
        let comparison = comparator(mid)?;
        if comparison == 0.0 {
            break;
        } else if comparison > 0.0 {
            max = mid;
        } else {
            min = mid;
        }
    }
    Ok(mid)
}
