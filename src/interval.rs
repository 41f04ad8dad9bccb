use crate::error::{Result, SplineError};

/// Returns `Ok(())` when `x` lies inside the closed range of sorted `knots`.
pub(crate) fn check_range(knots: &[f64], x: f64) -> Result<()> {
    let min = knots[0];
    let max = knots[knots.len() - 1];
    if min <= x && x <= max {
        Ok(())
    } else {
        Err(SplineError::OutOfRange { x, min, max })
    }
}

/// Index of the interval `[knots[i], knots[i + 1]]` holding `x`.
///
/// This is the index of the first knot strictly greater than `x`, minus one, clamped so the last
/// knot belongs to the last interval. `x` has to be in range.
pub(crate) fn find_interval_index(knots: &[f64], x: f64) -> usize {
    let mut min = 0;
    let mut max = knots.len() - 1;

    while max - min > 1 {
        let mid = (min + max) / 2;
        if x < knots[mid] {
            max = mid;
        } else {
            min = mid;
        }
    }
    min
}

/// Same as [find_interval_index] but checks `index_hint` and the following interval first,
/// which makes lookups for ascending batches O(1) on average.
pub(crate) fn find_interval_index_with_hint(knots: &[f64], index_hint: usize, x: f64) -> usize {
    let last_interval = knots.len() - 2;

    if is_in_interval(knots, index_hint, x) {
        index_hint
    } else if index_hint < last_interval && is_in_interval(knots, index_hint + 1, x) {
        index_hint + 1
    } else {
        find_interval_index(knots, x)
    }
}

fn is_in_interval(knots: &[f64], interval_index: usize, x: f64) -> bool {
    let last_interval = knots.len() - 2;
    if interval_index > last_interval {
        return false;
    }
    let right = knots[interval_index + 1];
    knots[interval_index] <= x && (x < right || (interval_index == last_interval && x == right))
}
