use crate::core::Point;

/// Index of the position nearest to `x` in ascending `positions`.
///
/// Queries outside `[first, last]` clamp to the nearest end; equidistant
/// candidates resolve to the earlier one. Returns `None` for empty input or
/// a non-finite query.
#[must_use]
pub fn nearest_index(positions: &[f64], x: f64) -> Option<usize> {
    if positions.is_empty() || !x.is_finite() {
        return None;
    }

    let right = positions.partition_point(|position| *position < x);
    if right == 0 {
        return Some(0);
    }
    if right == positions.len() {
        return Some(positions.len() - 1);
    }

    let left = right - 1;
    if x - positions[left] <= positions[right] - x {
        Some(left)
    } else {
        Some(right)
    }
}

/// Linear Y interpolation along `points` (ascending by `x`) at `x`.
///
/// Falls back to the nearest endpoint's Y outside the bracketed range or
/// when fewer than two points exist.
#[must_use]
pub fn interpolate_y(points: &[Point], x: f64) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if points.len() < 2 || !x.is_finite() || x <= first.x {
        return Some(first.y);
    }
    if x >= last.x {
        return Some(last.y);
    }

    let right = points.partition_point(|point| point.x < x);
    let (left_point, right_point) = (points[right - 1], points[right]);
    let span = right_point.x - left_point.x;
    if span <= 0.0 {
        return Some(left_point.y);
    }
    let ratio = (x - left_point.x) / span;
    Some(left_point.y + (right_point.y - left_point.y) * ratio)
}
