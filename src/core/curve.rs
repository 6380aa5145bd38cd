use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::{Path, Point, PriceScale, XScale};

/// Default number of Hermite sub-points per segment.
pub const DEFAULT_CURVE_SUBDIVISIONS: usize = 8;

/// Pixel-space output of the curve generator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurveGeometry {
    pub points: Vec<Point>,
    pub line: Path,
    /// Line path closed against the baseline, for gradient fills.
    pub area: Path,
}

/// Projects `(x_domain, value)` pairs through the axis scales.
///
/// `x_domain` holds epoch milliseconds for a time axis or sample indices for
/// an index axis; it is zipped with `values`, so the shorter input wins.
#[must_use]
pub fn project_points(
    values: &[f64],
    x_domain: &[f64],
    x_scale: XScale,
    price_scale: &PriceScale,
) -> Vec<Point> {
    let project = |(x, value): (&f64, &f64)| {
        Point::new(x_scale.to_pixel(*x), price_scale.price_to_pixel(*value))
    };

    #[cfg(feature = "parallel-projection")]
    {
        x_domain.par_iter().zip(values.par_iter()).map(project).collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        x_domain.iter().zip(values.iter()).map(project).collect()
    }
}

/// Builds line and area paths through the finite points.
#[must_use]
pub fn build_curve(points: Vec<Point>, subdivisions: usize, baseline_y: f64) -> CurveGeometry {
    let line = monotone_curve_path(&points, subdivisions);
    let area = close_to_baseline(&line, baseline_y);
    CurveGeometry { points, line, area }
}

/// Smooth path through `points` using monotone cubic Hermite segments.
///
/// Tangents average the neighbouring secant slopes and are zeroed at local
/// extrema and clamped to three times the smaller secant, so the curve never
/// overshoots between two consecutive samples. Each segment is flattened
/// into `subdivisions` line commands. Fewer than two finite points give an
/// empty path.
#[must_use]
pub fn monotone_curve_path(points: &[Point], subdivisions: usize) -> Path {
    let points: Vec<Point> = points.iter().copied().filter(|p| p.is_finite()).collect();
    let mut path = Path::new();
    if points.len() < 2 {
        return path;
    }

    let subdivisions = subdivisions.max(1);
    let tangents = monotone_tangents(&points);
    path.move_to(points[0].x, points[0].y);
    for (i, pair) in points.windows(2).enumerate() {
        for point in hermite_segment(pair[0], pair[1], tangents[i], tangents[i + 1], subdivisions)
        {
            path.line_to(point.x, point.y);
        }
    }
    path
}

/// Closes a line path down to `baseline_y`: straight down from the last
/// point, across under the first point and back up.
#[must_use]
pub fn close_to_baseline(line: &Path, baseline_y: f64) -> Path {
    let first = line.commands().first().and_then(|command| command.end_point());
    let (Some((first_x, first_y)), Some((last_x, _))) = (first, line.current_point()) else {
        return Path::new();
    };

    let mut area = line.clone();
    area.line_to(last_x, baseline_y);
    area.line_to(first_x, baseline_y);
    area.line_to(first_x, first_y);
    area.close();
    area
}

fn secant(left: Point, right: Point) -> f64 {
    let h = right.x - left.x;
    if h > 0.0 { (right.y - left.y) / h } else { 0.0 }
}

fn monotone_tangents(points: &[Point]) -> Vec<f64> {
    let secants: Vec<f64> = points.windows(2).map(|pair| secant(pair[0], pair[1])).collect();
    let last = secants.len() - 1;

    let mut tangents = Vec::with_capacity(points.len());
    tangents.push(secants[0]);
    for i in 1..points.len() - 1 {
        let (before, after) = (secants[i - 1], secants[i]);
        if before * after <= 0.0 {
            tangents.push(0.0);
            continue;
        }
        let average = (before + after) / 2.0;
        let limit = 3.0 * before.abs().min(after.abs());
        tangents.push(average.signum() * average.abs().min(limit));
    }
    tangents.push(secants[last]);
    tangents
}

fn hermite_segment(
    start: Point,
    end: Point,
    start_tangent: f64,
    end_tangent: f64,
    subdivisions: usize,
) -> SmallVec<[Point; 16]> {
    let h = end.x - start.x;
    let mut out = SmallVec::with_capacity(subdivisions);
    for step in 1..subdivisions {
        let s = step as f64 / subdivisions as f64;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        let y = h00 * start.y + h10 * h * start_tangent + h01 * end.y + h11 * h * end_tangent;
        out.push(Point::new(start.x + s * h, y));
    }
    // Land exactly on the sample.
    out.push(end);
    out
}
