//! Planar convex hull and polygon moments.

use nalgebra::Point2;

fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull in counter-clockwise order (monotone chain).
///
/// Collinear boundary points are dropped. The first vertex is not repeated.
/// Fewer than three distinct points are returned as-is, deduplicated.
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut pts: Vec<Point2<f64>> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<Point2<f64>> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Point2<f64>> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Area and centroid of a simple polygon (shoelace formula).
///
/// Returns `None` for polygons with (numerically) zero area.
pub fn area_and_centroid(polygon: &[Point2<f64>]) -> Option<(f64, Point2<f64>)> {
    if polygon.len() < 3 {
        return None;
    }
    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for (i, a) in polygon.iter().enumerate() {
        let b = &polygon[(i + 1) % polygon.len()];
        let w = a.x * b.y - b.x * a.y;
        twice_area += w;
        cx += (a.x + b.x) * w;
        cy += (a.y + b.y) * w;
    }
    if twice_area.abs() <= f64::EPSILON {
        return None;
    }
    let area = twice_area / 2.0;
    Some((area.abs(), Point2::new(cx / (6.0 * area), cy / (6.0 * area))))
}
