//! Stroke path helpers: geometry queries and the persistence encoding.

use kurbo::{Point, Rect, Vec2};

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline.
///
/// A single-point polyline degenerates to the distance to that point.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Axis-aligned bounding box of a point set.
pub fn bounds_of(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points
        .iter()
        .skip(1)
        .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p))
}

/// Unit direction of a segment, or zero for a degenerate one.
pub fn direction(from: Point, to: Point) -> Vec2 {
    let d = to - from;
    let len = d.hypot();
    if len < f64::EPSILON { Vec2::ZERO } else { d / len }
}

/// Serde adapter for stroke points.
///
/// Points are written as a JSON array of `{x, y}`. On load the legacy
/// encoding, a string holding that same array, is accepted too. Any
/// non-finite coordinate is rejected.
pub(crate) mod points_serde {
    use kurbo::Point;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Encoded {
        Points(Vec<Point>),
        Text(String),
    }

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        points.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let points = match Encoded::deserialize(deserializer)? {
            Encoded::Points(points) => points,
            Encoded::Text(text) => serde_json::from_str::<Vec<Point>>(&text)
                .map_err(|e| D::Error::custom(format!("malformed path text: {e}")))?,
        };
        if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(D::Error::custom("path contains non-finite coordinates"));
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_polyline_distance() {
        let points = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        assert!((point_to_polyline_dist(Point::new(12.0, 5.0), &points) - 2.0).abs() < 1e-9);
        assert!(point_to_polyline_dist(Point::ZERO, &[]).is_infinite());
    }

    #[test]
    fn test_bounds_of() {
        let rect = bounds_of(&[Point::new(5.0, 1.0), Point::new(-2.0, 8.0), Point::new(3.0, 3.0)]);
        assert_eq!(rect, Rect::new(-2.0, 1.0, 5.0, 8.0));
        assert_eq!(bounds_of(&[]), Rect::ZERO);
    }
}
