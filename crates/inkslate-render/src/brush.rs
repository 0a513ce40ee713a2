//! Path construction for element geometry and brush effects.

use inkslate_core::element::{ElementId, ShapeKind, direction};
use kurbo::{BezPath, Circle, Ellipse, Point, Rect, Shape, Vec2};

/// Curve flattening tolerance for circles and ellipses.
const TOLERANCE: f64 = 0.1;

/// Simple seeded random number generator (xorshift32).
/// Used for deterministic spray dots.
pub(crate) struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub(crate) fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    /// Seed derived from an element id, so an element always sprays the
    /// same dots.
    pub(crate) fn for_element(id: ElementId) -> Self {
        let bits = id.as_u128();
        let folded = (bits as u32) ^ ((bits >> 32) as u32) ^ ((bits >> 64) as u32) ^ ((bits >> 96) as u32);
        Self::new(folded)
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Random float in range [-1, 1]
    pub(crate) fn next_f64(&mut self) -> f64 {
        (self.next_u32() as f64 / u32::MAX as f64) * 2.0 - 1.0
    }
}

/// Open polyline through `points`.
pub(crate) fn polyline(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for p in iter {
            path.line_to(*p);
        }
    }
    path
}

/// Filled disc.
pub(crate) fn disc(center: Point, radius: f64) -> BezPath {
    Circle::new(center, radius).to_path(TOLERANCE)
}

/// Dots scattered around the stroke path.
///
/// Samples every half width along each segment and drops a handful of dots
/// inside a circle twice the stroke width across.
pub(crate) fn spray_dots(points: &[Point], width: f64, rng: &mut SimpleRng) -> BezPath {
    let radius = width.max(1.0);
    let dot = (width * 0.15).max(0.5);
    let spacing = (width / 2.0).max(1.0);
    let mut path = BezPath::new();

    let mut spray_at = |center: Point, path: &mut BezPath| {
        for _ in 0..6 {
            let dx = rng.next_f64() * radius;
            let dy = rng.next_f64() * radius;
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            path.extend(Circle::new(center + Vec2::new(dx, dy), dot).path_elements(TOLERANCE));
        }
    };

    match points {
        [] => {}
        [only] => spray_at(*only, &mut path),
        _ => {
            for pair in points.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let steps = ((a.distance(b) / spacing).ceil() as usize).max(1);
                for i in 0..steps {
                    spray_at(a.lerp(b, i as f64 / steps as f64), &mut path);
                }
            }
            if let Some(last) = points.last() {
                spray_at(*last, &mut path);
            }
        }
    }
    path
}

/// Ribbon swept by a flat nib held at 45 degrees.
///
/// The ribbon is thin where the stroke runs along the nib and full width
/// where it runs across.
pub(crate) fn calligraphy_ribbon(points: &[Point], width: f64) -> BezPath {
    let half = width / 2.0;
    let nib = Vec2::new(half * std::f64::consts::FRAC_1_SQRT_2, -half * std::f64::consts::FRAC_1_SQRT_2);
    let mut path = BezPath::new();
    let Some((first, rest)) = points.split_first() else {
        return path;
    };

    path.move_to(*first + nib);
    for p in rest {
        path.line_to(*p + nib);
    }
    for p in points.iter().rev() {
        path.line_to(*p - nib);
    }
    path.close_path();

    // A minimum-width core keeps strokes parallel to the nib visible.
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let normal = direction(a, b).turn_90() * (width * 0.1).max(0.5);
        path.move_to(a + normal);
        path.line_to(b + normal);
        path.line_to(b - normal);
        path.line_to(a - normal);
        path.close_path();
    }
    path
}

/// Outline of a shape primitive.
///
/// `rect` is the normalized box for closed shapes; lines and arrows run from
/// `start` to `end`.
pub(crate) fn shape_outline(kind: ShapeKind, rect: Rect, start: Point, end: Point, stroke_width: f64) -> BezPath {
    match kind {
        ShapeKind::Rectangle => rect.to_path(TOLERANCE),
        ShapeKind::RoundedRect => rounded_rect(rect, corner_radius(rect)),
        ShapeKind::Circle => Ellipse::from_rect(rect).to_path(TOLERANCE),
        ShapeKind::Triangle => {
            let mut path = BezPath::new();
            path.move_to(Point::new(rect.center().x, rect.y0));
            path.line_to(Point::new(rect.x1, rect.y1));
            path.line_to(Point::new(rect.x0, rect.y1));
            path.close_path();
            path
        }
        ShapeKind::Line => polyline(&[start, end]),
        ShapeKind::Arrow => {
            let mut path = polyline(&[start, end]);
            let (left, right) = arrowhead(start, end, stroke_width);
            path.move_to(left);
            path.line_to(end);
            path.line_to(right);
            path
        }
    }
}

fn corner_radius(rect: Rect) -> f64 {
    16.0_f64.min(rect.width() / 4.0).min(rect.height() / 4.0)
}

/// Rectangle with quadratic-curve corners.
pub(crate) fn rounded_rect(rect: Rect, radius: f64) -> BezPath {
    let r = radius.max(0.0);
    let (x0, y0, x1, y1) = (rect.x0, rect.y0, rect.x1, rect.y1);
    let mut path = BezPath::new();
    path.move_to((x0 + r, y0));
    path.line_to((x1 - r, y0));
    path.quad_to((x1, y0), (x1, y0 + r));
    path.line_to((x1, y1 - r));
    path.quad_to((x1, y1), (x1 - r, y1));
    path.line_to((x0 + r, y1));
    path.quad_to((x0, y1), (x0, y1 - r));
    path.line_to((x0, y0 + r));
    path.quad_to((x0, y0), (x0 + r, y0));
    path.close_path();
    path
}

/// End points of the two arrowhead barbs.
pub(crate) fn arrowhead(start: Point, end: Point, stroke_width: f64) -> (Point, Point) {
    let length = (stroke_width * 4.0).max(12.0);
    let back = -direction(start, end);
    let (sin, cos) = (std::f64::consts::FRAC_PI_6).sin_cos();
    let rotate = |v: Vec2, s: f64| Vec2::new(v.x * cos - v.y * s, v.x * s + v.y * cos);
    (end + rotate(back, sin) * length, end + rotate(back, -sin) * length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_is_deterministic() {
        let id = ElementId::from_u128(0x1234_5678_9abc_def0_1122_3344_5566_7788);
        let mut a = SimpleRng::for_element(id);
        let mut b = SimpleRng::for_element(id);
        for _ in 0..10 {
            let x = a.next_f64();
            assert_eq!(x, b.next_f64());
            assert!((-1.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn test_spray_stays_near_path() {
        let points = [Point::new(0.0, 0.0), Point::new(40.0, 0.0)];
        let mut rng = SimpleRng::new(7);
        let dots = spray_dots(&points, 4.0, &mut rng);
        let bounds = dots.bounding_box();
        assert!(!dots.elements().is_empty());
        assert!(bounds.y0 >= -5.0 && bounds.y1 <= 5.0);
        assert!(bounds.x0 >= -5.0 && bounds.x1 <= 45.0);
    }

    #[test]
    fn test_calligraphy_nib_is_slanted() {
        let ribbon = calligraphy_ribbon(&[Point::new(0.0, 0.0), Point::new(40.0, 0.0)], 10.0);
        let bounds = ribbon.bounding_box();
        assert!((bounds.height() - 10.0 * std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
        assert!(calligraphy_ribbon(&[], 10.0).elements().is_empty());
    }

    #[test]
    fn test_arrowhead_points_back() {
        let (left, right) = arrowhead(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 2.0);
        assert!(left.x < 100.0 && right.x < 100.0);
        assert!((left.y + right.y).abs() < 1e-9);
        assert!((left.distance(Point::new(100.0, 0.0)) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_rounded_rect_uses_quads() {
        let path = rounded_rect(Rect::new(0.0, 0.0, 100.0, 50.0), 10.0);
        let quads = path
            .elements()
            .iter()
            .filter(|el| matches!(el, kurbo::PathEl::QuadTo(..)))
            .count();
        assert_eq!(quads, 4);
        let bounds = path.bounding_box();
        assert!((bounds.width() - 100.0).abs() < 1e-9 && (bounds.height() - 50.0).abs() < 1e-9);
    }
}
