//! Element definitions for the whiteboard.
//!
//! Every drawable object is an [`Element`]: a set of common fields (id,
//! position, size, style, z-index) plus an [`ElementKind`] carrying the
//! per-variant payload. The kind is a closed enum so the renderer and the
//! persistence layer must handle every variant.

mod color;
mod path;
mod style;

pub use color::{ColorParseError, Rgba};
pub use path::{bounds_of, direction, point_to_polyline_dist, point_to_segment_dist};
pub use style::{ElementStyle, FontFamily, TextAlign};

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Minimum rendered width of a highlighter stroke.
pub const HIGHLIGHTER_MIN_WIDTH: f64 = 12.0;

/// Opacity multiplier applied to highlighter strokes.
pub const HIGHLIGHTER_ALPHA: f64 = 0.4;

/// Freehand brush used to draw a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Brush {
    #[default]
    Pen,
    Highlighter,
    Spray,
    Calligraphy,
}

impl Brush {
    /// Width the brush actually paints for a requested stroke width.
    pub fn effective_width(&self, stroke_width: f64) -> f64 {
        match self {
            Brush::Highlighter => stroke_width.max(HIGHLIGHTER_MIN_WIDTH),
            Brush::Pen | Brush::Spray | Brush::Calligraphy => stroke_width,
        }
    }
}

/// Primitive geometry of a shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Rectangle,
    RoundedRect,
    Circle,
    Triangle,
    Arrow,
    Line,
}

impl ShapeKind {
    /// Lines and arrows keep their direction: their size is a signed extent
    /// from the start point rather than a normalized box.
    pub fn is_linear(&self) -> bool {
        matches!(self, ShapeKind::Arrow | ShapeKind::Line)
    }
}

/// Per-variant payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    /// Freehand stroke through an ordered list of document-space points.
    Stroke {
        brush: Brush,
        #[serde(with = "path::points_serde")]
        points: Vec<Point>,
    },
    /// Single-line text anchored at the element position.
    Text { content: String },
    /// Sticky note with multi-line text.
    Sticky { content: String },
    /// Geometric shape filling the element box.
    Shape {
        #[serde(rename = "shapeKind")]
        shape_kind: ShapeKind,
    },
    /// Ephemeral laser mark that fades out over time.
    Laser,
}

impl ElementKind {
    /// Variant tag as written in the persisted format.
    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Stroke { .. } => "stroke",
            ElementKind::Text { .. } => "text",
            ElementKind::Sticky { .. } => "sticky",
            ElementKind::Shape { .. } => "shape",
            ElementKind::Laser => "laser",
        }
    }
}

/// A single drawable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub(crate) id: ElementId,
    #[serde(flatten)]
    pub kind: ElementKind,
    /// Top-left corner (or start point for lines/arrows) in document space.
    pub position: Point,
    /// Box size; zero for strokes, signed for lines/arrows.
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub style: ElementStyle,
    /// Creation order, used to order elements that share a document.
    #[serde(default)]
    pub z_index: u64,
    /// Creation time in milliseconds since the Unix epoch (laser only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl Element {
    fn new(kind: ElementKind, position: Point, size: Size, style: ElementStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            size,
            style,
            z_index: 0,
            timestamp: None,
        }
    }

    /// Create a freehand stroke from its points.
    pub fn stroke(brush: Brush, points: Vec<Point>, style: ElementStyle) -> Self {
        let position = points.first().copied().unwrap_or(Point::ZERO);
        Self::new(ElementKind::Stroke { brush, points }, position, Size::ZERO, style)
    }

    /// Create a shape spanning the gesture from `start` to `end`.
    ///
    /// Closed shapes get the normalized bounding box. Lines and arrows keep
    /// `start` as position and the signed delta as size.
    pub fn shape(shape_kind: ShapeKind, start: Point, end: Point, style: ElementStyle) -> Self {
        let (position, size) = if shape_kind.is_linear() {
            (start, Size::new(end.x - start.x, end.y - start.y))
        } else {
            let rect = Rect::from_points(start, end);
            (rect.origin(), rect.size())
        };
        Self::new(ElementKind::Shape { shape_kind }, position, size, style)
    }

    /// Create a text element whose box is estimated from the content.
    pub fn text(position: Point, content: String, style: ElementStyle) -> Self {
        let size = estimate_text_size(&content, &style);
        Self::new(ElementKind::Text { content }, position, size, style)
    }

    /// Create a sticky note occupying `rect`.
    pub fn sticky(rect: Rect, content: String, style: ElementStyle) -> Self {
        Self::new(ElementKind::Sticky { content }, rect.origin(), rect.size(), style)
    }

    /// Create a laser mark centered on `center`, stamped with `timestamp_ms`.
    pub fn laser(center: Point, radius: f64, style: ElementStyle, timestamp_ms: u64) -> Self {
        let mut element = Self::new(
            ElementKind::Laser,
            Point::new(center.x - radius, center.y - radius),
            Size::new(radius * 2.0, radius * 2.0),
            style,
        );
        element.timestamp = Some(timestamp_ms);
        element
    }

    /// Replace the id (for reconstructing persisted elements).
    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    /// Set the creation-order index.
    pub fn with_z_index(mut self, z_index: u64) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Laser marks are never persisted.
    pub fn is_ephemeral(&self) -> bool {
        matches!(self.kind, ElementKind::Laser)
    }

    /// Stroke points, if this is a stroke.
    pub fn points(&self) -> Option<&[Point]> {
        match &self.kind {
            ElementKind::Stroke { points, .. } => Some(points),
            _ => None,
        }
    }

    /// Text content of text and sticky elements.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text { content } | ElementKind::Sticky { content } => Some(content),
            _ => None,
        }
    }

    /// Start and end points of a line or arrow.
    pub fn segment(&self) -> Option<(Point, Point)> {
        match &self.kind {
            ElementKind::Shape { shape_kind } if shape_kind.is_linear() => Some((
                self.position,
                Point::new(
                    self.position.x + self.size.width,
                    self.position.y + self.size.height,
                ),
            )),
            _ => None,
        }
    }

    /// Bounding box in document coordinates.
    pub fn bounds(&self) -> Rect {
        match &self.kind {
            ElementKind::Stroke { points, .. } => bounds_of(points),
            ElementKind::Shape { shape_kind } if shape_kind.is_linear() => {
                let (start, end) = (self.position, self.position + self.size.to_vec2());
                Rect::from_points(start, end)
            }
            _ => Rect::from_origin_size(self.position, self.size),
        }
    }

    /// Check if a document-space point hits this element.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match &self.kind {
            ElementKind::Stroke { brush, points } => {
                let half_width = brush.effective_width(self.style.stroke_width) / 2.0;
                point_to_polyline_dist(point, points) <= tolerance + half_width
            }
            ElementKind::Shape { shape_kind } if shape_kind.is_linear() => {
                let end = self.position + self.size.to_vec2();
                point_to_segment_dist(point, self.position, end)
                    <= tolerance + self.style.stroke_width / 2.0
            }
            ElementKind::Shape { .. } | ElementKind::Text { .. } | ElementKind::Sticky { .. } => {
                self.bounds().inflate(tolerance, tolerance).contains(point)
            }
            ElementKind::Laser => false,
        }
    }

    /// Age of a laser mark at `now_ms`, or `None` for other elements.
    pub fn age_ms(&self, now_ms: u64) -> Option<u64> {
        match self.kind {
            ElementKind::Laser => self.timestamp.map(|t| now_ms.saturating_sub(t)),
            _ => None,
        }
    }

    /// Whether a laser mark has outlived `lifetime_ms`.
    pub fn is_expired(&self, now_ms: u64, lifetime_ms: u64) -> bool {
        match (&self.kind, self.timestamp) {
            (ElementKind::Laser, Some(_)) => self.age_ms(now_ms).is_some_and(|age| age > lifetime_ms),
            // A laser mark without a timestamp cannot fade, so it never shows.
            (ElementKind::Laser, None) => true,
            _ => false,
        }
    }

    /// Fade factor of a laser mark: 1.0 when fresh, falling linearly to 0.0.
    pub fn laser_opacity(&self, now_ms: u64, lifetime_ms: u64) -> Option<f64> {
        if self.is_expired(now_ms, lifetime_ms) || lifetime_ms == 0 {
            return None;
        }
        let age = self.age_ms(now_ms)?;
        Some((1.0 - age as f64 / lifetime_ms as f64).clamp(0.0, 1.0))
    }

    /// Decode one persisted element.
    ///
    /// Failures are reported per element so the caller can drop a corrupt
    /// entry and keep loading the rest of the document.
    pub fn decode(value: serde_json::Value) -> Result<Self, ElementDecodeError> {
        let id = value.get("id").and_then(|v| v.as_str()).map(str::to_owned);
        let is_stroke = value.get("type").and_then(|v| v.as_str()) == Some("stroke");

        serde_json::from_value(value).map_err(|e| {
            if is_stroke {
                ElementDecodeError::CorruptedPathData { id, reason: e.to_string() }
            } else {
                ElementDecodeError::Malformed { id, reason: e.to_string() }
            }
        })
    }
}

/// Estimate the box of a text element from its font metrics.
fn estimate_text_size(content: &str, style: &ElementStyle) -> Size {
    let lines = content.lines().count().max(1);
    let widest = content.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    Size::new(
        widest as f64 * style.font_size * 0.6,
        lines as f64 * style.line_height(),
    )
}

/// Error decoding a persisted element.
#[derive(Debug, Error)]
pub enum ElementDecodeError {
    #[error("corrupted path data in element {id:?}: {reason}")]
    CorruptedPathData { id: Option<String>, reason: String },
    #[error("malformed element {id:?}: {reason}")]
    Malformed { id: Option<String>, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rectangle_bounding_box() {
        let rect = Element::shape(
            ShapeKind::Rectangle,
            Point::new(110.0, 60.0),
            Point::new(10.0, 10.0),
            ElementStyle::default(),
        );
        assert_eq!(rect.position, Point::new(10.0, 10.0));
        assert_eq!(rect.size, Size::new(100.0, 50.0));
    }

    #[test]
    fn test_line_keeps_direction() {
        let line = Element::shape(
            ShapeKind::Line,
            Point::new(100.0, 0.0),
            Point::new(0.0, 50.0),
            ElementStyle::default(),
        );
        assert_eq!(line.segment(), Some((Point::new(100.0, 0.0), Point::new(0.0, 50.0))));
        assert_eq!(line.bounds(), Rect::new(0.0, 0.0, 100.0, 50.0));
        assert!(line.hit_test(Point::new(50.0, 25.0), 1.0));
        assert!(!line.hit_test(Point::new(10.0, 10.0), 1.0));
    }

    #[test]
    fn test_stroke_hit_test() {
        let stroke = Element::stroke(
            Brush::Pen,
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            ElementStyle::default(),
        );
        assert_eq!(stroke.size, Size::ZERO);
        assert!(stroke.hit_test(Point::new(50.0, 3.0), 2.0));
        assert!(!stroke.hit_test(Point::new(50.0, 20.0), 2.0));
    }

    #[test]
    fn test_highlighter_is_wider() {
        assert!((Brush::Highlighter.effective_width(3.0) - HIGHLIGHTER_MIN_WIDTH).abs() < f64::EPSILON);
        assert!((Brush::Pen.effective_width(3.0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_size_estimate() {
        let style = ElementStyle::default();
        let text = Element::text(Point::ZERO, "ab\nabcd".to_string(), style.clone());
        assert!((text.size.width - 4.0 * style.font_size * 0.6).abs() < 1e-9);
        assert!((text.size.height - 2.0 * style.line_height()).abs() < 1e-9);
    }

    #[test]
    fn test_laser_fade() {
        let laser = Element::laser(Point::new(5.0, 5.0), 4.0, ElementStyle::default(), 10_000);
        assert!(laser.is_ephemeral());
        assert!(!laser.hit_test(Point::new(5.0, 5.0), 10.0));

        assert_eq!(laser.laser_opacity(10_000, 3000), Some(1.0));
        let partial = laser.laser_opacity(11_000, 3000).unwrap();
        assert!(partial > 0.0 && partial < 1.0);
        assert!(laser.is_expired(15_000, 3000));
        assert_eq!(laser.laser_opacity(15_000, 3000), None);
    }

    #[test]
    fn test_serialized_shape() {
        let stroke = Element::stroke(
            Brush::Highlighter,
            vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)],
            ElementStyle::default(),
        )
        .with_z_index(7);
        let value = serde_json::to_value(&stroke).unwrap();
        assert_eq!(value["type"], "stroke");
        assert_eq!(value["brush"], "highlighter");
        assert_eq!(value["points"][1], json!({"x": 3.0, "y": 4.0}));
        assert_eq!(value["zIndex"], 7);
        assert!(value.get("timestamp").is_none());

        let back = Element::decode(value).unwrap();
        assert_eq!(back, stroke);
    }

    #[test]
    fn test_decode_legacy_string_path() {
        let value = json!({
            "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "type": "stroke",
            "brush": "pen",
            "points": "[{\"x\":0.0,\"y\":0.0},{\"x\":5.0,\"y\":5.0}]",
            "position": {"x": 0.0, "y": 0.0}
        });
        let element = Element::decode(value).unwrap();
        assert_eq!(element.points().map(<[Point]>::len), Some(2));
    }

    #[test]
    fn test_decode_corrupted_path() {
        let value = json!({
            "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "type": "stroke",
            "brush": "pen",
            "points": "[{\"x\":0.0,",
            "position": {"x": 0.0, "y": 0.0}
        });
        assert!(matches!(
            Element::decode(value),
            Err(ElementDecodeError::CorruptedPathData { .. })
        ));
    }

    #[test]
    fn test_decode_unknown_type() {
        let value = json!({"id": "x", "type": "hexagon", "position": {"x": 0.0, "y": 0.0}});
        assert!(matches!(
            Element::decode(value),
            Err(ElementDecodeError::Malformed { .. })
        ));
    }
}
