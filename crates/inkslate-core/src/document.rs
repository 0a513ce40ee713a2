//! Document and whiteboard records.

use crate::element::Element;
use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize, Serializer};

/// Canvas size used when a persisted document does not record one.
pub const DEFAULT_CANVAS_SIZE: Size = Size::new(1280.0, 800.0);

/// The drawable state of one whiteboard.
///
/// Elements are kept in paint order: later entries paint over earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawDocument")]
pub struct Document {
    #[serde(serialize_with = "serialize_persistent")]
    pub elements: Vec<Element>,
    pub canvas_size: Size,
    pub zoom: f64,
    pub pan: Vec2,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            canvas_size: DEFAULT_CANVAS_SIZE,
            zoom: 1.0,
            pan: Vec2::ZERO,
        }
    }

    /// Create a document holding the given elements.
    pub fn with_elements(elements: Vec<Element>) -> Self {
        Self {
            elements,
            ..Self::new()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Copy of this document without ephemeral (laser) elements.
    pub fn without_ephemeral(&self) -> Self {
        Self {
            elements: self
                .elements
                .iter()
                .filter(|e| !e.is_ephemeral())
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a document from JSON, dropping corrupt elements.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The z-index a newly created element should receive.
pub fn next_z_index(elements: &[Element]) -> u64 {
    elements.iter().map(|e| e.z_index).max().map_or(1, |z| z + 1)
}

fn serialize_persistent<S: Serializer>(elements: &[Element], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(elements.iter().filter(|e| !e.is_ephemeral()))
}

/// Wire form of [`Document`]: elements stay undecoded so each one can fail
/// on its own.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    elements: Vec<serde_json::Value>,
    #[serde(default = "default_canvas_size")]
    canvas_size: Size,
    #[serde(default = "default_zoom")]
    zoom: f64,
    #[serde(default)]
    pan: Vec2,
}

fn default_canvas_size() -> Size {
    DEFAULT_CANVAS_SIZE
}

fn default_zoom() -> f64 {
    1.0
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        let mut elements = Vec::with_capacity(raw.elements.len());
        for value in raw.elements {
            match Element::decode(value) {
                Ok(element) if element.is_ephemeral() => {
                    log::debug!("Skipping persisted laser mark {}", element.id());
                }
                Ok(element) => elements.push(element),
                Err(e) => log::warn!("Dropping element: {e}"),
            }
        }

        let zoom = if raw.zoom.is_finite() && raw.zoom > 0.0 { raw.zoom } else { 1.0 };
        Self {
            elements,
            canvas_size: raw.canvas_size,
            zoom,
            pan: raw.pan,
        }
    }
}

/// A stored whiteboard: the record the host lists, saves and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Whiteboard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: Document,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
}

impl Whiteboard {
    /// Create an empty whiteboard.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content: Document::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Serialize to the human-readable export format.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from the export format.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Brush, ElementStyle, ShapeKind};
    use kurbo::Point;

    fn sample_document() -> Document {
        let style = ElementStyle::default();
        let mut doc = Document::with_elements(vec![
            Element::stroke(
                Brush::Calligraphy,
                vec![Point::new(0.0, 0.0), Point::new(4.0, 2.0), Point::new(9.0, 1.0)],
                style.clone(),
            )
            .with_z_index(1),
            Element::shape(ShapeKind::Arrow, Point::new(5.0, 5.0), Point::new(1.0, 9.0), style.clone())
                .with_z_index(2),
            Element::sticky(
                kurbo::Rect::new(0.0, 0.0, 200.0, 200.0),
                "line one\nline two".to_string(),
                style.clone(),
            )
            .with_z_index(3),
        ]);
        doc.zoom = 1.5;
        doc.pan = Vec2::new(-20.0, 12.5);
        doc
    }

    #[test]
    fn test_whiteboard_export_roundtrip() {
        let mut board = Whiteboard::new("board-1", "Sketch");
        board.content = sample_document();

        let json = board.to_pretty_json().unwrap();
        assert!(json.contains('\n'));
        let back = Whiteboard::from_json(&json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_laser_is_not_persisted() {
        let mut doc = sample_document();
        doc.elements.push(Element::laser(Point::ZERO, 5.0, ElementStyle::default(), 1));

        let back = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back.len(), 3);
        assert!(back.elements.iter().all(|e| !e.is_ephemeral()));
        assert_eq!(doc.without_ephemeral().len(), 3);
    }

    #[test]
    fn test_corrupted_element_is_dropped() {
        let json = r#"{
            "elements": [
                {"id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff", "type": "stroke", "brush": "pen",
                 "points": "not json", "position": {"x": 0.0, "y": 0.0}},
                {"id": "7f9619ff-8b86-d011-b42d-00cf4fc964ff", "type": "text", "content": "hi",
                 "position": {"x": 3.0, "y": 4.0}}
            ],
            "zoom": 2.0
        }"#;
        let doc = Document::from_json(json).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.elements[0].content(), Some("hi"));
        assert_eq!(doc.canvas_size, DEFAULT_CANVAS_SIZE);
        assert!((doc.zoom - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_zoom_falls_back() {
        let doc = Document::from_json(r#"{"elements": [], "zoom": -3.0}"#).unwrap();
        assert!((doc.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_next_z_index() {
        assert_eq!(next_z_index(&[]), 1);
        assert_eq!(next_z_index(&sample_document().elements), 4);
    }
}
