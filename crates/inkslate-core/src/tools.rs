//! Tool system for the whiteboard.

use crate::element::{Brush, ElementStyle, Rgba, ShapeKind};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolKind {
    #[default]
    Pen,
    Highlighter,
    Spray,
    Calligraphy,
    Shape(ShapeKind),
    Text,
    Sticky,
    Laser,
    Eraser,
    /// Pans the view.
    Hand,
    /// Reserved for selection; pointer gestures do nothing.
    Cursor,
}

impl ToolKind {
    /// The brush for freehand tools.
    pub fn brush(&self) -> Option<Brush> {
        match self {
            ToolKind::Pen => Some(Brush::Pen),
            ToolKind::Highlighter => Some(Brush::Highlighter),
            ToolKind::Spray => Some(Brush::Spray),
            ToolKind::Calligraphy => Some(Brush::Calligraphy),
            _ => None,
        }
    }

    /// Whether the tool accumulates a freehand path.
    pub fn is_freehand(&self) -> bool {
        self.brush().is_some()
    }

    /// Whether a gesture with this tool produces an element.
    pub fn is_drawing(&self) -> bool {
        match self {
            ToolKind::Pen
            | ToolKind::Highlighter
            | ToolKind::Spray
            | ToolKind::Calligraphy
            | ToolKind::Shape(_)
            | ToolKind::Text
            | ToolKind::Sticky
            | ToolKind::Laser => true,
            ToolKind::Eraser | ToolKind::Hand | ToolKind::Cursor => false,
        }
    }
}

/// Current tool, color and stroke size chosen by the user.
///
/// Lives for one editor session and is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub color: Rgba,
    pub stroke_size: f64,
    /// Base style applied to new elements; color and size override it.
    pub base_style: ElementStyle,
}

impl Default for ToolSettings {
    fn default() -> Self {
        let base_style = ElementStyle::default();
        Self {
            tool: ToolKind::default(),
            color: base_style.color,
            stroke_size: base_style.stroke_width,
            base_style,
        }
    }
}

impl ToolSettings {
    /// Create settings seeded from a base style.
    pub fn from_style(base_style: ElementStyle) -> Self {
        Self {
            tool: ToolKind::default(),
            color: base_style.color,
            stroke_size: base_style.stroke_width,
            base_style,
        }
    }

    /// Style for an element created with the current settings.
    pub fn element_style(&self) -> ElementStyle {
        let mut style = self.base_style.clone();
        style.color = self.color;
        style.stroke_width = self.stroke_size;
        if self.tool == ToolKind::Highlighter {
            style.opacity *= crate::element::HIGHLIGHTER_ALPHA;
        }
        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_classification() {
        assert!(ToolKind::Spray.is_freehand());
        assert!(!ToolKind::Shape(ShapeKind::Line).is_freehand());
        assert!(ToolKind::Shape(ShapeKind::Line).is_drawing());
        assert!(ToolKind::Laser.is_drawing());
        assert!(!ToolKind::Hand.is_drawing());
        assert!(!ToolKind::Eraser.is_drawing());
        assert_eq!(ToolKind::Calligraphy.brush(), Some(Brush::Calligraphy));
    }

    #[test]
    fn test_element_style_uses_settings() {
        let mut settings = ToolSettings::default();
        settings.color = Rgba::rgb(200, 0, 0);
        settings.stroke_size = 7.0;

        let style = settings.element_style();
        assert_eq!(style.color, Rgba::rgb(200, 0, 0));
        assert!((style.stroke_width - 7.0).abs() < f64::EPSILON);
        assert!((style.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_highlighter_is_translucent() {
        let mut settings = ToolSettings::default();
        settings.tool = ToolKind::Highlighter;
        assert!(settings.element_style().opacity < 1.0);
    }
}
