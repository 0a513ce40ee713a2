//! Visual style shared by every element kind.

use super::Rgba;
use serde::{Deserialize, Serialize};

/// Font family options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
    Handwritten,
}

impl FontFamily {
    /// Generic family name as understood by text backends.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Sans => "sans-serif",
            FontFamily::Serif => "serif",
            FontFamily::Mono => "monospace",
            FontFamily::Handwritten => "cursive",
        }
    }
}

/// Horizontal text alignment inside the element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Style properties for elements.
///
/// Every field has a default so older documents with missing keys still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementStyle {
    /// Stroke / text color.
    pub color: Rgba,
    /// Background color (sticky notes, filled shapes).
    pub background_color: Option<Rgba>,
    /// Stroke width in document units.
    pub stroke_width: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    pub opacity: f64,
    /// Font size in document units.
    pub font_size: f64,
    pub font_family: FontFamily,
    /// Whether closed shapes are filled with `background_color` (or `color`).
    pub fill: bool,
    pub text_align: TextAlign,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            color: Rgba::rgb(0x1e, 0x1e, 0x1e),
            background_color: None,
            stroke_width: 3.0,
            opacity: 1.0,
            font_size: 20.0,
            font_family: FontFamily::default(),
            fill: false,
            text_align: TextAlign::default(),
        }
    }
}

impl ElementStyle {
    /// Stroke color with opacity applied.
    pub fn stroke_color(&self) -> Rgba {
        self.color.scale_alpha(self.opacity)
    }

    /// Fill color with opacity applied, if this style fills.
    pub fn fill_color(&self) -> Option<Rgba> {
        if !self.fill {
            return None;
        }
        Some(
            self.background_color
                .unwrap_or(self.color)
                .scale_alpha(self.opacity),
        )
    }

    /// Line height used for multi-line text.
    pub fn line_height(&self) -> f64 {
        self.font_size * 1.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let style: ElementStyle = serde_json::from_str(r##"{"color":"#ff0000"}"##).unwrap();
        assert_eq!(style.color, Rgba::rgb(255, 0, 0));
        assert!((style.stroke_width - 3.0).abs() < f64::EPSILON);
        assert_eq!(style.text_align, TextAlign::Left);
    }

    #[test]
    fn test_fill_color_prefers_background() {
        let mut style = ElementStyle::default();
        assert!(style.fill_color().is_none());

        style.fill = true;
        assert_eq!(style.fill_color(), Some(style.color));

        style.background_color = Some(Rgba::rgb(0, 128, 0));
        style.opacity = 0.5;
        assert_eq!(style.fill_color(), Some(Rgba::new(0, 128, 0, 128)));
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_value(ElementStyle::default()).unwrap();
        assert!(json.get("strokeWidth").is_some());
        assert!(json.get("backgroundColor").is_some());
        assert_eq!(json["fontFamily"], "sans");
    }
}
