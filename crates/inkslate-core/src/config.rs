//! Editor configuration.

use crate::element::{ElementStyle, Rgba};
use crate::viewport::{MAX_ZOOM, MIN_ZOOM};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("zoom bounds must satisfy 0 < min_zoom <= max_zoom (got {min} and {max})")]
    ZoomBounds { min: f64, max: f64 },
    #[error("{field} must be a positive number (got {value})")]
    NotPositive { field: &'static str, value: f64 },
}

/// Tunables for an editor session.
///
/// Any key missing from a config file keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// How long a laser mark stays visible.
    pub laser_lifetime_ms: u64,
    /// Radius of a laser mark in document units.
    pub laser_radius: f64,
    /// Eraser reach in screen pixels.
    pub eraser_radius: f64,
    /// Sticky note size used when the drag is smaller than this.
    pub sticky_width: f64,
    pub sticky_height: f64,
    /// Default sticky note paper color.
    pub sticky_color: Rgba,
    /// Maximum number of history entries (`None` = unlimited).
    pub history_limit: Option<usize>,
    /// Canvas background color.
    pub background_color: Rgba,
    /// Style new elements start from.
    pub style: ElementStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            laser_lifetime_ms: 3000,
            laser_radius: 6.0,
            eraser_radius: 8.0,
            sticky_width: 200.0,
            sticky_height: 200.0,
            sticky_color: Rgba::rgb(0xff, 0xf3, 0x8a),
            history_limit: None,
            background_color: Rgba::white(),
            style: ElementStyle::default(),
        }
    }
}

impl EditorConfig {
    /// Check the values for consistency.
    ///
    /// Zoom bounds are clamped into `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let (min, max) = (self.min_zoom, self.max_zoom);
        if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
            return Err(ConfigError::ZoomBounds { min, max });
        }
        self.min_zoom = min.clamp(MIN_ZOOM, MAX_ZOOM);
        self.max_zoom = max.clamp(MIN_ZOOM, MAX_ZOOM);
        for (field, value) in [
            ("laser_radius", self.laser_radius),
            ("eraser_radius", self.eraser_radius),
            ("sticky_width", self.sticky_width),
            ("sticky_height", self.sticky_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        Ok(self)
    }

    /// Default sticky note size.
    pub fn sticky_size(&self) -> Size {
        Size::new(self.sticky_width, self.sticky_height)
    }
}
