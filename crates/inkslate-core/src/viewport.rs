//! Viewport module for pan/zoom transforms.
//!
//! The viewport is the single source of truth for mapping between screen
//! coordinates (pointer events) and document coordinates (element
//! geometry). Rendering applies `scale(zoom)` and then `translate(pan)`,
//! so a document point `d` lands at `(d + pan) * zoom` in backing-store
//! pixels.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest allowed zoom level.
pub const MAX_ZOOM: f64 = 3.0;

/// Viewport manages the view transform for the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Pan offset in document units, applied after scaling.
    pub pan: Vec2,
    /// Displayed canvas size in screen pixels.
    pub canvas_size: Size,
    /// Backing-store pixels per displayed pixel on each axis.
    pub backing_scale: Vec2,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            canvas_size: Size::new(1280.0, 800.0),
            backing_scale: Vec2::new(1.0, 1.0),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Viewport {
    /// Create a new viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with explicit zoom bounds.
    ///
    /// Bounds are kept inside `[MIN_ZOOM, MAX_ZOOM]`. Non-finite or inverted
    /// bounds fall back to that full range.
    pub fn with_zoom_bounds(min_zoom: f64, max_zoom: f64) -> Self {
        let (min_zoom, max_zoom) = sanitize_zoom_bounds(min_zoom, max_zoom);
        Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Restore a persisted view, clamping the zoom into range.
    pub fn restore(&mut self, zoom: f64, pan: Vec2, canvas_size: Size) {
        self.pan = pan;
        self.canvas_size = canvas_size;
        self.set_zoom(zoom);
    }

    /// Get the affine transform for rendering.
    ///
    /// Maps document coordinates to backing-store pixels.
    pub fn render_transform(&self) -> Affine {
        Affine::scale(self.zoom) * Affine::translate(self.pan)
    }

    /// Convert a screen point to document coordinates.
    pub fn screen_to_document(&self, screen: Point) -> Point {
        Point::new(
            screen.x * self.backing_scale.x / self.zoom - self.pan.x,
            screen.y * self.backing_scale.y / self.zoom - self.pan.y,
        )
    }

    /// Convert a document point to screen coordinates.
    pub fn document_to_screen(&self, doc: Point) -> Point {
        Point::new(
            (doc.x + self.pan.x) * self.zoom / self.backing_scale.x,
            (doc.y + self.pan.y) * self.zoom / self.backing_scale.y,
        )
    }

    /// Convert a screen-space length to document units (x axis scale).
    pub fn screen_length_to_document(&self, length: f64) -> f64 {
        length * self.backing_scale.x / self.zoom
    }

    /// Pan by a delta measured in screen pixels.
    pub fn pan_by_screen(&mut self, delta: Vec2) {
        self.pan += Vec2::new(
            delta.x * self.backing_scale.x / self.zoom,
            delta.y * self.backing_scale.y / self.zoom,
        );
    }

    /// Set the zoom level, clamped to the allowed range. Non-finite values
    /// are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = self.clamp_zoom(zoom);
        }
    }

    /// Zoom by a factor, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let new_zoom = self.clamp_zoom(self.zoom * factor);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.screen_to_document(screen);
        self.zoom = new_zoom;

        // The anchor must map back onto the same screen point.
        let moved = self.screen_to_document(screen);
        self.pan += Vec2::new(moved.x - anchor.x, moved.y - anchor.y);
    }

    /// Reset to 100% zoom with no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    /// Update the displayed canvas size.
    pub fn set_canvas_size(&mut self, size: Size) {
        self.canvas_size = size;
    }

    /// Update the backing-store resolution relative to the displayed size.
    pub fn set_backing_scale(&mut self, scale: Vec2) {
        if scale.x > 0.0 && scale.y > 0.0 {
            self.backing_scale = scale;
        }
    }

    // Tolerates inverted bounds written through the public fields.
    fn clamp_zoom(&self, zoom: f64) -> f64 {
        let (min, max) = sanitize_zoom_bounds(self.min_zoom, self.max_zoom);
        zoom.max(min).min(max)
    }
}

/// Fit a pair of zoom bounds inside `[MIN_ZOOM, MAX_ZOOM]`.
pub fn sanitize_zoom_bounds(min_zoom: f64, max_zoom: f64) -> (f64, f64) {
    if !(min_zoom.is_finite() && max_zoom.is_finite()) || min_zoom > max_zoom {
        return (MIN_ZOOM, MAX_ZOOM);
    }
    let min = min_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    let max = max_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    (min, max)
}
