//! CPU raster backend on tiny-skia.

use crate::renderer::{RenderError, RenderResult, Surface, TextRun};
use inkslate_core::viewport::Viewport;
use kurbo::{Affine, BezPath, Cap, Join, PathEl, Stroke};
use peniko::{Color, Fill};
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

/// Surface backed by a tiny-skia pixmap.
///
/// Paths are rasterized with anti-aliasing. Text runs are counted but not
/// drawn, since this backend carries no font stack.
pub struct PixmapSurface {
    pixmap: Pixmap,
    transforms: Vec<Affine>,
    skipped_text: usize,
}

impl PixmapSurface {
    /// Create a transparent surface of the given pixel size.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        Ok(Self {
            pixmap,
            transforms: Vec::new(),
            skipped_text: 0,
        })
    }

    /// Create a surface matching the viewport's backing store.
    pub fn for_viewport(viewport: &Viewport) -> RenderResult<Self> {
        let width = (viewport.canvas_size.width * viewport.backing_scale.x).round().max(0.0) as u32;
        let height = (viewport.canvas_size.height * viewport.backing_scale.y).round().max(0.0) as u32;
        Self::new(width, height)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Number of text runs dropped since the last clear.
    pub fn skipped_text(&self) -> usize {
        self.skipped_text
    }

    /// Encode the current contents as PNG.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    fn current_transform(&self) -> Transform {
        let [a, b, c, d, e, f] = self.transforms.last().copied().unwrap_or(Affine::IDENTITY).as_coeffs();
        Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
    }
}

fn to_paint(color: Color) -> Paint<'static> {
    let rgba = color.to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
    paint.anti_alias = true;
    paint
}

fn to_skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => builder.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => builder.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

fn to_skia_stroke(stroke: &Stroke) -> tiny_skia::Stroke {
    tiny_skia::Stroke {
        width: stroke.width as f32,
        miter_limit: stroke.miter_limit as f32,
        line_cap: match stroke.start_cap {
            Cap::Butt => LineCap::Butt,
            Cap::Square => LineCap::Square,
            Cap::Round => LineCap::Round,
        },
        line_join: match stroke.join {
            Join::Bevel => LineJoin::Bevel,
            Join::Miter => LineJoin::Miter,
            Join::Round => LineJoin::Round,
        },
        dash: None,
    }
}

impl Surface for PixmapSurface {
    fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.transforms.clear();
        self.skipped_text = 0;
    }

    fn fill_background(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        self.pixmap
            .fill(tiny_skia::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a));
    }

    fn push_transform(&mut self, transform: Affine) {
        let current = self.transforms.last().copied().unwrap_or(Affine::IDENTITY);
        self.transforms.push(current * transform);
    }

    fn pop_transform(&mut self) {
        if self.transforms.pop().is_none() {
            log::warn!("Unbalanced pop_transform on pixmap surface");
        }
    }

    fn stroke(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let transform = self.current_transform();
        self.pixmap
            .stroke_path(&path, &to_paint(color), &to_skia_stroke(stroke), transform, None);
    }

    fn fill(&mut self, path: &BezPath, fill: Fill, color: Color) {
        let Some(path) = to_skia_path(path) else {
            return;
        };
        let rule = match fill {
            Fill::NonZero => FillRule::Winding,
            Fill::EvenOdd => FillRule::EvenOdd,
        };
        let transform = self.current_transform();
        self.pixmap.fill_path(&path, &to_paint(color), rule, transform, None);
    }

    fn fill_text(&mut self, run: &TextRun) {
        log::trace!("Skipping text run {:?}", run.text);
        self.skipped_text += 1;
    }
}
