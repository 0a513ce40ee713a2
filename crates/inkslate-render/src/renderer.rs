//! Rendering pipeline and the backend seam.

use crate::brush::{self, SimpleRng};
use inkslate_core::config::EditorConfig;
use inkslate_core::element::{Brush, Element, ElementKind, ElementStyle, FontFamily, Rgba, TextAlign};
use inkslate_core::session::{EditorHost, EditorSession};
use inkslate_core::viewport::Viewport;
use kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Shape, Stroke};
use peniko::{Color, Fill};
use thiserror::Error;

/// Inner margin between a sticky note's edge and its text.
const STICKY_PADDING: f64 = 12.0;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// One line of text, anchored at the left end of its baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: Point,
    pub font_size: f64,
    pub family: FontFamily,
    pub color: Rgba,
}

/// Drawing target for the renderer.
///
/// Paths and text positions are given in the coordinate space set up by
/// the innermost pushed transform.
pub trait Surface {
    /// Discard everything painted so far.
    fn clear(&mut self);

    /// Paint the whole surface with `color`, ignoring the transform.
    fn fill_background(&mut self, color: Color);

    fn push_transform(&mut self, transform: Affine);

    fn pop_transform(&mut self);

    fn stroke(&mut self, path: &BezPath, stroke: &Stroke, color: Color);

    fn fill(&mut self, path: &BezPath, fill: Fill, color: Color);

    fn fill_text(&mut self, run: &TextRun);
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Elements in paint order.
    pub elements: &'a [Element],
    pub viewport: &'a Viewport,
    /// Frame time, used to fade laser marks.
    pub now_ms: u64,
    pub laser_lifetime_ms: u64,
    pub background_color: Color,
    /// Paper color for sticky notes without a background color.
    pub sticky_color: Rgba,
    /// Uncommitted element painted above everything else.
    pub preview: Option<&'a Element>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(elements: &'a [Element], viewport: &'a Viewport, now_ms: u64) -> Self {
        let config = EditorConfig::default();
        Self {
            elements,
            viewport,
            now_ms,
            laser_lifetime_ms: config.laser_lifetime_ms,
            background_color: config.background_color.into(),
            sticky_color: config.sticky_color,
            preview: None,
        }
    }

    /// Take background, sticky color and laser lifetime from `config`.
    pub fn with_config(mut self, config: &EditorConfig) -> Self {
        self.laser_lifetime_ms = config.laser_lifetime_ms;
        self.background_color = config.background_color.into();
        self.sticky_color = config.sticky_color;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_laser_lifetime(mut self, lifetime_ms: u64) -> Self {
        self.laser_lifetime_ms = lifetime_ms;
        self
    }

    /// Set the live preview element.
    pub fn with_preview(mut self, preview: Option<&'a Element>) -> Self {
        self.preview = preview;
        self
    }
}

/// Paints documents onto a [`Surface`].
///
/// Holds no per-frame state: the output depends only on the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasRenderer;

impl CanvasRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Paint a full frame.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, ctx: &RenderContext<'_>) {
        surface.clear();
        surface.fill_background(ctx.background_color);

        let transform = ctx.viewport.render_transform();
        surface.push_transform(transform);
        for element in ctx.elements {
            self.render_element(surface, element, ctx);
        }
        surface.pop_transform();

        if let Some(preview) = ctx.preview {
            surface.push_transform(transform);
            self.render_element(surface, preview, ctx);
            surface.pop_transform();
        }
    }

    /// Paint only the newest segment of a freehand preview on top of what
    /// the surface already shows.
    pub fn render_preview_segment<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        viewport: &Viewport,
        preview: &Element,
        from: Point,
        to: Point,
    ) {
        let ElementKind::Stroke { brush, .. } = &preview.kind else {
            return;
        };
        surface.push_transform(viewport.render_transform());
        self.render_stroke(surface, *brush, &[from, to], &preview.style, preview);
        surface.pop_transform();
    }

    fn render_element<S: Surface + ?Sized>(&self, surface: &mut S, element: &Element, ctx: &RenderContext<'_>) {
        let style = &element.style;
        match &element.kind {
            ElementKind::Stroke { brush, points } => {
                self.render_stroke(surface, *brush, points, style, element);
            }
            ElementKind::Shape { shape_kind } => {
                let (start, end) = element
                    .segment()
                    .unwrap_or((element.position, element.position + element.size.to_vec2()));
                let path = brush::shape_outline(*shape_kind, element.bounds(), start, end, style.stroke_width);
                if !shape_kind.is_linear() {
                    if let Some(fill) = style.fill_color() {
                        surface.fill(&path, Fill::NonZero, fill.into());
                    }
                }
                let stroke = Stroke::new(style.stroke_width)
                    .with_caps(Cap::Round)
                    .with_join(Join::Round);
                surface.stroke(&path, &stroke, style.stroke_color().into());
            }
            ElementKind::Text { content } => {
                let bounds = element.bounds();
                self.render_lines(surface, content, bounds, style, style.stroke_color());
            }
            ElementKind::Sticky { content } => {
                let rect = element.bounds();
                let paper = style
                    .background_color
                    .unwrap_or(ctx.sticky_color)
                    .scale_alpha(style.opacity);
                let outline = rect.to_path(0.1);
                surface.fill(&outline, Fill::NonZero, paper.into());
                surface.stroke(
                    &outline,
                    &Stroke::new(1.0),
                    style.stroke_color().scale_alpha(0.35).into(),
                );
                let inner = rect.inset(-STICKY_PADDING);
                self.render_lines(surface, content, inner, style, style.stroke_color());
            }
            ElementKind::Laser => {
                let Some(fade) = element.laser_opacity(ctx.now_ms, ctx.laser_lifetime_ms) else {
                    return;
                };
                let bounds = element.bounds();
                let radius = bounds.width() / 2.0;
                let color = style.color.scale_alpha(fade * style.opacity);
                surface.fill(&brush::disc(bounds.center(), radius * 2.0), Fill::NonZero, color.scale_alpha(0.25).into());
                surface.fill(&brush::disc(bounds.center(), radius), Fill::NonZero, color.into());
            }
        }
    }

    fn render_stroke<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        brush: Brush,
        points: &[Point],
        style: &ElementStyle,
        element: &Element,
    ) {
        let width = brush.effective_width(style.stroke_width);
        let color: Color = style.stroke_color().into();

        match brush {
            Brush::Pen | Brush::Highlighter if points.len() == 1 => {
                surface.fill(&brush::disc(points[0], width / 2.0), Fill::NonZero, color);
            }
            Brush::Pen => {
                let stroke = Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round);
                surface.stroke(&brush::polyline(points), &stroke, color);
            }
            Brush::Highlighter => {
                let stroke = Stroke::new(width).with_caps(Cap::Square).with_join(Join::Round);
                surface.stroke(&brush::polyline(points), &stroke, color);
            }
            Brush::Spray => {
                let mut rng = SimpleRng::for_element(element.id());
                surface.fill(&brush::spray_dots(points, width, &mut rng), Fill::NonZero, color);
            }
            Brush::Calligraphy => {
                surface.fill(&brush::calligraphy_ribbon(points, width), Fill::NonZero, color);
            }
        }
    }

    /// Newline-split text, one baseline per line, starting one font size
    /// below the top of `area`.
    fn render_lines<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        content: &str,
        area: Rect,
        style: &ElementStyle,
        color: Rgba,
    ) {
        for (i, line) in content.split('\n').enumerate() {
            if line.is_empty() {
                continue;
            }
            let line_width = line.chars().count() as f64 * style.font_size * 0.6;
            let x = match style.text_align {
                TextAlign::Left => area.x0,
                TextAlign::Center => area.x0 + (area.width() - line_width) / 2.0,
                TextAlign::Right => area.x1 - line_width,
            };
            let baseline = area.y0 + style.font_size + i as f64 * style.line_height();
            surface.fill_text(&TextRun {
                text: line.to_string(),
                origin: Point::new(x, baseline),
                font_size: style.font_size,
                family: style.font_family,
                color,
            });
        }
    }
}

/// Render an editor session directly.
pub trait SessionRender {
    /// Paint the session's elements, view and live preview.
    fn render<S: Surface + ?Sized>(&self, renderer: &CanvasRenderer, surface: &mut S);
}

impl<H: EditorHost> SessionRender for EditorSession<H> {
    fn render<S: Surface + ?Sized>(&self, renderer: &CanvasRenderer, surface: &mut S) {
        let preview = self.preview();
        let ctx = RenderContext::new(self.elements(), self.viewport(), self.now_ms())
            .with_config(self.config())
            .with_preview(preview.as_ref());
        renderer.render(surface, &ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DrawCommand, Scene};
    use inkslate_core::element::ShapeKind;
    use kurbo::Vec2;

    const NOW: u64 = 1_000_000;

    fn sample_elements() -> Vec<Element> {
        let style = ElementStyle::default();
        vec![
            Element::stroke(
                Brush::Spray,
                vec![Point::new(0.0, 0.0), Point::new(20.0, 10.0)],
                style.clone(),
            ),
            Element::shape(ShapeKind::RoundedRect, Point::new(10.0, 10.0), Point::new(110.0, 60.0), ElementStyle {
                fill: true,
                ..style.clone()
            }),
            Element::shape(ShapeKind::Arrow, Point::new(0.0, 0.0), Point::new(50.0, 0.0), style.clone()),
            Element::text(Point::new(5.0, 5.0), "one\ntwo".to_string(), style.clone()),
            Element::sticky(Rect::new(200.0, 0.0, 400.0, 200.0), "note".to_string(), style),
        ]
    }

    fn render(elements: &[Element], viewport: &Viewport, now_ms: u64) -> Scene {
        let mut scene = Scene::new();
        let ctx = RenderContext::new(elements, viewport, now_ms);
        CanvasRenderer::new().render(&mut scene, &ctx);
        scene
    }

    fn filled_colors(scene: &Scene) -> Vec<Rgba> {
        scene
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_pipeline_order() {
        let mut viewport = Viewport::new();
        viewport.zoom = 2.0;
        viewport.pan = Vec2::new(5.0, 0.0);
        let elements = sample_elements();
        let scene = render(&elements, &viewport, NOW);

        let commands = scene.commands();
        assert_eq!(commands[0], DrawCommand::Background(Rgba::white()));
        assert_eq!(commands[1], DrawCommand::PushTransform(viewport.render_transform()));
        assert_eq!(commands.last(), Some(&DrawCommand::PopTransform));
        assert_eq!(scene.depth(), 0);
    }

    #[test]
    fn test_render_is_deterministic() {
        let viewport = Viewport::new();
        let elements = sample_elements();
        let renderer = CanvasRenderer::new();
        let ctx = RenderContext::new(&elements, &viewport, NOW);

        let mut scene = Scene::new();
        renderer.render(&mut scene, &ctx);
        let first = scene.commands().to_vec();
        renderer.render(&mut scene, &ctx);
        assert_eq!(scene.commands(), first.as_slice());
    }

    #[test]
    fn test_elements_paint_in_array_order() {
        let style = ElementStyle::default();
        let red = ElementStyle {
            color: Rgba::rgb(255, 0, 0),
            fill: true,
            ..style.clone()
        };
        let blue = ElementStyle {
            color: Rgba::rgb(0, 0, 255),
            fill: true,
            ..style
        };
        let elements = vec![
            Element::shape(ShapeKind::Rectangle, Point::ZERO, Point::new(10.0, 10.0), blue),
            Element::shape(ShapeKind::Rectangle, Point::ZERO, Point::new(10.0, 10.0), red),
        ];
        let scene = render(&elements, &Viewport::new(), NOW);
        assert_eq!(filled_colors(&scene), vec![Rgba::rgb(0, 0, 255), Rgba::rgb(255, 0, 0)]);
    }

    #[test]
    fn test_expired_laser_is_skipped() {
        let style = ElementStyle::default();
        let elements = vec![Element::laser(Point::new(50.0, 50.0), 6.0, style, NOW - 5000)];
        let scene = render(&elements, &Viewport::new(), NOW);
        assert!(filled_colors(&scene).is_empty());
    }

    #[test]
    fn test_fresh_laser_fades() {
        let style = ElementStyle {
            color: Rgba::rgb(255, 0, 0),
            ..ElementStyle::default()
        };
        let elements = vec![Element::laser(Point::new(50.0, 50.0), 6.0, style, NOW - 1000)];
        let scene = render(&elements, &Viewport::new(), NOW);

        let colors = filled_colors(&scene);
        let core = colors.last().copied().unwrap();
        assert!(core.a > 0 && core.a < 255);
        assert_eq!(core.a, 170);
    }

    #[test]
    fn test_text_lines_use_baselines() {
        let style = ElementStyle::default();
        let elements = vec![Element::text(Point::new(10.0, 20.0), "a\n\nb".to_string(), style)];
        let scene = render(&elements, &Viewport::new(), NOW);

        let origins: Vec<Point> = scene
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text(run) => Some(run.origin),
                _ => None,
            })
            .collect();
        assert_eq!(origins, vec![Point::new(10.0, 40.0), Point::new(10.0, 88.0)]);
    }

    #[test]
    fn test_sticky_paints_paper_then_text() {
        let elements = vec![Element::sticky(
            Rect::new(0.0, 0.0, 200.0, 200.0),
            "todo".to_string(),
            ElementStyle::default(),
        )];
        let scene = render(&elements, &Viewport::new(), NOW);
        let kinds: Vec<&str> = scene
            .commands()
            .iter()
            .map(|c| match c {
                DrawCommand::Fill { .. } => "fill",
                DrawCommand::Stroke { .. } => "stroke",
                DrawCommand::Text(_) => "text",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["other", "other", "fill", "stroke", "text", "other"]);
        assert_eq!(filled_colors(&scene), vec![EditorConfig::default().sticky_color]);
    }

    #[test]
    fn test_preview_paints_last() {
        let elements = sample_elements();
        let preview = Element::shape(ShapeKind::Line, Point::ZERO, Point::new(5.0, 5.0), ElementStyle::default());
        let viewport = Viewport::new();
        let ctx = RenderContext::new(&elements, &viewport, NOW).with_preview(Some(&preview));
        let mut scene = Scene::new();
        CanvasRenderer::new().render(&mut scene, &ctx);

        let commands = scene.commands();
        let n = commands.len();
        assert_eq!(commands[n - 3], DrawCommand::PushTransform(viewport.render_transform()));
        assert!(matches!(&commands[n - 2], DrawCommand::Stroke { path, .. } if path.bounding_box() == Rect::new(0.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_preview_segment_only() {
        let preview = Element::stroke(
            Brush::Pen,
            vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(9.0, 3.0)],
            ElementStyle::default(),
        );
        let mut scene = Scene::new();
        CanvasRenderer::new().render_preview_segment(
            &mut scene,
            &Viewport::new(),
            &preview,
            Point::new(5.0, 0.0),
            Point::new(9.0, 3.0),
        );

        assert_eq!(scene.commands().len(), 3);
        let DrawCommand::Stroke { path, .. } = &scene.commands()[1] else {
            panic!("expected a stroke");
        };
        assert_eq!(path.elements().len(), 2);
    }
}
