//! Recording backend.

use crate::renderer::{Surface, TextRun};
use inkslate_core::element::Rgba;
use kurbo::{Affine, BezPath, Stroke};
use peniko::{Color, Fill};

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Background(Rgba),
    PushTransform(Affine),
    PopTransform,
    Stroke {
        path: BezPath,
        stroke: Stroke,
        color: Rgba,
    },
    Fill {
        path: BezPath,
        fill: Fill,
        color: Rgba,
    },
    Text(TextRun),
}

/// Surface that records commands instead of painting them.
///
/// Two renders of the same input leave identical command lists, which makes
/// this the reference backend for tests and for hosts that replay commands
/// onto their own canvas.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    commands: Vec<DrawCommand>,
    depth: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Current transform nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Surface for Scene {
    fn clear(&mut self) {
        self.commands.clear();
        self.depth = 0;
    }

    fn fill_background(&mut self, color: Color) {
        self.commands.push(DrawCommand::Background(color.into()));
    }

    fn push_transform(&mut self, transform: Affine) {
        self.depth += 1;
        self.commands.push(DrawCommand::PushTransform(transform));
    }

    fn pop_transform(&mut self) {
        if self.depth == 0 {
            log::warn!("Unbalanced pop_transform on scene");
            return;
        }
        self.depth -= 1;
        self.commands.push(DrawCommand::PopTransform);
    }

    fn stroke(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            stroke: stroke.clone(),
            color: color.into(),
        });
    }

    fn fill(&mut self, path: &BezPath, fill: Fill, color: Color) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            fill,
            color: color.into(),
        });
    }

    fn fill_text(&mut self, run: &TextRun) {
        self.commands.push(DrawCommand::Text(run.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use kurbo::Shape;

    #[test]
    fn test_clear_resets_commands() {
        let mut scene = Scene::new();
        scene.push_transform(Affine::scale(2.0));
        scene.fill(&Rect::new(0.0, 0.0, 1.0, 1.0).to_path(0.1), Fill::NonZero, Color::from_rgba8(1, 2, 3, 255));
        assert_eq!(scene.commands().len(), 2);
        assert_eq!(scene.depth(), 1);

        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.depth(), 0);
    }

    #[test]
    fn test_unbalanced_pop_is_ignored() {
        let mut scene = Scene::new();
        scene.pop_transform();
        assert!(scene.is_empty());
    }

    #[test]
    fn test_colors_recorded_as_rgba() {
        let mut scene = Scene::new();
        scene.fill_background(Color::from_rgba8(10, 20, 30, 255));
        assert_eq!(scene.commands(), &[DrawCommand::Background(Rgba::rgb(10, 20, 30))]);
    }
}
