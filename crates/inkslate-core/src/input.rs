//! Pointer input state machine.
//!
//! Turns pointer-down/move/up events into pans, live previews, erasures and
//! finished elements. The machine never touches history itself: it reports
//! an [`InputEffect`] and the session decides what to commit and repaint.

use crate::config::EditorConfig;
use crate::document::next_z_index;
use crate::element::{Element, ElementId};
use crate::tools::{ToolKind, ToolSettings};
use crate::viewport::Viewport;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pointer event in screen coordinates relative to the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// The pointer left the canvas.
    Leave,
}

/// Current gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Dragging the view. The anchor is kept in screen space.
    Panning { anchor: Point },
    /// Drawing with `tool`; `path` and `current` are in document space.
    Drawing {
        tool: ToolKind,
        path: Vec<Point>,
        current: Point,
    },
    /// Erasing; counts the elements removed so far in this gesture.
    Erasing { removed: usize },
}

/// Why a finished gesture produced no element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// A freehand gesture with fewer than two points.
    TooFewPoints,
    /// A shape with zero area (or a zero-length line).
    ZeroArea,
    /// A text gesture without content.
    EmptyText,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DiscardReason::TooFewPoints => "stroke has fewer than two points",
            DiscardReason::ZeroArea => "shape has zero area",
            DiscardReason::EmptyText => "no text content",
        };
        f.write_str(text)
    }
}

/// What an input event changed.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEffect {
    /// Nothing visible changed.
    None,
    /// Pan or zoom changed; repaint everything.
    ViewChanged,
    /// One freehand segment was added; repaint only that segment.
    PreviewSegment { from: Point, to: Point },
    /// The live preview changed shape; repaint the preview.
    PreviewChanged,
    /// The eraser removed elements from the working document.
    ElementsChanged,
    /// A gesture finished with a new element to append and commit.
    Commit(Element),
    /// An eraser gesture finished after removing `removed` elements.
    EraseFinished { removed: usize },
    /// A gesture finished without producing anything.
    Discarded(DiscardReason),
}

/// Everything the machine reads or mutates while handling an event.
pub struct InputContext<'a> {
    pub viewport: &'a mut Viewport,
    /// Working copy of the document elements (the eraser edits it).
    pub elements: &'a mut Vec<Element>,
    pub settings: &'a ToolSettings,
    pub config: &'a EditorConfig,
    /// Content supplied by the host's text-input UI.
    pub text: Option<&'a str>,
    /// Current time in milliseconds since the Unix epoch.
    pub now_ms: u64,
}

/// The pointer gesture state machine.
#[derive(Debug, Clone, Default)]
pub struct InputMachine {
    state: GestureState,
    /// Last pointer position seen, for cancelling on leave.
    last_screen: Option<Point>,
}

impl InputMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Dispatch a pointer event.
    pub fn handle(&mut self, event: PointerEvent, ctx: &mut InputContext<'_>) -> InputEffect {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position, ctx),
            PointerEvent::Move { position } => self.pointer_move(position, ctx),
            PointerEvent::Up { position } => self.pointer_up(position, ctx),
            PointerEvent::Leave => self.pointer_leave(ctx),
        }
    }

    /// Start a gesture. Ignored while another gesture is active.
    pub fn pointer_down(&mut self, screen: Point, ctx: &mut InputContext<'_>) -> InputEffect {
        if !self.is_idle() {
            return InputEffect::None;
        }
        self.last_screen = Some(screen);
        let doc = ctx.viewport.screen_to_document(screen);

        match ctx.settings.tool {
            ToolKind::Hand => {
                self.state = GestureState::Panning { anchor: screen };
                InputEffect::None
            }
            ToolKind::Cursor => InputEffect::None,
            ToolKind::Eraser => {
                let removed = erase_at(doc, ctx);
                self.state = GestureState::Erasing { removed };
                if removed > 0 {
                    InputEffect::ElementsChanged
                } else {
                    InputEffect::None
                }
            }
            tool => {
                self.state = GestureState::Drawing {
                    tool,
                    path: vec![doc],
                    current: doc,
                };
                InputEffect::PreviewChanged
            }
        }
    }

    /// Continue the active gesture.
    pub fn pointer_move(&mut self, screen: Point, ctx: &mut InputContext<'_>) -> InputEffect {
        if self.is_idle() {
            return InputEffect::None;
        }
        self.last_screen = Some(screen);
        let doc = ctx.viewport.screen_to_document(screen);

        match &mut self.state {
            GestureState::Idle => InputEffect::None,
            GestureState::Panning { anchor } => {
                let delta = screen - *anchor;
                *anchor = screen;
                if delta.hypot2() == 0.0 {
                    return InputEffect::None;
                }
                ctx.viewport.pan_by_screen(delta);
                InputEffect::ViewChanged
            }
            GestureState::Drawing { tool, path, current } => {
                *current = doc;
                if !tool.is_freehand() {
                    return InputEffect::PreviewChanged;
                }
                match path.last().copied() {
                    Some(from) if from == doc => InputEffect::None,
                    Some(from) => {
                        path.push(doc);
                        InputEffect::PreviewSegment { from, to: doc }
                    }
                    None => {
                        path.push(doc);
                        InputEffect::PreviewChanged
                    }
                }
            }
            GestureState::Erasing { removed } => {
                let count = erase_at(doc, ctx);
                *removed += count;
                if count > 0 {
                    InputEffect::ElementsChanged
                } else {
                    InputEffect::None
                }
            }
        }
    }

    /// Finish the active gesture at `screen`.
    pub fn pointer_up(&mut self, screen: Point, ctx: &mut InputContext<'_>) -> InputEffect {
        let state = std::mem::take(&mut self.state);
        self.last_screen = None;
        let doc = ctx.viewport.screen_to_document(screen);

        match state {
            GestureState::Idle => InputEffect::None,
            GestureState::Panning { anchor } => {
                let delta = screen - anchor;
                if delta.hypot2() > 0.0 {
                    ctx.viewport.pan_by_screen(delta);
                    InputEffect::ViewChanged
                } else {
                    InputEffect::None
                }
            }
            GestureState::Drawing { tool, path, .. } => {
                match finish_drawing(tool, path, doc, ctx) {
                    Ok(element) => InputEffect::Commit(element.with_z_index(next_z_index(ctx.elements.as_slice()))),
                    Err(reason) => {
                        log::debug!("Discarding {tool:?} gesture: {reason}");
                        InputEffect::Discarded(reason)
                    }
                }
            }
            GestureState::Erasing { removed } => {
                let removed = removed + erase_at(doc, ctx);
                if removed > 0 {
                    InputEffect::EraseFinished { removed }
                } else {
                    InputEffect::None
                }
            }
        }
    }

    /// The pointer left the canvas: finish the gesture where it was last seen.
    pub fn pointer_leave(&mut self, ctx: &mut InputContext<'_>) -> InputEffect {
        match self.last_screen {
            Some(screen) if !self.is_idle() => self.pointer_up(screen, ctx),
            _ => {
                self.last_screen = None;
                InputEffect::None
            }
        }
    }

    /// Drop the active gesture without producing anything.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
        self.last_screen = None;
    }

    /// Uncommitted element for the live preview, if a drawing gesture is active.
    pub fn preview(&self, settings: &ToolSettings, config: &EditorConfig, now_ms: u64) -> Option<Element> {
        let GestureState::Drawing { tool, path, current } = &self.state else {
            return None;
        };
        let style = settings.element_style();
        let start = *path.first()?;
        let element = match *tool {
            ToolKind::Shape(kind) => Element::shape(kind, start, *current, style),
            ToolKind::Sticky => Element::sticky(sticky_rect(start, *current, config), String::new(), style),
            ToolKind::Laser => Element::laser(*current, config.laser_radius, style, now_ms),
            ToolKind::Text => return None,
            freehand => Element::stroke(freehand.brush()?, path.clone(), style),
        };
        // A fixed id keeps seeded brush effects stable between preview frames.
        Some(element.with_id(ElementId::nil()))
    }
}

/// Build the element for a finished drawing gesture.
fn finish_drawing(
    tool: ToolKind,
    path: Vec<Point>,
    end: Point,
    ctx: &InputContext<'_>,
) -> Result<Element, DiscardReason> {
    let style = ctx.settings.element_style();
    let start = path.first().copied().unwrap_or(end);

    match tool {
        ToolKind::Pen | ToolKind::Highlighter | ToolKind::Spray | ToolKind::Calligraphy => {
            let brush = tool.brush().ok_or(DiscardReason::TooFewPoints)?;
            if path.len() < 2 {
                return Err(DiscardReason::TooFewPoints);
            }
            Ok(Element::stroke(brush, path, style))
        }
        ToolKind::Shape(kind) => {
            let element = Element::shape(kind, start, end, style);
            let degenerate = if kind.is_linear() {
                start == end
            } else {
                element.size.width <= 0.0 || element.size.height <= 0.0
            };
            if degenerate {
                Err(DiscardReason::ZeroArea)
            } else {
                Ok(element)
            }
        }
        ToolKind::Text => match ctx.text {
            Some(content) if !content.trim().is_empty() => Ok(Element::text(start, content.to_string(), style)),
            _ => Err(DiscardReason::EmptyText),
        },
        ToolKind::Sticky => {
            let mut style = style;
            if style.background_color.is_none() {
                style.background_color = Some(ctx.config.sticky_color);
            }
            style.fill = true;
            let content = ctx.text.unwrap_or_default().to_string();
            Ok(Element::sticky(sticky_rect(start, end, ctx.config), content, style))
        }
        ToolKind::Laser => Ok(Element::laser(end, ctx.config.laser_radius, style, ctx.now_ms)),
        ToolKind::Eraser | ToolKind::Hand | ToolKind::Cursor => Err(DiscardReason::ZeroArea),
    }
}

/// Sticky notes take the dragged box, or the default size when the drag is
/// smaller than that.
fn sticky_rect(start: Point, end: Point, config: &EditorConfig) -> Rect {
    let dragged = Rect::from_points(start, end);
    let default = config.sticky_size();
    if dragged.width() >= default.width && dragged.height() >= default.height {
        dragged
    } else {
        Rect::from_origin_size(start, default)
    }
}

/// Remove every element under `doc`. Returns how many were removed.
fn erase_at(doc: Point, ctx: &mut InputContext<'_>) -> usize {
    let tolerance = ctx.viewport.screen_length_to_document(ctx.config.eraser_radius);
    let before = ctx.elements.len();
    ctx.elements.retain(|e| !e.hit_test(doc, tolerance));
    before - ctx.elements.len()
}
