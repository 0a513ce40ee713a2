//! Editor session: one open whiteboard and everything needed to edit it.

use crate::config::EditorConfig;
use crate::document::{Document, Whiteboard};
use crate::element::{Element, Rgba};
use crate::history::History;
use crate::input::{GestureState, InputContext, InputEffect, InputMachine, PointerEvent};
use crate::storage::{BoxFuture, Storage, StorageError, StorageResult};
use crate::tools::{ToolKind, ToolSettings};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors surfaced by an editor session.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("persistence failed: {0}")]
    Persistence(#[from] StorageError),
}

/// Source of the current time in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// The application embedding the editor.
pub trait EditorHost {
    /// Persist `board`. The editor waits for the result before accepting
    /// further edits.
    fn on_save(&self, board: &Whiteboard) -> BoxFuture<'_, StorageResult<()>>;

    /// The session was closed.
    fn on_close(&mut self) {}
}

/// Host that writes boards straight to a [`Storage`] backend.
pub struct StorageHost<S> {
    storage: S,
}

impl<S: Storage> StorageHost<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S: Storage> EditorHost for StorageHost<S> {
    fn on_save(&self, board: &Whiteboard) -> BoxFuture<'_, StorageResult<()>> {
        self.storage.save(&board.id, board)
    }
}

/// An open whiteboard.
///
/// Owns the working elements, their history, the view, and the current
/// tool settings. The working elements always equal the active history
/// entry except in the middle of an eraser gesture.
pub struct EditorSession<H: EditorHost> {
    host: H,
    config: EditorConfig,
    clock: Box<dyn Clock>,
    id: String,
    name: String,
    created_at: Option<u64>,
    elements: Vec<Element>,
    history: History,
    viewport: Viewport,
    settings: ToolSettings,
    input: InputMachine,
    pending_text: Option<String>,
    dirty: bool,
}

impl<H: EditorHost> EditorSession<H> {
    /// Open a whiteboard. Its content becomes the only history entry.
    pub fn open(board: Whiteboard, host: H, config: EditorConfig) -> Self {
        let Whiteboard {
            id,
            name,
            content,
            created_at,
            ..
        } = board;

        let mut viewport = Viewport::with_zoom_bounds(config.min_zoom, config.max_zoom);
        viewport.restore(content.zoom, content.pan, content.canvas_size);

        let elements = content.without_ephemeral().elements;
        let history = History::new(elements.clone()).with_limit(config.history_limit);
        let settings = ToolSettings::from_style(config.style.clone());

        log::info!("Opened whiteboard {id} ({} elements)", elements.len());

        Self {
            host,
            config,
            clock: Box::new(SystemClock),
            id,
            name,
            created_at,
            elements,
            history,
            viewport,
            settings,
            input: InputMachine::new(),
            pending_text: None,
            dirty: false,
        }
    }

    /// Load the whiteboard `id` from `storage` and open it.
    pub async fn load<S>(storage: &S, id: &str, host: H, config: EditorConfig) -> Result<Self, EditorError>
    where
        S: Storage + ?Sized,
    {
        let board = storage.load(id).await.inspect_err(|e| {
            log::warn!("Failed to load whiteboard {id}: {e}");
        })?;
        Ok(Self::open(board, host, config))
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // --- Input ---

    /// Feed one pointer event through the gesture state machine, committing
    /// whatever it finishes.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> InputEffect {
        let now_ms = self.clock.now_ms();
        let mut ctx = InputContext {
            viewport: &mut self.viewport,
            elements: &mut self.elements,
            settings: &self.settings,
            config: &self.config,
            text: self.pending_text.as_deref(),
            now_ms,
        };
        let effect = self.input.handle(event, &mut ctx);

        match &effect {
            InputEffect::Commit(element) => {
                let lifetime = self.config.laser_lifetime_ms;
                self.elements.retain(|e| !e.is_expired(now_ms, lifetime));
                if element.content().is_some() {
                    self.pending_text = None;
                }
                self.elements.push(element.clone());
                self.commit();
            }
            InputEffect::EraseFinished { removed } => {
                log::debug!("Eraser removed {removed} elements");
                self.commit();
            }
            _ => {}
        }
        effect
    }

    pub fn pointer_down(&mut self, position: Point) -> InputEffect {
        self.handle_pointer(PointerEvent::Down { position })
    }

    pub fn pointer_move(&mut self, position: Point) -> InputEffect {
        self.handle_pointer(PointerEvent::Move { position })
    }

    pub fn pointer_up(&mut self, position: Point) -> InputEffect {
        self.handle_pointer(PointerEvent::Up { position })
    }

    pub fn pointer_leave(&mut self) -> InputEffect {
        self.handle_pointer(PointerEvent::Leave)
    }

    /// The uncommitted element being drawn, if any.
    pub fn preview(&self) -> Option<Element> {
        self.input
            .preview(&self.settings, &self.config, self.clock.now_ms())
    }

    // --- History ---

    /// Step back one history entry. Returns false at the oldest entry.
    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        match self.history.undo() {
            Some(snapshot) => {
                self.elements = snapshot.to_vec();
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Step forward one history entry. Returns false at the newest entry.
    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        match self.history.redo() {
            Some(snapshot) => {
                self.elements = snapshot.to_vec();
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Remove every element as one undoable step.
    pub fn clear(&mut self) {
        self.cancel_gesture();
        self.elements.clear();
        self.commit();
    }

    fn commit(&mut self) {
        self.history.commit(&self.elements);
        self.dirty = true;
    }

    /// Abandon the active gesture, restoring anything the eraser removed.
    fn cancel_gesture(&mut self) {
        if matches!(self.input.state(), GestureState::Erasing { .. }) {
            self.elements = self.history.current().to_vec();
        }
        self.input.cancel();
    }

    // --- Tools and view ---

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.settings.tool != tool {
            self.cancel_gesture();
            self.settings.tool = tool;
        }
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.settings.color = color;
    }

    /// Set the stroke size. Non-positive sizes are ignored.
    pub fn set_stroke_size(&mut self, size: f64) {
        if size.is_finite() && size > 0.0 {
            self.settings.stroke_size = size;
        }
    }

    /// Content used by the next text or sticky gesture.
    pub fn set_pending_text(&mut self, text: Option<String>) {
        self.pending_text = text;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
    }

    /// Zoom by `factor` around a screen point.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        self.viewport.zoom_at(screen, factor);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn set_canvas_size(&mut self, size: Size) {
        self.viewport.set_canvas_size(size);
    }

    pub fn set_backing_scale(&mut self, scale: Vec2) {
        self.viewport.set_backing_scale(scale);
    }

    // --- Accessors ---

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Working elements in paint order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn tool(&self) -> ToolKind {
        self.settings.tool
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn gesture(&self) -> &GestureState {
        self.input.state()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Whether there are edits since the last successful save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // --- Lifecycle ---

    /// The persistable record for the current state.
    ///
    /// A half-finished eraser gesture is not part of it; the last committed
    /// elements are used instead.
    pub fn to_whiteboard(&self) -> Whiteboard {
        let elements = if matches!(self.input.state(), GestureState::Erasing { .. }) {
            self.history.current().to_vec()
        } else {
            self.elements.clone()
        };
        let content = Document {
            elements,
            canvas_size: self.viewport.canvas_size,
            zoom: self.viewport.zoom,
            pan: self.viewport.pan,
        };
        Whiteboard {
            id: self.id.clone(),
            name: self.name.clone(),
            content: content.without_ephemeral(),
            created_at: self.created_at,
            updated_at: Some(self.clock.now_ms()),
        }
    }

    /// Hand the current state to the host in one update.
    ///
    /// On failure the in-memory state is left untouched and stays dirty.
    pub async fn save(&mut self) -> Result<(), EditorError> {
        let board = self.to_whiteboard();
        match self.host.on_save(&board).await {
            Ok(()) => {
                self.dirty = false;
                log::info!("Saved whiteboard {} ({} elements)", self.id, board.content.len());
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to save whiteboard {}: {e}", self.id);
                Err(e.into())
            }
        }
    }

    /// Close the session, discarding unsaved state. Returns the host.
    pub fn close(mut self) -> H {
        self.input.cancel();
        if self.dirty {
            log::info!("Closing whiteboard {} with unsaved changes", self.id);
        } else {
            log::info!("Closing whiteboard {}", self.id);
        }
        self.host.on_close();
        self.host
    }
}
