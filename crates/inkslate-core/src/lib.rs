//! Inkslate Core Library
//!
//! Platform-agnostic data model and editing engine for the Inkslate
//! whiteboard: elements, view transform, history, pointer input and the
//! editor session that ties them to a persistence host.

pub mod config;
pub mod document;
pub mod element;
pub mod history;
pub mod input;
pub mod session;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use document::{Document, Whiteboard, next_z_index};
pub use element::{Brush, Element, ElementId, ElementKind, ElementStyle, Rgba, ShapeKind};
pub use history::History;
pub use input::{DiscardReason, GestureState, InputEffect, InputMachine, PointerEvent};
pub use session::{Clock, EditorError, EditorHost, EditorSession, StorageHost, SystemClock};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use tools::{ToolKind, ToolSettings};
pub use viewport::{MAX_ZOOM, MIN_ZOOM, Viewport};
