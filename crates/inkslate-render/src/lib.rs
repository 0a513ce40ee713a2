//! Inkslate Render Library
//!
//! Deterministic rendering pipeline for Inkslate documents.
//! Backends implement [`Surface`]; [`Scene`] records draw commands and
//! `PixmapSurface` rasterizes on the CPU with tiny-skia.

mod brush;
mod renderer;
mod scene;

#[cfg(feature = "raster")]
mod raster;

pub use renderer::{
    CanvasRenderer, RenderContext, RenderError, RenderResult, SessionRender, Surface, TextRun,
};
pub use scene::{DrawCommand, Scene};

#[cfg(feature = "raster")]
pub use raster::PixmapSurface;
