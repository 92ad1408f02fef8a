//! Redline Render Library
//!
//! Rendering half of the Redline annotation editor: the [`Surface`]
//! drawing abstraction with a software raster implementation, the shape
//! renderer (revision clouds, redaction post-pass, selection overlay)
//! and the [`Engine`] that wires surface, store, registry and tools
//! together.

pub mod cloud;
pub mod engine;
pub mod raster;
pub mod renderer;
pub mod surface;
pub mod text;

pub use engine::{ClipboardError, ClipboardSink, Engine};
pub use raster::{RasterSurface, SurfaceError};
pub use renderer::{render_all, render_grid, render_preview, render_selection, render_shape};
pub use surface::{FontSpec, Paint, StrokeParams, Surface};
