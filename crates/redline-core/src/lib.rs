//! Redline Core Library
//!
//! Platform-agnostic data model and logic for the Redline annotation
//! editor: shapes, styles and per-tool defaults, the object store with
//! undo/redo and z-order, the pointer-gesture tool state machines, and
//! the document exporters.

pub mod color;
pub mod export;
pub mod input;
pub mod registry;
pub mod shapes;
pub mod store;
pub mod style;
pub mod tools;

pub use color::Rgba;
pub use input::{Key, KeyEvent, Modifiers};
pub use registry::{StyleRegistry, ToolDefaults};
pub use shapes::{PixelBuffer, Shape, ShapeId, ShapeKind};
pub use store::{GridConfig, MAX_UNDO_HISTORY, ObjectStore};
pub use style::{Composite, LineType, RedactMode, Style, StylePatch};
pub use tools::{Preview, TextRequest, Tool, ToolCtx, ToolKind, ToolResponse};
