//! # lora-canvas
//!
//! Primitives shared by widgets that paint themselves onto a host canvas:
//!
//! - `geometry` - points, sizes and axis-aligned bounds
//! - `color` - HSLA colour values
//! - `input` - pointer and keyboard events delivered by the host
//! - `scene` - the retained draw list a widget paints into
//! - `text` - deterministic text measurement and truncation
//! - `theme` - colour and font tokens

pub mod color;
pub mod geometry;
pub mod input;
pub mod paint;
pub mod scene;
pub mod text;
pub mod theme;

pub use color::Hsla;
pub use geometry::{Bounds, Point, Size};
pub use input::{InputEvent, Modifiers, MouseButton};
pub use paint::PaintContext;
pub use scene::{Quad, Scene, TextAlign, TextRun};
pub use text::TextSystem;
