#![forbid(unsafe_code)]

//! Render: colors, text attributes, per-screen cursor state, the in-memory
//! canvas, and the drawing surface trait backends implement.

pub mod canvas;
pub mod color;
pub mod screen;
pub mod style;
pub mod surface;

pub use canvas::{Canvas, Glyph, Pixel};
pub use color::{Color, PackedRgba};
pub use screen::{ScreenContext, Viewport};
pub use style::{FontId, FontMetrics, MixMode, TextAttrs, TextStyle};
pub use surface::DrawingSurface;
