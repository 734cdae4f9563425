//! Render surfaces, pipeline stages and templates.
//!
//! - [`Surface`] - What components draw through
//! - [`Pipeline`] - Ordered decorators re-applied to every nested surface
//! - [`Template`] - Inline text with styled holes and embedded views

mod pipeline;
mod surface;
mod template;

pub use pipeline::{AsciiGlyphs, Pipeline, Stage, StageKind, StripColor};
pub use surface::{BufferSurface, Surface, View};
pub use template::{Node, Template};
