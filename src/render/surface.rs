//! Render surfaces.
//!
//! Components never touch a terminal buffer directly: they draw through a
//! [`Surface`], which knows its viewport, can draw a run of styled text, and
//! can render a nested view into a sub-region. Nested surfaces are always
//! rebuilt through the full [`Pipeline`], so a child cannot bypass a stage
//! its parent was drawn through.

use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use unicode_width::UnicodeWidthStr;

use crate::render::pipeline::Pipeline;

/// Anything that can draw itself onto a surface.
pub trait View {
    /// Draw the current state. Must not mutate state.
    fn view(&self, surface: &mut dyn Surface);
}

/// Drawing target for a [`View`].
///
/// All coordinates are absolute, like ratatui's `Rect`s. Drawing outside the
/// viewport is clipped.
pub trait Surface {
    /// Region this surface may draw into.
    fn viewport(&self) -> Rect;

    /// Draw `text` starting at `position`, returning the position right after
    /// the run.
    fn draw_text(&mut self, position: Position, text: &str, style: Style) -> Position;

    /// Render `view` into `area` on a freshly derived surface.
    ///
    /// The child's viewport is `area` intersected with this viewport. When
    /// `area` starts above or left of this viewport, the child's origin moves
    /// to the intersection rather than drawing partly out of sight; an area
    /// with no overlap yields an empty viewport and nothing is drawn.
    fn render(&mut self, view: &dyn View, area: Rect);
}

/// Surface writing into a ratatui [`Buffer`].
pub struct BufferSurface<'a> {
    buffer: &'a mut Buffer,
    viewport: Rect,
    pipeline: Pipeline,
}

impl<'a> BufferSurface<'a> {
    pub fn new(buffer: &'a mut Buffer, viewport: Rect, pipeline: Pipeline) -> Self {
        let viewport = viewport.intersection(buffer.area);
        Self {
            buffer,
            viewport,
            pipeline,
        }
    }

    /// Draw `view` into `area` of `buffer`, through every stage of `pipeline`.
    pub fn draw(buffer: &mut Buffer, area: Rect, pipeline: &Pipeline, view: &dyn View) {
        let base = BufferSurface::new(buffer, area, pipeline.clone());
        let mut surface = pipeline.apply(Box::new(base));
        view.view(surface.as_mut());
    }
}

impl Surface for BufferSurface<'_> {
    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn draw_text(&mut self, position: Position, text: &str, style: Style) -> Position {
        let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
        let end = Position::new(position.x.saturating_add(width), position.y);

        if self.viewport.contains(position) {
            let max_width = usize::from(self.viewport.right() - position.x);
            self.buffer
                .set_stringn(position.x, position.y, text, max_width, style);
        }
        end
    }

    fn render(&mut self, view: &dyn View, area: Rect) {
        let area = area.intersection(self.viewport);
        let child = BufferSurface {
            buffer: &mut *self.buffer,
            viewport: area,
            pipeline: self.pipeline.clone(),
        };
        let mut surface = self.pipeline.apply(Box::new(child));
        view.view(surface.as_mut());
    }
}
