//! Inline templates mixing literal text with styled holes and nested views.
//!
//! A [`Template`] is an ordered list of [`Node`]s drawn left to right from the
//! top-left corner of the viewport. A newline inside any text moves the
//! cursor to column 0 of the next line; a line is as tall as the tallest view
//! drawn on it.

use std::borrow::Cow;

use ratatui::layout::{Position, Rect, Size};
use ratatui::style::Style;
use unicode_width::UnicodeWidthStr;

use crate::layout::Measure;
use crate::render::surface::{Surface, View};

pub enum Node<'a> {
    /// Unstyled literal text
    Text(Cow<'a, str>),
    /// Styled text
    Styled(Cow<'a, str>, Style),
    /// Nested view, drawn at its measured size
    View(&'a dyn Measure),
}

#[derive(Default)]
pub struct Template<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> Template<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<Cow<'a, str>>) -> Self {
        self.nodes.push(Node::Text(text.into()));
        self
    }

    #[must_use]
    pub fn styled(mut self, text: impl Into<Cow<'a, str>>, style: Style) -> Self {
        self.nodes.push(Node::Styled(text.into(), style));
        self
    }

    #[must_use]
    pub fn embed(mut self, view: &'a dyn Measure) -> Self {
        self.nodes.push(Node::View(view));
        self
    }

    #[must_use]
    pub fn newline(self) -> Self {
        self.text("\n")
    }

    pub fn nodes(&self) -> &[Node<'a>] {
        &self.nodes
    }
}

struct Cursor {
    origin: Rect,
    position: Position,
    line_height: u16,
}

impl Cursor {
    const fn new(origin: Rect) -> Self {
        Self {
            origin,
            position: Position::new(origin.x, origin.y),
            line_height: 1,
        }
    }

    fn line_break(&mut self) {
        self.position = Position::new(
            self.origin.x,
            self.position.y.saturating_add(self.line_height),
        );
        self.line_height = 1;
    }

    fn available(&self) -> Size {
        Size::new(
            self.origin.right().saturating_sub(self.position.x),
            self.origin.bottom().saturating_sub(self.position.y),
        )
    }

    fn text(&mut self, surface: &mut dyn Surface, text: &str, style: Style) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.line_break();
            }
            if !line.is_empty() {
                self.position = surface.draw_text(self.position, line, style);
            }
        }
    }

    fn view(&mut self, surface: &mut dyn Surface, view: &dyn Measure) {
        let size = view.measure(self.available());
        surface.render(view, Rect::new(self.position.x, self.position.y, size.width, size.height));
        self.position.x = self.position.x.saturating_add(size.width);
        self.line_height = self.line_height.max(size.height);
    }
}

impl View for Template<'_> {
    fn view(&self, surface: &mut dyn Surface) {
        let mut cursor = Cursor::new(surface.viewport());
        for node in &self.nodes {
            match node {
                Node::Text(text) => cursor.text(surface, text, Style::new()),
                Node::Styled(text, style) => cursor.text(surface, text, *style),
                Node::View(view) => cursor.view(surface, *view),
            }
        }
    }
}

impl Measure for Template<'_> {
    /// Extent of the template with unbounded room to the right and below.
    fn min_size(&self) -> Size {
        let mut extent = Extent::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) | Node::Styled(text, _) => extent.text(text),
                Node::View(view) => extent.block(view.min_size()),
            }
        }
        extent.finish()
    }
}

struct Extent {
    width: u16,
    height: u16,
    line_width: u16,
    line_height: u16,
}

impl Extent {
    const fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            line_width: 0,
            line_height: 1,
        }
    }

    fn text(&mut self, text: &str) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.height = self.height.saturating_add(self.line_height);
                self.line_width = 0;
                self.line_height = 1;
            }
            let run = u16::try_from(line.width()).unwrap_or(u16::MAX);
            self.line_width = self.line_width.saturating_add(run);
            self.width = self.width.max(self.line_width);
        }
    }

    fn block(&mut self, size: Size) {
        self.line_width = self.line_width.saturating_add(size.width);
        self.width = self.width.max(self.line_width);
        self.line_height = self.line_height.max(size.height);
    }

    const fn finish(self) -> Size {
        Size::new(self.width, self.height.saturating_add(self.line_height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BufferSurface, Pipeline};
    use ratatui::buffer::Buffer;
    use ratatui::style::{Color, Stylize};

    struct Badge;

    impl View for Badge {
        fn view(&self, surface: &mut dyn Surface) {
            let area = surface.viewport();
            surface.draw_text(area.as_position(), "[ok]", Style::new());
            surface.draw_text(Position::new(area.x, area.y + 1), "[..]", Style::new());
        }
    }

    impl Measure for Badge {
        fn min_size(&self) -> Size {
            Size::new(4, 2)
        }
    }

    fn lines(buffer: &Buffer) -> Vec<String> {
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect()
            })
            .collect()
    }

    fn draw(template: &Template<'_>, width: u16, height: u16) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        BufferSurface::draw(&mut buffer, area, &Pipeline::new(), template);
        buffer
    }

    #[test]
    fn test_literal_and_styled_text() {
        let template = Template::new()
            .text("a: ")
            .styled("red", Style::new().red())
            .text("\nb");
        let buffer = draw(&template, 8, 2);
        assert_eq!(lines(&buffer), vec!["a: red  ", "b       "]);
        assert_eq!(buffer[(3, 0)].fg, Color::Red);
        assert_eq!(buffer[(2, 0)].fg, Color::Reset);
    }

    #[test]
    fn test_nested_view_advances_cursor() {
        let badge = Badge;
        let template = Template::new()
            .text(">")
            .embed(&badge)
            .text("<")
            .newline()
            .text("next");
        let buffer = draw(&template, 8, 3);
        assert_eq!(lines(&buffer), vec![">[ok]<  ", " [..]   ", "next    "]);
    }

    #[test]
    fn test_min_size() {
        let badge = Badge;
        let template = Template::new().text("ab").embed(&badge).newline().text("xyz");
        assert_eq!(template.min_size(), Size::new(6, 3));
        assert_eq!(Template::new().text("one\ntwo!").min_size(), Size::new(4, 2));
    }
}
