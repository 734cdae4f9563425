//! Cross-cutting render stages.
//!
//! A [`Stage`] decorates a [`Surface`]: it overrides only the operations it
//! transforms and delegates everything else. A [`Pipeline`] is the ordered
//! list of stages; the first stage listed is the outermost decorator and sees
//! every draw call first.

use std::borrow::Cow;
use std::sync::Arc;

use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use serde::{Deserialize, Serialize};

use crate::render::surface::{Surface, View};

/// Factory for a surface decorator.
pub trait Stage: Send + Sync {
    fn wrap<'a>(&self, inner: Box<dyn Surface + 'a>) -> Box<dyn Surface + 'a>;
}

/// Ordered, cheaply clonable list of stages.
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Arc<[Arc<dyn Stage>]>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage; it wraps inside every stage added before it.
    #[must_use]
    pub fn with_stage(self, stage: impl Stage + 'static) -> Self {
        let mut stages: Vec<Arc<dyn Stage>> = self.stages.iter().cloned().collect();
        stages.push(Arc::new(stage));
        Self {
            stages: stages.into(),
        }
    }

    pub fn from_kinds(kinds: &[StageKind]) -> Self {
        Self {
            stages: kinds.iter().map(|kind| kind.stage()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Decorate `base` with every stage.
    pub fn apply<'a>(&self, base: Box<dyn Surface + 'a>) -> Box<dyn Surface + 'a> {
        self.stages
            .iter()
            .rev()
            .fold(base, |inner, stage| stage.wrap(inner))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages.len())
            .finish()
    }
}

/// Built-in stages, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    StripColor,
    AsciiGlyphs,
}

impl StageKind {
    pub fn stage(self) -> Arc<dyn Stage> {
        match self {
            Self::StripColor => Arc::new(StripColor),
            Self::AsciiGlyphs => Arc::new(AsciiGlyphs),
        }
    }
}

/// Removes foreground and background colors, keeping modifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripColor;

impl Stage for StripColor {
    fn wrap<'a>(&self, inner: Box<dyn Surface + 'a>) -> Box<dyn Surface + 'a> {
        Box::new(StripColorSurface { inner })
    }
}

struct StripColorSurface<'a> {
    inner: Box<dyn Surface + 'a>,
}

impl Surface for StripColorSurface<'_> {
    fn viewport(&self) -> Rect {
        self.inner.viewport()
    }

    fn draw_text(&mut self, position: Position, text: &str, style: Style) -> Position {
        let plain = Style::new()
            .add_modifier(style.add_modifier)
            .remove_modifier(style.sub_modifier);
        self.inner.draw_text(position, text, plain)
    }

    fn render(&mut self, view: &dyn View, area: Rect) {
        self.inner.render(view, area);
    }
}

/// Replaces box-drawing and other decorative glyphs with ASCII look-alikes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiGlyphs;

impl Stage for AsciiGlyphs {
    fn wrap<'a>(&self, inner: Box<dyn Surface + 'a>) -> Box<dyn Surface + 'a> {
        Box::new(AsciiGlyphsSurface { inner })
    }
}

struct AsciiGlyphsSurface<'a> {
    inner: Box<dyn Surface + 'a>,
}

impl Surface for AsciiGlyphsSurface<'_> {
    fn viewport(&self) -> Rect {
        self.inner.viewport()
    }

    fn draw_text(&mut self, position: Position, text: &str, style: Style) -> Position {
        self.inner.draw_text(position, &to_ascii(text), style)
    }

    fn render(&mut self, view: &dyn View, area: Rect) {
        self.inner.render(view, area);
    }
}

fn to_ascii(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().map(ascii_glyph).collect())
}

/// Single-column fallback for a glyph; anything unknown passes through.
const fn ascii_glyph(c: char) -> char {
    match c {
        '─' | '━' | '═' | '┄' | '┅' | '┈' | '┉' | '╌' | '╍' | '╴' | '╶' | '╸' | '╺' => '-',
        '│' | '┃' | '║' | '┆' | '┇' | '┊' | '┋' | '╎' | '╏' | '╵' | '╷' | '╹' | '╻' => '|',
        '\u{2500}'..='\u{257F}' => '+',
        '\u{2580}'..='\u{259F}' => '#',
        '←' => '<',
        '→' => '>',
        '↑' => '^',
        '↓' => 'v',
        '•' | '●' | '○' | '◆' | '◇' => '*',
        '✓' | '✔' => 'v',
        '✗' | '✘' => 'x',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::BufferSurface;
    use ratatui::buffer::Buffer;
    use ratatui::style::{Color, Modifier, Stylize};

    struct Boxed;

    impl View for Boxed {
        fn view(&self, surface: &mut dyn Surface) {
            let area = surface.viewport();
            surface.draw_text(area.as_position(), "┌─•", Style::new().green().bold());
        }
    }

    struct Parent;

    impl View for Parent {
        fn view(&self, surface: &mut dyn Surface) {
            surface.render(&Boxed, Rect::new(0, 1, 3, 1));
        }
    }

    fn draw(pipeline: &Pipeline, view: &dyn View) -> Buffer {
        let area = Rect::new(0, 0, 3, 2);
        let mut buffer = Buffer::empty(area);
        BufferSurface::draw(&mut buffer, area, pipeline, view);
        buffer
    }

    #[test]
    fn test_strip_color_keeps_modifiers() {
        let buffer = draw(&Pipeline::new().with_stage(StripColor), &Parent);
        let cell = &buffer[(0, 1)];
        assert_eq!(cell.fg, Color::Reset);
        assert!(cell.modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_ascii_glyphs_maps_box_drawing() {
        assert_eq!(to_ascii("┌─┐│•→"), "+-+|*>");
        assert!(matches!(to_ascii("plain"), Cow::Borrowed("plain")));
        assert_eq!(to_ascii("héllo"), "héllo");
    }

    #[test]
    fn test_nested_render_reapplies_whole_pipeline() {
        let pipeline = Pipeline::from_kinds(&[StageKind::StripColor, StageKind::AsciiGlyphs]);
        let buffer = draw(&pipeline, &Parent);

        let line: String = (0..3).map(|x| buffer[(x, 1)].symbol().to_string()).collect();
        assert_eq!(line, "+-*");
        assert_eq!(buffer[(0, 1)].fg, Color::Reset);
    }

    #[test]
    fn test_empty_pipeline_passes_through() {
        let buffer = draw(&Pipeline::new(), &Parent);
        assert_eq!(buffer[(0, 1)].symbol(), "┌");
        assert_eq!(buffer[(0, 1)].fg, Color::Green);
    }

    #[test]
    fn test_stage_kind_names() {
        #[derive(Deserialize)]
        struct Config {
            pipeline: Vec<StageKind>,
        }
        let config: Config = toml::from_str(r#"pipeline = ["strip-color", "ascii-glyphs"]"#).unwrap();
        assert_eq!(config.pipeline, vec![StageKind::StripColor, StageKind::AsciiGlyphs]);
    }
}
