//! Row and column containers.
//!
//! Containers are assembled inside a parent's `view` from borrowed children,
//! laid out for the surface's current viewport and then dropped:
//!
//! ```ignore
//! fn view(&self, surface: &mut dyn Surface) {
//!     Flex::row()
//!         .gap(1)
//!         .fixed(&self.sidebar, 24)
//!         .fill(&self.body)
//!         .view(surface);
//! }
//! ```

use ratatui::layout::{Rect, Size};

use crate::layout::distribute::{FlexSize, distribute};
use crate::layout::sizing::Measure;
use crate::render::{Surface, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    const fn main(self, size: Size) -> u16 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    const fn cross(self, size: Size) -> u16 {
        match self {
            Self::Horizontal => size.height,
            Self::Vertical => size.width,
        }
    }

    const fn size(self, main: u16, cross: u16) -> Size {
        match self {
            Self::Horizontal => Size::new(main, cross),
            Self::Vertical => Size::new(cross, main),
        }
    }
}

/// A child of a [`Flex`] container.
pub struct FlexItem<'a> {
    pub view: &'a dyn Measure,
    pub size: FlexSize,
}

/// Row or column of sized views.
pub struct Flex<'a> {
    axis: Axis,
    gap: u16,
    items: Vec<FlexItem<'a>>,
}

impl<'a> Flex<'a> {
    /// Children laid out left to right.
    pub const fn row() -> Self {
        Self {
            axis: Axis::Horizontal,
            gap: 0,
            items: Vec::new(),
        }
    }

    /// Children laid out top to bottom.
    pub const fn column() -> Self {
        Self {
            axis: Axis::Vertical,
            gap: 0,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub const fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub fn push(mut self, view: &'a dyn Measure, size: FlexSize) -> Self {
        self.items.push(FlexItem { view, size });
        self
    }

    #[must_use]
    pub fn fixed(self, view: &'a dyn Measure, cells: u16) -> Self {
        self.push(view, FlexSize::Fixed(cells))
    }

    #[must_use]
    pub fn fill(self, view: &'a dyn Measure) -> Self {
        self.push(view, FlexSize::fill())
    }

    pub fn items(&self) -> &[FlexItem<'a>] {
        &self.items
    }

    /// Child regions for a container occupying `area`.
    pub fn areas(&self, area: Rect) -> Vec<Rect> {
        let sizes: Vec<FlexSize> = self.items.iter().map(|item| item.size).collect();
        let minimums: Vec<u16> = self
            .items
            .iter()
            .map(|item| self.axis.main(item.view.min_size()))
            .collect();
        let lengths = distribute(self.axis.main(area.as_size()), self.gap, &sizes, &minimums);

        let cross = self.axis.cross(area.as_size());
        let mut offset = 0_u16;
        lengths
            .into_iter()
            .map(|length| {
                let rect = match self.axis {
                    Axis::Horizontal => {
                        Rect::new(area.x.saturating_add(offset), area.y, length, cross)
                    }
                    Axis::Vertical => {
                        Rect::new(area.x, area.y.saturating_add(offset), cross, length)
                    }
                };
                offset = offset.saturating_add(length).saturating_add(self.gap);
                rect
            })
            .collect()
    }

    fn gaps(&self) -> u16 {
        let count = u16::try_from(self.items.len()).unwrap_or(u16::MAX);
        self.gap.saturating_mul(count.saturating_sub(1))
    }

    fn combine(&self, sizes: impl Iterator<Item = (FlexSize, Size)>) -> Size {
        let (main, cross) = sizes.fold((0_u16, 0_u16), |(main, cross), (flex, size)| {
            (
                main.saturating_add(flex.floor(self.axis.main(size))),
                cross.max(self.axis.cross(size)),
            )
        });
        self.axis.size(main.saturating_add(self.gaps()), cross)
    }
}

impl View for Flex<'_> {
    fn view(&self, surface: &mut dyn Surface) {
        let areas = self.areas(surface.viewport());
        for (item, area) in self.items.iter().zip(areas) {
            surface.render(item.view, area);
        }
    }
}

impl Measure for Flex<'_> {
    fn min_size(&self) -> Size {
        self.combine(
            self.items
                .iter()
                .map(|item| (item.size, item.view.min_size())),
        )
    }

    fn measure(&self, available: Size) -> Size {
        self.combine(
            self.items
                .iter()
                .map(|item| (item.size, item.view.measure(available))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BufferSurface, Pipeline};
    use ratatui::buffer::Buffer;
    use ratatui::layout::Position;
    use ratatui::style::Style;

    /// Fills its whole viewport with one character.
    struct Fill {
        glyph: &'static str,
        min: Size,
    }

    impl View for Fill {
        fn view(&self, surface: &mut dyn Surface) {
            let area = surface.viewport();
            for y in area.top()..area.bottom() {
                let line = self.glyph.repeat(usize::from(area.width));
                surface.draw_text(Position::new(area.x, y), &line, Style::new());
            }
        }
    }

    impl Measure for Fill {
        fn min_size(&self) -> Size {
            self.min
        }
    }

    const fn fill(glyph: &'static str, width: u16, height: u16) -> Fill {
        Fill {
            glyph,
            min: Size::new(width, height),
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

    #[test]
    fn test_row_areas() {
        let a = fill("a", 0, 0);
        let b = fill("b", 0, 0);
        let row = Flex::row().gap(2).fixed(&a, 3).fill(&b);

        let areas = row.areas(Rect::new(1, 1, 10, 2));
        assert_eq!(areas, vec![Rect::new(1, 1, 3, 2), Rect::new(6, 1, 5, 2)]);
    }

    #[test]
    fn test_column_areas_respect_minimums() {
        let a = fill("a", 0, 4);
        let b = fill("b", 0, 0);
        let column = Flex::column().fill(&a).fill(&b);

        let areas = column.areas(Rect::new(0, 0, 5, 6));
        assert_eq!(areas, vec![Rect::new(0, 0, 5, 5), Rect::new(0, 5, 5, 1)]);
    }

    #[test]
    fn test_row_renders_children() {
        let a = fill("a", 0, 0);
        let b = fill("b", 0, 0);
        let c = fill("c", 0, 0);
        let row = Flex::row().fill(&a).fill(&b).fill(&c);

        let area = Rect::new(0, 0, 7, 1);
        let mut buffer = Buffer::empty(area);
        BufferSurface::draw(&mut buffer, area, &Pipeline::new(), &row);
        assert_eq!(lines(&buffer), vec!["aabbccc"]);
    }

    #[test]
    fn test_nested_containers() {
        let a = fill("a", 0, 0);
        let b = fill("b", 0, 0);
        let c = fill("c", 0, 0);
        let right = Flex::column().fill(&b).fill(&c);
        let row = Flex::row().gap(1).fixed(&a, 2).fill(&right);

        let area = Rect::new(0, 0, 6, 2);
        let mut buffer = Buffer::empty(area);
        BufferSurface::draw(&mut buffer, area, &Pipeline::new(), &row);
        assert_eq!(lines(&buffer), vec!["aa bbb", "aa ccc"]);
    }

    #[test]
    fn test_min_size_sums_main_axis() {
        let a = fill("a", 3, 1);
        let b = fill("b", 2, 4);
        let row = Flex::row().gap(1).fixed(&a, 5).fill(&b);
        assert_eq!(row.min_size(), Size::new(8, 4));

        let column = Flex::column().fill(&a).fill(&b);
        assert_eq!(column.min_size(), Size::new(3, 5));
    }
}
