//! Sizing contract for layout participants.

use ratatui::layout::Size;

use crate::render::View;

/// A view that declares how much space it needs.
///
/// The minimum is a hard floor: containers never allocate less unless the
/// whole container is too small for the sum of its children's floors, in
/// which case every floor is scaled down proportionally.
pub trait Measure: View {
    /// Smallest size this view can be drawn at.
    fn min_size(&self) -> Size;

    /// Preferred size given `available` space. Defaults to the floor.
    fn measure(&self, available: Size) -> Size {
        let _ = available;
        self.min_size()
    }
}
