//! Sizing contracts and flex containers.
//!
//! - [`Measure`] - Minimum size plus optional space-aware measurement
//! - [`distribute`] - Deterministic split of one axis between items
//! - [`Flex`] - Row/column containers built on [`distribute`]

mod distribute;
mod flex;
mod sizing;

pub use distribute::{FlexSize, distribute};
pub use flex::{Flex, FlexItem};
pub use sizing::Measure;
