//! Component contract.
//!
//! Components follow the Elm architecture:
//! - `init()` runs once at mount and may start an effect
//! - `update()` consumes one message and returns the NEXT state plus an
//!   optional effect; the current state is never mutated
//! - `view()` draws the current state (see [`View`])
//!
//! Only `update()` decides what happens next. The runtime calls it strictly
//! one message at a time.

use crate::core::effect::{Effect, batch};
use crate::core::message::Message;
use crate::render::View;

/// Interactive unit hosted by the runtime or nested in another component.
pub trait Component: View + Sized {
    /// Application payload carried by [`Message::App`].
    type Msg: Send + 'static;

    /// Effect to start when the component is mounted.
    fn init(&self) -> Option<Effect<Self::Msg>> {
        None
    }

    /// Produce the next state for `msg`.
    ///
    /// `Batch` and `Sequence` wrappers are unwrapped by the runtime before
    /// they get here, so implementations only match on leaf messages.
    #[must_use]
    fn update(&self, msg: &Message<Self::Msg>) -> (Self, Option<Effect<Self::Msg>>);
}

/// Collects the effects children return during one parent `update`.
///
/// ```ignore
/// let mut effects = Effects::new();
/// let list = effects.absorb(self.list.update(msg));
/// let input = effects.absorb(self.input.update(msg));
/// (Self { list, input }, effects.finish())
/// ```
pub struct Effects<M> {
    pending: Vec<Effect<M>>,
}

impl<M: Send + 'static> Effects<M> {
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, effect: impl Into<Option<Effect<M>>>) {
        self.pending.extend(effect.into());
    }

    /// Keep the child's effect and hand back its new state.
    pub fn absorb<C>(&mut self, (state, effect): (C, Option<Effect<M>>)) -> C {
        self.push(effect);
        state
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Merge everything collected into one effect.
    pub fn finish(self) -> Option<Effect<M>> {
        batch(self.pending)
    }
}

impl<M: Send + 'static> Default for Effects<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward `msg` to every child and merge the effects they return.
pub fn forward_all<C: Component>(
    children: &[C],
    msg: &Message<C::Msg>,
) -> (Vec<C>, Option<Effect<C::Msg>>) {
    let mut effects = Effects::new();
    let children = children
        .iter()
        .map(|child| effects.absorb(child.update(msg)))
        .collect();
    (children, effects.finish())
}

/// Merged `init` effects of every child.
pub fn init_all<C: Component>(children: &[C]) -> Option<Effect<C::Msg>> {
    batch(children.iter().map(Component::init))
}
