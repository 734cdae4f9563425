//! Core framework types.
//!
//! This module contains the foundational types and traits that power the runtime:
//! - [`Event`] - Input events from the terminal
//! - [`Message`] - The value every `update` consumes
//! - [`Effect`] - Async side effects, composed with [`batch`] and [`sequence`]
//! - [`TickSource`] - Generation-stamped timers
//! - [`Component`] - The init/update/view contract

pub mod component;
pub mod effect;
pub mod event;
pub mod message;
pub mod tick;

// Re-export commonly used types
pub use component::{Component, Effects, forward_all, init_all};
pub use effect::{Effect, EffectError, EffectResult, Fault, batch, sequence};
pub use event::{Event, EventSource};
pub use message::Message;
pub use tick::{Tick, TickSource};
