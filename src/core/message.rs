//! Messages consumed by components.
//!
//! # Terminology
//! - **Event**: Input from the world (keyboard, mouse, resize) - see [`crate::core::Event`]
//! - **Message**: The single value type a component's `update` consumes
//! - **Effect**: Async side effect that resolves to at most one message - see [`crate::core::Effect`]
//!
//! Messages are immutable and single-use: the runtime hands each one to
//! `update` exactly once. `Batch` and `Sequence` are wrappers the runtime
//! unwraps before a component ever sees them.

use std::sync::Arc;

use crate::core::effect::{Effect, EffectError};
use crate::core::event::Event;
use crate::core::tick::Tick;

/// A message flowing through the runtime.
///
/// `M` is the application-defined payload carried by [`Message::App`].
#[derive(Debug)]
pub enum Message<M> {
    /// Input from the terminal driver (key, mouse, paste, focus)
    Input(Event),
    /// Terminal resized
    Resize { width: u16, height: u16 },
    /// Timer fired, see [`crate::core::TickSource`]
    Tick(Tick),
    /// Stop the runtime
    Quit,
    /// Results of a batch, in the order the effects were given
    Batch(Vec<Message<M>>),
    /// One completed step of a sequence plus the effects still to run
    Sequence {
        step: Option<Box<Message<M>>>,
        remaining: Vec<Effect<M>>,
    },
    /// A scheduled effect failed
    EffectError(EffectError),
    /// Application-defined payload
    App(M),
}

impl<M> Message<M> {
    pub const fn is_quit(&self) -> bool {
        matches!(self, Self::Quit)
    }

    /// Returns the application payload if this is an [`Message::App`].
    pub const fn app(&self) -> Option<&M> {
        match self {
            Self::App(payload) => Some(payload),
            _ => None,
        }
    }

    pub const fn tick(&self) -> Option<&Tick> {
        match self {
            Self::Tick(tick) => Some(tick),
            _ => None,
        }
    }
}

impl<M: Send + 'static> Message<M> {
    /// Convert the application payload, including payloads nested in
    /// `Batch` and `Sequence` wrappers. Pending sequence effects are mapped
    /// lazily when they run.
    pub fn map<N, F>(self, f: F) -> Message<N>
    where
        N: Send + 'static,
        F: Fn(M) -> N + Send + Sync + 'static,
    {
        let f: Arc<dyn Fn(M) -> N + Send + Sync> = Arc::new(f);
        self.map_with(&f)
    }

    pub(crate) fn map_with<N: Send + 'static>(
        self,
        f: &Arc<dyn Fn(M) -> N + Send + Sync>,
    ) -> Message<N> {
        match self {
            Self::Input(event) => Message::Input(event),
            Self::Resize { width, height } => Message::Resize { width, height },
            Self::Tick(tick) => Message::Tick(tick),
            Self::Quit => Message::Quit,
            Self::Batch(messages) => {
                Message::Batch(messages.into_iter().map(|m| m.map_with(f)).collect())
            }
            Self::Sequence { step, remaining } => Message::Sequence {
                step: step.map(|s| Box::new(s.map_with(f))),
                remaining: remaining
                    .into_iter()
                    .map(|effect| effect.map_with(Arc::clone(f)))
                    .collect(),
            },
            Self::EffectError(error) => Message::EffectError(error),
            Self::App(payload) => Message::App(f(payload)),
        }
    }
}

impl<M> From<Event> for Message<M> {
    fn from(event: Event) -> Self {
        match event {
            Event::Quit => Self::Quit,
            Event::Resize(width, height) => Self::Resize { width, height },
            other => Self::Input(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_conversion() {
        assert!(Message::<()>::from(Event::Quit).is_quit());
        assert!(matches!(
            Message::<()>::from(Event::Resize(80, 24)),
            Message::Resize {
                width: 80,
                height: 24
            }
        ));
        assert!(matches!(
            Message::<()>::from(Event::FocusLost),
            Message::Input(Event::FocusLost)
        ));
    }

    #[test]
    fn test_map_reaches_nested_payloads() {
        let message = Message::Batch(vec![
            Message::App(1),
            Message::Sequence {
                step: Some(Box::new(Message::App(2))),
                remaining: vec![],
            },
            Message::Quit,
        ]);

        let Message::Batch(items) = message.map(|n: i32| n.to_string()) else {
            panic!("expected batch");
        };
        assert_eq!(items[0].app().map(String::as_str), Some("1"));
        let Message::Sequence { step: Some(step), .. } = &items[1] else {
            panic!("expected sequence");
        };
        assert_eq!(step.app().map(String::as_str), Some("2"));
        assert!(items[2].is_quit());
    }
}
