//! Input events.
//!
//! Events represent input from the external world (keyboard, mouse, focus,
//! resize). They flow INTO the runtime from a terminal driver and are turned
//! into [`Message`](crate::core::Message)s before reaching a component.

use async_trait::async_trait;
use crossterm::event::{KeyEvent, MouseEvent};
use tokio::sync::mpsc::UnboundedReceiver;

/// Events from the terminal/environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Quit requested (Ctrl+C, SIGTERM)
    Quit,
    /// Terminal gained focus
    FocusGained,
    /// Terminal lost focus
    FocusLost,
    /// Text pasted from clipboard
    Paste(String),
    /// Key pressed
    Key(KeyEvent),
    /// Mouse event
    Mouse(MouseEvent),
    /// Terminal resized
    Resize(u16, u16),
}

/// Source of input events.
///
/// The runtime awaits [`EventSource::next_event`] concurrently with completed
/// effects. Returning `None` means the source is exhausted and ends the run.
/// The future must be cancel-safe: the runtime drops it whenever an effect
/// result wins the race.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Option<Event>;
}

#[async_trait]
impl EventSource for UnboundedReceiver<Event> {
    async fn next_event(&mut self) -> Option<Event> {
        self.recv().await
    }
}
