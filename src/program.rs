//! Program runtime.
//!
//! [`Program`] owns the event loop: it mounts a root [`Component`], waits for
//! whichever comes first (terminal input or a completed effect), feeds it
//! through `update`, schedules the returned effect and redraws when the state
//! changed.
//!
//! # Guarantees
//! - `update` and `view` never run concurrently; all state transitions form
//!   one linear history.
//! - Effects run concurrently on the tokio pool and report back through one
//!   single-consumer queue.
//! - A `Quit` anywhere in a message tree ends the loop once the tree has been
//!   applied; effects produced by that pass are discarded.
//! - Cancelling [`ProgramOptions::cancellation_token`] abandons every
//!   in-flight effect and exits at the next suspension point.

mod options;

pub use options::{DEFAULT_TARGET_FPS, MAX_TARGET_FPS, ProgramOptions, TerminalMode};

use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use ratatui::Frame;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::core::{
    Component, Effect, EffectError, Event, EventSource, Fault, Message, sequence,
};
use crate::render::BufferSurface;
use crate::tui::Tui;

/// Terminal lifecycle as seen by the runtime.
///
/// Escape sequences, raw mode and buffering stay behind this boundary.
pub trait TerminalHandle {
    /// Draw one frame.
    fn draw(&mut self, render: &mut dyn FnMut(&mut Frame<'_>)) -> Result<()>;

    fn clear(&mut self) -> Result<()>;

    /// The terminal reported a new size.
    fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        let _ = (width, height);
        Ok(())
    }

    /// Give the terminal back (leave raw mode, restore the screen).
    fn release(&mut self) -> Result<()>;
}

/// Lifecycle phase of a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Running,
    Terminating,
}

enum Step<M> {
    Cancelled,
    InputClosed,
    Frame,
    Message(Message<M>),
}

/// Event loop hosting a root component.
pub struct Program<C, T = Tui, E = UnboundedReceiver<Event>>
where
    C: Component,
{
    state: C,
    last_rendered: Option<C>,
    terminal: T,
    events: E,
    options: ProgramOptions,
    owns_terminal: bool,
    phase: Phase,
}

impl<C> Program<C>
where
    C: Component + Clone + PartialEq,
{
    /// Take over the process terminal. It is released when the run ends.
    ///
    /// # Errors
    /// Fails if the terminal cannot be switched into raw mode.
    pub fn new(state: C, options: ProgramOptions) -> Result<Self> {
        let mut tui = Tui::new(options.mode)?;
        let events = tui
            .take_events()
            .ok_or_else(|| eyre!("terminal events were already taken"))?;
        Ok(Self::build(state, tui, events, options, true))
    }
}

impl<C, T, E> Program<C, T, E>
where
    C: Component + Clone + PartialEq,
    T: TerminalHandle,
    E: EventSource,
{
    /// Run on an externally owned terminal. The runtime never releases it.
    pub fn with_terminal(state: C, terminal: T, events: E, options: ProgramOptions) -> Self {
        Self::build(state, terminal, events, options, false)
    }

    /// Run on a terminal the runtime releases when the run ends.
    pub fn with_owned_terminal(state: C, terminal: T, events: E, options: ProgramOptions) -> Self {
        Self::build(state, terminal, events, options, true)
    }

    fn build(state: C, terminal: T, events: E, options: ProgramOptions, owns_terminal: bool) -> Self {
        Self {
            state,
            last_rendered: None,
            terminal,
            events,
            options,
            owns_terminal,
            phase: Phase::Initializing,
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn state(&self) -> &C {
        &self.state
    }

    /// Run until quit, cancellation or the end of input. Returns the final
    /// state.
    ///
    /// # Errors
    /// Fails if drawing to or releasing the terminal fails. Effect failures
    /// never end the run.
    pub async fn run(mut self) -> Result<C> {
        let effect_token = self.options.cancellation_token.child_token();
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler {
            results: result_tx,
            token: effect_token.clone(),
        };
        let mut pacer = FramePacer::new(self.options.frame_interval());

        debug!(phase = ?self.phase, mode = ?self.options.mode, "starting runtime");
        if let Some(effect) = self.state.init() {
            scheduler.spawn(effect);
        }
        let outcome = match self.terminal.clear() {
            Ok(()) => self.render(&mut pacer),
            Err(error) => Err(error),
        };

        let outcome = match outcome {
            Ok(()) => {
                self.phase = Phase::Running;
                info!("runtime running");
                self.event_loop(&scheduler, &mut result_rx, &mut pacer).await
            }
            Err(error) => Err(error),
        };

        self.phase = Phase::Terminating;
        debug!(phase = ?self.phase, "stopping runtime");
        effect_token.cancel();
        drop(result_rx);

        let released = if self.owns_terminal {
            self.terminal.release()
        } else {
            Ok(())
        };
        outcome?;
        released?;
        Ok(self.state)
    }

    async fn event_loop(
        &mut self,
        scheduler: &Scheduler<C::Msg>,
        results: &mut UnboundedReceiver<Message<C::Msg>>,
        pacer: &mut FramePacer,
    ) -> Result<()> {
        let token = self.options.cancellation_token.clone();
        let mut dirty = false;

        loop {
            let step = tokio::select! {
                biased;
                () = token.cancelled() => Step::Cancelled,
                () = pacer.next_frame(), if dirty => Step::Frame,
                event = self.events.next_event() => {
                    event.map_or(Step::InputClosed, |event| Step::Message(Message::from(event)))
                }
                Some(message) = results.recv() => Step::Message(message),
            };

            let message = match step {
                Step::Cancelled => {
                    debug!("run cancelled");
                    return Ok(());
                }
                Step::InputClosed => {
                    debug!("input closed");
                    return Ok(());
                }
                Step::Frame => {
                    self.render(pacer)?;
                    dirty = false;
                    continue;
                }
                Step::Message(message) => message,
            };

            let mut pass = Pass::default();
            dispatch(&mut self.state, message, &mut pass);

            if let Some((width, height)) = pass.resize {
                trace!(width, height, "terminal resized");
                self.terminal.resize(width, height)?;
            }
            if pass.quit {
                info!(discarded = pass.effects.len(), "quit requested");
                return Ok(());
            }
            for effect in pass.effects {
                scheduler.spawn(effect);
            }

            if pass.resize.is_some() || self.last_rendered.as_ref() != Some(&self.state) {
                dirty = true;
            }
            if dirty && pacer.is_ready() {
                self.render(pacer)?;
                dirty = false;
            }
        }
    }

    fn render(&mut self, pacer: &mut FramePacer) -> Result<()> {
        let pipeline = &self.options.pipeline;
        let state = &self.state;
        self.terminal.draw(&mut |frame: &mut Frame<'_>| {
            let area = frame.area();
            BufferSurface::draw(frame.buffer_mut(), area, pipeline, state);
        })?;
        self.last_rendered = Some(self.state.clone());
        pacer.mark();
        trace!("frame rendered");
        Ok(())
    }
}

/// What one message tree did to the runtime.
pub(crate) struct Pass<M> {
    pub effects: Vec<Effect<M>>,
    pub quit: bool,
    pub resize: Option<(u16, u16)>,
}

impl<M> Default for Pass<M> {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            quit: false,
            resize: None,
        }
    }
}

/// Apply a message tree to `state`, unwrapping `Batch` and `Sequence`.
///
/// A sequence step is applied before the next effect of that sequence is
/// queued, so the effect observes the step's state change.
pub(crate) fn dispatch<C: Component>(state: &mut C, message: Message<C::Msg>, pass: &mut Pass<C::Msg>) {
    match message {
        Message::Batch(messages) => {
            for message in messages {
                dispatch(state, message, pass);
            }
        }
        Message::Sequence { step, remaining } => {
            if let Some(step) = step {
                dispatch(state, *step, pass);
            }
            pass.effects.extend(sequence(remaining));
        }
        message => {
            match &message {
                Message::Quit => pass.quit = true,
                Message::Resize { width, height } => pass.resize = Some((*width, *height)),
                _ => {}
            }
            let (next, effect) = state.update(&message);
            *state = next;
            pass.effects.extend(effect);
        }
    }
}

/// Spawns effects and routes their results into the loop's queue.
struct Scheduler<M> {
    results: UnboundedSender<Message<M>>,
    token: CancellationToken,
}

impl<M: Send + 'static> Scheduler<M> {
    fn spawn(&self, effect: Effect<M>) {
        let results = self.results.clone();
        let token = self.token.clone();
        tokio::spawn(async move {
            match effect.run_contained(token).await {
                Ok(Some(message)) => {
                    let _ = results.send(message);
                }
                Ok(None) => {}
                Err(Fault::Cancelled) => trace!("effect cancelled"),
                Err(Fault::Failed(report)) => {
                    warn!(error = %report, "effect failed");
                    let _ = results.send(Message::EffectError(EffectError::new(report)));
                }
            }
        });
    }
}

/// Caps the frame rate; a frame that comes too early waits for the next slot.
struct FramePacer {
    interval: Duration,
    last: Option<Instant>,
}

impl FramePacer {
    const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    fn is_ready(&self) -> bool {
        self.last
            .is_none_or(|last| last.elapsed() >= self.interval)
    }

    fn mark(&mut self) {
        self.last = Some(Instant::now());
    }

    async fn next_frame(&self) {
        if let Some(last) = self.last {
            tokio::time::sleep_until(last + self.interval).await;
        }
    }
}
