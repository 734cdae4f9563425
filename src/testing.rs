//! Test helpers for components and full programs.
//!
//! [`Harness`] drives a component without a terminal: messages go straight to
//! `update`, returned effects queue up and run one at a time when asked, so a
//! test controls exactly when each async result lands.
//!
//! [`HeadlessTerminal`] is a [`TerminalHandle`] over ratatui's `TestBackend`
//! for running a whole [`Program`](crate::program::Program) in a test.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use color_eyre::Result;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};
use tokio_util::sync::CancellationToken;

use crate::core::{Component, Effect, EffectError, Fault, Message};
use crate::program::{Pass, TerminalHandle, dispatch};
use crate::render::{BufferSurface, Pipeline};

/// Drives a component by hand.
pub struct Harness<C: Component> {
    state: C,
    pending: VecDeque<Effect<C::Msg>>,
    token: CancellationToken,
    quit: bool,
}

impl<C: Component> Harness<C> {
    /// Mount `state`, queueing its `init` effect.
    pub fn new(state: C) -> Self {
        let pending = state.init().into_iter().collect();
        Self {
            state,
            pending,
            token: CancellationToken::new(),
            quit: false,
        }
    }

    pub const fn state(&self) -> &C {
        &self.state
    }

    pub fn into_state(self) -> C {
        self.state
    }

    /// A `Quit` has been applied.
    pub const fn is_quit(&self) -> bool {
        self.quit
    }

    /// Number of effects waiting to run.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Apply a message the way the runtime would. Effects returned after a
    /// quit are dropped.
    pub fn send(&mut self, message: Message<C::Msg>) {
        let mut pass = Pass::default();
        dispatch(&mut self.state, message, &mut pass);
        self.quit |= pass.quit;
        if !self.quit {
            self.pending.extend(pass.effects);
        }
    }

    /// Remove the oldest pending effect without running it.
    pub fn take_effect(&mut self) -> Option<Effect<C::Msg>> {
        self.pending.pop_front()
    }

    /// Run the oldest pending effect and apply its result.
    ///
    /// Returns `false` if nothing was pending.
    pub async fn step(&mut self) -> bool {
        let Some(effect) = self.pending.pop_front() else {
            return false;
        };
        match effect.run_contained(self.token.clone()).await {
            Ok(Some(message)) => self.send(message),
            Ok(None) | Err(Fault::Cancelled) => {}
            Err(Fault::Failed(report)) => self.send(Message::EffectError(EffectError::new(report))),
        }
        true
    }

    /// Step until nothing is pending, a quit was applied or `max_steps` ran.
    /// Returns the number of steps taken.
    pub async fn settle(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && !self.quit && self.step().await {
            steps += 1;
        }
        steps
    }

    /// Cancel the token every effect run by this harness observes.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Draw the current state into a fresh buffer.
    pub fn render(&self, width: u16, height: u16, pipeline: &Pipeline) -> Buffer {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        BufferSurface::draw(&mut buffer, area, pipeline, &self.state);
        buffer
    }
}

/// Rows of a buffer as plain strings, styles dropped.
pub fn lines(buffer: &Buffer) -> Vec<String> {
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buffer[(x, y)].symbol())
                .collect()
        })
        .collect()
}

/// Shared view into a [`HeadlessTerminal`] after it was moved into a program.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    frames: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
    screen: Arc<Mutex<Option<Buffer>>>,
}

impl Probe {
    /// Frames drawn so far.
    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Contents of the last drawn frame.
    pub fn screen(&self) -> Option<Buffer> {
        self.screen.lock().ok().and_then(|screen| screen.clone())
    }

    pub fn lines(&self) -> Vec<String> {
        self.screen().map(|buffer| lines(&buffer)).unwrap_or_default()
    }
}

/// In-memory terminal.
pub struct HeadlessTerminal {
    terminal: Terminal<TestBackend>,
    probe: Probe,
}

impl HeadlessTerminal {
    pub fn new(width: u16, height: u16) -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(TestBackend::new(width, height))?,
            probe: Probe::default(),
        })
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }
}

impl TerminalHandle for HeadlessTerminal {
    fn draw(&mut self, render: &mut dyn FnMut(&mut Frame<'_>)) -> Result<()> {
        let frame = self.terminal.draw(|frame| render(frame))?;
        if let Ok(mut screen) = self.probe.screen.lock() {
            *screen = Some(frame.buffer.clone());
        }
        self.probe.frames.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.terminal.clear()?;
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.terminal.backend_mut().resize(width, height);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.probe.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Event, TickSource, sequence};
    use crate::render::{Surface, View};
    use color_eyre::eyre::eyre;
    use ratatui::style::Style;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    struct Recorder {
        seen: Vec<String>,
    }

    impl View for Recorder {
        fn view(&self, surface: &mut dyn Surface) {
            let origin = surface.viewport().as_position();
            surface.draw_text(origin, &self.seen.join(" "), Style::new());
        }
    }

    impl Component for Recorder {
        type Msg = &'static str;

        fn update(&self, msg: &Message<&'static str>) -> (Self, Option<Effect<&'static str>>) {
            let mut next = self.clone();
            match msg {
                Message::App(word) => next.seen.push((*word).to_string()),
                Message::EffectError(error) => next.seen.push(format!("error:{error}")),
                Message::Input(Event::Paste(text)) if text == "go" => {
                    return (
                        next,
                        sequence([
                            Effect::task(async { Err(eyre!("first failed")) }),
                            Effect::app("second"),
                        ]),
                    );
                }
                Message::Quit => next.seen.push("quit".to_string()),
                _ => {}
            }
            (next, None)
        }
    }

    #[tokio::test]
    async fn test_sequence_continues_after_failure() {
        let mut harness = Harness::new(Recorder::default());
        harness.send(Message::Input(Event::Paste("go".to_string())));
        assert_eq!(harness.pending(), 1);

        assert_eq!(harness.settle(10).await, 2);
        assert_eq!(harness.state().seen, vec!["error:first failed", "second"]);
    }

    #[tokio::test]
    async fn test_quit_drops_later_effects() {
        let mut harness = Harness::new(Recorder::default());
        harness.send(Message::Batch(vec![Message::App("a"), Message::Quit]));
        assert!(harness.is_quit());
        harness.send(Message::Input(Event::Paste("go".to_string())));
        assert_eq!(harness.pending(), 0);
        assert!(!harness.step().await);
    }

    #[test]
    fn test_render_current_state() {
        let mut harness = Harness::new(Recorder::default());
        harness.send(Message::App("hi"));
        harness.send(Message::App("there"));
        let buffer = harness.render(10, 1, &Pipeline::new());
        assert_eq!(lines(&buffer), vec!["hi there  "]);
    }

    /// Counts ticks from its own source; pausing advances the source.
    #[derive(Debug, Clone)]
    struct Clock {
        ticks: TickSource,
        count: u32,
    }

    impl View for Clock {
        fn view(&self, _surface: &mut dyn Surface) {}
    }

    impl Component for Clock {
        type Msg = ();

        fn init(&self) -> Option<Effect<()>> {
            Some(self.ticks.create_tick(Duration::from_millis(1), Some("clock")))
        }

        fn update(&self, msg: &Message<()>) -> (Self, Option<Effect<()>>) {
            match msg {
                Message::Tick(tick) if self.ticks.is_valid_kind(tick, "clock") => {
                    let next = Self {
                        count: self.count + 1,
                        ..self.clone()
                    };
                    let effect = next.ticks.create_tick(Duration::from_millis(1), Some("clock"));
                    (next, Some(effect))
                }
                Message::Input(Event::FocusLost) => (
                    Self {
                        ticks: self.ticks.advance(),
                        ..self.clone()
                    },
                    None,
                ),
                _ => (self.clone(), None),
            }
        }
    }

    #[tokio::test]
    async fn test_stale_tick_is_ignored_by_harness() {
        let mut harness = Harness::new(Clock {
            ticks: TickSource::new(),
            count: 0,
        });
        assert!(harness.step().await);
        assert!(harness.step().await);
        assert_eq!(harness.state().count, 2);

        // The next tick is already in flight when the source advances.
        harness.send(Message::Input(Event::FocusLost));
        assert_eq!(harness.pending(), 1);
        assert!(harness.step().await);
        assert_eq!(harness.state().count, 2);
        assert_eq!(harness.pending(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_harness_skips_results() {
        let mut harness = Harness::new(Clock {
            ticks: TickSource::new(),
            count: 0,
        });
        harness.cancel();
        assert!(harness.step().await);
        assert_eq!(harness.state().count, 0);
    }

    #[tokio::test]
    async fn test_cancelled_sequence_drops_remaining_effects() {
        let mut harness = Harness::new(Recorder::default());
        harness.pending.extend(sequence([
            Effect::tick(Duration::from_secs(10), |_| Message::App("tick")),
            Effect::app("after-cancel"),
        ]));
        harness.cancel();

        assert_eq!(harness.settle(10).await, 1);
        assert!(harness.state().seen.is_empty());
        assert_eq!(harness.pending(), 0);
    }

    #[test]
    fn test_headless_terminal_records_frames() {
        let mut terminal = HeadlessTerminal::new(4, 1).unwrap();
        let probe = terminal.probe();
        terminal
            .draw(&mut |frame: &mut Frame<'_>| {
                frame.buffer_mut().set_string(0, 0, "ok", Style::new());
            })
            .unwrap();
        assert_eq!(probe.frames(), 1);
        assert_eq!(probe.lines(), vec!["ok  "]);

        terminal.resize(6, 2).unwrap();
        terminal.draw(&mut |_frame: &mut Frame<'_>| {}).unwrap();
        assert_eq!(probe.screen().unwrap().area, Rect::new(0, 0, 6, 2));
        assert!(!probe.released());
        terminal.release().unwrap();
        assert!(probe.released());
    }
}
