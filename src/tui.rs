//! Terminal UI wrapper.
//!
//! This module provides [`Tui`], a wrapper around ratatui's Terminal that
//! handles raw mode, the alternate screen (or an inline viewport) and the
//! crossterm input stream.

use std::io::{Stdout, stdout};
use std::ops::{Deref, DerefMut};

use color_eyre::Result;
use crossterm::cursor;
use crossterm::event::{
    DisableBracketedPaste, DisableFocusChange, DisableMouseCapture, EnableBracketedPaste,
    EnableFocusChange, EnableMouseCapture, Event as CrosstermEvent, EventStream, KeyCode,
    KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use futures::{FutureExt, StreamExt};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::core::Event;
use crate::program::{TerminalHandle, TerminalMode};

pub type Backend = CrosstermBackend<Stdout>;

/// Terminal UI wrapper.
///
/// Manages the terminal state (raw mode, alternate screen) and forwards
/// input as [`Event`]s over an unbounded channel.
pub struct Tui {
    terminal: Terminal<Backend>,
    mode: TerminalMode,
    task: Option<JoinHandle<()>>,
    cancellation_token: CancellationToken,
    event_rx: Option<UnboundedReceiver<Event>>,
    active: bool,
}

impl Tui {
    /// Take over the terminal (raw mode, screen setup, mouse and focus
    /// reporting) and start reading input.
    pub fn new(mode: TerminalMode) -> Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        if mode == TerminalMode::Fullscreen {
            crossterm::execute!(stdout(), EnterAlternateScreen)?;
        }
        crossterm::execute!(
            stdout(),
            cursor::Hide,
            EnableMouseCapture,
            EnableBracketedPaste,
            EnableFocusChange
        )?;

        let backend = Backend::new(stdout());
        let terminal = match mode {
            TerminalMode::Fullscreen => Terminal::new(backend)?,
            TerminalMode::Inline(height) => Terminal::with_options(
                backend,
                TerminalOptions {
                    viewport: Viewport::Inline(height),
                },
            )?,
        };

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancellation_token = CancellationToken::new();
        let task = tokio::spawn(Self::event_loop(event_tx, cancellation_token.clone()));
        debug!(?mode, "terminal entered");

        Ok(Self {
            terminal,
            mode,
            task: Some(task),
            cancellation_token,
            event_rx: Some(event_rx),
            active: true,
        })
    }

    /// Hand out the input channel. Only the first call gets it.
    pub fn take_events(&mut self) -> Option<UnboundedReceiver<Event>> {
        self.event_rx.take()
    }

    /// Restore the terminal. Calling it twice is harmless.
    pub fn exit(&mut self) -> Result<()> {
        self.stop();
        if !self.active {
            return Ok(());
        }
        self.active = false;
        if crossterm::terminal::is_raw_mode_enabled()? {
            self.terminal.flush()?;
            crossterm::execute!(
                stdout(),
                DisableFocusChange,
                DisableBracketedPaste,
                DisableMouseCapture
            )?;
            if self.mode == TerminalMode::Fullscreen {
                crossterm::execute!(stdout(), LeaveAlternateScreen)?;
            }
            crossterm::execute!(stdout(), cursor::Show)?;
            crossterm::terminal::disable_raw_mode()?;
        }
        debug!("terminal restored");
        Ok(())
    }

    fn stop(&mut self) {
        self.cancellation_token.cancel();
        if let Some(task) = self.task.take()
            && !task.is_finished()
        {
            task.abort();
        }
    }

    async fn event_loop(event_tx: UnboundedSender<Event>, cancellation_token: CancellationToken) {
        let mut event_stream = EventStream::new();

        #[cfg(unix)]
        {
            let event_tx = event_tx.clone();
            let cancellation_token = cancellation_token.clone();
            tokio::spawn(async move {
                let Ok(mut sigterm) =
                    tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                else {
                    warn!("could not install SIGTERM handler");
                    return;
                };
                tokio::select! {
                    _ = sigterm.recv() => {
                        let _ = event_tx.send(Event::Quit);
                    }
                    () = cancellation_token.cancelled() => {}
                }
            });
        }

        loop {
            let event = tokio::select! {
                () = cancellation_token.cancelled() => {
                    break;
                }
                crossterm_event = event_stream.next().fuse() => {
                    match crossterm_event {
                        Some(Ok(event)) => match event {
                            CrosstermEvent::Key(key) => {
                                if key.kind != KeyEventKind::Press {
                                    continue;
                                }
                                if key.modifiers.contains(KeyModifiers::CONTROL)
                                    && key.code == KeyCode::Char('c')
                                {
                                    Event::Quit
                                } else {
                                    Event::Key(key)
                                }
                            }
                            CrosstermEvent::Mouse(mouse) => Event::Mouse(mouse),
                            CrosstermEvent::Resize(width, height) => Event::Resize(width, height),
                            CrosstermEvent::FocusGained => Event::FocusGained,
                            CrosstermEvent::FocusLost => Event::FocusLost,
                            CrosstermEvent::Paste(paste) => Event::Paste(paste),
                        },
                        Some(Err(e)) => {
                            warn!(error = %e, "failed to read terminal input");
                            continue;
                        }
                        None => break,
                    }
                }
            };
            if event_tx.send(event).is_err() {
                break;
            }
        }
        cancellation_token.cancel();
    }
}

impl TerminalHandle for Tui {
    fn draw(&mut self, render: &mut dyn FnMut(&mut Frame<'_>)) -> Result<()> {
        self.terminal.draw(|frame| render(frame))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.terminal.clear()?;
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        if self.mode == TerminalMode::Fullscreen {
            self.terminal.resize(Rect::new(0, 0, width, height))?;
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.exit()
    }
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!(error = %e, "failed to restore terminal");
        }
    }
}
