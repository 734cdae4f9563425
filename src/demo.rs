//! Stopwatch shown by the `lazyflow` binary.

use std::time::Duration;

use color_eyre::eyre::eyre;
use crossterm::event::{KeyCode, KeyEvent};
use lazyflow::core::{Component, Effect, Event, Message, TickSource, batch};
use lazyflow::layout::{Flex, Measure};
use lazyflow::render::{Surface, Template, View};
use ratatui::layout::{Position, Rect, Size};
use ratatui::style::{Color, Style, Stylize};
use unicode_width::UnicodeWidthStr;

const TICK: Duration = Duration::from_millis(100);
const TICK_KIND: &str = "stopwatch";
const KEYS: &str = "space  start/stop\nl      lap\nr      reset\nf      sync\nq      quit";

#[derive(Debug)]
pub enum StopwatchMsg {
    Synced(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopwatch {
    ticks: TickSource,
    elapsed: Duration,
    laps: Vec<Duration>,
    running: bool,
    syncing: bool,
    notice: Option<String>,
    error: Option<String>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            ticks: TickSource::new(),
            elapsed: Duration::ZERO,
            laps: Vec::new(),
            running: false,
            syncing: false,
            notice: None,
            error: None,
        }
    }

    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn laps(&self) -> &[Duration] {
        &self.laps
    }

    fn schedule(&self) -> Effect<StopwatchMsg> {
        self.ticks.create_tick(TICK, Some(TICK_KIND))
    }

    /// Advancing the source invalidates the tick already in flight.
    fn toggle(&self) -> (Self, Option<Effect<StopwatchMsg>>) {
        let next = Self {
            ticks: self.ticks.advance(),
            running: !self.running,
            ..self.clone()
        };
        let effect = next.running.then(|| next.schedule());
        (next, effect)
    }

    fn pause(&self) -> Self {
        Self {
            ticks: self.ticks.advance(),
            running: false,
            ..self.clone()
        }
    }

    fn on_key(&self, key: &KeyEvent) -> (Self, Option<Effect<StopwatchMsg>>) {
        match key.code {
            KeyCode::Char(' ') => self.toggle(),
            KeyCode::Char('l') if self.running => {
                let mut next = self.clone();
                next.laps.push(self.elapsed);
                (next, None)
            }
            KeyCode::Char('r') => (Self::new(), None),
            KeyCode::Char('f') if !self.syncing => (
                Self {
                    syncing: true,
                    notice: None,
                    error: None,
                    ..self.clone()
                },
                sync(),
            ),
            KeyCode::Esc => (
                Self {
                    error: None,
                    ..self.clone()
                },
                None,
            ),
            KeyCode::Char('q') => (self.clone(), Some(Effect::quit())),
            _ => (self.clone(), None),
        }
    }

    fn laps_view(&self) -> Template<'static> {
        if self.laps.is_empty() {
            return Template::new().styled("no laps yet", Style::new().dark_gray());
        }
        self.laps
            .iter()
            .enumerate()
            .fold(Template::new(), |template, (i, lap)| {
                let template = if i > 0 { template.newline() } else { template };
                template
                    .styled(format!("#{:<3}", i + 1), Style::new().dark_gray())
                    .text(format_elapsed(*lap))
            })
    }

    fn status_view(&self) -> Template<'static> {
        let (marker, label, color) = if self.running {
            ("●", "running", Color::Green)
        } else {
            ("○", "paused", Color::Yellow)
        };
        let template = Template::new()
            .styled(format!("{marker} {label}"), Style::new().fg(color))
            .text("  laps ")
            .styled(self.laps.len().to_string(), Style::new().bold());
        match (&self.notice, self.syncing) {
            (_, true) => template.styled("  syncing…", Style::new().dark_gray()),
            (Some(notice), false) => template.text("  ").styled(notice.clone(), Style::new().cyan()),
            (None, false) => template,
        }
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Two remote calls; the second one always fails.
fn sync() -> Option<Effect<StopwatchMsg>> {
    batch([
        Effect::task(async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            Ok(Message::App(StopwatchMsg::Synced("local clock ok".to_string())))
        }),
        Effect::task(async {
            tokio::time::sleep(Duration::from_millis(250)).await;
            Err(eyre!("remote clock unreachable"))
        }),
    ])
}

impl Component for Stopwatch {
    type Msg = StopwatchMsg;

    fn update(&self, msg: &Message<StopwatchMsg>) -> (Self, Option<Effect<StopwatchMsg>>) {
        match msg {
            Message::Tick(tick) if self.running && self.ticks.is_valid_kind(tick, TICK_KIND) => {
                let next = Self {
                    elapsed: self.elapsed + TICK,
                    ..self.clone()
                };
                let effect = next.schedule();
                (next, Some(effect))
            }
            Message::Input(Event::Key(key)) => self.on_key(key),
            Message::Input(Event::FocusLost) => (self.pause(), None),
            Message::App(StopwatchMsg::Synced(notice)) => (
                Self {
                    syncing: false,
                    notice: Some(notice.clone()),
                    ..self.clone()
                },
                None,
            ),
            Message::EffectError(error) => (
                Self {
                    syncing: false,
                    error: Some(error.to_string()),
                    ..self.clone()
                },
                None,
            ),
            _ => (self.clone(), None),
        }
    }
}

impl View for Stopwatch {
    fn view(&self, surface: &mut dyn Surface) {
        let color = if self.running { Color::Green } else { Color::Yellow };
        let clock = Template::new()
            .text(" ")
            .styled(format_elapsed(self.elapsed), Style::new().bold().fg(color));
        let clock = Panel::new("stopwatch", &clock);
        let laps = self.laps_view();
        let laps = Panel::new("laps", &laps);
        let keys = Template::new().text(KEYS);
        let keys = Panel::new("keys", &keys);
        let body = Flex::row().gap(1).fill(&laps).fixed(&keys, 22);
        let status = self.status_view();
        let banner = self.error.as_deref().map(|error| {
            Template::new().styled(
                format!(" ✗ {error} (esc to dismiss)"),
                Style::new().fg(Color::White).bg(Color::Red),
            )
        });

        let mut column = Flex::column().fixed(&clock, 3).fill(&body).fixed(&status, 1);
        if let Some(banner) = &banner {
            column = column.fixed(banner, 1);
        }
        column.view(surface);
    }
}

/// Bordered box with a title.
struct Panel<'a> {
    title: &'a str,
    body: &'a dyn Measure,
}

impl<'a> Panel<'a> {
    const fn new(title: &'a str, body: &'a dyn Measure) -> Self {
        Self { title, body }
    }
}

impl View for Panel<'_> {
    fn view(&self, surface: &mut dyn Surface) {
        let area = surface.viewport();
        if area.width < 2 || area.height < 2 {
            return;
        }
        let border = Style::new().dark_gray();
        let span = "─".repeat(usize::from(area.width - 2));
        let bottom = area.bottom() - 1;

        surface.draw_text(area.as_position(), &format!("┌{span}┐"), border);
        for y in area.y + 1..bottom {
            surface.draw_text(Position::new(area.x, y), "│", border);
            surface.draw_text(Position::new(area.right() - 1, y), "│", border);
        }
        surface.draw_text(Position::new(area.x, bottom), &format!("└{span}┘"), border);

        let title = format!(" {} ", self.title);
        if usize::from(area.width) >= title.width() + 4 {
            surface.draw_text(Position::new(area.x + 2, area.y), &title, Style::new().bold());
        }

        let inner = Rect::new(area.x + 1, area.y + 1, area.width - 2, area.height - 2);
        surface.render(self.body, inner);
    }
}

impl Measure for Panel<'_> {
    fn min_size(&self) -> Size {
        let body = self.body.min_size();
        Size::new(body.width.saturating_add(2), body.height.saturating_add(2))
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let tenths = elapsed.as_millis() / 100;
    format!("{:02}:{:02}.{}", tenths / 600, (tenths / 10) % 60, tenths % 10)
}
