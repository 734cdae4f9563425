//! Generation-stamped timers.
//!
//! A component that animates keeps a [`TickSource`] in its state and
//! schedules ticks with [`TickSource::create_tick`]. Every tick carries the
//! source's `id` and `tag` at the time it was scheduled. Restarting, stopping
//! or otherwise invalidating the timer is just [`TickSource::advance`]: ticks
//! already in flight still arrive, but no longer validate, so they are
//! dropped without any per-timer cancellation plumbing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::core::effect::Effect;
use crate::core::message::Message;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A fired timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub time: Instant,
    pub id: u64,
    pub tag: u64,
    /// Discriminator for sources that multiplex several logical timers
    pub kind: Option<&'static str>,
}

/// Timer identity plus a generation tag.
///
/// `id` is unique per process and never changes; `tag` only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickSource {
    id: u64,
    tag: u64,
}

impl TickSource {
    pub fn new() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            tag: 0,
        }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn tag(&self) -> u64 {
        self.tag
    }

    /// Invalidate every tick scheduled so far.
    #[must_use]
    pub const fn advance(self) -> Self {
        Self {
            id: self.id,
            tag: self.tag + 1,
        }
    }

    /// Whether `tick` was scheduled by this source in its current generation.
    pub const fn is_valid(&self, tick: &Tick) -> bool {
        tick.id == self.id && tick.tag == self.tag
    }

    /// Like [`TickSource::is_valid`], additionally requiring `kind` to match.
    pub fn is_valid_kind(&self, tick: &Tick, kind: &str) -> bool {
        self.is_valid(tick) && tick.kind == Some(kind)
    }

    /// Stamp a tick with the current generation.
    pub fn stamp(&self, time: Instant, kind: Option<&'static str>) -> Tick {
        Tick {
            time,
            id: self.id,
            tag: self.tag,
            kind,
        }
    }

    /// Schedule a tick after `interval`, stamped with the current generation.
    pub fn create_tick<M: Send + 'static>(
        &self,
        interval: Duration,
        kind: Option<&'static str>,
    ) -> Effect<M> {
        let source = *self;
        Effect::tick(interval, move |time| Message::Tick(source.stamp(time, kind)))
    }
}

impl Default for TickSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_ids_are_unique() {
        let a = TickSource::new();
        let b = TickSource::new();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.tag(), 0);
    }

    #[test]
    fn test_advance_rejects_stale_ticks() {
        let source = TickSource::new();
        let tick = source.stamp(Instant::now(), None);
        assert!(source.is_valid(&tick));

        let advanced = source.advance();
        assert_eq!(advanced.id(), source.id());
        assert_eq!(advanced.tag(), 1);
        assert!(!advanced.is_valid(&tick));
        assert!(advanced.is_valid(&advanced.stamp(Instant::now(), None)));
    }

    #[test]
    fn test_foreign_id_is_rejected() {
        let source = TickSource::new();
        let other = TickSource::new();
        assert!(!source.is_valid(&other.stamp(Instant::now(), None)));
    }

    #[test]
    fn test_kind_must_match() {
        let source = TickSource::new();
        let blink = source.stamp(Instant::now(), Some("blink"));
        assert!(source.is_valid_kind(&blink, "blink"));
        assert!(!source.is_valid_kind(&blink, "spin"));
        assert!(!source.is_valid_kind(&source.stamp(Instant::now(), None), "blink"));
    }

    #[tokio::test]
    async fn test_create_tick_is_stamped() {
        let source = TickSource::new().advance();
        let effect: Effect<()> = source.create_tick(Duration::from_millis(1), Some("spin"));
        let message = effect.run(CancellationToken::new()).await.unwrap().unwrap();
        let tick = message.tick().copied().unwrap();
        assert!(source.is_valid_kind(&tick, "spin"));
        assert!(!source.advance().is_valid(&tick));
    }
}
