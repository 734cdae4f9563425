//! Async effects.
//!
//! An [`Effect`] is a cancellable unit of work that resolves to at most one
//! [`Message`]. Components return effects from `init` and `update`; the
//! runtime schedules each one exactly once and feeds its result back through
//! the same serialized queue as terminal input.
//!
//! Failures are contained at the effect boundary: an error (or panic) becomes
//! [`Message::EffectError`]. Cancellation is not an error and never reaches a
//! component.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::Report;
use color_eyre::eyre::eyre;
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use tokio_util::sync::CancellationToken;

use crate::core::message::Message;

/// Outcome of running an effect.
pub type EffectResult<M> = Result<Option<Message<M>>, Fault>;

/// Why an effect produced no value.
#[derive(Debug)]
pub enum Fault {
    /// The run was cancelled. Dropped silently by the runtime.
    Cancelled,
    /// The effect failed. Delivered as [`Message::EffectError`].
    Failed(Report),
}

impl From<Report> for Fault {
    fn from(report: Report) -> Self {
        Self::Failed(report)
    }
}

/// Error raised by a scheduled effect, delivered to the owning component.
#[derive(Clone)]
pub struct EffectError(Arc<Report>);

impl EffectError {
    pub fn new(report: Report) -> Self {
        Self(Arc::new(report))
    }

    pub fn report(&self) -> &Report {
        &self.0
    }
}

impl fmt::Debug for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EffectError")
            .field(&format_args!("{}", self.0))
            .finish()
    }
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Run<M> = Box<dyn FnOnce(CancellationToken) -> BoxFuture<'static, EffectResult<M>> + Send>;

/// Async side effect yielding zero or one message.
pub struct Effect<M> {
    run: Run<M>,
}

impl<M> fmt::Debug for Effect<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Effect(..)")
    }
}

impl<M: Send + 'static> Effect<M> {
    /// Build an effect from a function of the run's cancellation token.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = EffectResult<M>> + Send + 'static,
    {
        Self {
            run: Box::new(move |token| f(token).boxed()),
        }
    }

    /// Effect that resolves immediately to `message`.
    pub fn message(message: Message<M>) -> Self {
        Self::new(move |_| async move { Ok(Some(message)) })
    }

    /// Shorthand for `Effect::message(Message::App(payload))`.
    pub fn app(payload: M) -> Self {
        Self::message(Message::App(payload))
    }

    pub fn quit() -> Self {
        Self::message(Message::Quit)
    }

    /// Wait for `interval`, then resolve to `build(now)`.
    ///
    /// Cancellation during the wait resolves to nothing.
    pub fn tick<F>(interval: Duration, build: F) -> Self
    where
        F: FnOnce(Instant) -> Message<M> + Send + 'static,
    {
        Self::new(move |token: CancellationToken| async move {
            tokio::select! {
                () = token.cancelled() => Ok(None),
                () = tokio::time::sleep(interval) => Ok(Some(build(Instant::now()))),
            }
        })
    }

    /// Run a fallible future, racing it against cancellation.
    pub fn task<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = color_eyre::Result<Message<M>>> + Send + 'static,
    {
        Self::new(move |token: CancellationToken| async move {
            tokio::select! {
                () = token.cancelled() => Err(Fault::Cancelled),
                result = future => result.map(Some).map_err(Fault::Failed),
            }
        })
    }

    /// Convert the application payload of whatever this effect resolves to.
    pub fn map<N, F>(self, f: F) -> Effect<N>
    where
        N: Send + 'static,
        F: Fn(M) -> N + Send + Sync + 'static,
    {
        self.map_with(Arc::new(f))
    }

    pub(crate) fn map_with<N: Send + 'static>(
        self,
        f: Arc<dyn Fn(M) -> N + Send + Sync>,
    ) -> Effect<N> {
        Effect::new(move |token| async move {
            self.run(token)
                .await
                .map(|message| message.map(|m| m.map_with(&f)))
        })
    }

    /// Run the effect to completion.
    pub async fn run(self, token: CancellationToken) -> EffectResult<M> {
        (self.run)(token).await
    }

    /// Run the effect, turning a panic into [`Fault::Failed`].
    pub async fn run_contained(self, token: CancellationToken) -> EffectResult<M> {
        match AssertUnwindSafe(self.run(token)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(Fault::Failed(eyre!("effect panicked: {reason}")))
            }
        }
    }
}

/// Run effects concurrently and collect their results into one
/// [`Message::Batch`].
///
/// - no effects: `None`
/// - one effect: that effect, unchanged
/// - many: results keep the argument order, not completion order. A failing
///   effect occupies its slot as [`Message::EffectError`]; an effect that
///   resolves to nothing leaves no slot. Cancellation aborts the whole batch.
pub fn batch<M, I>(effects: I) -> Option<Effect<M>>
where
    M: Send + 'static,
    I: IntoIterator,
    I::Item: Into<Option<Effect<M>>>,
{
    let mut effects: Vec<Effect<M>> = effects.into_iter().filter_map(Into::into).collect();
    match effects.len() {
        0 => None,
        1 => effects.pop(),
        _ => Some(Effect::new(move |token: CancellationToken| async move {
            let results = join_all(
                effects
                    .into_iter()
                    .map(|effect| effect.run_contained(token.clone())),
            )
            .await;

            let mut messages = Vec::with_capacity(results.len());
            for result in results {
                match result {
                    Ok(Some(message)) => messages.push(message),
                    Ok(None) => {}
                    Err(Fault::Cancelled) => return Err(Fault::Cancelled),
                    Err(Fault::Failed(report)) => {
                        messages.push(Message::EffectError(EffectError::new(report)));
                    }
                }
            }
            if token.is_cancelled() {
                return Err(Fault::Cancelled);
            }
            Ok(Some(Message::Batch(messages)))
        })),
    }
}

/// Run effects one after another.
///
/// Only the first effect runs; its result and the untouched remaining effects
/// come back as a [`Message::Sequence`]. A cancelled run ends the whole
/// sequence. Whoever drives the component must
/// feed the step through `update` before starting the next effect, so every
/// step's state change is visible to the side effect that follows it.
pub fn sequence<M, I>(effects: I) -> Option<Effect<M>>
where
    M: Send + 'static,
    I: IntoIterator,
    I::Item: Into<Option<Effect<M>>>,
{
    let mut remaining: Vec<Effect<M>> = effects.into_iter().filter_map(Into::into).collect();
    if remaining.is_empty() {
        return None;
    }
    let first = remaining.remove(0);

    Some(Effect::new(move |token| async move {
        let step = match first.run_contained(token.clone()).await {
            Ok(_) if token.is_cancelled() => return Err(Fault::Cancelled),
            Ok(step) => step,
            Err(Fault::Cancelled) => return Err(Fault::Cancelled),
            Err(Fault::Failed(report)) => Some(Message::EffectError(EffectError::new(report))),
        };
        Ok(Some(Message::Sequence {
            step: step.map(Box::new),
            remaining,
        }))
    }))
}
