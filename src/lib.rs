//! Unidirectional-data-flow runtime for terminal UIs.
//!
//! Applications are trees of [`Component`](core::Component)s following an
//! init / update / view cycle. `update` never performs I/O; it returns an
//! [`Effect`](core::Effect) the runtime runs concurrently and whose result
//! comes back as the next [`Message`](core::Message).
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`core`] | Messages, effects, ticks and the component contract |
//! | [`layout`] | Sizing contract, axis distribution, row/column containers |
//! | [`render`] | Surfaces, decorator pipeline, inline templates |
//! | [`program`] | The event loop hosting a root component |
//! | [`config`] | `config.toml` loading |
//! | [`testing`] | Headless harness and terminal for tests |
//!
//! ```ignore
//! let options = lazyflow::config::load()?
//!     .runtime
//!     .into_options(CancellationToken::new());
//! let state = Program::new(Stopwatch::new(), options)?.run().await?;
//! ```

pub mod config;
pub mod core;
pub mod layout;
pub mod program;
pub mod render;
pub mod testing;
pub mod tui;
