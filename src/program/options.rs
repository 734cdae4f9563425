//! Runtime configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::render::Pipeline;

pub const DEFAULT_TARGET_FPS: u32 = 60;
pub const MAX_TARGET_FPS: u32 = 240;

/// How the runtime occupies the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalMode {
    /// Alternate screen, whole terminal
    #[default]
    Fullscreen,
    /// Fixed-height region below the cursor
    Inline(u16),
}

/// Options for [`Program`](crate::program::Program).
#[derive(Debug, Clone)]
pub struct ProgramOptions {
    pub mode: TerminalMode,
    /// Upper bound on frames drawn per second
    pub target_fps: u32,
    /// Cancels the whole run, including every in-flight effect
    pub cancellation_token: CancellationToken,
    pub pipeline: Pipeline,
}

impl ProgramOptions {
    /// Minimum time between two frames.
    pub fn frame_interval(&self) -> Duration {
        let fps = self.target_fps.clamp(1, MAX_TARGET_FPS);
        Duration::from_secs_f64(1.0 / f64::from(fps))
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: TerminalMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn with_target_fps(mut self, target_fps: u32) -> Self {
        self.target_fps = target_fps;
        self
    }

    #[must_use]
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    #[must_use]
    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            mode: TerminalMode::default(),
            target_fps: DEFAULT_TARGET_FPS,
            cancellation_token: CancellationToken::new(),
            pipeline: Pipeline::new(),
        }
    }
}
