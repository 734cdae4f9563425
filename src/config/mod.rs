//! Runtime configuration read from `<config dir>/lazyflow/config.toml`.
//!
//! ```toml
//! [runtime]
//! mode = "fullscreen"      # or { inline = 12 }
//! target_fps = 30
//! pipeline = ["ascii-glyphs"]
//! ```

pub mod loader;

pub use loader::{config_path, load, load_from};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::program::{DEFAULT_TARGET_FPS, MAX_TARGET_FPS, ProgramOptions, TerminalMode};
use crate::render::{Pipeline, StageKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub mode: TerminalMode,
    pub target_fps: u32,
    /// Render stages, outermost first
    pub pipeline: Vec<StageKind>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: TerminalMode::default(),
            target_fps: DEFAULT_TARGET_FPS,
            pipeline: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Honour the `NO_COLOR` convention: any non-empty value strips color.
    #[must_use]
    pub fn apply_no_color(mut self, value: Option<&str>) -> Self {
        if value.is_some_and(|value| !value.is_empty())
            && !self.pipeline.contains(&StageKind::StripColor)
        {
            self.pipeline.push(StageKind::StripColor);
        }
        self
    }

    pub fn into_options(self, cancellation_token: CancellationToken) -> ProgramOptions {
        ProgramOptions::default()
            .with_mode(self.mode)
            .with_target_fps(self.target_fps.clamp(1, MAX_TARGET_FPS))
            .with_pipeline(Pipeline::from_kinds(&self.pipeline))
            .with_cancellation_token(cancellation_token)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_runtime_section() {
        let config: AppConfig = toml::from_str("[runtime]\ntarget_fps = 30\n").unwrap();
        assert_eq!(config.runtime.target_fps, 30);
        assert_eq!(config.runtime.mode, TerminalMode::Fullscreen);
        assert!(config.runtime.pipeline.is_empty());
    }

    #[test]
    fn test_inline_mode_and_pipeline() {
        let config: AppConfig = toml::from_str(
            "[runtime]\nmode = { inline = 8 }\npipeline = [\"ascii-glyphs\", \"strip-color\"]\n",
        )
        .unwrap();
        assert_eq!(config.runtime.mode, TerminalMode::Inline(8));
        assert_eq!(
            config.runtime.pipeline,
            vec![StageKind::AsciiGlyphs, StageKind::StripColor]
        );
    }

    #[test]
    fn test_no_color() {
        let runtime = RuntimeConfig::default();
        assert!(runtime.clone().apply_no_color(None).pipeline.is_empty());
        assert!(runtime.clone().apply_no_color(Some("")).pipeline.is_empty());

        let stripped = runtime.apply_no_color(Some("1")).apply_no_color(Some("1"));
        assert_eq!(stripped.pipeline, vec![StageKind::StripColor]);
    }

    #[test]
    fn test_into_options_clamps_fps() {
        let runtime = RuntimeConfig {
            target_fps: 10_000,
            pipeline: vec![StageKind::StripColor],
            ..RuntimeConfig::default()
        };
        let options = runtime.into_options(CancellationToken::new());
        assert_eq!(options.target_fps, MAX_TARGET_FPS);
        assert_eq!(options.pipeline.len(), 1);
    }
}
