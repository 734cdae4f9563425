use clap::Parser;
use lazyflow::config::RuntimeConfig;
use lazyflow::program::TerminalMode;
use lazyflow::render::StageKind;

#[derive(Parser, Debug)]
#[command(name = "lazyflow", version, about = "Stopwatch demo for the lazyflow runtime")]
pub struct Args {
    /// Draw in an inline region of this many rows instead of the full screen
    #[arg(short, long, value_name = "ROWS")]
    pub inline: Option<u16>,

    /// Frame rate cap (1-240)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Strip all colors
    #[arg(long)]
    pub no_color: bool,

    /// Replace box-drawing glyphs with ASCII
    #[arg(long)]
    pub ascii: bool,
}

impl Args {
    /// Layer command line flags over the loaded config.
    pub fn apply(&self, mut runtime: RuntimeConfig) -> RuntimeConfig {
        if let Some(rows) = self.inline {
            runtime.mode = TerminalMode::Inline(rows);
        }
        if let Some(fps) = self.fps {
            runtime.target_fps = fps;
        }
        for (enabled, stage) in [
            (self.no_color, StageKind::StripColor),
            (self.ascii, StageKind::AsciiGlyphs),
        ] {
            if enabled && !runtime.pipeline.contains(&stage) {
                runtime.pipeline.push(stage);
            }
        }
        runtime
    }
}
