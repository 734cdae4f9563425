use clap::Parser;
use color_eyre::Result;
use lazyflow::config;
use lazyflow::program::Program;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::demo::Stopwatch;

mod cli;
mod demo;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting lazyflow");

    let args = cli::Args::parse();

    let no_color = std::env::var("NO_COLOR").ok();
    let runtime = args.apply(config::load()?.runtime.apply_no_color(no_color.as_deref()));
    info!(?runtime, "Runtime configured");

    let options = runtime.into_options(CancellationToken::new());
    let stopwatch = Program::new(Stopwatch::new(), options)?.run().await?;
    info!(
        elapsed = ?stopwatch.elapsed(),
        laps = stopwatch.laps().len(),
        "Stopwatch finished"
    );

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("lazyflow").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "lazyflow.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
