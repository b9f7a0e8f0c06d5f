// src/main.rs
mod strip;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;

use crate::strip::{ChartStyle, PlottersBackend, StripRun, DEST_DIR, SOURCE_DIR};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let source = Path::new(SOURCE_DIR);
    if !source.is_dir() {
        log::error!("source directory {SOURCE_DIR:?} does not exist");
        return ExitCode::FAILURE;
    }
    match run(source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(source: &Path) -> anyhow::Result<()> {
    let run = StripRun::new(PlottersBackend::new(ChartStyle::default()));
    run.execute(source, Path::new(DEST_DIR))
        .with_context(|| format!("failed to render strips from {SOURCE_DIR:?}"))?;
    Ok(())
}
