//! Folio: a reader for picture books and comics kept as directories of
//! pictures.

mod browser;
mod host;
mod pages;
mod program;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use folio_files::FileSys;
use folio_platform::{Proxy, WindowConfig};

use crate::program::{Msg, Program};

#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Picture book and comic reader")]
struct Cli {
    /// Directory or picture to open right away
    path: Option<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let fs = FileSys::new().context("failed to open the settings directory")?;
    let sets = fs.load_settings();
    let config = WindowConfig {
        title: "Folio".to_owned(),
        size: sets.resolution,
        maximized: sets.maximized,
        fullscreen: sets.fullscreen,
    };
    log::info!("library: {}", sets.library.display());
    let program: Program<Proxy<Msg>> = Program::new(fs, cli.path);
    folio_platform::run(config, program)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        log::error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
