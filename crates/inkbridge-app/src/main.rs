//! Replay a session script and print every host update as a JSON line.

use clap::Parser;
use inkbridge_app::{FsImageLoader, ReplayError, Script, replay};
use inkbridge_core::Services;
use inkbridge_render::SkiaRasterizer;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "inkbridge-replay", about = "Replay a canvas session against InkBridge", version)]
struct Cli {
    /// Session script (JSON).
    script: PathBuf,

    /// Directory that image URLs are served from.
    #[arg(short, long, default_value = ".")]
    assets: PathBuf,

    /// File returned when a tool opens the file chooser.
    #[arg(short, long)]
    pick: Option<PathBuf>,

    /// Pretty-print each update instead of one line per update.
    #[arg(long)]
    pretty: bool,
}

fn run(cli: Cli) -> Result<(), ReplayError> {
    let script = Script::from_json(&std::fs::read_to_string(&cli.script)?)?;
    log::info!("replaying {} steps from {}", script.steps.len(), cli.script.display());

    let loader = FsImageLoader::new(cli.assets).with_pick(cli.pick);
    let updates = replay(script, Services::new(loader, SkiaRasterizer::new()))?;

    let mut out = std::io::stdout().lock();
    for update in &updates {
        let json = update.to_json()?;
        if cli.pretty {
            serde_json::to_writer_pretty(&mut out, &json)?;
        } else {
            serde_json::to_writer(&mut out, &json)?;
        }
        writeln!(out)?;
    }
    log::info!("{} host updates", updates.len());
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        eprintln!("inkbridge-replay: {e}");
        std::process::exit(1);
    }
}
