//! `inkroom` command line entry point.

use clap::Parser;
use inkroom_app::{App, AppConfig, RunOptions};
use std::path::PathBuf;
use std::process::ExitCode;

/// Open an inkroom drawing room headlessly
#[derive(Parser, Debug)]
#[command(name = "inkroom")]
#[command(about = "Replay input into a collaborative inkroom canvas and export it")]
struct Cli {
    /// Page URL; the room comes from its `room` query parameter or its path
    #[arg(short, long)]
    url: Option<String>,

    /// Directory for persisted documents (default: platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Peer update file to merge before replaying (repeatable)
    #[arg(short, long = "import")]
    imports: Vec<PathBuf>,

    /// JSON input script to replay
    #[arg(short, long)]
    replay: Option<PathBuf>,

    /// Write the final frame as SVG
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write the elements as JSON (`-` for stdout)
    #[arg(long)]
    dump_json: Option<PathBuf>,

    /// Write this peer's updates for other peers to import
    #[arg(long)]
    export_updates: Option<PathBuf>,
}

impl Cli {
    fn options(self) -> RunOptions {
        RunOptions {
            url: self.url,
            data_dir: self.data_dir,
            imports: self.imports,
            script: self.replay,
            svg: self.svg,
            dump_json: self.dump_json,
            export_updates: self.export_updates,
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match AppConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let options = cli.options();
    let result = App::with_data_dir(config, options.data_dir.as_deref()).and_then(|app| app.run(&options));

    match result {
        Ok(report) => {
            log::info!(
                "room {}: {} elements, {} peers, {} frames, connected: {}",
                report.room,
                report.elements,
                report.peers,
                report.frames,
                report.connected
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
