use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use osm_grid_loader::errors::Result;
use osm_grid_loader::{load_config, InitialGridData, LoadRequest, LoaderConfig, LoaderWorker};

/// Load an OSM extract into a projected grid and print the result as JSON.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// URL or path of an Overpass JSON export
    data_url: String,

    /// Loader config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid name
    #[arg(long)]
    name: Option<String>,

    /// Grid id
    #[arg(long)]
    id: Option<u64>,

    /// Whether the grid describes an area
    #[arg(long)]
    area: Option<bool>,
}

fn setup_logging(level: &str) {
    // stdout carries the response.
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stderr()))
        .init();
}

fn run(args: Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => LoaderConfig::default(),
    };
    setup_logging(&config.log_level);

    let request = LoadRequest {
        data_url: args.data_url,
        initial_grid_data: InitialGridData {
            name: args.name,
            id: args.id,
            is_area: args.area,
        },
    };

    let worker = LoaderWorker::spawn(config)?;
    let response = worker.queue_request(request).wait()?;
    worker.shutdown();

    println!("{}", response.message.to_json()?);
    Ok(response.message.is_success())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            let message = err.to_string();
            error!(err = message.as_str(); "Loader failed");
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}
