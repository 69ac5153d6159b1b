//! # mapgen
//!
//! Generates one map and writes it as JSON.
//!
//! ```bash
//! # Defaults, printed to stdout
//! mapgen
//!
//! # From a config file, with a different seed, to a file
//! mapgen --config village.toml --seed harbor --output harbor.json --pretty
//!
//! # More logging
//! RUST_LOG=arcology=debug mapgen --partition bsp
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use arcology::{MapAssembler, MapConfig, MapResult, PartitionStrategy, SeedInput};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Partition strategy as typed on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum PartitionArg {
    /// Organic Voronoi zones
    Voronoi,
    /// Rectangular BSP rooms
    Bsp,
}

impl From<PartitionArg> for PartitionStrategy {
    fn from(arg: PartitionArg) -> Self {
        match arg {
            PartitionArg::Voronoi => Self::Voronoi,
            PartitionArg::Bsp => Self::Bsp,
        }
    }
}

/// Procedural habitat map generator.
///
/// Command-line values override the config file.
#[derive(Parser, Debug)]
#[command(name = "mapgen", version, about = "Generate a procedural habitat map as JSON")]
struct Args {
    /// TOML map config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// World seed; digits are used as a number, anything else is hashed.
    #[arg(long)]
    seed: Option<String>,

    /// Zone partition strategy.
    #[arg(long, value_enum)]
    partition: Option<PartitionArg>,

    /// Output file; stdout when absent.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Indent the JSON.
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn load_config(&self) -> MapResult<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_file(path)?,
            None => MapConfig::default(),
        };
        if let Some(seed) = &self.seed {
            config.seed = SeedInput::parse(seed);
        }
        if let Some(partition) = self.partition {
            config.partition = partition.into();
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(args: &Args) -> MapResult<()> {
    let config = args.load_config()?;
    let map = MapAssembler::new(config)?.generate()?;
    let json = map.to_json(args.pretty)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(path = %path.display(), zones = map.zones.len(), "map written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "map generation failed");
            ExitCode::FAILURE
        }
    }
}
