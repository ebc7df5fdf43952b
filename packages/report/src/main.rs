#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Renders `plots/earthquakes_scatter.png` and `plots/earthquakes_tri.png`
//! from the datasets under `data/`.

use std::path::PathBuf;

use clap::Parser;
use quake_map_report::ReportConfig;

#[derive(Parser)]
#[command(name = "quake_map", about = "Earthquake and toxic-release map report")]
struct Cli {
    /// Project root that relative dataset paths resolve against
    #[arg(long)]
    root: Option<PathBuf>,

    /// TOML config replacing the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip writing the per-state release table
    #[arg(long)]
    no_export: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ReportConfig::from_file(path)?,
        None => ReportConfig::embedded()?,
    };
    if let Some(root) = cli.root {
        config = config.with_root(root);
    }
    if cli.no_export {
        config.export.aggregates_csv = false;
    }

    let summary = quake_map_report::run(&config)?;

    println!("{}", summary.scatter_path.display());
    println!("{}", summary.tri_path.display());
    if let Some(path) = &summary.aggregates_path {
        println!("{}", path.display());
    }

    Ok(())
}
