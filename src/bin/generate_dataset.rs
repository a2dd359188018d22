//! Synthetic covariate dataset generator
//!
//! Writes observation tables (no yield column) for one or more cultivars to a
//! single CSV. Setpoints default to each covariate's most probable value.
//!
//! Usage:
//!   cargo run --release --bin generate_dataset -- [OPTIONS]
//!
//! Options:
//!   --start <DATE>       First day (default: 2024-01-01)
//!   --end <DATE>         End of range (default: 2024-12-31)
//!   --cultivar <NAME>    Cultivar to simulate, repeatable (default: all encoded)
//!   --include-end        Simulate the end date too
//!   --seed <N>           Random seed for reproducibility (optional)
//!   --output <PATH>      Output CSV path (default: data/covariates.csv)

use anyhow::Result;
use clap::Parser;
use crop_simulator::catalog::{Covariate, ENCODED_CULTIVARS};
use crop_simulator::config::DateBoundary;
use crop_simulator::generator::CovariateGenerator;
use crop_simulator::models::SimulationRequest;
use csv::WriterBuilder;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::path::PathBuf;

/// Synthetic covariate generator for model fitting
#[derive(Parser, Debug)]
#[command(name = "generate_dataset")]
#[command(about = "Generate synthetic daily covariates for soybean cultivars")]
struct Args {
    #[arg(long, default_value = "2024-01-01")]
    start: String,

    #[arg(long, default_value = "2024-12-31")]
    end: String,

    /// Cultivars to simulate; every encoded cultivar when omitted
    #[arg(long)]
    cultivar: Vec<String>,

    #[arg(long)]
    include_end: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "data/covariates.csv")]
    output: PathBuf,
}

fn default_request(start: &str, end: &str, cultivar: &str) -> SimulationRequest {
    let mode = |c: Covariate| c.spec().max_proba;
    SimulationRequest {
        start_date: start.to_string(),
        end_date: end.to_string(),
        cultivar: cultivar.to_string(),
        ph: mode(Covariate::Ph),
        nlp: mode(Covariate::Nlp),
        ngl: mode(Covariate::Ngl),
        ns: mode(Covariate::Ns),
        ifp: mode(Covariate::Ifp),
        mhg: mode(Covariate::Mhg),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let cultivars: Vec<String> = if args.cultivar.is_empty() {
        ENCODED_CULTIVARS.iter().map(|c| c.to_string()).collect()
    } else {
        args.cultivar.clone()
    };
    let boundary = if args.include_end {
        DateBoundary::IncludeEnd
    } else {
        DateBoundary::ExcludeEnd
    };

    println!("Synthetic Covariate Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Range:            {} -> {} ({:?})", args.start, args.end, boundary);
    println!("Cultivars:        {}", cultivars.len());
    println!("Output:           {}", args.output.display());
    if let Some(seed) = args.seed {
        println!("Random seed:      {}", seed);
    }
    println!();

    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let generator = CovariateGenerator::new();
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(&args.output)?;

    let mut total_written = 0;
    for cultivar in &cultivars {
        let request = default_request(&args.start, &args.end, cultivar);
        let table = generator.build_observation_table(&request, boundary, &mut rng)?;
        for row in &table.rows {
            writer.serialize(row)?;
        }
        total_written += table.len();
        println!("   {:<32} {:>6} rows", cultivar, table.len());
    }

    writer.flush()?;

    println!("\nGeneration complete");
    println!("Total written:     {:>8}", total_written);
    println!("Output file:       {}", args.output.display());

    Ok(())
}
