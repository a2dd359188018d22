use anyhow::Result;
use clap::Parser;
use crop_simulator::config::{CategoryPolicy, DateBoundary, SimulatorConfig};
use crop_simulator::export::write_workbook;
use crop_simulator::models::{Language, SimulationRequest};
use crop_simulator::session::SimulationSession;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulate daily soybean grain yield for one cultivar
#[derive(Parser, Debug)]
#[command(name = "crop_simulator")]
#[command(about = "Simulate daily grain yield from synthetic plant covariates")]
struct Args {
    /// First simulated day (YYYY-MM-DD)
    #[arg(long)]
    start: String,

    /// End of the range (YYYY-MM-DD)
    #[arg(long)]
    end: String,

    #[arg(long)]
    cultivar: String,

    /// Plant height setpoint (cm)
    #[arg(long, default_value = "70")]
    ph: f64,

    /// Stems and branches setpoint
    #[arg(long, default_value = "40")]
    nlp: f64,

    /// Grains per plant setpoint
    #[arg(long, default_value = "2")]
    ngl: f64,

    /// Grains per pod setpoint
    #[arg(long, default_value = "3.5")]
    ns: f64,

    /// First pod insertion setpoint (cm)
    #[arg(long, default_value = "15")]
    ifp: f64,

    /// Thousand seed weight setpoint (g)
    #[arg(long, default_value = "160")]
    mhg: f64,

    /// Simulator config file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// Header and report language
    #[arg(long, value_enum)]
    language: Option<Language>,

    #[arg(long)]
    cluster_model: Option<PathBuf>,

    #[arg(long)]
    lstm_model: Option<PathBuf>,

    /// Simulate the end date too
    #[arg(long)]
    include_end: bool,

    /// Fail on cultivars the sequence model does not encode
    #[arg(long)]
    strict: bool,

    /// Write one CSV per sheet into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

fn build_config(args: &Args) -> Result<SimulatorConfig> {
    let mut config = match &args.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(language) = args.language {
        config.language = language;
    }
    if let Some(path) = &args.cluster_model {
        config.cluster_model_path = path.clone();
    }
    if let Some(path) = &args.lstm_model {
        config.lstm_model_path = path.clone();
    }
    if args.include_end {
        config.date_boundary = DateBoundary::IncludeEnd;
    }
    if args.strict {
        config.category_policy = CategoryPolicy::Strict;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let language = config.language;

    let request = SimulationRequest {
        start_date: args.start.clone(),
        end_date: args.end.clone(),
        cultivar: args.cultivar.clone(),
        ph: args.ph,
        nlp: args.nlp,
        ngl: args.ngl,
        ns: args.ns,
        ifp: args.ifp,
        mhg: args.mhg,
    };

    let mut session = SimulationSession::new(config);
    let run = session.run(&request)?;

    println!("============================================================");
    println!("  {}", run.sheet_name);
    println!("============================================================");
    for entry in &run.report.entries {
        println!("  {:<45} {}", entry.parameter, entry.value);
    }
    println!();

    let headers = language.yield_axis_labels();
    println!("  {:<12} {:>12}", headers.0, headers.1);
    for (date, gy) in run.result.yield_points() {
        println!("  {:<12} {:>12.2}", date, gy);
    }
    if let Some(mean) = run.result.mean_yield() {
        println!();
        println!("  Mean GY: {:.2} kg/ha over {} days", mean, run.result.len());
    }

    if let Some(dir) = &args.export_dir {
        let written = write_workbook(dir, session.exported_tables(), language)?;
        for path in written {
            info!("Wrote {}", path.display());
        }
    }

    Ok(())
}
