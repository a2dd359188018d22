//! REST API server for the crop simulator
//!
//! Usage:
//!   ./target/release/api_server [options]
//!
//! Options:
//!   --port PORT       Port to listen on (default: 8080)
//!   --config PATH     Simulator config, TOML or JSON (optional)
//!
//! REST endpoints:
//!   GET  /api/v1/health                  - Health check
//!   GET  /api/v1/cultivars               - Cultivar catalog
//!   GET  /api/v1/covariates              - Covariate generation parameters
//!   POST /api/v1/simulations             - Run a simulation
//!   GET  /api/v1/simulations             - Completed simulations
//!   GET  /api/v1/simulations/:id         - Result table and report
//!   GET  /api/v1/simulations/:id/yield   - Date/yield series

use anyhow::Result;
use clap::Parser;
use crop_simulator::api::{create_router, SimulationService};
use crop_simulator::config::SimulatorConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "Serve crop yield simulations over REST")]
struct Args {
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Simulator config file (.toml or .json)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn print_banner(port: u16, config: &SimulatorConfig) {
    println!("============================================================");
    println!("             CROP YIELD SIMULATOR API SERVER");
    println!("============================================================");
    println!();
    println!("  Port:           {}", port);
    println!("  REST:           http://localhost:{}/api/v1/", port);
    println!("  Cluster model:  {}", config.cluster_model_path.display());
    println!("  Sequence model: {}", config.lstm_model_path.display());
    println!("  Language:       {:?}", config.language);
    if let Some(timeout) = config.inference_timeout_secs {
        println!("  Timeout:        {}s", timeout);
    }
    println!();
    println!("REST Endpoints:");
    println!("  GET  /api/v1/health                 Health check");
    println!("  GET  /api/v1/cultivars              Cultivar catalog");
    println!("  GET  /api/v1/covariates             Covariate parameters");
    println!("  POST /api/v1/simulations            Run a simulation");
    println!("  GET  /api/v1/simulations            Completed runs");
    println!("  GET  /api/v1/simulations/:id        Result and report");
    println!("  GET  /api/v1/simulations/:id/yield  Yield series");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };

    print_banner(args.port, &config);

    let service = Arc::new(SimulationService::new(config));
    let app = create_router(service);

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
