use clap::Parser;
use fitness_tracker::app::probe::{ProbeConfig, ProximityProbe, DEFAULT_ENDPOINT, DEFAULT_SENSOR_ID};
use fitness_tracker::utils::{logger, validation::Validate};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "sensor-probe")]
#[command(about = "Simulated proximity sensor that posts readings to the tracker API")]
struct Args {
    /// Ingestion endpoint
    #[arg(long, env = "SENSOR_SERVER_URL", default_value = DEFAULT_ENDPOINT)]
    server_url: String,

    #[arg(long, default_value = DEFAULT_SENSOR_ID)]
    sensor_id: String,

    /// Seconds between readings
    #[arg(short, long, default_value = "5")]
    interval: u64,

    /// Stop after this many readings
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let config = ProbeConfig {
        endpoint: args.server_url,
        sensor_id: args.sensor_id,
        interval: Duration::from_secs(args.interval),
        ..Default::default()
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let mut probe = match ProximityProbe::new(config) {
        Ok(probe) => probe,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    tokio::select! {
        succeeded = probe.run(args.count) => {
            tracing::info!("✅ Probe finished, {} readings accepted", succeeded);
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("🛑 Probe stopped");
        }
    }

    Ok(())
}
