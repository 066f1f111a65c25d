use clap::Parser;
use fitness_tracker::adapters::open_store;
use fitness_tracker::config::{AppConfig, Profile, ServerArgs};
use fitness_tracker::utils::{logger, validation::Validate};
use fitness_tracker::{AppState, FitnessSimulator, SimulatorRunner, TrackerError, TrackerServer};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 必須在解析參數前載入，clap 的 env 屬性才讀得到
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    let args = ServerArgs::parse();

    let config = match AppConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    match config.profile {
        Profile::Production => logger::init_production_logger(),
        Profile::Development => logger::init_cli_logger(args.verbose || config.debug),
    }

    tracing::info!(
        "🚀 Starting fitness-tracker ({} profile)",
        config.profile.as_str()
    );
    if dotenv_loaded {
        tracing::debug!("Loaded environment from .env");
    }
    if let Some(path) = &args.config {
        tracing::info!("📁 Configuration loaded from: {}", path);
    }
    if args.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    // 資料庫無法開啟時仍提供頁面，資料端點回傳 500
    let store = match open_store(&config.storage) {
        Ok(store) => {
            tracing::info!("✅ Connected to reading store");
            Some(store)
        }
        Err(e) => {
            tracing::error!(
                "❌ Error opening reading store: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            None
        }
    };

    let runner = store.as_ref().map(|store| {
        let simulator = match config.device.seed {
            Some(seed) => FitnessSimulator::with_seed(config.sensors, seed),
            None => FitnessSimulator::new(config.sensors),
        };
        Arc::new(SimulatorRunner::new(
            simulator,
            Arc::clone(store),
            config.device.interval(),
        ))
    });

    if config.device.autostart {
        match &runner {
            Some(runner) => {
                runner.start().await;
            }
            None => tracing::warn!("⚠️ Simulator autostart skipped: no reading store"),
        }
    }

    let state = AppState::new(
        store,
        runner.clone(),
        config.heart_rate_zones.clone(),
        config.api.clone(),
    );

    let server = TrackerServer::new(&config, state);
    if let Err(e) = server.start(shutdown_signal()).await {
        tracing::error!("❌ Server failed: {:#}", e);
        eprintln!("❌ {:#}", e);
        std::process::exit(TrackerError::exit_code_for(&e));
    }

    if let Some(runner) = runner {
        if runner.is_running().await {
            runner.stop().await;
        }
    }

    tracing::info!("👋 Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 Shutdown signal received");
}
