use clap::Parser;

/// Command line flags for the server. Each flag can also come from the
/// environment, which is how the container image configures it.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "fitness-tracker")]
#[command(about = "Wearable fitness tracker backend with a simulated biometric device")]
pub struct ServerArgs {
    /// Optional TOML configuration file
    #[arg(short, long, env = "FITNESS_TRACKER_CONFIG")]
    pub config: Option<String>,

    /// Configuration profile: development or production
    #[arg(long = "env", env = "APP_ENV")]
    pub profile: Option<String>,

    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory of the embedded reading database
    #[arg(long, env = "STORAGE_PATH")]
    pub storage_path: Option<String>,

    /// Seconds between simulated device readings
    #[arg(long, env = "DEVICE_INTERVAL")]
    pub device_interval: Option<u64>,

    /// Start the simulated device together with the server
    #[arg(long, env = "SIMULATOR_AUTOSTART")]
    pub autostart: Option<bool>,

    #[arg(long, env = "APP_DEBUG")]
    pub debug: Option<bool>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}
