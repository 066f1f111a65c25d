pub mod cli;
pub mod toml_config;

use crate::core::zones::ZoneTable;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_bounds, validate_finite, validate_non_empty_string, validate_path, validate_range,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use cli::ServerArgs;
pub use toml_config::FileConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    Production,
}

impl Profile {
    /// Unknown names resolve to development.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Profile::Production,
            "development" | "dev" | "default" => Profile::Development,
            other => {
                tracing::warn!("⚠️ Unknown profile '{}', using development", other);
                Profile::Development
            }
        }
    }

    pub fn default_debug(&self) -> bool {
        matches!(self, Profile::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Development => "development",
            Profile::Production => "production",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sled,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sled,
            path: "./data/fitness_tracker_db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub interval_seconds: u64,
    pub autostart: bool,
    /// Fixed RNG seed for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 5,
            autostart: false,
            seed: None,
        }
    }
}

impl DeviceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntLimits {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatLimits {
    pub min: f64,
    pub max: f64,
}

impl FloatLimits {
    /// 上下限必須是有限數且 min < max，否則 `f64::clamp` 會 panic
    pub fn check(&self, field: &str) -> Result<()> {
        validate_finite(&format!("{}.min", field), self.min)?;
        validate_finite(&format!("{}.max", field), self.max)?;
        validate_bounds(field, self.min, self.max)
    }
}

/// Physical limits every generated value is clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// bpm
    pub heart_rate: IntLimits,
    /// % SpO2
    pub oxygen: FloatLimits,
    /// °C
    pub temperature: FloatLimits,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            heart_rate: IntLimits { min: 60, max: 180 },
            oxygen: FloatLimits {
                min: 95.0,
                max: 100.0,
            },
            temperature: FloatLimits {
                min: 36.1,
                max: 37.5,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub history_limit: usize,
    pub proximity_history_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            history_limit: 50,
            proximity_history_limit: 50,
        }
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub profile: Profile,
    pub debug: bool,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub device: DeviceConfig,
    pub sensors: SensorConfig,
    pub api: ApiConfig,
    pub heart_rate_zones: ZoneTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::resolve(FileConfig::default(), &ServerArgs::default())
    }
}

impl AppConfig {
    /// 載入 .env 後依序套用 TOML 檔案、環境變數與命令列參數
    pub fn load(args: &ServerArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };

        Ok(Self::resolve(file, args))
    }

    pub fn resolve(file: FileConfig, args: &ServerArgs) -> Self {
        let profile = args
            .profile
            .as_deref()
            .map(Profile::parse)
            .or(file.profile)
            .unwrap_or_default();

        let debug = args
            .debug
            .or(file.debug)
            .unwrap_or_else(|| profile.default_debug());

        let mut server = file.server;
        if let Some(host) = &args.host {
            server.host = host.clone();
        }
        if let Some(port) = args.port {
            server.port = port;
        }

        let mut storage = file.storage;
        if let Some(path) = &args.storage_path {
            storage.path = path.clone();
        }

        let mut device = file.device;
        if let Some(interval) = args.device_interval {
            device.interval_seconds = interval;
        }
        if let Some(autostart) = args.autostart {
            device.autostart = autostart;
        }

        Self {
            profile,
            debug,
            server,
            storage,
            device,
            sensors: file.sensors,
            api: file.api,
            heart_rate_zones: file.heart_rate_zones.unwrap_or_default(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;

        if self.storage.backend == StorageBackend::Sled {
            validate_path("storage.path", &self.storage.path)?;
        }

        validate_range("device.interval_seconds", self.device.interval_seconds, 1, 3600)?;

        validate_bounds(
            "sensors.heart_rate",
            self.sensors.heart_rate.min,
            self.sensors.heart_rate.max,
        )?;
        self.sensors.oxygen.check("sensors.oxygen")?;
        validate_range("sensors.oxygen.max", self.sensors.oxygen.max, 0.0, 100.0)?;
        self.sensors.temperature.check("sensors.temperature")?;

        validate_range("api.history_limit", self.api.history_limit, 1, 1000)?;
        validate_range(
            "api.proximity_history_limit",
            self.api.proximity_history_limit,
            1,
            1000,
        )?;

        self.heart_rate_zones.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_container_contract() {
        let config = AppConfig::default();
        assert_eq!(config.profile, Profile::Development);
        assert!(config.debug);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.device.interval(), Duration::from_secs(5));
        assert_eq!(config.api.history_limit, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_production_profile_disables_debug() {
        let args = ServerArgs {
            profile: Some("production".to_string()),
            ..Default::default()
        };
        let config = AppConfig::resolve(FileConfig::default(), &args);
        assert_eq!(config.profile, Profile::Production);
        assert!(!config.debug);
    }

    #[test]
    fn test_unknown_profile_falls_back_to_development() {
        assert_eq!(Profile::parse("staging"), Profile::Development);
        assert_eq!(Profile::parse("PRODUCTION"), Profile::Production);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig::from_toml_str(
            "profile = \"production\"\n[server]\nport = 8080\n[device]\ninterval_seconds = 10\n",
        )
        .unwrap();
        let args = ServerArgs {
            port: Some(7000),
            device_interval: Some(1),
            debug: Some(true),
            ..Default::default()
        };

        let config = AppConfig::resolve(file, &args);
        assert_eq!(config.profile, Profile::Production);
        assert!(config.debug);
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.device.interval_seconds, 1);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.device.interval_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.sensors.heart_rate = IntLimits { min: 200, max: 100 };
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.history_limit = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.storage.path = String::new();
        assert!(config.validate().is_err());
        config.storage.backend = StorageBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_config_file_is_valid() {
        let file = FileConfig::from_toml_str(include_str!("../../fitness-tracker.toml")).unwrap();
        let config = AppConfig::resolve(file, &ServerArgs::default());

        assert!(config.device.autostart);
        assert_eq!(config.heart_rate_zones, ZoneTable::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_finite_sensor_limits_are_rejected() {
        for toml in [
            "[sensors.oxygen]\nmin = nan\nmax = 100.0\n",
            "[sensors.oxygen]\nmin = 95.0\nmax = nan\n",
            "[sensors.temperature]\nmin = -inf\nmax = 37.5\n",
            "[sensors.temperature]\nmin = 36.1\nmax = inf\n",
        ] {
            let file = FileConfig::from_toml_str(toml).unwrap();
            let config = AppConfig::resolve(file, &ServerArgs::default());
            assert!(config.validate().is_err(), "{}", toml);
        }
    }
}
