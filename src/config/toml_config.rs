use crate::config::{
    ApiConfig, DeviceConfig, Profile, SensorConfig, ServerConfig, StorageConfig,
};
use crate::core::zones::ZoneTable;
use crate::utils::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shape of the optional TOML file. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub profile: Option<Profile>,
    pub debug: Option<bool>,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub device: DeviceConfig,
    pub sensors: SensorConfig,
    pub api: ApiConfig,
    pub heart_rate_zones: Option<ZoneTable>,
}

impl FileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TrackerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TrackerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STORAGE_PATH})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TrackerError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use crate::domain::model::HeartRateZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = FileConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.device.interval_seconds, 5);
        assert!(config.profile.is_none());
        assert!(config.heart_rate_zones.is_none());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r##"
profile = "production"
debug = false

[server]
host = "127.0.0.1"
port = 8080

[storage]
backend = "memory"

[device]
interval_seconds = 2
autostart = true
seed = 42

[sensors.heart_rate]
min = 50
max = 190

[api]
history_limit = 20

[[heart_rate_zones]]
zone = "reposo"
min = 0
max = 90
color = "#6b7280"

[[heart_rate_zones]]
zone = "maxima"
min = 90
max = 250
color = "#dc2626"
"##;

        let config = FileConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.profile, Some(Profile::Production));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.device.seed, Some(42));
        assert!(config.device.autostart);
        assert_eq!(config.sensors.heart_rate.min, 50);
        // 未指定的區段沿用預設值
        assert_eq!(config.sensors.oxygen.max, 100.0);
        assert_eq!(config.api.history_limit, 20);

        let zones = config.heart_rate_zones.unwrap();
        assert_eq!(zones.bands().len(), 2);
        assert_eq!(zones.classify(120).zone, HeartRateZone::Maxima);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FT_TEST_STORAGE_PATH", "/var/lib/tracker");

        let toml_content = r#"
[storage]
path = "${FT_TEST_STORAGE_PATH}/readings"
"#;

        let config = FileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.storage.path, "/var/lib/tracker/readings");

        std::env::remove_var("FT_TEST_STORAGE_PATH");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = FileConfig::from_toml_str("[server\nport = 1").unwrap_err();
        assert!(matches!(err, TrackerError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 9000\n")
            .unwrap();

        let config = FileConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
    }
}
