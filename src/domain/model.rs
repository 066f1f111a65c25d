use crate::utils::error::{Result, TrackerError};
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const OXYGEN_NORMAL_MIN: f64 = 95.0;
pub const OXYGEN_CRITICAL_BELOW: f64 = 90.0;
pub const TEMPERATURE_NORMAL_MIN: f64 = 36.1;
pub const TEMPERATURE_NORMAL_MAX: f64 = 37.5;

/// Static information about the emulated wrist device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetadata {
    pub device_type: String,
    pub firmware_version: String,
    pub sensor_status: String,
}

impl Default for DeviceMetadata {
    fn default() -> Self {
        Self {
            device_type: "ESP32_Wearable".to_string(),
            firmware_version: "1.0.0".to_string(),
            sensor_status: "active".to_string(),
        }
    }
}

/// One sample from the wearable. Field names on the wire match the stored
/// document layout used by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiometricReading {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "frecuencia_cardiaca")]
    pub heart_rate: u32,
    /// Cumulative steps since the last reset.
    #[serde(rename = "pasos")]
    pub steps: u64,
    #[serde(rename = "oxigeno")]
    pub oxygen: f64,
    #[serde(rename = "temperatura")]
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: DeviceMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeartRateZone {
    Reposo,
    Ligera,
    Moderada,
    Intensa,
    Maxima,
}

impl HeartRateZone {
    /// Fixed-threshold classification used by the device itself.
    pub fn from_bpm(bpm: u32) -> Self {
        match bpm {
            0..=59 => HeartRateZone::Reposo,
            60..=99 => HeartRateZone::Ligera,
            100..=139 => HeartRateZone::Moderada,
            140..=169 => HeartRateZone::Intensa,
            _ => HeartRateZone::Maxima,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeartRateZone::Reposo => "reposo",
            HeartRateZone::Ligera => "ligera",
            HeartRateZone::Moderada => "moderada",
            HeartRateZone::Intensa => "intensa",
            HeartRateZone::Maxima => "maxima",
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, HeartRateZone::Intensa | HeartRateZone::Maxima)
    }
}

impl fmt::Display for HeartRateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartRateStatus {
    Normal,
    Elevated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OxygenStatus {
    Normal,
    Low,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureStatus {
    Normal,
    Abnormal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Healthy,
    Exercising,
    AttentionNeeded,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverallStatus::Healthy => "healthy",
            OverallStatus::Exercising => "exercising",
            OverallStatus::AttentionNeeded => "attention_needed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub heart_rate: HeartRateStatus,
    pub oxygen: OxygenStatus,
    pub temperature: TemperatureStatus,
    pub overall: OverallStatus,
}

impl BiometricReading {
    pub fn new(heart_rate: u32, steps: u64, oxygen: f64, temperature: f64) -> Self {
        Self::with_timestamp(heart_rate, steps, oxygen, temperature, Utc::now())
    }

    pub fn with_timestamp(
        heart_rate: u32,
        steps: u64,
        oxygen: f64,
        temperature: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            heart_rate,
            steps,
            oxygen,
            temperature,
            timestamp,
            metadata: DeviceMetadata::default(),
        }
    }

    pub fn heart_rate_zone(&self) -> HeartRateZone {
        HeartRateZone::from_bpm(self.heart_rate)
    }

    pub fn is_oxygen_normal(&self) -> bool {
        self.oxygen >= OXYGEN_NORMAL_MIN
    }

    pub fn is_temperature_normal(&self) -> bool {
        (TEMPERATURE_NORMAL_MIN..=TEMPERATURE_NORMAL_MAX).contains(&self.temperature)
    }

    pub fn health_status(&self) -> HealthStatus {
        let heart_rate = if self.heart_rate_zone().is_elevated() {
            HeartRateStatus::Elevated
        } else {
            HeartRateStatus::Normal
        };

        let oxygen = if self.is_oxygen_normal() {
            OxygenStatus::Normal
        } else if self.oxygen >= OXYGEN_CRITICAL_BELOW {
            OxygenStatus::Low
        } else {
            OxygenStatus::Critical
        };

        let temperature = if self.is_temperature_normal() {
            TemperatureStatus::Normal
        } else {
            TemperatureStatus::Abnormal
        };

        let needs_attention =
            oxygen != OxygenStatus::Normal || temperature == TemperatureStatus::Abnormal;

        let overall = if needs_attention {
            OverallStatus::AttentionNeeded
        } else if heart_rate == HeartRateStatus::Elevated {
            OverallStatus::Exercising
        } else {
            OverallStatus::Healthy
        };

        HealthStatus {
            heart_rate,
            oxygen,
            temperature,
            overall,
        }
    }
}

impl fmt::Display for BiometricReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BiometricReading(FC={}bpm, Pasos={}, SpO2={}%, Temp={}°C, Time={})",
            self.heart_rate,
            self.steps,
            self.oxygen,
            self.temperature,
            self.timestamp.to_rfc3339()
        )
    }
}

/// Distance sample posted by the proximity microcontroller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityReading {
    #[serde(rename = "_id")]
    pub id: String,
    pub sensor_id: String,
    #[serde(rename = "distancia_cm")]
    pub distance_cm: f64,
    pub received_at: DateTime<Utc>,
}

/// Body the probe sends; the server assigns id and arrival time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityPayload {
    pub sensor_id: String,
    #[serde(rename = "distancia_cm")]
    pub distance_cm: f64,
}

impl Validate for ProximityPayload {
    fn validate(&self) -> Result<()> {
        if self.sensor_id.trim().is_empty() {
            return Err(TrackerError::ValidationError {
                message: "sensor_id cannot be empty".to_string(),
            });
        }
        if !self.distance_cm.is_finite() || self.distance_cm < 0.0 {
            return Err(TrackerError::ValidationError {
                message: "distancia_cm must be a non-negative number".to_string(),
            });
        }
        Ok(())
    }
}

impl ProximityReading {
    pub fn from_payload(payload: ProximityPayload) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sensor_id: payload.sensor_id,
            distance_cm: payload.distance_cm,
            received_at: Utc::now(),
        }
    }
}

/// Rounds to a fixed number of decimals the way the device firmware reports values.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
