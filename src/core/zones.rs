//! Heart-rate zone table used by the API when reporting the current zone.
//!
//! The table is configurable; the device model keeps its own fixed
//! thresholds in [`HeartRateZone::from_bpm`].

use crate::domain::model::HeartRateZone;
use crate::utils::error::{Result, TrackerError};
use crate::utils::validation::{validate_bounds, validate_hex_color, Validate};
use serde::{Deserialize, Serialize};

const FALLBACK_REST_COLOR: &str = "#6b7280";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneBand {
    pub zone: HeartRateZone,
    /// Inclusive lower bound in bpm.
    pub min: u32,
    /// Exclusive upper bound in bpm.
    pub max: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneMatch {
    pub zone: HeartRateZone,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneTable {
    bands: Vec<ZoneBand>,
}

impl Default for ZoneTable {
    fn default() -> Self {
        let band = |zone, min, max, color: &str| ZoneBand {
            zone,
            min,
            max,
            color: color.to_string(),
        };

        Self {
            bands: vec![
                band(HeartRateZone::Reposo, 0, 60, "#6b7280"),
                band(HeartRateZone::Ligera, 60, 100, "#10b981"),
                band(HeartRateZone::Moderada, 100, 140, "#f59e0b"),
                band(HeartRateZone::Intensa, 140, 170, "#ef4444"),
                band(HeartRateZone::Maxima, 170, 220, "#dc2626"),
            ],
        }
    }
}

impl ZoneTable {
    pub fn new(bands: Vec<ZoneBand>) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &[ZoneBand] {
        &self.bands
    }

    /// First band with `min <= bpm < max` wins; anything outside the table is rest.
    pub fn classify(&self, bpm: u32) -> ZoneMatch {
        let zone = self
            .bands
            .iter()
            .find(|band| band.min <= bpm && bpm < band.max)
            .map(|band| band.zone)
            .unwrap_or(HeartRateZone::Reposo);

        ZoneMatch {
            zone,
            color: self.color_of(zone).to_string(),
        }
    }

    pub fn color_of(&self, zone: HeartRateZone) -> &str {
        self.bands
            .iter()
            .find(|band| band.zone == zone)
            .map(|band| band.color.as_str())
            .unwrap_or(FALLBACK_REST_COLOR)
    }
}

impl Validate for ZoneTable {
    fn validate(&self) -> Result<()> {
        if self.bands.is_empty() {
            return Err(TrackerError::ConfigValidationError {
                field: "heart_rate_zones".to_string(),
                message: "At least one zone band is required".to_string(),
            });
        }

        for (index, band) in self.bands.iter().enumerate() {
            let field = format!("heart_rate_zones[{}]", index);
            validate_bounds(&field, band.min, band.max)?;
            validate_hex_color(&format!("{}.color", field), &band.color)?;
        }

        Ok(())
    }
}
