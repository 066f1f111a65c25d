pub mod simulator;
pub mod zones;

pub use crate::domain::model::{BiometricReading, HealthStatus, HeartRateZone, ProximityReading};
pub use crate::domain::ports::ReadingStore;
pub use crate::utils::error::Result;
