pub mod adapters;
pub mod api;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{MemoryStore, SledStore};
pub use api::{router, AppState, TrackerServer};
pub use app::{ProbeConfig, ProximityProbe, SimulatorRunner};
pub use config::{AppConfig, ServerArgs};
pub use core::simulator::FitnessSimulator;
pub use domain::model::{BiometricReading, ProximityReading};
pub use domain::ports::ReadingStore;
pub use utils::error::{Result, TrackerError};
