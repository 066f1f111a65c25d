pub mod probe;
pub mod runner;

pub use probe::{ProbeConfig, ProximityProbe};
pub use runner::{RunnerStatus, SimulatorRunner};
