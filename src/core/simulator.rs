//! Simulated wrist device.
//!
//! Produces heart rate, cumulative steps, SpO2 and body temperature that
//! follow a randomly changing activity level. All values are clamped to the
//! configured sensor limits.

use crate::config::SensorConfig;
use crate::domain::model::{round_to, BiometricReading};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BASELINE_HEART_RATE: u32 = 75;
const ACTIVITY_CHANGE_PROBABILITY: f64 = 0.2;
const ACTIVITY_STATES: [ActivityState; 4] = [
    ActivityState::Resting,
    ActivityState::Light,
    ActivityState::Moderate,
    ActivityState::Intense,
];
// 靜止狀態的機率最高
const ACTIVITY_WEIGHTS: [f64; 4] = [0.4, 0.3, 0.2, 0.1];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityState {
    #[default]
    Resting,
    Light,
    Moderate,
    Intense,
}

impl ActivityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityState::Resting => "resting",
            ActivityState::Light => "light",
            ActivityState::Moderate => "moderate",
            ActivityState::Intense => "intense",
        }
    }

    /// Target heart rate window in bpm.
    fn heart_rate_window(&self) -> (i64, i64) {
        match self {
            ActivityState::Resting => (60, 80),
            ActivityState::Light => (90, 110),
            ActivityState::Moderate => (120, 140),
            ActivityState::Intense => (150, 175),
        }
    }

    /// Steps taken between two readings.
    fn step_window(&self) -> (u64, u64) {
        match self {
            ActivityState::Resting => (0, 2),
            ActivityState::Light => (3, 8),
            ActivityState::Moderate => (10, 20),
            ActivityState::Intense => (25, 40),
        }
    }

    fn oxygen_window(&self) -> (f64, f64) {
        match self {
            ActivityState::Intense => (95.0, 98.0),
            _ => (97.0, 100.0),
        }
    }

    fn temperature_window(&self) -> (f64, f64) {
        match self {
            ActivityState::Resting => (36.3, 36.8),
            ActivityState::Light => (36.6, 37.0),
            ActivityState::Moderate => (36.9, 37.3),
            ActivityState::Intense => (37.0, 37.5),
        }
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SimulatorSnapshot {
    pub activity_state: ActivityState,
    pub total_steps: u64,
    pub baseline_hr: u32,
}

pub struct FitnessSimulator {
    activity_state: ActivityState,
    total_steps: u64,
    baseline_hr: u32,
    sensors: SensorConfig,
    rng: StdRng,
}

impl FitnessSimulator {
    pub fn new(sensors: SensorConfig) -> Self {
        Self::with_rng(sensors, StdRng::from_entropy())
    }

    pub fn with_seed(sensors: SensorConfig, seed: u64) -> Self {
        Self::with_rng(sensors, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sensors: SensorConfig, rng: StdRng) -> Self {
        Self {
            activity_state: ActivityState::Resting,
            total_steps: 0,
            baseline_hr: BASELINE_HEART_RATE,
            sensors,
            rng,
        }
    }

    pub fn activity_state(&self) -> ActivityState {
        self.activity_state
    }

    pub fn set_activity_state(&mut self, state: ActivityState) {
        self.activity_state = state;
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn generate_heart_rate(&mut self) -> u32 {
        let (low, high) = self.activity_state.heart_rate_window();
        let target = self.rng.gen_range(low..=high);

        // 自然變異 ±5 bpm
        let hr = target + self.rng.gen_range(-5..=5);

        let limits = self.sensors.heart_rate;
        hr.clamp(i64::from(limits.min), i64::from(limits.max)) as u32
    }

    /// Adds this interval's steps to the running total and returns the total.
    pub fn generate_steps(&mut self) -> u64 {
        let (low, high) = self.activity_state.step_window();
        self.total_steps += self.rng.gen_range(low..=high);
        self.total_steps
    }

    pub fn generate_oxygen(&mut self) -> f64 {
        let (low, high) = self.activity_state.oxygen_window();
        let spo2 = self.rng.gen_range(low..high) + self.rng.gen_range(-0.5..0.5);

        let limits = self.sensors.oxygen;
        round_to(spo2.clamp(limits.min, limits.max), 1)
    }

    pub fn generate_temperature(&mut self) -> f64 {
        let (low, high) = self.activity_state.temperature_window();
        let temp = self.rng.gen_range(low..high) + self.rng.gen_range(-0.1..0.1);

        let limits = self.sensors.temperature;
        round_to(temp.clamp(limits.min, limits.max), 1)
    }

    /// Occasionally switches activity level. Returns the new state when it changed.
    pub fn maybe_change_activity(&mut self) -> Option<ActivityState> {
        if !self.rng.gen_bool(ACTIVITY_CHANGE_PROBABILITY) {
            return None;
        }

        let weights = WeightedIndex::new(ACTIVITY_WEIGHTS).ok()?;
        let next = ACTIVITY_STATES[weights.sample(&mut self.rng)];
        self.activity_state = next;
        tracing::info!("🏃 Activity state changed to: {}", next);
        Some(next)
    }

    pub fn generate_reading(&mut self) -> BiometricReading {
        self.maybe_change_activity();

        let hr = self.generate_heart_rate();
        let steps = self.generate_steps();
        let spo2 = self.generate_oxygen();
        let temp = self.generate_temperature();

        BiometricReading::new(hr, steps, spo2, temp)
    }

    /// 重設步數 (模擬新的一天)
    pub fn reset_steps(&mut self) {
        self.total_steps = 0;
        tracing::info!("🔄 Step counter reset");
    }

    pub fn snapshot(&self) -> SimulatorSnapshot {
        SimulatorSnapshot {
            activity_state: self.activity_state,
            total_steps: self.total_steps,
            baseline_hr: self.baseline_hr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator(seed: u64) -> FitnessSimulator {
        FitnessSimulator::with_seed(SensorConfig::default(), seed)
    }

    #[test]
    fn test_initial_state() {
        let sim = simulator(1);
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.activity_state, ActivityState::Resting);
        assert_eq!(snapshot.total_steps, 0);
        assert_eq!(snapshot.baseline_hr, 75);
    }

    #[test]
    fn test_heart_rate_stays_in_state_window_and_limits() {
        let mut sim = simulator(7);
        for state in ACTIVITY_STATES {
            sim.set_activity_state(state);
            let (low, high) = state.heart_rate_window();
            for _ in 0..200 {
                let hr = i64::from(sim.generate_heart_rate());
                assert!(hr >= (low - 5).max(60) && hr <= (high + 5).min(180), "{} -> {}", state, hr);
            }
        }
    }

    #[test]
    fn test_steps_accumulate_per_state() {
        let mut sim = simulator(11);
        sim.set_activity_state(ActivityState::Intense);

        let mut previous = 0;
        for _ in 0..50 {
            let total = sim.generate_steps();
            let increment = total - previous;
            assert!((25..=40).contains(&increment));
            previous = total;
        }

        sim.set_activity_state(ActivityState::Resting);
        let before = sim.total_steps();
        let after = sim.generate_steps();
        assert!(after - before <= 2);
    }

    #[test]
    fn test_oxygen_and_temperature_clamped_and_rounded() {
        let mut sim = simulator(3);
        for state in ACTIVITY_STATES {
            sim.set_activity_state(state);
            for _ in 0..200 {
                let spo2 = sim.generate_oxygen();
                assert!((95.0..=100.0).contains(&spo2));
                assert_eq!(spo2, round_to(spo2, 1));

                let temp = sim.generate_temperature();
                assert!((36.1..=37.5).contains(&temp));
                assert_eq!(temp, round_to(temp, 1));
            }
        }
    }

    #[test]
    fn test_reset_steps() {
        let mut sim = simulator(5);
        sim.set_activity_state(ActivityState::Moderate);
        sim.generate_steps();
        assert!(sim.total_steps() > 0);

        sim.reset_steps();
        assert_eq!(sim.total_steps(), 0);
    }

    #[test]
    fn test_activity_changes_roughly_one_in_five() {
        let mut sim = simulator(99);
        let changes = (0..5000)
            .filter(|_| sim.maybe_change_activity().is_some())
            .count();
        assert!((800..=1200).contains(&changes), "changes = {}", changes);
    }

    #[test]
    fn test_same_seed_same_readings() {
        let mut a = simulator(2024);
        let mut b = simulator(2024);
        for _ in 0..20 {
            let ra = a.generate_reading();
            let rb = b.generate_reading();
            assert_eq!(ra.heart_rate, rb.heart_rate);
            assert_eq!(ra.steps, rb.steps);
            assert_eq!(ra.oxygen, rb.oxygen);
            assert_eq!(ra.temperature, rb.temperature);
        }
    }

    #[test]
    fn test_generated_reading_is_monotonic_in_steps() {
        let mut sim = simulator(8);
        let mut last = 0;
        for _ in 0..100 {
            let reading = sim.generate_reading();
            assert!(reading.steps >= last);
            last = reading.steps;
        }
    }
}
