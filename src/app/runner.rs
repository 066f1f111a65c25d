//! Background execution of the simulated device.

use crate::core::simulator::{ActivityState, FitnessSimulator};
use crate::domain::model::BiometricReading;
use crate::domain::ports::ReadingStore;
use crate::utils::error::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize)]
pub struct RunnerStatus {
    pub running: bool,
    pub activity_state: ActivityState,
    pub total_steps: u64,
    pub baseline_hr: u32,
    /// Seconds between readings.
    pub interval: u64,
}

struct RunningTask {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

pub struct SimulatorRunner {
    simulator: Arc<Mutex<FitnessSimulator>>,
    store: Arc<dyn ReadingStore>,
    interval: Duration,
    task: Mutex<Option<RunningTask>>,
}

impl SimulatorRunner {
    pub fn new(simulator: FitnessSimulator, store: Arc<dyn ReadingStore>, interval: Duration) -> Self {
        Self {
            simulator: Arc::new(Mutex::new(simulator)),
            store,
            interval,
            task: Mutex::new(None),
        }
    }

    /// Generates one reading and persists it.
    pub async fn tick(&self) -> Result<BiometricReading> {
        tick(&self.simulator, self.store.as_ref()).await
    }

    /// 啟動背景模擬；已在執行時回傳 false
    pub async fn start(&self) -> bool {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.join.is_finished()) {
            warn!("⚠️ Simulator is already running");
            return false;
        }

        let cancel = CancellationToken::new();
        let join = tokio::spawn(run_loop(
            Arc::clone(&self.simulator),
            Arc::clone(&self.store),
            self.interval,
            cancel.clone(),
        ));

        *task = Some(RunningTask { cancel, join });
        info!("✅ Simulator started");
        true
    }

    /// 停止背景模擬；未執行時回傳 false
    pub async fn stop(&self) -> bool {
        let running = self.task.lock().await.take();
        let Some(RunningTask { cancel, mut join }) = running else {
            warn!("⚠️ Simulator is not running");
            return false;
        };

        cancel.cancel();
        match tokio::time::timeout(STOP_TIMEOUT, &mut join).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("❌ Simulator task ended abnormally: {}", e),
            Err(_) => {
                warn!("⚠️ Simulator did not stop within {:?}, aborting", STOP_TIMEOUT);
                join.abort();
            }
        }

        info!("🛑 Simulator stopped");
        true
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.join.is_finished())
    }

    pub async fn reset_steps(&self) {
        self.simulator.lock().await.reset_steps();
    }

    pub async fn set_activity_state(&self, state: ActivityState) {
        self.simulator.lock().await.set_activity_state(state);
    }

    pub async fn status(&self) -> RunnerStatus {
        let running = self.is_running().await;
        let snapshot = self.simulator.lock().await.snapshot();

        RunnerStatus {
            running,
            activity_state: snapshot.activity_state,
            total_steps: snapshot.total_steps,
            baseline_hr: snapshot.baseline_hr,
            interval: self.interval.as_secs(),
        }
    }
}

async fn tick(
    simulator: &Mutex<FitnessSimulator>,
    store: &dyn ReadingStore,
) -> Result<BiometricReading> {
    let reading = simulator.lock().await.generate_reading();
    store.insert_biometric(&reading).await?;
    debug!("✅ Reading saved: {}", reading);
    Ok(reading)
}

async fn run_loop(
    simulator: Arc<Mutex<FitnessSimulator>>,
    store: Arc<dyn ReadingStore>,
    interval: Duration,
    cancel: CancellationToken,
) {
    info!("🚀 Fitness tracker simulator started");
    info!("📊 Generating readings every {} seconds", interval.as_secs());

    loop {
        match tick(&simulator, store.as_ref()).await {
            Ok(reading) => {
                let health = reading.health_status();
                info!(
                    "💓 Status: {} | HR zone: {}",
                    health.overall,
                    reading.heart_rate_zone()
                );
            }
            Err(e) => error!("❌ Simulation error: {}", e),
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {},
            _ = cancel.cancelled() => {
                debug!("Simulator loop cancelled");
                break;
            }
        }
    }
}
