use fitness_tracker::config::{ApiConfig, SensorConfig};
use fitness_tracker::core::zones::ZoneTable;
use fitness_tracker::{
    router, AppState, FitnessSimulator, MemoryStore, ProbeConfig, ProximityProbe, ReadingStore,
    SimulatorRunner, SledStore,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

async fn spawn_server(store: Arc<dyn ReadingStore>) -> String {
    let runner = Arc::new(SimulatorRunner::new(
        FitnessSimulator::with_seed(SensorConfig::default(), 1),
        Arc::clone(&store),
        Duration::from_millis(20),
    ));
    let state = AppState::new(
        Some(store),
        Some(runner),
        ZoneTable::default(),
        ApiConfig::default(),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state, true)).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_probe_readings_reach_the_store() {
    let store = MemoryStore::new();
    let base_url = spawn_server(Arc::new(store.clone())).await;

    let config = ProbeConfig {
        endpoint: format!("{}/api/sensor/proximidad", base_url),
        interval: Duration::from_millis(5),
        ..Default::default()
    };
    let mut probe = ProximityProbe::new(config).unwrap().with_seed(9);

    let accepted = probe.run(Some(3)).await;

    assert_eq!(accepted, 3);
    let readings = store.recent_proximity(10).await.unwrap();
    assert_eq!(readings.len(), 3);
    assert!(readings
        .iter()
        .all(|r| r.sensor_id == "proximidad_01" && (5.0..=40.0).contains(&r.distance_cm)));
}

#[tokio::test]
async fn test_simulated_device_persists_to_sled() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(SledStore::open(temp_dir.path().join("db")).unwrap());
    let base_url = spawn_server(store.clone()).await;
    let client = reqwest::Client::new();

    let started: serde_json::Value = client
        .post(format!("{}/api/simulator/start", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["started"], true);

    tokio::time::sleep(Duration::from_millis(200)).await;

    let stopped: serde_json::Value = client
        .post(format!("{}/api/simulator/stop", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stopped["stopped"], true);

    let history: Vec<serde_json::Value> = client
        .get(format!("{}/api/biometrics/history", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(history.len() >= 3);
    assert_eq!(history.len(), store.biometric_count());

    // 累計步數不會倒退，最新的在前
    let steps: Vec<u64> = history
        .iter()
        .map(|r| r["pasos"].as_u64().unwrap())
        .collect();
    assert!(steps.windows(2).all(|w| w[0] >= w[1]));

    for reading in &history {
        let hr = reading["frecuencia_cardiaca"].as_u64().unwrap();
        assert!((60..=180).contains(&hr));
    }
}
