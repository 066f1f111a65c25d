//! Emulated proximity microcontroller that pushes readings to the API.

use crate::domain::model::{round_to, ProximityPayload};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/sensor/proximidad";
pub const DEFAULT_SENSOR_ID: &str = "proximidad_01";
const MIN_DISTANCE_CM: f64 = 5.0;
const MAX_DISTANCE_CM: f64 = 40.0;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub endpoint: String,
    pub sensor_id: String,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            sensor_id: DEFAULT_SENSOR_ID.to_string(),
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Validate for ProbeConfig {
    fn validate(&self) -> Result<()> {
        validate_url("probe.endpoint", &self.endpoint)?;
        validate_non_empty_string("probe.sensor_id", &self.sensor_id)?;
        validate_range("probe.interval_seconds", self.interval.as_secs(), 1, 3600)?;
        Ok(())
    }
}

pub struct ProximityProbe {
    config: ProbeConfig,
    client: Client,
    rng: StdRng,
}

impl ProximityProbe {
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            client,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 模擬一次距離量測
    pub fn generate(&mut self) -> ProximityPayload {
        let distance = self.rng.gen_range(MIN_DISTANCE_CM..=MAX_DISTANCE_CM);
        ProximityPayload {
            sensor_id: self.config.sensor_id.clone(),
            distance_cm: round_to(distance, 2),
        }
    }

    /// Posts one reading and returns the server's status code.
    pub async fn send(&mut self) -> Result<(ProximityPayload, StatusCode)> {
        let payload = self.generate();
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await?;
        Ok((payload, response.status()))
    }

    /// Sends readings forever, or `count` times. Failures are logged and the loop continues.
    /// Returns how many sends got a success status.
    pub async fn run(&mut self, count: Option<u64>) -> u64 {
        tracing::info!("🔵 Proximity sensor simulation started");
        tracing::info!("📡 Posting to {}", self.config.endpoint);

        let mut sent = 0u64;
        let mut succeeded = 0u64;
        loop {
            match self.send().await {
                Ok((payload, status)) => {
                    tracing::info!(
                        "📡 Sent: {} {:.2}cm | Response: {}",
                        payload.sensor_id,
                        payload.distance_cm,
                        status.as_u16()
                    );
                    if status.is_success() {
                        succeeded += 1;
                    }
                }
                Err(e) => tracing::error!("❌ Error sending reading: {}", e),
            }

            sent += 1;
            if count.is_some_and(|limit| sent >= limit) {
                break;
            }
            tokio::time::sleep(self.config.interval).await;
        }

        succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_generated_distance_in_range() {
        let mut probe = ProximityProbe::new(ProbeConfig::default())
            .unwrap()
            .with_seed(3);

        for _ in 0..500 {
            let payload = probe.generate();
            assert_eq!(payload.sensor_id, "proximidad_01");
            assert!((5.0..=40.0).contains(&payload.distance_cm));
            assert_eq!(payload.distance_cm, round_to(payload.distance_cm, 2));
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(ProbeConfig::default().validate().is_ok());

        let config = ProbeConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ProbeConfig {
            sensor_id: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_send_posts_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/sensor/proximidad")
                .header("content-type", "application/json")
                .json_body_partial(r#"{"sensor_id": "proximidad_01"}"#);
            then.status(201);
        });

        let config = ProbeConfig {
            endpoint: server.url("/api/sensor/proximidad"),
            ..Default::default()
        };
        let mut probe = ProximityProbe::new(config).unwrap();

        let (_, status) = probe.send().await.unwrap();

        mock.assert();
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_run_survives_server_errors() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/sensor/proximidad");
            then.status(500);
        });

        let config = ProbeConfig {
            endpoint: server.url("/api/sensor/proximidad"),
            interval: Duration::from_millis(1),
            ..Default::default()
        };
        let mut probe = ProximityProbe::new(config).unwrap();

        let succeeded = probe.run(Some(3)).await;

        mock.assert_hits(3);
        assert_eq!(succeeded, 0);
    }

    #[tokio::test]
    async fn test_run_survives_unreachable_server() {
        let config = ProbeConfig {
            endpoint: "http://127.0.0.1:9/api/sensor/proximidad".to_string(),
            interval: Duration::from_millis(1),
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        let mut probe = ProximityProbe::new(config).unwrap();

        assert_eq!(probe.run(Some(2)).await, 0);
    }
}
