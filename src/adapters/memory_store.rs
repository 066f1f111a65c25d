use crate::domain::model::{BiometricReading, ProximityReading};
use crate::domain::ports::ReadingStore;
use crate::utils::error::{Result, TrackerError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-process store. Readings are lost on restart.
#[derive(Clone)]
pub struct MemoryStore {
    biometrics: Arc<Mutex<Vec<BiometricReading>>>,
    proximity: Arc<Mutex<Vec<ProximityReading>>>,
    available: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            biometrics: Arc::new(Mutex::new(Vec::new())),
            proximity: Arc::new(Mutex::new(Vec::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// 模擬資料庫中斷，之後的操作都會失敗
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn biometric_count(&self) -> usize {
        self.biometrics.lock().await.len()
    }

    fn ensure_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TrackerError::StorageUnavailable {
                message: "memory store is offline".to_string(),
            })
        }
    }
}

/// Newest first; later inserts win ties.
fn newest<T: Clone>(items: &[T], limit: usize, at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut sorted: Vec<T> = items.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| at(b).cmp(&at(a)));
    sorted.truncate(limit);
    sorted
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn insert_biometric(&self, reading: &BiometricReading) -> Result<String> {
        self.ensure_available()?;
        self.biometrics.lock().await.push(reading.clone());
        Ok(reading.id.clone())
    }

    async fn latest_biometric(&self) -> Result<Option<BiometricReading>> {
        Ok(self.recent_biometrics(1).await?.into_iter().next())
    }

    async fn recent_biometrics(&self, limit: usize) -> Result<Vec<BiometricReading>> {
        self.ensure_available()?;
        let readings = self.biometrics.lock().await;
        Ok(newest(&readings, limit, |r| r.timestamp))
    }

    async fn insert_proximity(&self, reading: &ProximityReading) -> Result<String> {
        self.ensure_available()?;
        self.proximity.lock().await.push(reading.clone());
        Ok(reading.id.clone())
    }

    async fn recent_proximity(&self, limit: usize) -> Result<Vec<ProximityReading>> {
        self.ensure_available()?;
        let readings = self.proximity.lock().await;
        Ok(newest(&readings, limit, |r| r.received_at))
    }

    async fn is_healthy(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_ordering_matches_sled_store() {
        let store = MemoryStore::new();
        let now = Utc::now();

        for (offset, hr) in [(5, 90), (-5, 60), (5, 91), (0, 75)] {
            let reading =
                BiometricReading::with_timestamp(hr, 0, 98.0, 36.6, now + Duration::seconds(offset));
            store.insert_biometric(&reading).await.unwrap();
        }

        let rates: Vec<u32> = store
            .recent_biometrics(10)
            .await
            .unwrap()
            .iter()
            .map(|r| r.heart_rate)
            .collect();
        assert_eq!(rates, vec![91, 90, 75, 60]);
        assert_eq!(store.latest_biometric().await.unwrap().unwrap().heart_rate, 91);
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let store = MemoryStore::new();
        store.set_available(false);

        assert!(!store.is_healthy().await);
        let err = store.latest_biometric().await.unwrap_err();
        assert!(matches!(err, TrackerError::StorageUnavailable { .. }));
    }
}
