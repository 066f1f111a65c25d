//! Embedded persistent store backed by sled.
//!
//! One tree per collection. Keys are the reading timestamp (sign-flipped
//! big-endian nanos) followed by a monotonic sequence number, so forward
//! iteration is chronological and ties keep insertion order.

use crate::domain::model::{BiometricReading, ProximityReading};
use crate::domain::ports::ReadingStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

const BIOMETRIC_TREE: &str = "biometric_readings";
const PROXIMITY_TREE: &str = "proximity_readings";

#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    biometrics: sled::Tree,
    proximity: sled::Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Throwaway database that is removed when dropped.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let biometrics = db.open_tree(BIOMETRIC_TREE)?;
        let proximity = db.open_tree(PROXIMITY_TREE)?;
        Ok(Self {
            db,
            biometrics,
            proximity,
        })
    }

    fn key_for(&self, timestamp: DateTime<Utc>) -> Result<[u8; 16]> {
        let nanos = timestamp
            .timestamp_nanos_opt()
            .unwrap_or_else(|| timestamp.timestamp_micros().saturating_mul(1000));
        // 翻轉符號位，讓有號數順序等於位元組順序
        let ordered = (nanos as u64) ^ (1 << 63);
        let seq = self.db.generate_id()?;

        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&ordered.to_be_bytes());
        key[8..].copy_from_slice(&seq.to_be_bytes());
        Ok(key)
    }

    async fn insert<T: Serialize>(
        &self,
        tree: &sled::Tree,
        timestamp: DateTime<Utc>,
        value: &T,
    ) -> Result<()> {
        let key = self.key_for(timestamp)?;
        let bytes = serde_json::to_vec(value)?;
        tree.insert(key, bytes)?;
        tree.flush_async().await?;
        Ok(())
    }

    fn newest<T: DeserializeOwned>(tree: &sled::Tree, limit: usize) -> Result<Vec<T>> {
        let mut values = Vec::new();
        for entry in tree.iter().rev().take(limit) {
            let (_, bytes) = entry?;
            values.push(serde_json::from_slice(&bytes)?);
        }
        Ok(values)
    }

    pub fn biometric_count(&self) -> usize {
        self.biometrics.len()
    }
}

#[async_trait]
impl ReadingStore for SledStore {
    async fn insert_biometric(&self, reading: &BiometricReading) -> Result<String> {
        self.insert(&self.biometrics, reading.timestamp, reading).await?;
        Ok(reading.id.clone())
    }

    async fn latest_biometric(&self) -> Result<Option<BiometricReading>> {
        match self.biometrics.last()? {
            Some((_, bytes)) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn recent_biometrics(&self, limit: usize) -> Result<Vec<BiometricReading>> {
        Self::newest(&self.biometrics, limit)
    }

    async fn insert_proximity(&self, reading: &ProximityReading) -> Result<String> {
        self.insert(&self.proximity, reading.received_at, reading).await?;
        Ok(reading.id.clone())
    }

    async fn recent_proximity(&self, limit: usize) -> Result<Vec<ProximityReading>> {
        Self::newest(&self.proximity, limit)
    }

    async fn is_healthy(&self) -> bool {
        self.db.size_on_disk().is_ok()
    }
}
