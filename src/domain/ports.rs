use crate::domain::model::{BiometricReading, ProximityReading};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence for sensor readings. Every query returns newest first.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// 儲存一筆生理讀數，回傳文件 id
    async fn insert_biometric(&self, reading: &BiometricReading) -> Result<String>;

    async fn latest_biometric(&self) -> Result<Option<BiometricReading>>;

    async fn recent_biometrics(&self, limit: usize) -> Result<Vec<BiometricReading>>;

    async fn insert_proximity(&self, reading: &ProximityReading) -> Result<String>;

    async fn recent_proximity(&self, limit: usize) -> Result<Vec<ProximityReading>>;

    /// 儲存後端是否可用
    async fn is_healthy(&self) -> bool;
}
