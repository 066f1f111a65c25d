// Adapters layer: concrete ReadingStore backends.

pub mod memory_store;
pub mod sled_store;

pub use memory_store::MemoryStore;
pub use sled_store::SledStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::domain::ports::ReadingStore;
use crate::utils::error::Result;
use std::sync::Arc;

/// 依設定開啟對應的儲存後端
pub fn open_store(config: &StorageConfig) -> Result<Arc<dyn ReadingStore>> {
    match config.backend {
        StorageBackend::Sled => {
            tracing::debug!("Opening sled store at {}", config.path);
            Ok(Arc::new(SledStore::open(&config.path)?))
        }
        StorageBackend::Memory => {
            tracing::warn!("⚠️ Using in-memory storage, readings will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
