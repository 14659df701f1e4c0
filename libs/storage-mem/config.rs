use doable_storage_core::{StorageBox, StorageConfig};
use serde_derive::Deserialize;

use crate::MemStorage;

/// This storage type is used for testing and local runs, data is not
/// persisted to disk but only present in memory
#[derive(Debug, Deserialize, Default)]
pub struct MemStorageConfig {
    /// Capacity of the per-account change notification channel
    pub channel_capacity: Option<usize>,
}

impl StorageConfig for MemStorageConfig {
    type Storage = MemStorage;

    fn try_into_storage(self) -> eyre::Result<StorageBox> {
        Ok(StorageBox::new(MemStorage::new(self)))
    }
}
