mod config;
mod identity;
mod storage;

pub use config::MemStorageConfig;
pub use identity::MemIdentity;
pub use storage::MemStorage;
