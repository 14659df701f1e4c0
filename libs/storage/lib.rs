pub use doable_storage_core::{
    AccountId, AuthState, Collaborator, FederatedProvider, IdentityBox, IdentityProvider,
    Invitation, InvitationStatus, InviteId, OriginalRef, PinFuture, Priority, Profile, Recurrence,
    RecurrenceCompletion, RecurrenceKind, ShareRole, Storage, StorageBox, StorageConfig,
    StoreError, StoreResult, Todo, TodoChange, TodoId, TodoUpdate, WriteBatch, WriteOp,
};

pub mod backend {
    #[cfg(feature = "memory")]
    pub use doable_storage_mem::{MemIdentity, MemStorage, MemStorageConfig};
}

#[derive(Clone, Debug, strum_macros::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BuiltinStorageType {
    #[cfg(feature = "memory")]
    Memory,
}
