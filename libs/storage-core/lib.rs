use std::{future::Future, pin::Pin};

mod batch;
mod errors;
mod event;
mod identity;
mod invitation;
mod storage;
mod storage_config;
mod todo;

pub use batch::{WriteBatch, WriteOp};
pub use errors::{StoreError, StoreResult};
pub use event::TodoChange;
pub use identity::{AuthState, FederatedProvider, IdentityBox, IdentityProvider, Profile};
pub use invitation::{Invitation, InvitationStatus, InviteId};
pub use storage::{Storage, StorageBox};
pub use storage_config::StorageConfig;
pub use todo::{
    AccountId, Collaborator, OriginalRef, Priority, Recurrence, RecurrenceCompletion,
    RecurrenceKind, ShareRole, Todo, TodoId, TodoUpdate,
};

pub type PinFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
