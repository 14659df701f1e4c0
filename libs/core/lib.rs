use doable_storage::{IdentityBox, IdentityProvider, Profile, Storage, StorageBox};

pub mod calendar;
pub mod errors;
pub mod instance;
pub mod overlap;
pub mod recurrence;
pub mod validate;
pub mod visibility;

mod invite_ops;
mod load;
mod session;
mod todo_ops;

pub use errors::{CoreError, Result};
pub use invite_ops::InvitePreview;
pub use load::{load, load_with};
pub use validate::TodoDraft;

use visibility::VisibilityTracker;

pub struct Core {
    storage: StorageBox,
    identity: IdentityBox,
    visibility: VisibilityTracker,
    /// Ok - found | Err - not found with error reason
    found_config_file: Result<(), eyre::Error>,
}

impl Core {
    pub fn new(storage: StorageBox, identity: IdentityBox) -> Self {
        Core {
            storage,
            identity,
            visibility: VisibilityTracker::new(),
            found_config_file: Ok(()),
        }
    }

    pub async fn initialize(&self) -> eyre::Result<()> {
        self.storage.init().await?;
        Ok(())
    }

    pub fn get_inner_storage(&self) -> &StorageBox {
        &self.storage
    }

    pub fn visibility(&self) -> &VisibilityTracker {
        &self.visibility
    }

    pub fn has_found_config_file(&self) -> &Result<(), eyre::Error> {
        &self.found_config_file
    }

    pub(crate) fn with_config_status(mut self, found_config_file: Result<(), eyre::Error>) -> Self {
        self.found_config_file = found_config_file;
        self
    }

    pub(crate) fn require_profile(&self) -> Result<Profile, CoreError> {
        self.identity
            .current_state()
            .profile()
            .cloned()
            .ok_or(CoreError::NotAuthenticated)
    }
}
