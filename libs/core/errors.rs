use doable_storage::{InviteId, StoreError};
use thiserror::Error;

use crate::validate::ValidationError;
use crate::visibility::TransitionError;

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Everything in here is recovered at the UI boundary, no error is
/// fatal to the process.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("this action requires a signed-in account")]
    NotAuthenticated,
    #[error("{0} was not found")]
    NotFound(String),
    #[error("invitation '{0}' has expired")]
    InvitationExpired(InviteId),
    #[error("account '{account_id}' may not modify todo '{todo_id}'")]
    PermissionDenied {
        account_id: String,
        todo_id: String,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("the store rejected the operation: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CoreError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(what) => CoreError::NotFound(what),
            other => CoreError::Store(other),
        }
    }
}
