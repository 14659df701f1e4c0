use chrono::{DateTime, Utc};
use derive_more::{Deref, DerefMut};
use tokio::sync::broadcast;

use crate::batch::WriteBatch;
use crate::errors::StoreResult;
use crate::event::TodoChange;
use crate::invitation::{Invitation, InviteId};
use crate::todo::{AccountId, RecurrenceCompletion, Todo, TodoId, TodoUpdate};
use crate::PinFuture;

#[derive(Deref, DerefMut)]
#[deref(forward)]
#[deref_mut(forward)]
pub struct StorageBox(Box<dyn Storage>);

impl StorageBox {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self(Box::new(storage))
    }
}

/// Contract of the hosted document store: a per-account todo collection,
/// a top-level invitation collection, point and batched writes, and
/// subscribe-and-receive change notifications.
pub trait Storage: Send + Sync {
    fn init(&self) -> PinFuture<StoreResult<()>>;

    /// Create a new todo in its owner's collection
    fn create_todo(&self, todo: Todo) -> PinFuture<StoreResult<()>>;

    // Get a todo by id
    fn get_todo(&self, owner_id: AccountId, todo_id: TodoId) -> PinFuture<StoreResult<Todo>>;

    // List all todos of an account
    fn list_todos(&self, owner_id: AccountId) -> PinFuture<StoreResult<Vec<Todo>>>;

    /// List todos whose start time falls inside `[start, end)`; todos
    /// without a start time are never returned by range queries
    fn list_todos_range(
        &self,
        owner_id: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PinFuture<StoreResult<Vec<Todo>>>;

    // Update a todo
    fn update_todo(
        &self,
        owner_id: AccountId,
        todo_id: TodoId,
        update: TodoUpdate,
    ) -> PinFuture<StoreResult<()>>;

    // Delete a todo by id
    fn delete_todo(&self, owner_id: AccountId, todo_id: TodoId) -> PinFuture<StoreResult<()>>;

    fn get_invitation(&self, invite_id: InviteId) -> PinFuture<StoreResult<Option<Invitation>>>;

    fn put_invitation(&self, invitation: Invitation) -> PinFuture<StoreResult<()>>;

    fn list_recurrence_completions(
        &self,
        owner_id: AccountId,
    ) -> PinFuture<StoreResult<Vec<RecurrenceCompletion>>>;

    /// Apply a batch atomically, partial application is never visible
    fn commit_batch(&self, batch: WriteBatch) -> PinFuture<StoreResult<()>>;

    /// Subscribe to the change feed of an account's todo collection
    fn watch_todos(
        &self,
        owner_id: AccountId,
    ) -> PinFuture<StoreResult<broadcast::Receiver<TodoChange>>>;
}
