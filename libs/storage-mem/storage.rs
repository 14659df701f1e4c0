use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use doable_storage_core::{
    AccountId, Invitation, InviteId, PinFuture, RecurrenceCompletion, Storage, StoreError,
    StoreResult, Todo, TodoChange, TodoId, TodoUpdate, WriteBatch, WriteOp,
};
use tokio::sync::broadcast;

use crate::config::MemStorageConfig;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// In-memory model of the hosted document store. Writes are applied in
/// arrival order (last write wins) and batches are staged against a
/// snapshot so partial application is never observable.
#[derive(Clone)]
pub struct MemStorage {
    inner: Arc<Mutex<Inner>>,
    watchers: Arc<Mutex<HashMap<AccountId, broadcast::Sender<TodoChange>>>>,
    reject_reason: Arc<Mutex<Option<String>>>,
    channel_capacity: usize,
}

#[derive(Default, Clone)]
struct Inner {
    todos: HashMap<AccountId, BTreeMap<TodoId, Todo>>,
    invitations: HashMap<InviteId, Invitation>,
    completions: HashMap<AccountId, BTreeMap<TodoId, RecurrenceCompletion>>,
}

impl MemStorage {
    pub fn new(config: MemStorageConfig) -> Self {
        MemStorage {
            inner: Arc::new(Mutex::new(Inner::default())),
            watchers: Arc::new(Mutex::new(HashMap::new())),
            reject_reason: Arc::new(Mutex::new(None)),
            channel_capacity: config.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY),
        }
    }

    /// Make the next write operation fail with `WriteRejected`, as the
    /// hosted store would on a refused request. Used to exercise
    /// rollback and batch atomicity paths.
    pub fn reject_next_write(&self, reason: &str) {
        if let Ok(mut slot) = self.reject_reason.lock() {
            *slot = Some(reason.to_owned());
        }
    }

    fn lock_inner(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| StoreError::OperationFailed(e.to_string()))
    }

    fn take_rejection(&self) -> StoreResult<()> {
        let mut slot = self
            .reject_reason
            .lock()
            .map_err(|e| StoreError::OperationFailed(e.to_string()))?;
        match slot.take() {
            Some(reason) => Err(StoreError::WriteRejected(reason)),
            None => Ok(()),
        }
    }

    fn emit(&self, events: Vec<(AccountId, TodoChange)>) {
        let Ok(watchers) = self.watchers.lock() else {
            return;
        };
        for (owner_id, change) in events {
            if let Some(sender) = watchers.get(&owner_id) {
                // A send only fails when nobody is listening anymore
                let _ = sender.send(change);
            }
        }
    }
}

fn apply_op(
    inner: &mut Inner,
    op: WriteOp,
    now: DateTime<Utc>,
    events: &mut Vec<(AccountId, TodoChange)>,
) -> StoreResult<()> {
    match op {
        WriteOp::CreateTodo(todo) => {
            let collection = inner.todos.entry(todo.owner_id.clone()).or_default();
            if collection.contains_key(&todo.id) {
                return Err(StoreError::Conflict(format!("todo '{}'", todo.id)));
            }
            events.push((todo.owner_id.clone(), TodoChange::Created(todo.clone())));
            collection.insert(todo.id.clone(), todo);
            Ok(())
        }
        WriteOp::UpdateTodo {
            owner_id,
            todo_id,
            update,
        } => {
            let collection = inner.todos.entry(owner_id.clone()).or_default();
            let current = collection
                .get(&todo_id)
                .ok_or_else(|| StoreError::NotFound(format!("todo '{todo_id}'")))?;
            let merged = update.merge_with_todo(current, now);
            events.push((owner_id, TodoChange::Updated(merged.clone())));
            collection.insert(todo_id, merged);
            Ok(())
        }
        WriteOp::DeleteTodo { owner_id, todo_id } => {
            let collection = inner.todos.entry(owner_id.clone()).or_default();
            if collection.remove(&todo_id).is_none() {
                return Err(StoreError::NotFound(format!("todo '{todo_id}'")));
            }
            events.push((owner_id, TodoChange::Deleted(todo_id)));
            Ok(())
        }
        WriteOp::PutInvitation(invitation) => {
            inner
                .invitations
                .insert(invitation.id.clone(), invitation);
            Ok(())
        }
        WriteOp::PutRecurrenceCompletion(completion) => {
            inner
                .completions
                .entry(completion.owner_id.clone())
                .or_default()
                .insert(completion.canonical_id.clone(), completion);
            Ok(())
        }
        WriteOp::DeleteRecurrenceCompletion {
            owner_id,
            canonical_id,
        } => {
            // Removing an absent marker is a no-op: deletion flows pair
            // this with the todo delete without knowing if one exists
            if let Some(markers) = inner.completions.get_mut(&owner_id) {
                markers.remove(&canonical_id);
            }
            Ok(())
        }
    }
}

impl Storage for MemStorage {
    fn init(&self) -> PinFuture<StoreResult<()>> {
        Box::pin(async move { Ok(()) })
    }

    fn create_todo(&self, todo: Todo) -> PinFuture<StoreResult<()>> {
        Box::pin(async move {
            self.take_rejection()?;
            let mut events = Vec::new();
            {
                let mut inner = self.lock_inner()?;
                apply_op(&mut inner, WriteOp::CreateTodo(todo), Utc::now(), &mut events)?;
            }
            self.emit(events);
            Ok(())
        })
    }

    fn get_todo(&self, owner_id: AccountId, todo_id: TodoId) -> PinFuture<StoreResult<Todo>> {
        Box::pin(async move {
            let inner = self.lock_inner()?;
            inner
                .todos
                .get(&owner_id)
                .and_then(|collection| collection.get(&todo_id))
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("todo '{todo_id}'")))
        })
    }

    fn list_todos(&self, owner_id: AccountId) -> PinFuture<StoreResult<Vec<Todo>>> {
        Box::pin(async move {
            let inner = self.lock_inner()?;
            let mut todos: Vec<Todo> = inner
                .todos
                .get(&owner_id)
                .map(|collection| collection.values().cloned().collect())
                .unwrap_or_default();
            todos.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
            Ok(todos)
        })
    }

    fn list_todos_range(
        &self,
        owner_id: AccountId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PinFuture<StoreResult<Vec<Todo>>> {
        Box::pin(async move {
            let inner = self.lock_inner()?;
            let mut todos: Vec<Todo> = inner
                .todos
                .get(&owner_id)
                .map(|collection| {
                    collection
                        .values()
                        .filter(|todo| {
                            todo.start_time
                                .map(|t| start <= t && t < end)
                                .unwrap_or(false)
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            todos.sort_by_key(|todo| todo.start_time);
            Ok(todos)
        })
    }

    fn update_todo(
        &self,
        owner_id: AccountId,
        todo_id: TodoId,
        update: TodoUpdate,
    ) -> PinFuture<StoreResult<()>> {
        Box::pin(async move {
            self.take_rejection()?;
            let mut events = Vec::new();
            {
                let mut inner = self.lock_inner()?;
                apply_op(
                    &mut inner,
                    WriteOp::UpdateTodo {
                        owner_id,
                        todo_id,
                        update,
                    },
                    Utc::now(),
                    &mut events,
                )?;
            }
            self.emit(events);
            Ok(())
        })
    }

    fn delete_todo(&self, owner_id: AccountId, todo_id: TodoId) -> PinFuture<StoreResult<()>> {
        Box::pin(async move {
            self.take_rejection()?;
            let mut events = Vec::new();
            {
                let mut inner = self.lock_inner()?;
                apply_op(
                    &mut inner,
                    WriteOp::DeleteTodo { owner_id, todo_id },
                    Utc::now(),
                    &mut events,
                )?;
            }
            self.emit(events);
            Ok(())
        })
    }

    fn get_invitation(&self, invite_id: InviteId) -> PinFuture<StoreResult<Option<Invitation>>> {
        Box::pin(async move {
            let inner = self.lock_inner()?;
            Ok(inner.invitations.get(&invite_id).cloned())
        })
    }

    fn put_invitation(&self, invitation: Invitation) -> PinFuture<StoreResult<()>> {
        Box::pin(async move {
            self.take_rejection()?;
            let mut inner = self.lock_inner()?;
            inner
                .invitations
                .insert(invitation.id.clone(), invitation);
            Ok(())
        })
    }

    fn list_recurrence_completions(
        &self,
        owner_id: AccountId,
    ) -> PinFuture<StoreResult<Vec<RecurrenceCompletion>>> {
        Box::pin(async move {
            let inner = self.lock_inner()?;
            Ok(inner
                .completions
                .get(&owner_id)
                .map(|markers| markers.values().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn commit_batch(&self, batch: WriteBatch) -> PinFuture<StoreResult<()>> {
        Box::pin(async move {
            self.take_rejection()?;
            let now = Utc::now();
            let mut events = Vec::new();
            {
                let mut inner = self.lock_inner()?;
                // Stage against a snapshot so a failing op leaves the
                // visible state untouched
                let mut staged = inner.clone();
                for op in batch.into_ops() {
                    apply_op(&mut staged, op, now, &mut events)?;
                }
                *inner = staged;
            }
            tracing::debug!(events = events.len(), "committed write batch");
            self.emit(events);
            Ok(())
        })
    }

    fn watch_todos(
        &self,
        owner_id: AccountId,
    ) -> PinFuture<StoreResult<broadcast::Receiver<TodoChange>>> {
        Box::pin(async move {
            let mut watchers = self
                .watchers
                .lock()
                .map_err(|e| StoreError::OperationFailed(e.to_string()))?;
            let sender = watchers
                .entry(owner_id)
                .or_insert_with(|| broadcast::channel(self.channel_capacity).0);
            Ok(sender.subscribe())
        })
    }
}
