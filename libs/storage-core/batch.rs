use crate::invitation::Invitation;
use crate::todo::{AccountId, RecurrenceCompletion, Todo, TodoId, TodoUpdate};

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    CreateTodo(Todo),
    UpdateTodo {
        owner_id: AccountId,
        todo_id: TodoId,
        update: TodoUpdate,
    },
    DeleteTodo {
        owner_id: AccountId,
        todo_id: TodoId,
    },
    PutInvitation(Invitation),
    PutRecurrenceCompletion(RecurrenceCompletion),
    DeleteRecurrenceCompletion {
        owner_id: AccountId,
        canonical_id: TodoId,
    },
}

/// Ordered set of writes applied by the store as a single unit: either
/// every operation takes effect or none of them does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_todo(mut self, todo: Todo) -> Self {
        self.ops.push(WriteOp::CreateTodo(todo));
        self
    }

    pub fn update_todo(mut self, owner_id: AccountId, todo_id: TodoId, update: TodoUpdate) -> Self {
        self.ops.push(WriteOp::UpdateTodo {
            owner_id,
            todo_id,
            update,
        });
        self
    }

    pub fn delete_todo(mut self, owner_id: AccountId, todo_id: TodoId) -> Self {
        self.ops.push(WriteOp::DeleteTodo { owner_id, todo_id });
        self
    }

    pub fn put_invitation(mut self, invitation: Invitation) -> Self {
        self.ops.push(WriteOp::PutInvitation(invitation));
        self
    }

    pub fn put_recurrence_completion(mut self, completion: RecurrenceCompletion) -> Self {
        self.ops.push(WriteOp::PutRecurrenceCompletion(completion));
        self
    }

    pub fn delete_recurrence_completion(
        mut self,
        owner_id: AccountId,
        canonical_id: TodoId,
    ) -> Self {
        self.ops.push(WriteOp::DeleteRecurrenceCompletion {
            owner_id,
            canonical_id,
        });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
