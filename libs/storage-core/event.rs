use crate::todo::{Todo, TodoId};

/// Change notification delivered to the subscribers of an account's
/// todo collection.
#[derive(Clone, Debug, PartialEq)]
pub enum TodoChange {
    Created(Todo),
    Updated(Todo),
    Deleted(TodoId),
}

impl TodoChange {
    pub fn todo_id(&self) -> &TodoId {
        match self {
            Self::Created(todo) => &todo.id,
            Self::Updated(todo) => &todo.id,
            Self::Deleted(id) => id,
        }
    }
}
