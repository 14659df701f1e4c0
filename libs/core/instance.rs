use chrono::{DateTime, NaiveDate, Utc};
use doable_storage::{Todo, TodoId};
use serde_derive::Serialize;

/// Identity of a displayed todo. Instances of a recurring todo are
/// keyed by their canonical record plus the occurrence date instead of
/// a suffixed id, so identity never has to be parsed back out of a
/// string.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct InstanceKey {
    pub canonical_id: TodoId,
    pub occurrence: Option<NaiveDate>,
}

impl InstanceKey {
    pub fn canonical(id: impl Into<TodoId>) -> Self {
        InstanceKey {
            canonical_id: id.into(),
            occurrence: None,
        }
    }

    pub fn occurrence(id: impl Into<TodoId>, date: NaiveDate) -> Self {
        InstanceKey {
            canonical_id: id.into(),
            occurrence: Some(date),
        }
    }

    pub fn is_instance(&self) -> bool {
        self.occurrence.is_some()
    }
}

/// A todo as it appears in a list or calendar lane. Instances are
/// display values only, the canonical record stays the single
/// persisted document behind all of them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisplayTodo {
    pub key: InstanceKey,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub todo: Todo,
}

impl DisplayTodo {
    pub fn from_todo(todo: Todo) -> Self {
        DisplayTodo {
            key: InstanceKey::canonical(todo.canonical_id().clone()),
            start: todo.start_time,
            end: todo.end_time,
            todo,
        }
    }

    /// Derive the instance of a recurring todo on a concrete occurrence
    /// date, keeping the original duration when one is set.
    pub fn occurrence_of(todo: Todo, start: DateTime<Utc>) -> Self {
        let end = match (todo.start_time, todo.end_time) {
            (Some(original_start), Some(original_end)) => {
                Some(start + (original_end - original_start))
            }
            _ => None,
        };
        DisplayTodo {
            key: InstanceKey::occurrence(todo.canonical_id().clone(), start.date_naive()),
            start: Some(start),
            end,
            todo,
        }
    }
}
