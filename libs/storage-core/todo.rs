use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

pub type TodoId = String;
pub type AccountId = String;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Recurrence {
    pub kind: RecurrenceKind,
    /// Multiplier of the repetition unit, 1 means every unit
    pub interval: u32,
    /// Occurrences are never generated past this date. Setting it at or
    /// before today acts as "stop recurring from here".
    pub end_date: Option<DateTime<Utc>>,
}

impl Default for Recurrence {
    fn default() -> Self {
        Recurrence {
            kind: RecurrenceKind::None,
            interval: 1,
            end_date: None,
        }
    }
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        self.kind != RecurrenceKind::None
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareRole {
    Viewer,
    Editor,
    Admin,
}

impl ShareRole {
    pub fn can_edit(&self) -> bool {
        matches!(self, ShareRole::Editor | ShareRole::Admin)
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Collaborator {
    pub account_id: AccountId,
    pub role: ShareRole,
}

/// Denormalized back-reference carried by a todo that was copied into
/// another account through an accepted invitation. The copy shares no
/// mutable state with the original.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct OriginalRef {
    pub todo_id: TodoId,
    pub owner_id: AccountId,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub links: Vec<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub completed: bool,
    pub priority: Priority,
    /// 6 hex digit color code
    pub color: String,
    pub recurrence: Recurrence,
    /// Immutable after creation
    pub owner_id: AccountId,
    pub shared_with: Vec<Collaborator>,
    pub original: Option<OriginalRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Identifier of the record every displayed instance of this todo
    /// derives from: the original's id for an accepted copy, its own
    /// id otherwise.
    pub fn canonical_id(&self) -> &TodoId {
        match &self.original {
            Some(origin) => &origin.todo_id,
            None => &self.id,
        }
    }

    pub fn collaborator_role(&self, account_id: &str) -> Option<ShareRole> {
        self.shared_with
            .iter()
            .find(|c| c.account_id == account_id)
            .map(|c| c.role)
    }
}

/// Marker suppressing every displayed instance of a recurring todo,
/// keyed by canonical id within an owner's collection.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RecurrenceCompletion {
    pub owner_id: AccountId,
    pub canonical_id: TodoId,
    pub completed_at: DateTime<Utc>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoUpdate {
    pub id: Option<TodoId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub links: Option<Vec<String>>,
    pub start_time: Option<Option<DateTime<Utc>>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub color: Option<String>,
    pub recurrence: Option<Recurrence>,
    pub shared_with: Option<Vec<Collaborator>>,
}

impl TodoUpdate {
    pub fn set_id(mut self, v: TodoId) -> Self {
        self.id = Some(v);
        self
    }

    pub fn set_title(mut self, v: String) -> Self {
        self.title = Some(v);
        self
    }

    pub fn set_description(mut self, v: String) -> Self {
        self.description = Some(v);
        self
    }

    pub fn set_category(mut self, v: String) -> Self {
        self.category = Some(v);
        self
    }

    pub fn set_links(mut self, v: Vec<String>) -> Self {
        self.links = Some(v);
        self
    }

    pub fn set_start_time(mut self, v: Option<DateTime<Utc>>) -> Self {
        self.start_time = Some(v);
        self
    }

    pub fn set_end_time(mut self, v: Option<DateTime<Utc>>) -> Self {
        self.end_time = Some(v);
        self
    }

    pub fn set_completed(mut self, v: bool) -> Self {
        self.completed = Some(v);
        self
    }

    pub fn set_priority(mut self, v: Priority) -> Self {
        self.priority = Some(v);
        self
    }

    pub fn set_color(mut self, v: String) -> Self {
        self.color = Some(v);
        self
    }

    pub fn set_recurrence(mut self, v: Recurrence) -> Self {
        self.recurrence = Some(v);
        self
    }

    pub fn set_shared_with(mut self, v: Vec<Collaborator>) -> Self {
        self.shared_with = Some(v);
        self
    }

    pub fn from_todo_diff(left: &Todo, right: &Todo) -> eyre::Result<TodoUpdate> {
        if left.id != right.id {
            return Err(eyre::eyre!("diff between todos with different id"));
        }

        let mut res = TodoUpdate::default().set_id(left.id.clone());

        if left.title != right.title {
            res = res.set_title(right.title.clone());
        }

        if left.description != right.description {
            res = res.set_description(right.description.clone());
        }

        if left.category != right.category {
            res = res.set_category(right.category.clone());
        }

        if left.links != right.links {
            res = res.set_links(right.links.to_vec());
        }

        if left.start_time != right.start_time {
            res = res.set_start_time(right.start_time);
        }

        if left.end_time != right.end_time {
            res = res.set_end_time(right.end_time);
        }

        if left.completed != right.completed {
            res = res.set_completed(right.completed);
        }

        if left.priority != right.priority {
            res = res.set_priority(right.priority);
        }

        if left.color != right.color {
            res = res.set_color(right.color.clone());
        }

        if left.recurrence != right.recurrence {
            res = res.set_recurrence(right.recurrence.clone());
        }

        if left.shared_with != right.shared_with {
            res = res.set_shared_with(right.shared_with.to_vec());
        }

        Ok(res)
    }

    /// Owner, back-reference and creation date are not patchable, the
    /// merged todo always keeps them. `now` becomes the update date.
    pub fn merge_with_todo(self, todo: &Todo, now: DateTime<Utc>) -> Todo {
        Todo {
            id: self.id.unwrap_or(todo.id.clone()),
            title: self.title.unwrap_or(todo.title.clone()),
            description: self.description.unwrap_or(todo.description.clone()),
            category: self.category.unwrap_or(todo.category.clone()),
            links: self.links.unwrap_or(todo.links.clone()),
            start_time: self.start_time.unwrap_or(todo.start_time),
            end_time: self.end_time.unwrap_or(todo.end_time),
            completed: self.completed.unwrap_or(todo.completed),
            priority: self.priority.unwrap_or(todo.priority),
            color: self.color.unwrap_or(todo.color.clone()),
            recurrence: self.recurrence.unwrap_or(todo.recurrence.clone()),
            owner_id: todo.owner_id.clone(),
            shared_with: self.shared_with.unwrap_or(todo.shared_with.clone()),
            original: todo.original.clone(),
            created_at: todo.created_at,
            updated_at: now,
        }
    }

    // This is an helper method
    pub fn get_id(&self) -> eyre::Result<TodoId> {
        match &self.id {
            Some(id) => Ok(id.clone()),
            None => Err(eyre::eyre!("todo id is a required field")),
        }
    }
}
