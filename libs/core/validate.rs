use chrono::{DateTime, Utc};
use doable_storage::{Priority, Recurrence, Todo, TodoUpdate};
use lazy_regex::regex_is_match;
use serde_derive::Deserialize;
use thiserror::Error;

pub const DEFAULT_COLOR: &str = "6366f1";

/// Caught and surfaced inline, before anything reaches the store.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a todo requires a title")]
    MissingTitle,
    #[error("a todo requires a category")]
    MissingCategory,
    #[error("end time must come strictly after start time")]
    EndBeforeStart,
    #[error("'{0}' is not a 6 hex digit color code")]
    InvalidColor(String),
    #[error("recurrence interval must be at least 1")]
    ZeroInterval,
    #[error("an invitation requires at least one todo")]
    EmptyShare,
    #[error("view window end precedes its start")]
    WindowOrder,
}

/// Form input for a new todo.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub links: Vec<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub priority: Priority,
    pub color: String,
    pub recurrence: Recurrence,
}

impl Default for TodoDraft {
    fn default() -> Self {
        TodoDraft {
            title: String::new(),
            description: String::new(),
            category: "general".to_owned(),
            links: Vec::new(),
            start_time: None,
            end_time: None,
            priority: Priority::default(),
            color: DEFAULT_COLOR.to_owned(),
            recurrence: Recurrence::default(),
        }
    }
}

pub fn validate_draft(draft: &TodoDraft) -> Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if draft.category.trim().is_empty() {
        return Err(ValidationError::MissingCategory);
    }
    validate_times(draft.start_time, draft.end_time)?;
    validate_color(&draft.color)?;
    validate_recurrence(&draft.recurrence)?;
    Ok(())
}

/// Validate a patch against the record it will merge into, so the
/// merged todo can never violate the form rules.
pub fn validate_update(update: &TodoUpdate, current: &Todo) -> Result<(), ValidationError> {
    if let Some(title) = &update.title {
        if title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
    }
    if let Some(category) = &update.category {
        if category.trim().is_empty() {
            return Err(ValidationError::MissingCategory);
        }
    }
    if let Some(color) = &update.color {
        validate_color(color)?;
    }
    if let Some(recurrence) = &update.recurrence {
        validate_recurrence(recurrence)?;
    }

    let start = update.start_time.unwrap_or(current.start_time);
    let end = update.end_time.unwrap_or(current.end_time);
    validate_times(start, end)
}

fn validate_times(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(ValidationError::EndBeforeStart);
        }
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    if regex_is_match!(r"^[0-9a-fA-F]{6}$", color) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor(color.to_owned()))
    }
}

fn validate_recurrence(recurrence: &Recurrence) -> Result<(), ValidationError> {
    if recurrence.is_recurring() && recurrence.interval == 0 {
        return Err(ValidationError::ZeroInterval);
    }
    Ok(())
}
