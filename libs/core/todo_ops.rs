use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use doable_storage::{
    AccountId, RecurrenceCompletion, Storage, Todo, TodoChange, TodoId, TodoUpdate, WriteBatch,
};
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::calendar::{build_day_schedules, DaySchedule};
use crate::errors::{CoreError, Result};
use crate::instance::DisplayTodo;
use crate::validate::{self, TodoDraft, ValidationError};
use crate::visibility::{visible_todos, GroupKind};
use crate::Core;

impl Core {
    pub async fn create_todo(&self, draft: TodoDraft) -> Result<Todo> {
        let profile = self.require_profile()?;
        validate::validate_draft(&draft)?;

        let now = Utc::now();
        let todo = Todo {
            id: Ulid::new().to_string(),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            links: draft.links,
            start_time: draft.start_time,
            end_time: draft.end_time,
            completed: false,
            priority: draft.priority,
            color: draft.color,
            recurrence: draft.recurrence,
            owner_id: profile.account_id,
            shared_with: Vec::new(),
            original: None,
            created_at: now,
            updated_at: now,
        };
        self.storage.create_todo(todo.clone()).await?;

        tracing::info!(todo_id = %todo.id, "created todo");
        Ok(todo)
    }

    /// Edit a todo in place, allowed for its owner and for editor or
    /// admin collaborators.
    pub async fn edit_todo(
        &self,
        owner_id: AccountId,
        todo_id: TodoId,
        update: TodoUpdate,
    ) -> Result<()> {
        let profile = self.require_profile()?;
        let current = self
            .storage
            .get_todo(owner_id.clone(), todo_id.clone())
            .await?;
        ensure_can_edit(&current, &profile.account_id)?;
        validate::validate_update(&update, &current)?;

        self.storage.update_todo(owner_id, todo_id, update).await?;
        Ok(())
    }

    /// Optimistic completion: the item checks immediately, leaves the
    /// list once the store confirms, and is restored when the write is
    /// refused.
    pub async fn complete_todo(&self, item: &DisplayTodo) -> Result<()> {
        let profile = self.require_profile()?;
        ensure_can_edit(&item.todo, &profile.account_id)?;
        self.visibility.begin_completing(&item.key)?;

        let update = TodoUpdate::default().set_completed(true);
        match self
            .storage
            .update_todo(item.todo.owner_id.clone(), item.todo.id.clone(), update)
            .await
        {
            Ok(()) => {
                self.visibility.begin_removing(&item.key)?;
                self.visibility.confirm_hidden(&item.key)?;
                tracing::info!(todo_id = %item.todo.id, "completed todo");
                Ok(())
            }
            Err(e) => {
                self.visibility.rollback(&item.key);
                tracing::warn!(todo_id = %item.todo.id, "completion refused, item restored");
                Err(e.into())
            }
        }
    }

    /// Completing a recurring todo writes the completion marker for its
    /// canonical id, which suppresses every displayed instance at once.
    pub async fn complete_recurring_todo(&self, item: &DisplayTodo) -> Result<()> {
        let profile = self.require_profile()?;
        self.visibility.begin_completing(&item.key)?;

        let marker = RecurrenceCompletion {
            owner_id: profile.account_id.clone(),
            canonical_id: item.key.canonical_id.clone(),
            completed_at: Utc::now(),
        };
        match self
            .storage
            .commit_batch(WriteBatch::new().put_recurrence_completion(marker))
            .await
        {
            Ok(()) => {
                self.visibility.begin_removing(&item.key)?;
                self.visibility.confirm_hidden(&item.key)?;
                tracing::info!(todo_id = %item.key.canonical_id, "completed recurring todo");
                Ok(())
            }
            Err(e) => {
                self.visibility.rollback(&item.key);
                tracing::warn!(todo_id = %item.key.canonical_id, "completion refused, item restored");
                Err(e.into())
            }
        }
    }

    /// Drag-to-delete flow. The record and its recurrence completion
    /// marker go away in one atomic batch.
    pub async fn delete_todo(&self, item: &DisplayTodo) -> Result<()> {
        let profile = self.require_profile()?;
        ensure_can_edit(&item.todo, &profile.account_id)?;
        self.visibility.begin_removing(&item.key)?;

        let owner_id = item.todo.owner_id.clone();
        let batch = WriteBatch::new()
            .delete_todo(owner_id.clone(), item.todo.id.clone())
            .delete_recurrence_completion(owner_id, item.todo.canonical_id().clone());
        match self.storage.commit_batch(batch).await {
            Ok(()) => {
                self.visibility.confirm_hidden(&item.key)?;
                tracing::info!(todo_id = %item.todo.id, "deleted todo");
                Ok(())
            }
            Err(e) => {
                self.visibility.rollback(&item.key);
                tracing::warn!(todo_id = %item.todo.id, "deletion refused, item restored");
                Err(e.into())
            }
        }
    }

    /// Date driven group such as "this week": recurring todos are kept
    /// out, they populate their own section.
    pub async fn date_range_todos(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<DisplayTodo>> {
        let profile = self.require_profile()?;
        if start > end {
            return Err(ValidationError::WindowOrder.into());
        }

        let todos = self
            .storage
            .list_todos_range(profile.account_id.clone(), start, end)
            .await?;
        let completed = self.completed_recurring_ids(&profile.account_id).await?;
        let items: Vec<DisplayTodo> = todos.into_iter().map(DisplayTodo::from_todo).collect();

        Ok(visible_todos(
            &items,
            GroupKind::DateRange,
            &completed,
            &self.visibility,
        ))
    }

    /// Category group with one surviving item per canonical todo.
    pub async fn category_todos(&self, category: &str) -> Result<Vec<DisplayTodo>> {
        let profile = self.require_profile()?;

        let todos = self.storage.list_todos(profile.account_id.clone()).await?;
        let completed = self.completed_recurring_ids(&profile.account_id).await?;
        let items: Vec<DisplayTodo> = todos
            .into_iter()
            .filter(|todo| todo.category == category)
            .map(DisplayTodo::from_todo)
            .collect();

        Ok(visible_todos(
            &items,
            GroupKind::Category,
            &completed,
            &self.visibility,
        ))
    }

    /// Calendar view over an inclusive day range.
    pub async fn day_schedules(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DaySchedule>> {
        let profile = self.require_profile()?;

        let todos = self.storage.list_todos(profile.account_id.clone()).await?;
        let completed = self.completed_recurring_ids(&profile.account_id).await?;

        Ok(build_day_schedules(
            &todos,
            &completed,
            &self.visibility,
            from,
            to,
        )?)
    }

    /// Change feed of the signed-in account's todo collection.
    pub async fn watch_todos(&self) -> Result<broadcast::Receiver<TodoChange>> {
        let profile = self.require_profile()?;
        Ok(self.storage.watch_todos(profile.account_id).await?)
    }

    pub(crate) async fn completed_recurring_ids(
        &self,
        owner_id: &str,
    ) -> Result<HashSet<TodoId>> {
        let markers = self
            .storage
            .list_recurrence_completions(owner_id.to_owned())
            .await?;
        Ok(markers.into_iter().map(|m| m.canonical_id).collect())
    }
}

fn ensure_can_edit(todo: &Todo, account_id: &str) -> Result<()> {
    if todo.owner_id == account_id {
        return Ok(());
    }
    let allowed = todo
        .collaborator_role(account_id)
        .map(|role| role.can_edit())
        .unwrap_or(false);
    if allowed {
        return Ok(());
    }
    Err(CoreError::PermissionDenied {
        account_id: account_id.to_owned(),
        todo_id: todo.id.clone(),
    })
}
