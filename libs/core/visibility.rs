use std::collections::HashSet;

use dashmap::DashMap;
use doable_storage::TodoId;
use thiserror::Error;

use crate::instance::{DisplayTodo, InstanceKey};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VisibilityState {
    #[default]
    Visible,
    /// Optimistically checked, the store has not confirmed yet
    Completing,
    /// Removal dispatched, waiting for confirmation
    Removing,
    /// The store confirmed, the item left the list
    Hidden,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("cannot move a {from:?} todo to {to:?}")]
pub struct TransitionError {
    pub from: VisibilityState,
    pub to: VisibilityState,
}

/// Display state of every rendered todo, in one container keyed by
/// instance, so an item can never sit in two states at once.
#[derive(Default)]
pub struct VisibilityTracker {
    states: DashMap<InstanceKey, VisibilityState>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &InstanceKey) -> VisibilityState {
        self.states.get(key).map(|entry| *entry).unwrap_or_default()
    }

    pub fn is_hidden(&self, key: &InstanceKey) -> bool {
        self.state(key) == VisibilityState::Hidden
    }

    pub fn begin_completing(&self, key: &InstanceKey) -> Result<(), TransitionError> {
        self.transition(key, VisibilityState::Completing, &[VisibilityState::Visible])
    }

    pub fn begin_removing(&self, key: &InstanceKey) -> Result<(), TransitionError> {
        self.transition(
            key,
            VisibilityState::Removing,
            &[VisibilityState::Visible, VisibilityState::Completing],
        )
    }

    /// Only reachable once the persistence call succeeded
    pub fn confirm_hidden(&self, key: &InstanceKey) -> Result<(), TransitionError> {
        self.transition(key, VisibilityState::Hidden, &[VisibilityState::Removing])
    }

    /// Failed persistence: a pending item falls back to visible
    pub fn rollback(&self, key: &InstanceKey) {
        if let Some(mut entry) = self.states.get_mut(key) {
            if matches!(
                *entry,
                VisibilityState::Completing | VisibilityState::Removing
            ) {
                *entry = VisibilityState::Visible;
            }
        }
    }

    pub fn reset(&self, key: &InstanceKey) {
        self.states.remove(key);
    }

    fn transition(
        &self,
        key: &InstanceKey,
        to: VisibilityState,
        allowed_from: &[VisibilityState],
    ) -> Result<(), TransitionError> {
        let mut entry = self.states.entry(key.clone()).or_default();
        if allowed_from.contains(&*entry) {
            *entry = to;
            Ok(())
        } else {
            Err(TransitionError { from: *entry, to })
        }
    }
}

/// Which display context a list is filtered for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GroupKind {
    /// Date driven groups such as "this week": recurring todos never
    /// show up here, they only populate their own recurring section
    DateRange,
    /// Category driven groups: one item per canonical todo survives
    Category,
}

/// Compute the visible subset of a display list, preserving the input
/// order of survivors.
pub fn visible_todos(
    items: &[DisplayTodo],
    kind: GroupKind,
    completed_recurring: &HashSet<TodoId>,
    tracker: &VisibilityTracker,
) -> Vec<DisplayTodo> {
    let mut seen: HashSet<TodoId> = HashSet::new();
    let mut visible = Vec::new();

    for item in items {
        if item.todo.completed
            || completed_recurring.contains(&item.key.canonical_id)
            || tracker.is_hidden(&item.key)
        {
            continue;
        }
        match kind {
            GroupKind::DateRange => {
                if item.todo.recurrence.is_recurring() || item.key.is_instance() {
                    continue;
                }
            }
            GroupKind::Category => {
                if !seen.insert(item.key.canonical_id.clone()) {
                    continue;
                }
            }
        }
        visible.push(item.clone());
    }

    visible
}
