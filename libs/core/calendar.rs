use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveTime};
use doable_storage::{Todo, TodoId};
use serde_derive::Serialize;

use crate::instance::DisplayTodo;
use crate::overlap::{group_all_day, group_overlapping, TodoStack};
use crate::recurrence::expand_occurrences;
use crate::validate::ValidationError;
use crate::visibility::VisibilityTracker;

/// One rendered day of the calendar: overlap-grouped timed stacks plus
/// the all-day lane.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub stacks: Vec<TodoStack>,
    pub all_day: Vec<TodoStack>,
}

#[derive(Default)]
struct DayBucket {
    seen: HashSet<TodoId>,
    timed: Vec<DisplayTodo>,
    all_day: Vec<DisplayTodo>,
}

impl DayBucket {
    fn insert(&mut self, item: DisplayTodo, tracker: &VisibilityTracker) {
        if tracker.is_hidden(&item.key) {
            return;
        }
        // First seen wins within a day: a stored copy that came earlier
        // in the list suppresses a generated instance of the same todo
        if !self.seen.insert(item.key.canonical_id.clone()) {
            return;
        }
        if item.start.is_some() {
            self.timed.push(item);
        } else {
            self.all_day.push(item);
        }
    }
}

/// Merge canonical todos, shared copies and generated recurring
/// instances into per-day display groups for the inclusive date range
/// `[from, to]`.
pub fn build_day_schedules(
    todos: &[Todo],
    completed_recurring: &HashSet<TodoId>,
    tracker: &VisibilityTracker,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<DaySchedule>, ValidationError> {
    if from > to {
        return Err(ValidationError::WindowOrder);
    }

    let window_start = from.and_time(NaiveTime::MIN).and_utc();
    let window_end = to.and_time(NaiveTime::MIN).and_utc() + Duration::days(1);

    let mut days: BTreeMap<NaiveDate, DayBucket> = from
        .iter_days()
        .take_while(|day| *day <= to)
        .map(|day| (day, DayBucket::default()))
        .collect();

    for todo in todos {
        // Completion state merges across every copy of the same record
        if todo.completed || completed_recurring.contains(todo.canonical_id()) {
            continue;
        }

        if todo.recurrence.is_recurring() {
            for start in expand_occurrences(todo, window_start, window_end)? {
                let date = start.date_naive();
                if let Some(bucket) = days.get_mut(&date) {
                    bucket.insert(DisplayTodo::occurrence_of(todo.clone(), start), tracker);
                }
            }
        } else if let Some(start) = todo.start_time {
            if let Some(bucket) = days.get_mut(&start.date_naive()) {
                bucket.insert(DisplayTodo::from_todo(todo.clone()), tracker);
            }
        } else {
            // All-day todos appear in every day's all-day lane
            for bucket in days.values_mut() {
                bucket.insert(DisplayTodo::from_todo(todo.clone()), tracker);
            }
        }
    }

    Ok(days
        .into_iter()
        .map(|(date, bucket)| DaySchedule {
            date,
            stacks: group_overlapping(&bucket.timed),
            all_day: group_all_day(&bucket.all_day),
        })
        .collect())
}
