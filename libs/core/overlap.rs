use chrono::{DateTime, Duration, Utc};
use serde_derive::Serialize;

use crate::instance::DisplayTodo;

/// Group of mutually overlapping items rendered as one visual stack.
/// A singleton stack degrades to plain, unstacked display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TodoStack {
    pub items: Vec<DisplayTodo>,
}

impl TodoStack {
    pub fn is_stacked(&self) -> bool {
        self.items.len() > 1
    }
}

fn effective_interval(item: &DisplayTodo) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = item.start?;
    // An item without an end occupies a synthetic one hour slot
    let end = item.end.unwrap_or(start + Duration::hours(1));
    Some((start, end))
}

/// Half-open `[start, end)` intersection, touching items do not overlap
fn overlaps(a: &DisplayTodo, b: &DisplayTodo) -> bool {
    match (effective_interval(a), effective_interval(b)) {
        (Some((a_start, a_end)), Some((b_start, b_end))) => a_start < b_end && b_start < a_end,
        _ => false,
    }
}

/// Partition timed items into connected components of the overlap
/// relation. A candidate joins a group when it overlaps any current
/// member, repeated until nothing more is absorbed, so the partition is
/// the transitive closure and does not depend on input order. Groups
/// come out in first-seen order and members keep their input order.
pub fn group_overlapping(items: &[DisplayTodo]) -> Vec<TodoStack> {
    let mut processed = vec![false; items.len()];
    let mut groups = Vec::new();

    for seed in 0..items.len() {
        if processed[seed] || items[seed].start.is_none() {
            continue;
        }
        processed[seed] = true;
        let mut group = vec![items[seed].clone()];

        loop {
            let mut absorbed = false;
            for (idx, candidate) in items.iter().enumerate() {
                if processed[idx] || candidate.start.is_none() {
                    continue;
                }
                if group.iter().any(|member| overlaps(member, candidate)) {
                    processed[idx] = true;
                    group.push(candidate.clone());
                    absorbed = true;
                }
            }
            if !absorbed {
                break;
            }
        }

        groups.push(TodoStack { items: group });
    }

    groups
}

/// All-day items (no start time) always share one stack when there is
/// more than one of them.
pub fn group_all_day(items: &[DisplayTodo]) -> Vec<TodoStack> {
    let all_day: Vec<DisplayTodo> = items
        .iter()
        .filter(|item| item.start.is_none())
        .cloned()
        .collect();

    if all_day.is_empty() {
        Vec::new()
    } else {
        vec![TodoStack { items: all_day }]
    }
}
