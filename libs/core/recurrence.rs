use chrono::{DateTime, Duration, Months, Utc};
use doable_storage::{RecurrenceKind, Todo};

use crate::validate::ValidationError;

/// Upper bound on generated occurrences, whatever the window asks for.
/// Keeps degenerate recurrence values from looping forever.
pub const MAX_OCCURRENCES: usize = 100;

/// Expand a recurring todo into the concrete occurrence dates of its
/// start-time pattern inside `[view_start, view_end]`, bounded further
/// by the recurrence end date when one is set.
///
/// Todos without a start time or without an actual recurrence expand to
/// nothing; malformed recurrence values yield an empty or truncated
/// sequence rather than an error. A reversed window is the one caller
/// mistake reported as an error.
pub fn expand_occurrences(
    todo: &Todo,
    view_start: DateTime<Utc>,
    view_end: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, ValidationError> {
    if view_start > view_end {
        return Err(ValidationError::WindowOrder);
    }
    let Some(first) = todo.start_time else {
        return Ok(Vec::new());
    };
    if !todo.recurrence.is_recurring() {
        return Ok(Vec::new());
    }

    let bound = match todo.recurrence.end_date {
        Some(end_date) => end_date.min(view_end),
        None => view_end,
    };

    let mut occurrences = Vec::new();
    let mut current = first;
    while current <= bound && occurrences.len() < MAX_OCCURRENCES {
        if current >= view_start {
            occurrences.push(current);
        }
        match step(current, todo.recurrence.kind, todo.recurrence.interval) {
            // Landing back on the first occurrence means the interval
            // does not advance, stop instead of spinning
            Some(next) if next != first => current = next,
            _ => break,
        }
    }

    Ok(occurrences)
}

fn step(from: DateTime<Utc>, kind: RecurrenceKind, interval: u32) -> Option<DateTime<Utc>> {
    match kind {
        RecurrenceKind::None => None,
        RecurrenceKind::Daily => from.checked_add_signed(Duration::days(interval as i64)),
        RecurrenceKind::Weekly => from.checked_add_signed(Duration::weeks(interval as i64)),
        RecurrenceKind::Monthly => from.checked_add_months(Months::new(interval)),
        RecurrenceKind::Yearly => from.checked_add_months(Months::new(interval.checked_mul(12)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use doable_storage::{Priority, Recurrence};

    fn recurring(kind: RecurrenceKind, interval: u32) -> Todo {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        Todo {
            id: "a1".to_owned(),
            title: "standup".to_owned(),
            description: String::new(),
            category: "work".to_owned(),
            links: Vec::new(),
            start_time: Some(start),
            end_time: None,
            completed: false,
            priority: Priority::Medium,
            color: "6366f1".to_owned(),
            recurrence: Recurrence {
                kind,
                interval,
                end_date: None,
            },
            owner_id: "acc-1".to_owned(),
            shared_with: Vec::new(),
            original: None,
            created_at: start,
            updated_at: start,
        }
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 22, 23, 59, 59).unwrap(),
        )
    }

    #[test]
    fn weekly_todo_expands_to_four_january_dates() {
        let todo = recurring(RecurrenceKind::Weekly, 1);
        let (start, end) = window();

        let occurrences = expand_occurrences(&todo, start, end).unwrap();

        assert_eq!(
            occurrences,
            vec![
                Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 22, 9, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn expansion_is_ascending_with_a_fixed_step() {
        let todo = recurring(RecurrenceKind::Daily, 3);
        let (start, end) = window();

        let occurrences = expand_occurrences(&todo, start, end).unwrap();

        assert!(!occurrences.is_empty());
        for pair in occurrences.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(3));
        }
    }

    #[test]
    fn expansion_is_idempotent() {
        let todo = recurring(RecurrenceKind::Weekly, 2);
        let (start, end) = window();

        let first = expand_occurrences(&todo, start, end).unwrap();
        let second = expand_occurrences(&todo, start, end).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn output_is_capped_at_one_hundred_occurrences() {
        let todo = recurring(RecurrenceKind::Daily, 1);
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let occurrences = expand_occurrences(&todo, start, end).unwrap();

        assert_eq!(occurrences.len(), MAX_OCCURRENCES);
    }

    #[test]
    fn recurrence_end_date_bounds_the_window() {
        let mut todo = recurring(RecurrenceKind::Weekly, 1);
        todo.recurrence.end_date = Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap());
        let (start, end) = window();

        let occurrences = expand_occurrences(&todo, start, end).unwrap();

        assert_eq!(
            occurrences,
            vec![
                Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn occurrences_before_the_window_are_skipped_over() {
        let mut todo = recurring(RecurrenceKind::Weekly, 1);
        todo.start_time = Some(Utc.with_ymd_and_hms(2023, 12, 25, 9, 0, 0).unwrap());
        let (start, end) = window();

        let occurrences = expand_occurrences(&todo, start, end).unwrap();

        assert_eq!(occurrences[0], Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());
        assert_eq!(occurrences.len(), 4);
    }

    #[test]
    fn reversed_window_is_an_input_error() {
        let todo = recurring(RecurrenceKind::Daily, 1);
        let (start, end) = window();

        assert_eq!(
            expand_occurrences(&todo, end, start),
            Err(ValidationError::WindowOrder)
        );
    }

    #[test]
    fn zero_interval_truncates_to_the_first_occurrence() {
        let todo = recurring(RecurrenceKind::Daily, 0);
        let (start, end) = window();

        let occurrences = expand_occurrences(&todo, start, end).unwrap();

        assert_eq!(
            occurrences,
            vec![Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()]
        );
    }

    #[test]
    fn non_recurring_and_undated_todos_expand_to_nothing() {
        let (start, end) = window();

        let todo = recurring(RecurrenceKind::None, 1);
        assert_eq!(
            expand_occurrences(&todo, start, end).unwrap(),
            Vec::<DateTime<Utc>>::new()
        );

        let mut undated = recurring(RecurrenceKind::Daily, 1);
        undated.start_time = None;
        assert_eq!(
            expand_occurrences(&undated, start, end).unwrap(),
            Vec::<DateTime<Utc>>::new()
        );
    }

    #[test]
    fn monthly_steps_clamp_at_month_end() {
        let mut todo = recurring(RecurrenceKind::Monthly, 1);
        todo.start_time = Some(Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap());
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        let occurrences = expand_occurrences(&todo, start, end).unwrap();

        assert_eq!(
            occurrences,
            vec![
                Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 29, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 29, 9, 0, 0).unwrap(),
            ]
        );
    }
}
