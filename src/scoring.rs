use crate::models::{Task, TaskStatus, TaskType};

/// Unit-based work cannot be "more done" than its target.
pub const UNIT_BASED_CAP: f64 = 100.0;
/// Time-based work rewards finishing early, up to 1.5x.
pub const TIME_BASED_CAP: f64 = 150.0;

/// Computes the success percentage for a task snapshot.
///
/// Returns `None` — not an error — when the task is not completed, when a
/// required expected/actual field for its scoring policy is absent, or
/// when the applicable denominator is zero (validation rejects zero
/// values at write time, but the scorer also accepts snapshots that were
/// never persisted).
///
/// Policies by type:
/// - **Unit-based**: `(actual_units / expected_units) x 100`, capped at
///   100. Partial delivery scores below 100; overdelivery earns no credit
///   past the target.
/// - **Time-based, non-commute**: `(expected_duration / actual_duration)
///   x 100`, capped at 150. Finishing faster than expected scores above
///   100.
/// - **Commute-flavored** (type `Commute`, or `TimeBased` with
///   `is_commute`): on-time or early is exactly 100; lateness scores
///   `(expected / actual) x 100`, which is always below 100 and
///   approaches 0 as lateness grows.
pub fn success_percentage(task: &Task) -> Option<f64> {
    if task.status != TaskStatus::Completed {
        return None;
    }

    match task.task_type {
        TaskType::UnitBased => {
            let expected = task.expected_units?;
            let actual = task.actual_units?;
            if expected == 0 {
                return None;
            }
            Some((f64::from(actual) / f64::from(expected) * 100.0).min(UNIT_BASED_CAP))
        }
        TaskType::TimeBased if !task.is_commute => {
            let expected = task.expected_duration?;
            let actual = task.actual_duration?;
            if actual == 0 {
                return None;
            }
            Some((f64::from(expected) / f64::from(actual) * 100.0).min(TIME_BASED_CAP))
        }
        TaskType::TimeBased | TaskType::Commute => punctuality_score(task),
    }
}

/// On-time or early is full credit with no bonus; lateness is penalized
/// proportionally. The division only runs when `actual > expected`, so
/// the ratio is always below 100 and the denominator is never zero.
fn punctuality_score(task: &Task) -> Option<f64> {
    let expected = task.expected_duration?;
    let actual = task.actual_duration?;
    if actual <= expected {
        return Some(100.0);
    }
    Some(f64::from(expected) / f64::from(actual) * 100.0)
}
