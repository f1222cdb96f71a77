use std::collections::HashSet;

use nudge::error::NudgeError;
use nudge::models::{
    new_id, RecurrenceType, RecurringTask, Task, TaskCategory, TaskStatus, TaskType,
    ValidationError,
};
use nudge::scoring::success_percentage;
use nudge::seed::seed;
use nudge::storage::Store;

fn store() -> Store {
    Store::open_in_memory().expect("in-memory store")
}

#[test]
fn test_create_assigns_id_and_persists() {
    let store = store();
    let mut task = Task::new("Deep work", TaskType::TimeBased);
    task.expected_duration = Some(120);

    let id = store.create_task(&mut task).unwrap();
    assert!(!id.is_nil());

    let loaded = store.get_task(id).unwrap().expect("task stored");
    assert_eq!(loaded.name, "Deep work");
    assert_eq!(loaded.task_type, TaskType::TimeBased);
    assert_eq!(loaded.expected_duration, Some(120));
    assert_eq!(loaded.status, TaskStatus::Pending);
    assert!(loaded.completed_at.is_none());
}

#[test]
fn test_supplied_id_is_kept() {
    let store = store();
    let id = new_id();
    let mut task = Task::new("Preassigned", TaskType::UnitBased);
    task.id = id;
    task.expected_units = Some(2);

    assert_eq!(store.create_task(&mut task).unwrap(), id);
}

#[test]
fn test_unit_based_requires_expected_units() {
    let store = store();
    let mut task = Task::new("No target", TaskType::UnitBased);

    let err = store.create_task(&mut task).unwrap_err();
    assert!(matches!(
        err,
        NudgeError::Validation(ValidationError::MissingExpectedUnits)
    ));
}

#[test]
fn test_time_based_requires_expected_duration_only() {
    let store = store();
    let mut task = Task::new("No duration", TaskType::TimeBased);
    let err = store.create_task(&mut task).unwrap_err();
    assert!(matches!(
        err,
        NudgeError::Validation(ValidationError::MissingExpectedDuration)
    ));

    // expected_units absent is fine for a time-based task
    let mut task = Task::new("Duration only", TaskType::TimeBased);
    task.expected_duration = Some(60);
    assert!(store.create_task(&mut task).is_ok());
}

#[test]
fn test_zero_expected_values_are_rejected_at_write_time() {
    let store = store();

    let mut task = Task::new("Zero units", TaskType::UnitBased);
    task.expected_units = Some(0);
    let err = store.create_task(&mut task).unwrap_err();
    assert!(matches!(
        err,
        NudgeError::Validation(ValidationError::ExpectedUnitsOutOfRange(0))
    ));

    let mut task = Task::new("Zero duration", TaskType::Commute);
    task.expected_duration = Some(0);
    let err = store.create_task(&mut task).unwrap_err();
    assert!(matches!(
        err,
        NudgeError::Validation(ValidationError::DurationOutOfRange { .. })
    ));
}

#[test]
fn test_commute_normalization_is_forced_on_write() {
    let store = store();
    let mut task = Task::new("Ride home", TaskType::Commute);
    task.task_category = TaskCategory::Action;
    task.is_commute = false;
    task.expected_duration = Some(30);

    let id = store.create_task(&mut task).unwrap();
    let loaded = store.get_task(id).unwrap().unwrap();
    assert!(loaded.is_commute);
    assert_eq!(loaded.task_category, TaskCategory::Transit);
}

#[test]
fn test_complete_sets_completed_at_exactly_once() {
    let store = store();
    let mut task = Task::new("Session", TaskType::TimeBased);
    task.expected_duration = Some(60);
    let id = store.create_task(&mut task).unwrap();

    let completed = store.complete_task(id, Some(45), None).unwrap();
    let first = completed.completed_at.expect("completed_at set");

    // A later write must not move the completion timestamp.
    let mut reloaded = store.get_task(id).unwrap().unwrap();
    reloaded.notes = Some("went well".into());
    store.update_task(&mut reloaded).unwrap();

    let final_state = store.get_task(id).unwrap().unwrap();
    assert_eq!(final_state.completed_at, Some(first));
    assert_eq!(final_state.notes.as_deref(), Some("went well"));
}

#[test]
fn test_complete_task_scores_by_policy() {
    let store = store();
    let mut task = Task::new("Morning commute", TaskType::Commute);
    task.expected_duration = Some(30);
    let id = store.create_task(&mut task).unwrap();

    let completed = store.complete_task(id, Some(35), None).unwrap();
    let score = success_percentage(&completed).expect("scored");
    assert!((score - 30.0 / 35.0 * 100.0).abs() < 1e-9);
}

#[test]
fn test_completing_with_zero_actual_duration_is_rejected() {
    let store = store();
    let mut task = Task::new("Session", TaskType::TimeBased);
    task.expected_duration = Some(60);
    let id = store.create_task(&mut task).unwrap();

    let err = store.complete_task(id, Some(0), None).unwrap_err();
    assert!(matches!(err, NudgeError::Validation(_)));

    // the rejected write must not have touched the record
    let loaded = store.get_task(id).unwrap().unwrap();
    assert_eq!(loaded.status, TaskStatus::Pending);
    assert!(loaded.actual_duration.is_none());
}

#[test]
fn test_delete_recurring_cascades_to_tasks() {
    let store = store();

    let mut rt = RecurringTask::new("Daily Standup", RecurrenceType::Daily);
    rt.recurrence_interval = Some(1);
    let rt_id = store.create_recurring_task(&mut rt).unwrap();

    for name in ["Standup Mon", "Standup Tue"] {
        let mut task = Task::new(name, TaskType::TimeBased);
        task.expected_duration = Some(15);
        task.recurring_task_id = Some(rt_id);
        store.create_task(&mut task).unwrap();
    }
    let mut standalone = Task::new("One-off", TaskType::TimeBased);
    standalone.expected_duration = Some(30);
    let standalone_id = store.create_task(&mut standalone).unwrap();

    assert_eq!(store.task_count().unwrap(), 3);

    store.delete_recurring_task(rt_id).unwrap();

    assert!(store.get_recurring_task(rt_id).unwrap().is_none());
    let remaining = store.list_tasks().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, standalone_id);
}

#[test]
fn test_identifier_generation_has_no_duplicates() {
    let mut seen = HashSet::new();
    for _ in 0..10_000 {
        assert!(seen.insert(new_id()));
    }
}

#[test]
fn test_find_task_by_id_prefix() {
    let store = store();
    let mut task = Task::new("Findable", TaskType::UnitBased);
    task.expected_units = Some(1);
    let id = store.create_task(&mut task).unwrap();

    let prefix = &id.to_string()[..8];
    let found = store.find_task_by_id_prefix(prefix).unwrap();
    assert_eq!(found.id, id);

    assert!(matches!(
        store.find_task_by_id_prefix("zzzzzzzz"),
        Err(NudgeError::InvalidId(_))
    ));
}

#[test]
fn test_seed_is_idempotent() {
    let store = store();
    seed(&store).unwrap();
    seed(&store).unwrap();

    assert_eq!(store.recurring_task_count().unwrap(), 4);
    assert_eq!(store.task_count().unwrap(), 6);

    // every seeded completed task must produce a score
    for task in store.list_tasks().unwrap() {
        if task.status == TaskStatus::Completed {
            assert!(success_percentage(&task).is_some(), "{} unscored", task.name);
        }
    }
}

#[test]
fn test_recurring_round_trip() {
    let store = store();
    let mut rt = RecurringTask::new("Team Meeting", RecurrenceType::Weekly);
    rt.recurrence_days = Some(vec![1, 3]);
    let id = store.create_recurring_task(&mut rt).unwrap();

    let loaded = store.get_recurring_task(id).unwrap().unwrap();
    assert_eq!(loaded.recurrence_type, RecurrenceType::Weekly);
    assert_eq!(loaded.recurrence_days, Some(vec![1, 3]));
    assert!(loaded.is_active);
}

#[test]
fn test_clear_data_keeps_schema() {
    let store = store();
    seed(&store).unwrap();
    store.clear_data().unwrap();

    assert_eq!(store.task_count().unwrap(), 0);
    assert_eq!(store.recurring_task_count().unwrap(), 0);

    // still usable after the wipe
    let mut task = Task::new("Fresh start", TaskType::UnitBased);
    task.expected_units = Some(1);
    assert!(store.create_task(&mut task).is_ok());
}

#[test]
fn test_reopening_a_database_file_preserves_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nudge.db");

    let id = {
        let store = Store::open(&path).unwrap();
        let mut task = Task::new("Persisted", TaskType::TimeBased);
        task.expected_duration = Some(60);
        store.create_task(&mut task).unwrap()
    };

    let store = Store::open(&path).unwrap();
    let loaded = store.get_task(id).unwrap().expect("survives reopen");
    assert_eq!(loaded.name, "Persisted");
}
