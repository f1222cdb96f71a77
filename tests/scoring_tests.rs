use nudge::models::{Task, TaskStatus, TaskType};
use nudge::scoring::success_percentage;

fn completed(task_type: TaskType) -> Task {
    let mut t = Task::new("Test", task_type);
    t.status = TaskStatus::Completed;
    t
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("expected a score");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_non_completed_tasks_never_score() {
    for status in [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Failed,
        TaskStatus::Deferred,
    ] {
        let mut t = Task::new("Test", TaskType::UnitBased);
        t.status = status;
        t.expected_units = Some(3);
        t.actual_units = Some(3);
        assert!(success_percentage(&t).is_none(), "{status:?} scored");
    }
}

#[test]
fn test_unit_based_exact_target() {
    let mut t = completed(TaskType::UnitBased);
    t.expected_units = Some(3);
    t.actual_units = Some(3);
    assert_close(success_percentage(&t), 100.0);
}

#[test]
fn test_unit_based_overachievement_is_clamped() {
    let mut t = completed(TaskType::UnitBased);
    t.expected_units = Some(3);
    t.actual_units = Some(5);
    // 166.7 raw, no credit past the target
    assert_close(success_percentage(&t), 100.0);
}

#[test]
fn test_unit_based_partial_delivery() {
    let mut t = completed(TaskType::UnitBased);
    t.expected_units = Some(3);
    t.actual_units = Some(1);
    assert_close(success_percentage(&t), 100.0 / 3.0);
}

#[test]
fn test_unit_based_zero_delivered() {
    let mut t = completed(TaskType::UnitBased);
    t.expected_units = Some(3);
    t.actual_units = Some(0);
    assert_close(success_percentage(&t), 0.0);
}

#[test]
fn test_time_based_slower_than_expected() {
    let mut t = completed(TaskType::TimeBased);
    t.expected_duration = Some(60);
    t.actual_duration = Some(80);
    assert_close(success_percentage(&t), 75.0);
}

#[test]
fn test_time_based_at_clamp_boundary() {
    let mut t = completed(TaskType::TimeBased);
    t.expected_duration = Some(120);
    t.actual_duration = Some(80);
    // 120/80 x 100 = 150 exactly, no clamping needed
    assert_close(success_percentage(&t), 150.0);

    t.expected_duration = Some(60);
    t.actual_duration = Some(40);
    assert_close(success_percentage(&t), 150.0);
}

#[test]
fn test_time_based_beyond_clamp_is_capped() {
    let mut t = completed(TaskType::TimeBased);
    t.expected_duration = Some(60);
    t.actual_duration = Some(30);
    // 200 raw, capped at 150
    assert_close(success_percentage(&t), 150.0);
}

#[test]
fn test_commute_late_is_penalized_proportionally() {
    let mut t = completed(TaskType::Commute);
    t.expected_duration = Some(30);
    t.actual_duration = Some(35);
    assert_close(success_percentage(&t), 30.0 / 35.0 * 100.0);
}

#[test]
fn test_commute_early_gets_no_bonus() {
    let mut t = completed(TaskType::Commute);
    t.expected_duration = Some(30);
    t.actual_duration = Some(20);
    assert_close(success_percentage(&t), 100.0);
}

#[test]
fn test_commute_exactly_on_time() {
    let mut t = completed(TaskType::Commute);
    t.expected_duration = Some(30);
    t.actual_duration = Some(30);
    assert_close(success_percentage(&t), 100.0);
}

#[test]
fn test_time_based_with_commute_flag_uses_punctuality_policy() {
    let mut t = completed(TaskType::TimeBased);
    t.is_commute = true;
    t.expected_duration = Some(60);
    t.actual_duration = Some(40);
    // early finish: 100 exactly, not the 150 the efficiency policy would give
    assert_close(success_percentage(&t), 100.0);

    t.actual_duration = Some(90);
    assert_close(success_percentage(&t), 60.0 / 90.0 * 100.0);
}

#[test]
fn test_missing_actuals_give_no_score() {
    let mut t = completed(TaskType::UnitBased);
    t.expected_units = Some(3);
    assert!(success_percentage(&t).is_none());

    let mut t = completed(TaskType::TimeBased);
    t.expected_duration = Some(60);
    assert!(success_percentage(&t).is_none());

    let mut t = completed(TaskType::Commute);
    t.expected_duration = Some(30);
    assert!(success_percentage(&t).is_none());
}

#[test]
fn test_missing_expected_gives_no_score() {
    let mut t = completed(TaskType::UnitBased);
    t.actual_units = Some(3);
    assert!(success_percentage(&t).is_none());

    let mut t = completed(TaskType::TimeBased);
    t.actual_duration = Some(60);
    assert!(success_percentage(&t).is_none());
}

#[test]
fn test_zero_denominators_give_no_score() {
    // Validation rejects these at write time; the scorer still has to
    // handle never-persisted snapshots without producing inf/NaN.
    let mut t = completed(TaskType::UnitBased);
    t.expected_units = Some(0);
    t.actual_units = Some(3);
    assert!(success_percentage(&t).is_none());

    let mut t = completed(TaskType::TimeBased);
    t.expected_duration = Some(60);
    t.actual_duration = Some(0);
    assert!(success_percentage(&t).is_none());
}
