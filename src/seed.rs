use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::error::NudgeError;
use crate::models::{
    Priority, RecurrenceType, RecurringTask, Task, TaskCategory, TaskStatus, TaskType,
};
use crate::scoring::success_percentage;
use crate::storage::Store;

/// Populates an empty database with sample data: one recurring definition
/// per recurrence type, and tasks covering all three scoring policies in
/// both pending and completed states. Skips databases that already hold
/// rows, so running it twice is harmless.
///
/// Intended for development only; the caller gates on the environment.
pub fn seed(store: &Store) -> Result<(), NudgeError> {
    if store.task_count()? > 0 || store.recurring_task_count()? > 0 {
        info!("skipping seed - database already has data");
        return Ok(());
    }

    info!("seeding database with sample data");

    for mut rt in sample_recurring_tasks() {
        store.create_recurring_task(&mut rt)?;
    }

    for mut task in sample_tasks() {
        store.create_task(&mut task)?;

        if task.status == TaskStatus::Completed {
            match success_percentage(&task) {
                Some(score) => info!(name = %task.name, "task success: {score:.2}%"),
                None => warn!(name = %task.name, "completed task has no computable score"),
            }
        }
    }

    info!("database seeding completed");
    Ok(())
}

fn sample_recurring_tasks() -> Vec<RecurringTask> {
    let daily = RecurringTask {
        recurrence_interval: Some(1),
        ..RecurringTask::new("Daily Standup", RecurrenceType::Daily)
    };
    let weekly = RecurringTask {
        // Monday and Wednesday
        recurrence_days: Some(vec![1, 3]),
        ..RecurringTask::new("Team Meeting", RecurrenceType::Weekly)
    };
    let monthly_date = RecurringTask {
        recurrence_day_of_month: Some(1),
        ..RecurringTask::new("Pay Rent", RecurrenceType::MonthlyDate)
    };
    let monthly_pattern = RecurringTask {
        recurrence_pattern: Some("first_monday".into()),
        ..RecurringTask::new("Board Meeting", RecurrenceType::MonthlyPattern)
    };
    vec![daily, weekly, monthly_date, monthly_pattern]
}

fn sample_tasks() -> Vec<Task> {
    let now = Utc::now();
    vec![
        Task {
            expected_units: Some(3),
            expected_duration: Some(150),
            ..Task::new("Read 3 chapters for exam", TaskType::UnitBased)
        },
        Task {
            priority: Priority::High,
            expected_duration: Some(120),
            ..Task::new("Deep work session", TaskType::TimeBased)
        },
        Task {
            status: TaskStatus::Completed,
            expected_duration: Some(30),
            actual_duration: Some(35),
            completed_at: Some(now - Duration::hours(1)),
            ..Task::new("Morning commute to office", TaskType::Commute)
        },
        Task {
            task_category: TaskCategory::Anchor,
            priority: Priority::Critical,
            status: TaskStatus::Completed,
            expected_duration: Some(480),
            actual_duration: Some(450),
            completed_at: Some(now - Duration::hours(8)),
            ..Task::new("Sleep", TaskType::TimeBased)
        },
        Task {
            task_category: TaskCategory::Anchor,
            priority: Priority::Critical,
            status: TaskStatus::Completed,
            expected_duration: Some(60),
            actual_duration: Some(60),
            completed_at: Some(now - Duration::hours(2)),
            ..Task::new("Family dinner", TaskType::TimeBased)
        },
        Task {
            priority: Priority::High,
            status: TaskStatus::Completed,
            expected_units: Some(3),
            actual_units: Some(3),
            expected_duration: Some(60),
            actual_duration: Some(75),
            completed_at: Some(now - Duration::hours(3)),
            category: Some("Work".into()),
            ..Task::new("Review 3 PRs", TaskType::UnitBased)
        },
    ]
}
