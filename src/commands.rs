use std::io::{self, Write};

use chrono::NaiveDate;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use uuid::Uuid;

use crate::config::Config;
use crate::error::NudgeError;
use crate::models::{
    Priority, RecurrenceType, RecurringTask, Task, TaskCategory, TaskStatus, TaskType,
};
use crate::scoring::success_percentage;
use crate::seed;
use crate::storage::Store;

/// Connects (creating and migrating the database as needed) and seeds
/// sample data when running in development.
pub fn cmd_init(config: &Config) -> Result<(), NudgeError> {
    let store = Store::connect(config)?;
    if config.is_development() {
        seed::seed(&store)?;
    }
    println!("Database ready at {}", store.path().display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    store: &Store,
    name: String,
    task_type: TaskType,
    task_category: Option<TaskCategory>,
    priority: Option<Priority>,
    expected_duration: Option<u32>,
    expected_units: Option<u32>,
    deadline: Option<NaiveDate>,
    tag: Option<String>,
    notes: Option<String>,
) -> Result<(), NudgeError> {
    let mut task = Task::new(name, task_type);
    if let Some(c) = task_category {
        task.task_category = c;
    }
    if let Some(p) = priority {
        task.priority = p;
    }
    task.expected_duration = expected_duration;
    task.expected_units = expected_units;
    task.deadline = deadline.map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc());
    task.category = tag;
    task.notes = notes;

    let id = store.create_task(&mut task)?;
    println!("Task added (id = {id})");
    Ok(())
}

/// Lists tasks in a table with their computed success percentage.
/// Completed, failed and deferred tasks are hidden unless `all` is set.
pub fn cmd_list(store: &Store, all: bool) -> Result<(), NudgeError> {
    let mut tasks = store.list_tasks()?;
    if !all {
        tasks.retain(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::InProgress));
    }
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Pri").add_attribute(Attribute::Bold),
            Cell::new("Expected").add_attribute(Attribute::Bold),
            Cell::new("Actual").add_attribute(Attribute::Bold),
            Cell::new("Success").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let score = success_percentage(&t);
        let score_str = score.map_or_else(|| "-".into(), |s| format!("{s:.1}%"));
        let score_color = match score {
            Some(s) if s >= 100.0 => Color::Green,
            Some(s) if s >= 70.0 => Color::Yellow,
            Some(_) => Color::Red,
            None => Color::Grey,
        };
        let status_color = match t.status {
            TaskStatus::Completed => Color::Green,
            TaskStatus::InProgress => Color::Cyan,
            TaskStatus::Failed => Color::Red,
            TaskStatus::Pending | TaskStatus::Deferred => Color::Yellow,
        };

        let short_id: String = t.id.to_string().chars().take(8).collect();
        table.add_row(vec![
            Cell::new(short_id),
            Cell::new(&t.name),
            Cell::new(t.task_type.as_sql()),
            Cell::new(t.task_category.as_sql()),
            Cell::new(t.status.as_sql()).fg(status_color),
            Cell::new(t.priority.as_i64()),
            Cell::new(format_target(&t, t.expected_duration, t.expected_units)),
            Cell::new(format_target(&t, t.actual_duration, t.actual_units)),
            Cell::new(score_str).fg(score_color),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Renders the metric that drives the task's scoring policy: units for
/// unit-based tasks, minutes otherwise.
fn format_target(task: &Task, duration: Option<u32>, units: Option<u32>) -> String {
    match task.task_type {
        TaskType::UnitBased => units.map_or_else(|| "-".into(), |u| format!("{u} units")),
        TaskType::TimeBased | TaskType::Commute => {
            duration.map_or_else(|| "-".into(), |m| format!("{m} min"))
        }
    }
}

/// Marks a task completed, recording the observed actuals, and prints
/// its success percentage.
pub fn cmd_complete(
    store: &Store,
    id_prefix: &str,
    actual_duration: Option<u32>,
    actual_units: Option<u32>,
) -> Result<(), NudgeError> {
    let task = store.find_task_by_id_prefix(id_prefix)?;
    let task = store.complete_task(task.id, actual_duration, actual_units)?;
    match success_percentage(&task) {
        Some(score) => println!("Task '{}' completed - success {score:.2}%", task.name),
        None => println!(
            "Task '{}' completed (no score: actual values missing)",
            task.name
        ),
    }
    Ok(())
}

pub fn cmd_remove(store: &Store, id_prefix: &str) -> Result<(), NudgeError> {
    let task = store.find_task_by_id_prefix(id_prefix)?;
    store.delete_task(task.id)?;
    println!("Task '{}' removed.", task.name);
    Ok(())
}

pub fn cmd_seed(store: &Store) -> Result<(), NudgeError> {
    seed::seed(store)?;
    println!("Seed data inserted.");
    Ok(())
}

/// Deletes all rows after a confirmation prompt (skipped with `force`).
pub fn cmd_reset(store: &Store, force: bool) -> Result<(), NudgeError> {
    if !force {
        print!("Delete all tasks and recurring definitions? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            println!("Aborted.");
            return Ok(());
        }
    }
    store.clear_data()?;
    println!("Database cleared.");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_recurring_add(
    store: &Store,
    name: String,
    recurrence_type: RecurrenceType,
    interval: Option<u32>,
    days: Option<Vec<u8>>,
    day_of_month: Option<u8>,
    pattern: Option<String>,
) -> Result<(), NudgeError> {
    let mut rt = RecurringTask::new(name, recurrence_type);
    rt.recurrence_interval = interval;
    rt.recurrence_days = days;
    rt.recurrence_day_of_month = day_of_month;
    rt.recurrence_pattern = pattern;

    let id = store.create_recurring_task(&mut rt)?;
    println!("Recurring definition added (id = {id})");
    Ok(())
}

pub fn cmd_recurring_list(store: &Store) -> Result<(), NudgeError> {
    let rts = store.list_recurring_tasks()?;
    if rts.is_empty() {
        println!("No recurring definitions found.");
        return Ok(());
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Type", "Rule", "Active"]);
    for rt in rts {
        table.add_row(vec![
            rt.id.to_string(),
            rt.name.clone(),
            rt.recurrence_type.as_sql().to_string(),
            format_rule(&rt),
            if rt.is_active { "yes".into() } else { "no".into() },
        ]);
    }
    println!("{table}");
    Ok(())
}

fn format_rule(rt: &RecurringTask) -> String {
    match rt.recurrence_type {
        RecurrenceType::Daily => {
            format!("every {} day(s)", rt.recurrence_interval.unwrap_or(1))
        }
        RecurrenceType::Weekly => match &rt.recurrence_days {
            Some(days) => format!("days of week {days:?}"),
            None => "-".into(),
        },
        RecurrenceType::MonthlyDate => rt
            .recurrence_day_of_month
            .map_or_else(|| "-".into(), |d| format!("day {d} of month")),
        RecurrenceType::MonthlyPattern => {
            rt.recurrence_pattern.clone().unwrap_or_else(|| "-".into())
        }
    }
}

/// Removes a recurring definition and, via the cascade, every task that
/// references it.
pub fn cmd_recurring_remove(store: &Store, id: &str) -> Result<(), NudgeError> {
    let id = Uuid::parse_str(id).map_err(|_| NudgeError::InvalidId(id.to_string()))?;
    store.delete_recurring_task(id)?;
    println!("Recurring definition {id} removed (tasks referencing it were deleted).");
    Ok(())
}
