use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;
use uuid::Uuid;

use crate::config::{Config, ConnectionMode};
use crate::error::NudgeError;
use crate::models::{self, RecurringTask, Task, TaskStatus};

/// Applied at connection time. Foreign keys must be on for the
/// recurring-task delete cascade to fire.
const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
PRAGMA synchronous = NORMAL;
";

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS recurring_tasks (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    recurrence_type TEXT NOT NULL,
    recurrence_interval INTEGER,
    recurrence_days TEXT,
    recurrence_day_of_month INTEGER,
    recurrence_pattern TEXT,
    recurrence_end_date TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    recurring_task_id TEXT REFERENCES recurring_tasks(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    task_type TEXT NOT NULL,
    task_category TEXT NOT NULL DEFAULT 'ACTION',
    is_commute INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'PENDING',
    priority INTEGER NOT NULL DEFAULT 2,
    expected_duration INTEGER,
    expected_units INTEGER,
    actual_duration INTEGER,
    actual_units INTEGER,
    category TEXT,
    notes TEXT,
    deadline TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    completed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at);
CREATE INDEX IF NOT EXISTS idx_tasks_completed_at ON tasks(completed_at);
CREATE INDEX IF NOT EXISTS idx_tasks_recurring_id ON tasks(recurring_task_id);
CREATE INDEX IF NOT EXISTS idx_recurring_tasks_active ON recurring_tasks(is_active);
";

const TASK_COLUMNS: &str = "id, recurring_task_id, name, task_type, task_category, is_commute, \
     status, priority, expected_duration, expected_units, actual_duration, actual_units, \
     category, notes, deadline, created_at, updated_at, completed_at";

const RECURRING_COLUMNS: &str = "id, name, recurrence_type, recurrence_interval, recurrence_days, \
     recurrence_day_of_month, recurrence_pattern, recurrence_end_date, is_active, created_at, \
     updated_at";

/// Persistence collaborator owning a single embedded-database connection.
///
/// Writes follow an explicit two-step contract before touching SQL:
/// normalize, then validate; the identifier is assigned afterwards if the
/// record arrived with a nil one. Single connection, at most one writer
/// at a time.
pub struct Store {
    conn: Connection,
    path: PathBuf,
}

impl Store {
    /// Opens the backend the configuration selects. Only the embedded
    /// local engine ships in this build; a remote selection is reported
    /// as a configuration error rather than silently falling back.
    pub fn connect(config: &Config) -> Result<Self, NudgeError> {
        match config.connection_mode() {
            ConnectionMode::Local(path) => {
                info!(path = %path.display(), "connecting to local database");
                Self::open(&path)
            }
            ConnectionMode::Remote { url, .. } => Err(NudgeError::Config(format!(
                "remote database backend ({url}) is not available in this build; \
                 unset DB_TOKEN to use the local file"
            ))),
        }
    }

    /// Opens (creating if needed) a database file and migrates the schema.
    pub fn open(path: &Path) -> Result<Self, NudgeError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Store {
            conn,
            path: path.to_owned(),
        };
        store.migrate()?;
        Ok(store)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, NudgeError> {
        let store = Store {
            conn: Connection::open_in_memory()?,
            path: PathBuf::from(":memory:"),
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn migrate(&self) -> Result<(), NudgeError> {
        self.conn.execute_batch(PRAGMAS)?;
        self.conn.execute_batch(CREATE_TABLES)?;
        info!("database migrations completed");
        Ok(())
    }

    // Tasks

    /// Normalizes, validates, assigns an id if nil, stamps timestamps,
    /// and inserts. Returns the task's id.
    pub fn create_task(&self, task: &mut Task) -> Result<Uuid, NudgeError> {
        task.normalize();
        task.validate()?;
        if task.id.is_nil() {
            task.id = models::new_id();
        }
        let now = Utc::now();
        task.created_at = now;
        task.updated_at = now;
        if task.status == TaskStatus::Completed && task.completed_at.is_none() {
            task.completed_at = Some(now);
        }

        self.conn.execute(
            "INSERT INTO tasks (id, recurring_task_id, name, task_type, task_category, \
             is_commute, status, priority, expected_duration, expected_units, actual_duration, \
             actual_units, category, notes, deadline, created_at, updated_at, completed_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
             ?17, ?18)",
            params![
                task.id.to_string(),
                task.recurring_task_id.map(|id| id.to_string()),
                task.name,
                task.task_type.as_sql(),
                task.task_category.as_sql(),
                task.is_commute,
                task.status.as_sql(),
                task.priority.as_i64(),
                task.expected_duration,
                task.expected_units,
                task.actual_duration,
                task.actual_units,
                task.category,
                task.notes,
                task.deadline.map(|d| d.to_rfc3339()),
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
                task.completed_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(task.id)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>, NudgeError> {
        let task = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id.to_string()],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    /// Resolves a task from a (possibly partial) id string. Errors when
    /// the prefix matches nothing or more than one task.
    pub fn find_task_by_id_prefix(&self, prefix: &str) -> Result<Task, NudgeError> {
        if prefix.is_empty() {
            return Err(NudgeError::InvalidId("empty identifier".into()));
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id LIKE ?1 || '%' LIMIT 2"
        ))?;
        let mut matches: Vec<Task> = stmt
            .query_map(params![prefix], task_from_row)?
            .collect::<Result<_, _>>()?;
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(NudgeError::InvalidId(format!("no task matches '{prefix}'"))),
            _ => Err(NudgeError::InvalidId(format!(
                "'{prefix}' is ambiguous; give more characters"
            ))),
        }
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, NudgeError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at"
        ))?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<_, _>>()?;
        Ok(tasks)
    }

    /// Overwrites a stored task after re-running normalization and
    /// validation. `created_at` is preserved; `completed_at` is written
    /// exactly once, on the transition into `Completed`, and kept
    /// thereafter.
    pub fn update_task(&self, task: &mut Task) -> Result<(), NudgeError> {
        task.normalize();
        task.validate()?;
        let existing = self
            .get_task(task.id)?
            .ok_or(NudgeError::NotFound(task.id))?;

        task.created_at = existing.created_at;
        task.updated_at = Utc::now();
        task.completed_at = match (existing.completed_at, task.status) {
            (Some(at), _) => Some(at),
            (None, TaskStatus::Completed) => Some(task.updated_at),
            (None, _) => None,
        };

        self.conn.execute(
            "UPDATE tasks SET recurring_task_id = ?2, name = ?3, task_type = ?4, \
             task_category = ?5, is_commute = ?6, status = ?7, priority = ?8, \
             expected_duration = ?9, expected_units = ?10, actual_duration = ?11, \
             actual_units = ?12, category = ?13, notes = ?14, deadline = ?15, \
             updated_at = ?16, completed_at = ?17 WHERE id = ?1",
            params![
                task.id.to_string(),
                task.recurring_task_id.map(|id| id.to_string()),
                task.name,
                task.task_type.as_sql(),
                task.task_category.as_sql(),
                task.is_commute,
                task.status.as_sql(),
                task.priority.as_i64(),
                task.expected_duration,
                task.expected_units,
                task.actual_duration,
                task.actual_units,
                task.category,
                task.notes,
                task.deadline.map(|d| d.to_rfc3339()),
                task.updated_at.to_rfc3339(),
                task.completed_at.map(|d| d.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Marks a task completed with the observed actuals and returns the
    /// stored record.
    pub fn complete_task(
        &self,
        id: Uuid,
        actual_duration: Option<u32>,
        actual_units: Option<u32>,
    ) -> Result<Task, NudgeError> {
        let mut task = self.get_task(id)?.ok_or(NudgeError::NotFound(id))?;
        if actual_duration.is_some() {
            task.actual_duration = actual_duration;
        }
        if actual_units.is_some() {
            task.actual_units = actual_units;
        }
        task.status = TaskStatus::Completed;
        self.update_task(&mut task)?;
        Ok(task)
    }

    pub fn delete_task(&self, id: Uuid) -> Result<(), NudgeError> {
        let n = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id.to_string()])?;
        if n == 0 {
            return Err(NudgeError::NotFound(id));
        }
        Ok(())
    }

    pub fn task_count(&self) -> Result<u64, NudgeError> {
        let n: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(n)
    }

    // Recurring definitions

    pub fn create_recurring_task(&self, rt: &mut RecurringTask) -> Result<Uuid, NudgeError> {
        rt.validate()?;
        if rt.id.is_nil() {
            rt.id = models::new_id();
        }
        let now = Utc::now();
        rt.created_at = now;
        rt.updated_at = now;

        let days_json = rt
            .recurrence_days
            .as_ref()
            .map(|days| serde_json::to_string(days).unwrap_or_else(|_| "[]".into()));

        self.conn.execute(
            "INSERT INTO recurring_tasks (id, name, recurrence_type, recurrence_interval, \
             recurrence_days, recurrence_day_of_month, recurrence_pattern, recurrence_end_date, \
             is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                rt.id.to_string(),
                rt.name,
                rt.recurrence_type.as_sql(),
                rt.recurrence_interval,
                days_json,
                rt.recurrence_day_of_month,
                rt.recurrence_pattern,
                rt.recurrence_end_date.map(|d| d.to_rfc3339()),
                rt.is_active,
                rt.created_at.to_rfc3339(),
                rt.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(rt.id)
    }

    pub fn get_recurring_task(&self, id: Uuid) -> Result<Option<RecurringTask>, NudgeError> {
        let rt = self
            .conn
            .query_row(
                &format!("SELECT {RECURRING_COLUMNS} FROM recurring_tasks WHERE id = ?1"),
                params![id.to_string()],
                recurring_from_row,
            )
            .optional()?;
        Ok(rt)
    }

    pub fn list_recurring_tasks(&self) -> Result<Vec<RecurringTask>, NudgeError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {RECURRING_COLUMNS} FROM recurring_tasks ORDER BY created_at"
        ))?;
        let rts = stmt
            .query_map([], recurring_from_row)?
            .collect::<Result<_, _>>()?;
        Ok(rts)
    }

    /// Deletes a recurring definition. Every task referencing it goes
    /// with it (enforced by the schema's cascade).
    pub fn delete_recurring_task(&self, id: Uuid) -> Result<(), NudgeError> {
        let n = self.conn.execute(
            "DELETE FROM recurring_tasks WHERE id = ?1",
            params![id.to_string()],
        )?;
        if n == 0 {
            return Err(NudgeError::NotFound(id));
        }
        Ok(())
    }

    pub fn recurring_task_count(&self) -> Result<u64, NudgeError> {
        let n: u64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM recurring_tasks", [], |row| row.get(0))?;
        Ok(n)
    }

    /// Removes all rows, keeping the schema.
    pub fn clear_data(&self) -> Result<(), NudgeError> {
        self.conn.execute("DELETE FROM tasks", [])?;
        self.conn.execute("DELETE FROM recurring_tasks", [])?;
        info!("all data cleared");
        Ok(())
    }
}

// Row mapping. Column order matches TASK_COLUMNS / RECURRING_COLUMNS.

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: get_uuid(row, 0)?,
        recurring_task_id: get_opt_uuid(row, 1)?,
        name: row.get(2)?,
        task_type: get_parsed(row, 3, models::TaskType::from_sql)?,
        task_category: get_parsed(row, 4, models::TaskCategory::from_sql)?,
        is_commute: row.get(5)?,
        status: get_parsed(row, 6, models::TaskStatus::from_sql)?,
        priority: {
            let v: i64 = row.get(7)?;
            models::Priority::from_i64(v)
                .ok_or_else(|| conversion_err(7, format!("priority out of range: {v}")))?
        },
        expected_duration: row.get(8)?,
        expected_units: row.get(9)?,
        actual_duration: row.get(10)?,
        actual_units: row.get(11)?,
        category: row.get(12)?,
        notes: row.get(13)?,
        deadline: get_opt_datetime(row, 14)?,
        created_at: get_datetime(row, 15)?,
        updated_at: get_datetime(row, 16)?,
        completed_at: get_opt_datetime(row, 17)?,
    })
}

fn recurring_from_row(row: &Row<'_>) -> rusqlite::Result<RecurringTask> {
    let days: Option<String> = row.get(4)?;
    let recurrence_days = match days {
        Some(json) => Some(
            serde_json::from_str(&json)
                .map_err(|e| conversion_err(4, format!("recurrence_days: {e}")))?,
        ),
        None => None,
    };
    Ok(RecurringTask {
        id: get_uuid(row, 0)?,
        name: row.get(1)?,
        recurrence_type: get_parsed(row, 2, models::RecurrenceType::from_sql)?,
        recurrence_interval: row.get(3)?,
        recurrence_days,
        recurrence_day_of_month: row.get(5)?,
        recurrence_pattern: row.get(6)?,
        recurrence_end_date: get_opt_datetime(row, 7)?,
        is_active: row.get(8)?,
        created_at: get_datetime(row, 9)?,
        updated_at: get_datetime(row, 10)?,
    })
}

fn conversion_err(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

fn get_parsed<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    parse(&s).ok_or_else(|| conversion_err(idx, format!("unexpected value: {s}")))
}

fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_err(idx, format!("uuid: {e}")))
}

fn get_opt_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_err(idx, format!("uuid: {e}"))))
        .transpose()
}

fn get_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, format!("timestamp: {e}")))
}

fn get_opt_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| conversion_err(idx, format!("timestamp: {e}")))
    })
    .transpose()
}
