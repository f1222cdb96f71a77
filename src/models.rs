use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// How a task's success is measured, fixed at creation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Delivered a countable quantity against a target (e.g. "read 3 chapters").
    UnitBased,
    /// Spent time against an expected duration.
    TimeBased,
    /// Transit time; punctuality-scored.
    Commute,
}

impl TaskType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            TaskType::UnitBased => "UNIT_BASED",
            TaskType::TimeBased => "TIME_BASED",
            TaskType::Commute => "COMMUTE",
        }
    }

    pub fn from_sql(s: &str) -> Option<Self> {
        match s {
            "UNIT_BASED" => Some(TaskType::UnitBased),
            "TIME_BASED" => Some(TaskType::TimeBased),
            "COMMUTE" => Some(TaskType::Commute),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskCategory {
    Anchor,
    Transit,
    Action,
}

impl TaskCategory {
    pub fn as_sql(&self) -> &'static str {
        match self {
            TaskCategory::Anchor => "ANCHOR",
            TaskCategory::Transit => "TRANSIT",
            TaskCategory::Action => "ACTION",
        }
    }

    pub fn from_sql(s: &str) -> Option<Self> {
        match s {
            "ANCHOR" => Some(TaskCategory::Anchor),
            "TRANSIT" => Some(TaskCategory::Transit),
            "ACTION" => Some(TaskCategory::Action),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Deferred,
}

impl TaskStatus {
    pub fn as_sql(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Deferred => "DEFERRED",
        }
    }

    pub fn from_sql(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(TaskStatus::Pending),
            "IN_PROGRESS" => Some(TaskStatus::InProgress),
            "COMPLETED" => Some(TaskStatus::Completed),
            "FAILED" => Some(TaskStatus::Failed),
            "DEFERRED" => Some(TaskStatus::Deferred),
            _ => None,
        }
    }
}

/// Ordinal priority, stored as its numeric value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Priority {
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }

    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            1 => Some(Priority::Low),
            2 => Some(Priority::Medium),
            3 => Some(Priority::High),
            4 => Some(Priority::Critical),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    MonthlyDate,
    MonthlyPattern,
}

impl RecurrenceType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            RecurrenceType::Daily => "DAILY",
            RecurrenceType::Weekly => "WEEKLY",
            RecurrenceType::MonthlyDate => "MONTHLY_DATE",
            RecurrenceType::MonthlyPattern => "MONTHLY_PATTERN",
        }
    }

    pub fn from_sql(s: &str) -> Option<Self> {
        match s {
            "DAILY" => Some(RecurrenceType::Daily),
            "WEEKLY" => Some(RecurrenceType::Weekly),
            "MONTHLY_DATE" => Some(RecurrenceType::MonthlyDate),
            "MONTHLY_PATTERN" => Some(RecurrenceType::MonthlyPattern),
            _ => None,
        }
    }
}

/// A single actionable, trackable unit of work with an expected target
/// and an optional actual outcome.
///
/// Duration fields are minutes. Expected values are set at creation and
/// gated by [`Task::validate`]; actual values are set on completion.
/// Absence is always represented as `None`, never as a zero sentinel.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Task {
    pub id: Uuid,
    /// Reference to a recurring definition; `None` for standalone tasks.
    pub recurring_task_id: Option<Uuid>,
    pub name: String,
    pub task_type: TaskType,
    pub task_category: TaskCategory,
    pub is_commute: bool,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Target duration in minutes (1-1440). Required for time-based and commute tasks.
    pub expected_duration: Option<u32>,
    /// Target quantity (1-1000). Required for unit-based tasks.
    pub expected_units: Option<u32>,
    /// Observed duration in minutes, set on completion.
    pub actual_duration: Option<u32>,
    /// Observed quantity, set on completion. Zero delivered is a valid outcome.
    pub actual_units: Option<u32>,
    /// User-defined tag. No effect on scoring.
    pub category: Option<String>,
    pub notes: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Written exactly once, on the transition into `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Recurrence configuration referenced by tasks. This entity carries no
/// behavior: nothing in the current system materializes task instances
/// from it.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RecurringTask {
    pub id: Uuid,
    pub name: String,
    pub recurrence_type: RecurrenceType,
    /// Every N days, for `Daily`.
    pub recurrence_interval: Option<u32>,
    /// Days of week for `Weekly`, 0 = Sunday.
    pub recurrence_days: Option<Vec<u8>>,
    /// Day of month (1-31) for `MonthlyDate`.
    pub recurrence_day_of_month: Option<u8>,
    /// Named pattern such as "first_monday", for `MonthlyPattern`.
    pub recurrence_pattern: Option<String>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task write was rejected before reaching storage. Distinct from
/// database errors so callers can surface a field-level message instead
/// of retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task name must be 1-200 characters")]
    InvalidName,
    #[error("unit-based tasks require expected_units")]
    MissingExpectedUnits,
    #[error("time-based and commute tasks require expected_duration")]
    MissingExpectedDuration,
    #[error("expected_units must be between 1 and 1000, got {0}")]
    ExpectedUnitsOutOfRange(u32),
    #[error("actual_units must be at most 1000, got {0}")]
    ActualUnitsOutOfRange(u32),
    #[error("{field} must be between 1 and 1440 minutes, got {value}")]
    DurationOutOfRange { field: &'static str, value: u32 },
    #[error("recurring task name must not be empty")]
    EmptyRecurringName,
    #[error("recurrence day_of_month must be between 1 and 31, got {0}")]
    DayOfMonthOutOfRange(u8),
}

/// Generates a new random 128-bit identifier.
///
/// Collision-free at the system's expected scale without any central
/// counter or coordination.
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}

impl Task {
    /// A pending task with defaults matching the storage schema.
    /// The id stays nil until storage assigns one at create time.
    pub fn new(name: impl Into<String>, task_type: TaskType) -> Self {
        let now = Utc::now();
        Task {
            id: Uuid::nil(),
            recurring_task_id: None,
            name: name.into(),
            task_type,
            task_category: TaskCategory::Action,
            is_commute: false,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            expected_duration: None,
            expected_units: None,
            actual_duration: None,
            actual_units: None,
            category: None,
            notes: None,
            deadline: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Forces the invariants a commute task must hold: `is_commute` set
    /// and category `Transit`. Storage calls this before validating every
    /// write; callers working on detached snapshots may call it directly.
    pub fn normalize(&mut self) {
        if self.task_type == TaskType::Commute {
            self.is_commute = true;
            self.task_category = TaskCategory::Transit;
        }
    }

    /// Pre-persistence gate: rejects a task whose required expected field
    /// is absent for its type, or whose values fall outside the schema
    /// ranges. Never corrects or defaults anything.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() || self.name.len() > 200 {
            return Err(ValidationError::InvalidName);
        }

        match self.task_type {
            TaskType::UnitBased => {
                if self.expected_units.is_none() {
                    return Err(ValidationError::MissingExpectedUnits);
                }
            }
            TaskType::TimeBased | TaskType::Commute => {
                if self.expected_duration.is_none() {
                    return Err(ValidationError::MissingExpectedDuration);
                }
            }
        }

        if let Some(units) = self.expected_units {
            if units == 0 || units > 1000 {
                return Err(ValidationError::ExpectedUnitsOutOfRange(units));
            }
        }
        if let Some(units) = self.actual_units {
            if units > 1000 {
                return Err(ValidationError::ActualUnitsOutOfRange(units));
            }
        }
        for (field, value) in [
            ("expected_duration", self.expected_duration),
            ("actual_duration", self.actual_duration),
        ] {
            if let Some(minutes) = value {
                if minutes == 0 || minutes > 1440 {
                    return Err(ValidationError::DurationOutOfRange {
                        field,
                        value: minutes,
                    });
                }
            }
        }

        Ok(())
    }
}

impl RecurringTask {
    /// An active definition with a nil id; storage assigns the id at
    /// create time.
    pub fn new(name: impl Into<String>, recurrence_type: RecurrenceType) -> Self {
        let now = Utc::now();
        RecurringTask {
            id: Uuid::nil(),
            name: name.into(),
            recurrence_type,
            recurrence_interval: None,
            recurrence_days: None,
            recurrence_day_of_month: None,
            recurrence_pattern: None,
            recurrence_end_date: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyRecurringName);
        }
        if let Some(day) = self.recurrence_day_of_month {
            if day == 0 || day > 31 {
                return Err(ValidationError::DayOfMonthOutOfRange(day));
            }
        }
        Ok(())
    }
}
