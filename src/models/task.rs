use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Completed,
}

/// Input structure for creating a task.
/// Contains validation rules for its fields.
///
/// `status` defaults to `pending` when omitted; out-of-range status strings
/// are rejected during deserialization.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Optional due date for the task (RFC 3339, UTC).
    pub due_date: Option<DateTime<Utc>>,

    /// The initial status of the task.
    pub status: Option<TaskStatus>,
}

/// Partial update for a task: only the fields actually supplied are applied,
/// everything else keeps its stored value.
///
/// Blank or whitespace-only strings count as "not supplied" — this mirrors
/// the wire contract where an empty field means "leave unchanged".
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub due_date: Option<DateTime<Utc>>,

    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Drops blank string fields so they are treated the same as absent ones.
    pub fn normalized(mut self) -> Self {
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            self.title = None;
        }
        if matches!(&self.description, Some(d) if d.trim().is_empty()) {
            self.description = None;
        }
        self
    }

    /// True when no field would be applied by this patch.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task, assigned by storage on creation.
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
}
