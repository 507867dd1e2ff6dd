//!
//! # Repository abstractions
//!
//! The managers depend on these traits only; which storage engine sits behind
//! them is a wiring decision. Two implementations ship with the crate:
//! [`postgres`] (sqlx, used by the binary) and [`memory`] (used by the test
//! suite and handy for local experiments).
//!
//! Each implementation is expected to provide per-operation atomicity for
//! single-record inserts, updates, and deletes; nothing here assumes
//! cross-operation transactions.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Role, Task, TaskPatch, TaskStatus, User};

/// A user record about to be persisted. The id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// A task record about to be persisted. The id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
}

/// Persistence operations for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new account and returns it with its assigned id.
    /// Fails with `AppError::Conflict` when the username is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    /// Looks an account up by username. `None` when absent.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Looks an account up by id. `None` when absent.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Number of accounts currently stored.
    async fn count(&self) -> Result<i64, AppError>;

    /// Sets the role of an account, returning how many records matched.
    async fn set_role(&self, id: Uuid, role: Role) -> Result<u64, AppError>;
}

/// Persistence operations for tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persists a new task and returns it with its assigned id.
    async fn insert(&self, task: NewTask) -> Result<Task, AppError>;

    /// Looks a task up by id. `None` when absent.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError>;

    /// Every stored task. An empty vec when there are none.
    async fn find_all(&self) -> Result<Vec<Task>, AppError>;

    /// Applies the supplied fields to a stored task and returns the merged
    /// record, or `None` when the id does not resolve. Fields the patch does
    /// not carry keep their stored values.
    async fn update_fields(&self, id: Uuid, changes: TaskPatch) -> Result<Option<Task>, AppError>;

    /// Removes a task, returning how many records were deleted.
    async fn delete_by_id(&self, id: Uuid) -> Result<u64, AppError>;
}
