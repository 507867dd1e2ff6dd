//! PostgreSQL repository implementations backed by sqlx.
//!
//! Every call runs under a fixed deadline; expiry surfaces as
//! `AppError::Timeout` and relies on single-statement atomicity, so no
//! partial mutation is assumed. The username unique index is what turns a
//! duplicate registration into a conflict.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::time::timeout;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Role, Task, TaskPatch, User};

use super::{NewTask, NewUser, TaskRepository, UserRepository};

/// Deadline applied to every storage round trip.
const STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs a query future under [`STORAGE_TIMEOUT`].
async fn run<T, F>(fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(STORAGE_TIMEOUT, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::Timeout("storage operation timed out".into())),
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let query = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, role)
             VALUES ($1, $2, $3)
             RETURNING id, username, password_hash, role",
        )
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.role);

        let result = timeout(STORAGE_TIMEOUT, query.fetch_one(&self.pool))
            .await
            .map_err(|_| AppError::Timeout("storage operation timed out".into()))?;

        result.map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("user already exists".into());
                }
            }
            AppError::from(e)
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        run(
            sqlx::query_as::<_, User>(
                "SELECT id, username, password_hash, role FROM users WHERE username = $1",
            )
            .bind(username)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        run(
            sqlx::query_as::<_, User>(
                "SELECT id, username, password_hash, role FROM users WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn count(&self) -> Result<i64, AppError> {
        run(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool)).await
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<u64, AppError> {
        let result = run(sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role)
            .execute(&self.pool))
        .await?;

        Ok(result.rows_affected())
    }
}

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        run(sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (title, description, due_date, status)
             VALUES ($1, $2, $3, $4)
             RETURNING id, title, description, due_date, status",
        )
        .bind(task.title)
        .bind(task.description)
        .bind(task.due_date)
        .bind(task.status)
        .fetch_one(&self.pool))
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        run(sqlx::query_as::<_, Task>(
            "SELECT id, title, description, due_date, status FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool))
        .await
    }

    async fn find_all(&self) -> Result<Vec<Task>, AppError> {
        run(
            sqlx::query_as::<_, Task>("SELECT id, title, description, due_date, status FROM tasks")
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn update_fields(&self, id: Uuid, changes: TaskPatch) -> Result<Option<Task>, AppError> {
        // The SET clause is assembled from whichever fields the patch
        // carries; parameters are bound in the same order below.
        let mut assignments: Vec<String> = Vec::new();
        let mut param_count = 1;

        if changes.title.is_some() {
            assignments.push(format!("title = ${}", param_count));
            param_count += 1;
        }
        if changes.description.is_some() {
            assignments.push(format!("description = ${}", param_count));
            param_count += 1;
        }
        if changes.due_date.is_some() {
            assignments.push(format!("due_date = ${}", param_count));
            param_count += 1;
        }
        if changes.status.is_some() {
            assignments.push(format!("status = ${}", param_count));
            param_count += 1;
        }

        if assignments.is_empty() {
            return self.find_by_id(id).await;
        }

        let sql = format!(
            "UPDATE tasks SET {} WHERE id = ${} RETURNING id, title, description, due_date, status",
            assignments.join(", "),
            param_count
        );

        let mut query = sqlx::query_as::<_, Task>(&sql);

        if let Some(title) = &changes.title {
            query = query.bind(title);
        }
        if let Some(description) = &changes.description {
            query = query.bind(description);
        }
        if let Some(due_date) = changes.due_date {
            query = query.bind(due_date);
        }
        if let Some(status) = changes.status {
            query = query.bind(status);
        }
        query = query.bind(id);

        run(query.fetch_optional(&self.pool)).await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<u64, AppError> {
        let result = run(sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool))
        .await?;

        Ok(result.rows_affected())
    }
}
