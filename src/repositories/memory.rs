//! In-memory repository implementations.
//!
//! These back the integration tests (no database required) and can stand in
//! for PostgreSQL during local experiments. Semantics match the real
//! implementations: username uniqueness, merge-only field updates, and
//! removed-count reporting.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Role, Task, TaskPatch, User};

use super::{NewTask, NewUser, TaskRepository, UserRepository};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().unwrap();

        if users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict("user already exists".into()));
        }

        let stored = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
        };
        users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().unwrap();
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().unwrap();
        Ok(users.get(&id).cloned())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let users = self.users.read().unwrap();
        Ok(users.len() as i64)
    }

    async fn set_role(&self, id: Uuid, role: Role) -> Result<u64, AppError> {
        let mut users = self.users.write().unwrap();
        match users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tasks = self.tasks.write().unwrap();

        let stored = Task {
            id: Uuid::new_v4(),
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            status: task.status,
        };
        tasks.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.read().unwrap();
        Ok(tasks.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.read().unwrap();
        Ok(tasks.values().cloned().collect())
    }

    async fn update_fields(&self, id: Uuid, changes: TaskPatch) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().unwrap();

        let task = match tasks.get_mut(&id) {
            Some(task) => task,
            None => return Ok(None),
        };

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = description;
        }
        if let Some(due_date) = changes.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(status) = changes.status {
            task.status = status;
        }

        Ok(Some(task.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<u64, AppError> {
        let mut tasks = self.tasks.write().unwrap();
        Ok(if tasks.remove(&id).is_some() { 1 } else { 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;

    #[tokio::test]
    async fn test_duplicate_username_is_a_conflict() {
        let repo = InMemoryUserRepository::new();

        let user = NewUser {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Admin,
        };
        repo.insert(user.clone()).await.unwrap();

        let err = repo.insert(user).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_role_reports_matched_count() {
        let repo = InMemoryUserRepository::new();
        let stored = repo
            .insert(NewUser {
                username: "bob".to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();

        assert_eq!(repo.set_role(stored.id, Role::Admin).await.unwrap(), 1);
        assert_eq!(repo.set_role(Uuid::new_v4(), Role::Admin).await.unwrap(), 0);

        let promoted = repo.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(promoted.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_update_fields_merges() {
        let repo = InMemoryTaskRepository::new();
        let stored = repo
            .insert(NewTask {
                title: "write report".to_string(),
                description: "quarterly numbers".to_string(),
                due_date: None,
                status: TaskStatus::Pending,
            })
            .await
            .unwrap();

        let merged = repo
            .update_fields(
                stored.id,
                TaskPatch {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(merged.title, "write report");
        assert_eq!(merged.description, "quarterly numbers");
        assert_eq!(merged.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_delete_reports_removed_count() {
        let repo = InMemoryTaskRepository::new();
        let stored = repo
            .insert(NewTask {
                title: "t".to_string(),
                description: String::new(),
                due_date: None,
                status: TaskStatus::Pending,
            })
            .await
            .unwrap();

        assert_eq!(repo.delete_by_id(stored.id).await.unwrap(), 1);
        assert_eq!(repo.delete_by_id(stored.id).await.unwrap(), 0);
        assert!(repo.find_all().await.unwrap().is_empty());
    }
}
