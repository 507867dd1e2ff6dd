use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskInput, TaskPatch, TaskStatus};
use crate::repositories::{NewTask, TaskRepository};

/// Task CRUD with merge-only partial updates.
#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    /// Persists a new task; storage assigns the id. Status defaults to
    /// `pending` when the input omits it.
    pub async fn create(&self, input: TaskInput) -> Result<Task, AppError> {
        self.repo
            .insert(NewTask {
                title: input.title,
                description: input.description.unwrap_or_default(),
                due_date: input.due_date,
                status: input.status.unwrap_or(TaskStatus::Pending),
            })
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<Task, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("task not found".into()))
    }

    /// Every stored task; an empty vec when there are none.
    pub async fn get_all(&self) -> Result<Vec<Task>, AppError> {
        self.repo.find_all().await
    }

    /// Applies a partial update and returns the merged record.
    ///
    /// Only supplied, non-blank fields overwrite stored values. A patch that
    /// carries nothing is rejected before storage is touched.
    pub async fn update(&self, id: Uuid, patch: TaskPatch) -> Result<Task, AppError> {
        let patch = patch.normalized();
        if patch.is_empty() {
            return Err(AppError::BadRequest(
                "no valid fields provided for update".into(),
            ));
        }

        self.repo
            .update_fields(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("task not found".into()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let removed = self.repo.delete_by_id(id).await?;
        if removed == 0 {
            return Err(AppError::NotFound("task not found".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::InMemoryTaskRepository;
    use chrono::{TimeZone, Utc};

    fn service() -> TaskService {
        TaskService::new(Arc::new(InMemoryTaskRepository::new()))
    }

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: Some("some details".to_string()),
            due_date: None,
            status: Some(TaskStatus::Pending),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_status_to_pending() {
        let service = service();

        let task = service
            .create(TaskInput {
                title: "deploy release".to_string(),
                description: None,
                due_date: None,
                status: None,
            })
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.description, "");
    }

    #[tokio::test]
    async fn test_get_all_empty_store_returns_empty_vec() {
        let service = service();
        assert_eq!(service.get_all().await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn test_update_merges_only_supplied_fields() {
        let service = service();
        let created = service.create(input("write report")).await.unwrap();

        let merged = service
            .update(
                created.id,
                TaskPatch {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(merged.title, "write report");
        assert_eq!(merged.description, "some details");
        assert_eq!(merged.status, TaskStatus::Completed);

        let due = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let merged = service
            .update(
                created.id,
                TaskPatch {
                    due_date: Some(due),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(merged.due_date, Some(due));
        assert_eq!(merged.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_with_empty_patch_is_rejected() {
        let service = service();
        let created = service.create(input("write report")).await.unwrap();

        let err = service
            .update(created.id, TaskPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // Blank strings count as absent, so this is equally empty.
        let err = service
            .update(
                created.id,
                TaskPatch {
                    title: Some("  ".to_string()),
                    description: Some("".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        // The stored record is untouched.
        let stored = service.get(created.id).await.unwrap();
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_update_unknown_task_not_found() {
        let service = service();

        let err = service
            .update(
                Uuid::new_v4(),
                TaskPatch {
                    title: Some("anything".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let service = service();
        let created = service.create(input("short-lived")).await.unwrap();

        service.delete(created.id).await.unwrap();

        let err = service.get(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.delete(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
