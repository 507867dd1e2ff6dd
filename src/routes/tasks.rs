use crate::{
    auth::{require_role, AuthenticatedUser},
    error::AppError,
    models::{Role, TaskInput, TaskPatch},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("invalid task ID format".into()))
}

/// Retrieves all tasks.
///
/// Any authenticated caller may list tasks; the response is an array,
/// empty when no tasks exist.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskService>,
    _caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let all = tasks.get_all().await?;
    Ok(HttpResponse::Ok().json(all))
}

/// Creates a new task.
///
/// Admin-only. The task's id is assigned by storage; `status` defaults to
/// `pending` when omitted.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task` object as JSON.
/// - `400 Bad Request`: If the input data is invalid.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the caller is not an administrator.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    require_role(caller.role, Role::Admin)?;
    task_data.validate()?;

    let created = tasks.create(task_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(created))
}

/// Retrieves a specific task by its ID.
///
/// Any authenticated caller may fetch a task.
///
/// ## Responses:
/// - `200 OK`: Returns the `Task` object as JSON.
/// - `400 Bad Request`: If the id is not a well-formed identifier.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If no task has the given id.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<String>,
    _caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&task_id.into_inner())?;

    let task = tasks.get(task_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates an existing task.
///
/// Admin-only. Only the fields present and non-blank in the payload
/// overwrite stored values; a payload carrying nothing is rejected.
///
/// ## Responses:
/// - `200 OK`: Returns the fully merged `Task` object as JSON.
/// - `400 Bad Request`: Malformed id, invalid field values, or an empty patch.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the caller is not an administrator.
/// - `404 Not Found`: If no task has the given id.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<String>,
    task_data: web::Json<TaskPatch>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    require_role(caller.role, Role::Admin)?;
    let task_id = parse_task_id(&task_id.into_inner())?;
    task_data.validate()?;

    let updated = tasks.update(task_id, task_data.into_inner()).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task by its ID.
///
/// Admin-only.
///
/// ## Responses:
/// - `200 OK`: On successful deletion.
/// - `400 Bad Request`: If the id is not a well-formed identifier.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `403 Forbidden`: If the caller is not an administrator.
/// - `404 Not Found`: If no task has the given id.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<String>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    require_role(caller.role, Role::Admin)?;
    let task_id = parse_task_id(&task_id.into_inner())?;

    tasks.delete(task_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "task deleted successfully"
    })))
}
