use crate::{
    auth::{require_role, AuthenticatedUser},
    error::AppError,
    models::Role,
    services::UserService,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

/// Promote a user to administrator.
///
/// Admin-only. The target's outstanding tokens keep their old role until
/// they expire.
#[post("/{id}/promote")]
pub async fn promote(
    users: web::Data<UserService>,
    user_id: web::Path<String>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    require_role(caller.role, Role::Admin)?;

    let user_id = Uuid::parse_str(&user_id.into_inner())
        .map_err(|_| AppError::BadRequest("invalid user ID format".into()))?;

    users.promote_to_admin(user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "user promoted to admin successfully"
    })))
}
