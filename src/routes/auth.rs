use crate::{
    auth::{LoginRequest, LoginResponse, RegisterRequest},
    error::AppError,
    services::UserService,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Creates a new user account. The first account registered in the system
/// becomes the administrator.
#[post("/register")]
pub async fn register(
    users: web::Data<UserService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    users
        .register(&register_data.username, &register_data.password)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "user created successfully"
    })))
}

/// Login user
///
/// Authenticates a user and returns a token plus the sanitized user view.
/// Unknown usernames and wrong passwords are indistinguishable in the
/// response.
#[post("/login")]
pub async fn login(
    users: web::Data<UserService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let (token, user) = users
        .login(&login_data.username, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: user.public(),
    }))
}
