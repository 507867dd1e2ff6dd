use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;

use taskhub::auth::{AuthMiddleware, TokenService};
use taskhub::config::Config;
use taskhub::repositories::postgres::{PgTaskRepository, PgUserRepository};
use taskhub::repositories::{TaskRepository, UserRepository};
use taskhub::routes;
use taskhub::services::{TaskService, UserService};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let tokens = TokenService::new(config.jwt_secret.as_bytes());

    let user_repo: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let task_repo: Arc<dyn TaskRepository> = Arc::new(PgTaskRepository::new(pool));

    let users = UserService::new(user_repo, tokens.clone());
    let tasks = TaskService::new(task_repo);

    log::info!("starting server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::Data::new(users.clone()))
            .app_data(web::Data::new(tasks.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
