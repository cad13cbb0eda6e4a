// ABOUTME: HTTP API layer for the todo backend providing REST endpoints and routing
// ABOUTME: Integration layer that depends on all domain packages

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};

use todo_users::validation::MAX_AVATAR_BYTES;

pub mod auth;
pub mod error;
pub mod health;
pub mod middleware;
pub mod response;
pub mod state;
pub mod tasks_handlers;
pub mod users_handlers;

pub use error::{ApiResult, AppError};
pub use state::AppState;

/// Creates the tasks API router (nested under /api/tasks)
pub fn create_tasks_router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks_handlers::list_tasks))
        .route("/", post(tasks_handlers::create_task))
        .route("/{id}", get(tasks_handlers::get_task))
        .route("/{id}", put(tasks_handlers::update_task))
        .route("/{id}", delete(tasks_handlers::delete_task))
}

/// Creates the users API router (nested under /api/user)
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(users_handlers::register))
        .route("/login", post(users_handlers::login))
        .route("/logout", get(users_handlers::logout))
        .route("/info", get(users_handlers::get_info))
        .route("/profile", put(users_handlers::update_profile))
        // Leave headroom so oversized images reach the handler and get a 413 body
        .route(
            "/avatar",
            put(users_handlers::update_avatar).layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES * 2)),
        )
        .route("/reset-password", post(users_handlers::reset_password))
}

/// Full application router with authentication applied to every non-public route
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_check))
        .nest("/user", create_users_router())
        .nest("/tasks", create_tasks_router());

    Router::new()
        .nest("/api", api)
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .with_state(state)
}
