// ABOUTME: HTTP request handlers for user accounts
// ABOUTME: Registration, login/logout, profile, avatar upload and password reset

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use todo_auth::TokenPair;
use todo_users::{ProfileUpdateInput, RegisterInput, User, UserError};

use crate::auth::CurrentUser;
use crate::error::{ApiResult, AppError};
use crate::response::{set_token_headers, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[serde(rename = "userUniqueName")]
    pub unique_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub url: String,
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn require_credentials(email: &str, password: &str) -> ApiResult<()> {
    if email.trim().is_empty() {
        return Err(AppError::validation("email is required"));
    }
    if password.is_empty() {
        return Err(AppError::validation("password is required"));
    }
    Ok(())
}

/// Join the account session, issue tokens for `user` and build the session response
async fn start_session(
    state: &AppState,
    user: User,
    user_agent: &str,
    status: StatusCode,
) -> ApiResult<Response> {
    let session_key = state.users.open_session(user.id).await?;
    let tokens = state
        .tokens
        .generate_tokens(user.id, user_agent, &session_key)
        .await?;

    let mut response = (
        status,
        Json(ApiResponse::success(SessionResponse {
            user,
            tokens: tokens.clone(),
        })),
    )
        .into_response();
    set_token_headers(&mut response, &tokens);
    Ok(response)
}

/// Register a new account and log it in
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Response> {
    require_credentials(&request.email, &request.password)?;
    info!("Registering new user");

    let user = state
        .users
        .register(RegisterInput {
            email: request.email,
            password: request.password,
            name: request.name,
        })
        .await?;

    start_session(&state, user, &user_agent(&headers), StatusCode::CREATED).await
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Response> {
    require_credentials(&request.email, &request.password)?;

    // Unknown emails look the same as wrong passwords
    let user = state
        .users
        .login(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            UserError::UserNotFound => AppError::Unauthorized,
            other => other.into(),
        })?;
    info!("User {} logged in", user.id);

    start_session(&state, user, &user_agent(&headers), StatusCode::OK).await
}

/// Revoke the refresh token pinned for this client
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<()>>> {
    state.tokens.revoke(user.id, &user.user_agent).await?;
    info!("User {} logged out", user.id);
    Ok(Json(ApiResponse::success(())))
}

pub async fn get_info(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state.users.get_user(user.id).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<User>>> {
    info!("Updating profile for user: {}", user.id);

    let updated = state
        .users
        .update_profile(
            user.id,
            ProfileUpdateInput {
                name: request.name,
                unique_name: request.unique_name,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Upload a raw image body as the user's avatar
pub async fn update_avatar(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<ApiResponse<AvatarResponse>>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::validation("Content-Type header is required"))?;
    if body.is_empty() {
        return Err(AppError::validation("image body is empty"));
    }

    let url = state
        .users
        .update_avatar(user.id, content_type, body)
        .await?;
    Ok(Json(ApiResponse::success(AvatarResponse { url })))
}

/// Change the signed-in user's password.
///
/// The body email must be the caller's own. Every refresh token issued before
/// the reset stops working; the caller's access token lives out its TTL.
pub async fn reset_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ResetPasswordRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    require_credentials(&request.email, &request.password)?;

    state
        .users
        .reset_password(user.id, &request.email, &request.password)
        .await?;
    state.tokens.revoke(user.id, &user.user_agent).await?;
    info!("User {} reset their password", user.id);
    Ok(Json(ApiResponse::success(())))
}
