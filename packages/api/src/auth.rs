// ABOUTME: Authentication context for API requests
// ABOUTME: Exposes the user resolved by the auth middleware to request handlers

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Current authenticated user, placed in request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub user_agent: String,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
