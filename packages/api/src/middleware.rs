// ABOUTME: JWT authentication middleware for request authorization
// ABOUTME: Accepts a bearer access token or transparently refreshes from a refresh token

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use todo_auth::bearer_token;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::response::{set_token_headers, REFRESH_TOKEN_HEADER};
use crate::state::AppState;

/// Cookie carrying the refresh token for browser clients
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Paths that don't require authentication
const PUBLIC_PATHS: &[&str] = &["/api/health", "/api/user/register", "/api/user/login"];

fn requires_authentication(path: &str) -> bool {
    !PUBLIC_PATHS.contains(&path)
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn access_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| bearer_token(value).ok())
}

/// Refresh token from the `X-Refresh-Token` header, falling back to the cookie
fn refresh_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(REFRESH_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().split_once('='))
        .find(|(name, value)| *name == REFRESH_TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Resolve the caller's identity or reject with 401.
///
/// A valid access token wins. Otherwise a pinned refresh token whose account
/// session is still live is exchanged, and the new pair is returned in the
/// `X-Access-Token`/`X-Refresh-Token` response headers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    if !requires_authentication(&path) {
        debug!(path = %path, "Public path, skipping authentication");
        return Ok(next.run(request).await);
    }

    let user_agent = user_agent(request.headers());

    if let Some(token) = access_token(request.headers()) {
        match state.tokens.verify_access_token(token) {
            Ok(user_id) => {
                request
                    .extensions_mut()
                    .insert(CurrentUser { id: user_id, user_agent });
                return Ok(next.run(request).await);
            }
            Err(e) => debug!(path = %path, error = %e, "Access token rejected, trying refresh"),
        }
    }

    let Some(refresh) = refresh_token(request.headers()) else {
        warn!(path = %path, "Missing credentials");
        return Err(AppError::Unauthorized);
    };

    let claims = state.tokens.refresh_claims(&refresh).map_err(|e| {
        warn!(path = %path, error = %e, "Refresh token rejected");
        AppError::from(e)
    })?;
    state
        .users
        .verify_session(claims.user_id, claims.sid.as_deref().unwrap_or_default())
        .await
        .map_err(|e| {
            warn!(path = %path, user_id = claims.user_id, error = %e, "Session check failed");
            AppError::from(e)
        })?;

    let (tokens, user_id) = state
        .tokens
        .try_refresh(&refresh, &user_agent)
        .await
        .map_err(|e| {
            warn!(path = %path, error = %e, "Token refresh failed");
            AppError::from(e)
        })?;

    debug!(path = %path, user_id, "Session refreshed");
    request
        .extensions_mut()
        .insert(CurrentUser { id: user_id, user_agent });

    let mut response = next.run(request).await;
    set_token_headers(&mut response, &tokens);
    Ok(response)
}
