// ABOUTME: Shared API response envelope
// ABOUTME: Provides a consistent success/data/error shape across all endpoints

use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;
use serde::Serialize;

use todo_auth::TokenPair;

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";
pub const REFRESH_TOKEN_HEADER: &str = "x-refresh-token";

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Attach a token pair to a response as headers
pub fn set_token_headers(response: &mut Response, tokens: &TokenPair) {
    let headers = response.headers_mut();
    for (name, value) in [
        (ACCESS_TOKEN_HEADER, &tokens.access_token),
        (REFRESH_TOKEN_HEADER, &tokens.refresh_token),
    ] {
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
}
