// ABOUTME: JWT access/refresh token issuing, validation, rotation and revocation
// ABOUTME: Refresh tokens are pinned in the cache per user and user-agent fingerprint

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{AuthError, AuthResult};
use todo_core::{now_millis, Clock};
use todo_storage::Cache;

/// Lifetime of access tokens issued at login
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Lifetime of access tokens minted from a refresh token
pub const REFRESHED_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

const TOKEN_ID_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub typ: TokenKind,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Account session the refresh token belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> AuthResult<&str> {
    if header_value.trim().is_empty() {
        return Err(AuthError::MissingToken);
    }
    match header_value.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidHeader),
    }
}

/// Cache key holding the live refresh token for one user on one client
fn refresh_key(user_id: i64, user_agent: &str) -> String {
    let digest = Sha256::digest(user_agent.as_bytes());
    format!("refresh_token:{}:{}", user_id, URL_SAFE_NO_PAD.encode(digest))
}

fn generate_token_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_ID_LENGTH)
        .map(char::from)
        .collect()
}

pub struct TokenManager {
    cache: Arc<dyn Cache>,
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Clock,
}

impl TokenManager {
    /// Build a manager signing with the HMAC algorithm named by `algorithm` (HS256, HS384 or HS512)
    pub fn new(secret: &str, algorithm: &str, cache: Arc<dyn Cache>) -> AuthResult<Self> {
        Self::with_clock(secret, algorithm, cache, Arc::new(now_millis))
    }

    pub fn with_clock(
        secret: &str,
        algorithm: &str,
        cache: Arc<dyn Cache>,
        clock: Clock,
    ) -> AuthResult<Self> {
        if secret.is_empty() {
            return Err(AuthError::Configuration(
                "JWT secret must not be empty".to_string(),
            ));
        }

        let algorithm = Algorithm::from_str(algorithm)
            .ok()
            .filter(|alg| matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512))
            .ok_or_else(|| {
                AuthError::Configuration(format!("Unsupported signing algorithm: {}", algorithm))
            })?;

        Ok(Self {
            cache,
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            clock,
        })
    }

    fn now_secs(&self) -> i64 {
        (self.clock)() / 1000
    }

    fn issue(
        &self,
        user_id: i64,
        typ: TokenKind,
        ttl: Duration,
        session_key: Option<&str>,
    ) -> AuthResult<String> {
        let iat = self.now_secs();
        let claims = Claims {
            user_id,
            typ,
            iat,
            exp: iat + ttl.as_secs() as i64,
            jti: (typ == TokenKind::Refresh).then(generate_token_id),
            sid: session_key.map(str::to_string),
        };
        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?)
    }

    /// Issue a fresh access/refresh pair and pin the refresh token for this client.
    /// The refresh token carries `session_key` so it dies with the account session.
    pub async fn generate_tokens(
        &self,
        user_id: i64,
        user_agent: &str,
        session_key: &str,
    ) -> AuthResult<TokenPair> {
        let access_token = self.issue(user_id, TokenKind::Access, ACCESS_TOKEN_TTL, None)?;
        let refresh_token = self.issue(
            user_id,
            TokenKind::Refresh,
            REFRESH_TOKEN_TTL,
            Some(session_key),
        )?;

        self.cache
            .set(&refresh_key(user_id, user_agent), &refresh_token, REFRESH_TOKEN_TTL)
            .await?;
        debug!("Issued token pair for user {}", user_id);

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify signature and expiry. Expiry is checked against wall-clock time.
    pub fn parse_token(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 5;
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    fn parse_kind(&self, token: &str, expected: TokenKind) -> AuthResult<Claims> {
        let claims = self.parse_token(token)?;
        if claims.typ != expected {
            return Err(AuthError::WrongTokenKind {
                expected: expected.as_str(),
            });
        }
        Ok(claims)
    }

    /// Validate a refresh token's signature, expiry and kind without consuming it
    pub fn refresh_claims(&self, token: &str) -> AuthResult<Claims> {
        self.parse_kind(token, TokenKind::Refresh)
    }

    /// Validate an access token and return the user it identifies
    pub fn verify_access_token(&self, token: &str) -> AuthResult<i64> {
        Ok(self.parse_kind(token, TokenKind::Access)?.user_id)
    }

    /// Exchange a pinned refresh token for a new access token.
    ///
    /// The refresh token is rotated once less than a third of its lifetime
    /// remains; otherwise the same refresh token is handed back.
    pub async fn try_refresh(
        &self,
        refresh_token: &str,
        user_agent: &str,
    ) -> AuthResult<(TokenPair, i64)> {
        let claims = self.parse_kind(refresh_token, TokenKind::Refresh)?;
        let key = refresh_key(claims.user_id, user_agent);

        let stored = self.cache.get(&key).await?;
        if stored.as_deref() != Some(refresh_token) {
            warn!("Rejected revoked refresh token for user {}", claims.user_id);
            return Err(AuthError::Revoked);
        }

        let access_token = self.issue(
            claims.user_id,
            TokenKind::Access,
            REFRESHED_ACCESS_TOKEN_TTL,
            None,
        )?;

        let remaining = claims.exp - self.now_secs();
        let lifetime = claims.exp - claims.iat;
        let refresh_token = if remaining < lifetime / 3 {
            let rotated = self.issue(
                claims.user_id,
                TokenKind::Refresh,
                REFRESH_TOKEN_TTL,
                claims.sid.as_deref(),
            )?;
            self.cache.set(&key, &rotated, REFRESH_TOKEN_TTL).await?;
            debug!("Rotated refresh token for user {}", claims.user_id);
            rotated
        } else {
            refresh_token.to_string()
        };

        Ok((
            TokenPair {
                access_token,
                refresh_token,
            },
            claims.user_id,
        ))
    }

    /// Forget the refresh token pinned for this user and client
    pub async fn revoke(&self, user_id: i64, user_agent: &str) -> AuthResult<()> {
        self.cache.delete(&refresh_key(user_id, user_agent)).await?;
        debug!("Revoked refresh token for user {}", user_id);
        Ok(())
    }
}
