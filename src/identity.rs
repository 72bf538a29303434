use async_trait::async_trait;
use axum::http::{HeaderMap, StatusCode, header};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{AppConfig, Env};

/// SessionClaims
///
/// Represents the standard payload structure expected inside the Identity
/// Provider's session token (a JWT). These claims are signed with the shared
/// session secret and validated on every gated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (sub): The provider-assigned user id for this session.
    pub sub: String,
    /// Expiration Time (exp): Timestamp after which the session must not be accepted.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the session token was issued.
    pub iat: usize,
}

/// IdentityProvider
///
/// Defines the abstract contract for resolving a request's authenticated user.
/// This trait allows us to swap the concrete implementation—from the real
/// session-token verifier (SessionVerifier) in production to the in-memory
/// Mock (MockIdentityProvider) during testing—without affecting the gate.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the caller's session from the request headers.
    ///
    /// Returns `Ok(Some(user_id))` for a live session, `Ok(None)` for a
    /// signed-out caller, and `Err` only when the presented session material
    /// is malformed or forged. An absent or expired session is signed-out,
    /// not an error.
    async fn resolve_session(&self, headers: &HeaderMap) -> Result<Option<String>, StatusCode>;
}

/// IdentityState
///
/// The concrete type used to share the identity collaborator across the application state.
pub type IdentityState = Arc<dyn IdentityProvider>;

/// SessionVerifier
///
/// The concrete implementation backed by the external Identity Provider's
/// session tokens. Verification is networkless: the provider signs a JWT into
/// the session cookie at sign-in, and this verifier checks it locally with
/// the shared secret.
///
/// The token is read from the session cookie first, falling back to a
/// standard `Authorization: Bearer` header for non-browser clients.
#[derive(Clone)]
pub struct SessionVerifier {
    secret: String,
    cookie_name: String,
    env: Env,
}

impl SessionVerifier {
    /// Constructs the verifier from the loaded application configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            secret: config.session_secret.clone(),
            cookie_name: config.session_cookie.clone(),
            env: config.env.clone(),
        }
    }

    /// Pulls the raw session token out of the request headers, if any.
    fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        // Cookie scan: the session cookie may sit anywhere in the Cookie header.
        if let Some(cookie_header) = headers.get(header::COOKIE) {
            if let Ok(cookies) = cookie_header.to_str() {
                for pair in cookies.split(';') {
                    if let Some((name, value)) = pair.trim().split_once('=') {
                        if name == self.cookie_name && !value.is_empty() {
                            return Some(value.to_string());
                        }
                    }
                }
            }
        }

        // Bearer fallback for API clients that do not carry cookies.
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.to_string())
    }
}

#[async_trait]
impl IdentityProvider for SessionVerifier {
    /// resolve_session
    ///
    /// The entire process involves:
    /// 1. Local Bypass: Allowing development-time access using the 'x-user-id' header.
    /// 2. Token Extraction: session cookie or Bearer header.
    /// 3. Token Validation: JWT decoding against the shared session secret.
    async fn resolve_session(&self, headers: &HeaderMap) -> Result<Option<String>, StatusCode> {
        // 1. Local Development Bypass Check
        // If the application is running in Env::Local, we allow authentication by
        // providing a user id directly in the 'x-user-id' header. This accelerates
        // development but is guarded by the Env check.
        if self.env == Env::Local {
            if let Some(user_id_header) = headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if !id_str.is_empty() {
                        return Ok(Some(id_str.to_string()));
                    }
                }
            }
        }

        // 2. Token Extraction
        let Some(token) = self.extract_token(headers) else {
            // No session material at all: the caller is simply signed out.
            return Ok(None);
        };

        // 3. Decode and Validate the Token
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::default();
        // Ensure expiration time validation is always active.
        validation.validate_exp = true;

        match decode::<SessionClaims>(&token, &decoding_key, &validation) {
            Ok(token_data) => Ok(Some(token_data.claims.sub)),
            Err(e) => match e.kind() {
                // Token expired: a valid-but-old session. Treated as signed out
                // rather than rejected, so the caller lands on sign-in again.
                ErrorKind::ExpiredSignature => Ok(None),
                // Anything else (bad signature, malformed token) is session
                // material that should never have been presented.
                _ => Err(StatusCode::UNAUTHORIZED),
            },
        }
    }
}

/// MockIdentityProvider
///
/// A mock implementation of `IdentityProvider` used exclusively for unit and
/// integration testing. It resolves every request to a fixed identity (or to
/// signed-out), isolating the gate's decision logic from token mechanics.
#[derive(Clone)]
pub struct MockIdentityProvider {
    /// The identity returned for every request; `None` means signed out.
    pub user_id: Option<String>,
    /// When true, every resolution returns a simulated hard failure.
    pub should_fail: bool,
}

impl MockIdentityProvider {
    pub fn signed_in(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            should_fail: false,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user_id: None,
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            user_id: None,
            should_fail: true,
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn resolve_session(&self, _headers: &HeaderMap) -> Result<Option<String>, StatusCode> {
        if self.should_fail {
            return Err(StatusCode::UNAUTHORIZED);
        }
        Ok(self.user_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn verifier() -> SessionVerifier {
        SessionVerifier::new(&AppConfig {
            env: Env::Production,
            ..AppConfig::default()
        })
    }

    fn mint(secret: &str, sub: &str, exp_offset: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            sub: sub.to_string(),
            exp: (now + exp_offset) as usize,
            iat: now as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn no_session_material_resolves_to_signed_out() {
        let headers = HeaderMap::new();
        assert_eq!(verifier().resolve_session(&headers).await, Ok(None));
    }

    #[tokio::test]
    async fn valid_cookie_session_resolves_user_id() {
        let token = mint("super-secure-test-secret-value-local", "user_42", 3600);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("theme=dark; __session={token}").parse().unwrap(),
        );
        assert_eq!(
            verifier().resolve_session(&headers).await,
            Ok(Some("user_42".to_string()))
        );
    }

    #[tokio::test]
    async fn valid_bearer_session_resolves_user_id() {
        let token = mint("super-secure-test-secret-value-local", "user_7", 3600);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        assert_eq!(
            verifier().resolve_session(&headers).await,
            Ok(Some("user_7".to_string()))
        );
    }

    #[tokio::test]
    async fn expired_session_resolves_to_signed_out() {
        let token = mint("super-secure-test-secret-value-local", "user_42", -3600);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("__session={token}").parse().unwrap(),
        );
        assert_eq!(verifier().resolve_session(&headers).await, Ok(None));
    }

    #[tokio::test]
    async fn forged_session_is_rejected() {
        let token = mint("some-other-secret", "user_42", 3600);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("__session={token}").parse().unwrap(),
        );
        assert_eq!(
            verifier().resolve_session(&headers).await,
            Err(StatusCode::UNAUTHORIZED)
        );
    }

    #[tokio::test]
    async fn bypass_header_is_ignored_in_production() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "sneaky".parse().unwrap());
        assert_eq!(verifier().resolve_session(&headers).await, Ok(None));
    }

    #[tokio::test]
    async fn bypass_header_is_honored_locally() {
        let local = SessionVerifier::new(&AppConfig::default());
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "dev-user".parse().unwrap());
        assert_eq!(
            local.resolve_session(&headers).await,
            Ok(Some("dev-user".to_string()))
        );
    }
}
