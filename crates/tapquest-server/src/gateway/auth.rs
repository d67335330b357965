//! Admin authentication.
//!
//! Every admin request must present `Authorization: Bearer <token>`
//! matching the service credential from startup configuration, and the
//! admin surface can be disabled wholesale. Tokens are compared as SHA-256
//! digests.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};

use tapquest_core::config::AdminConfig;

use super::response::ApiError;

/// Admin gate state.
#[derive(Clone)]
pub struct AdminAuth {
    enabled: bool,
    token_digest: Option<[u8; 32]>,
}

impl std::fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAuth")
            .field("enabled", &self.enabled)
            .field("token_configured", &self.token_digest.is_some())
            .finish()
    }
}

impl AdminAuth {
    /// Build the gate from startup configuration. An empty token leaves
    /// the gate closed even when enabled.
    pub fn from_config(config: &AdminConfig) -> Self {
        let token_digest = if config.token.is_empty() {
            None
        } else {
            Some(Sha256::digest(config.token.as_bytes()).into())
        };

        Self {
            enabled: config.enabled,
            token_digest,
        }
    }

    /// Authorize one request from its `Authorization` header value.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), ApiError> {
        if !self.enabled {
            return Err(ApiError::forbidden("Unauthorized"));
        }
        let Some(expected) = self.token_digest else {
            return Err(ApiError::forbidden("Unauthorized"));
        };

        let token = authorization
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::forbidden("Unauthorized"))?;

        let digest: [u8; 32] = Sha256::digest(token.as_bytes()).into();
        if digest != expected {
            return Err(ApiError::forbidden("Unauthorized"));
        }
        Ok(())
    }
}

/// Axum middleware guarding the admin routes.
pub async fn admin_auth_middleware(
    State(auth): State<Arc<AdminAuth>>,
    req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match auth.authorize(header) {
        Ok(()) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}
