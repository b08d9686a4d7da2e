use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use goaero_core::{Role, Session};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub email: Option<String>,
    pub role: Role,
    pub exp: usize,
}

impl SessionClaims {
    pub fn into_session(self) -> Option<Session> {
        let user_id = Uuid::parse_str(&self.sub).ok()?;
        Some(Session::new(user_id, self.email, self.role))
    }
}

// ============================================================================
// Session Middleware
// ============================================================================

/// Decodes the bearer token and injects the caller's [`Session`] into the
/// request extensions.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::AuthenticationError("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::AuthenticationError("Expected a Bearer token".to_string()))?;

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    ).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        AppError::AuthenticationError("Invalid or expired token".to_string())
    })?;

    let session = token_data
        .claims
        .into_session()
        .ok_or_else(|| AppError::AuthenticationError("Token subject is not a user id".to_string()))?;
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
