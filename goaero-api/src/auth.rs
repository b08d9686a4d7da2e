use axum::{
    extract::State,
    Json,
    routing::post,
    Router,
};
use serde::Serialize;
use jsonwebtoken::{encode, Header, EncodingKey};
use chrono::{Utc, Duration};
use goaero_core::Session;
use crate::{state::{AppState, AuthConfig}, error::AppError, middleware::auth::SessionClaims};

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user_id: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/auth/guest", post(login_guest))
}

/// Sign a bearer token carrying `session`.
pub fn issue_token(auth: &AuthConfig, session: &Session) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: session.user_id.to_string(),
        email: session.email.clone(),
        role: session.role,
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

async fn login_guest(State(state): State<AppState>) -> Result<Json<AuthResponse>, AppError> {
    let session = Session::guest();
    let token = issue_token(&state.auth, &session)?;

    tracing::info!("Issued guest session {}", session.user_id);
    Ok(Json(AuthResponse { token, user_id: session.user_id.to_string() }))
}
