use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;
use tower_sessions::Session;
use validator::Validate;

use crate::session::{snapshot, AUTHENTICATION_PATH, HOME_PATH};
use crate::AppState;

const LOGIN_PATH: &str = "/api/users/login";

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

pub async fn login_page() -> impl IntoResponse {
    Json(json!({ "screen": "login" }))
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let response = state
        .backend
        .post_json(
            LOGIN_PATH,
            json!({
                "email": payload.email,
                "password": payload.password,
            }),
        )
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    if !status.is_success() {
        tracing::warn!(status = %status, "Login rejected by backend");
        let message = if body.trim().is_empty() {
            "Invalid email or password".to_string()
        } else {
            body
        };
        return Err(AppError::Unauthorized(anyhow::anyhow!(message)));
    }

    let token = token_from_body(&body);

    // New session id on privilege change.
    session
        .cycle_id()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to cycle session id: {}", e))?;

    let sessions = snapshot::request_gate(&session, state.tokens.clone()).await;
    let claims = sessions.establish(&token).map_err(|e| {
        tracing::warn!(error = %e, "Backend issued a token that does not decode");
        AppError::Unauthorized(anyhow::anyhow!("Login failed: {}", e))
    })?;
    snapshot::persist(sessions.decoder().store(), &session)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to store session: {}", e))?;

    tracing::info!(
        user_id = claims.subject_id(),
        role = %claims.role(),
        "User logged in successfully"
    );

    Ok(Redirect::to(HOME_PATH).into_response())
}

/// The backend answers with the bare token, sometimes JSON-quoted.
fn token_from_body(body: &str) -> String {
    let body = body.trim();
    serde_json::from_str::<String>(body).unwrap_or_else(|_| body.to_string())
}

/// Token first, then everything derived from it. Never fails.
pub async fn logout_handler(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let sessions = snapshot::request_gate(&session, state.tokens.clone()).await;
    sessions.invalidate();
    if let Err(e) = snapshot::persist(sessions.decoder().store(), &session).await {
        tracing::error!(error = %e, "Failed to clear session keys");
    }
    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush session");
    }

    Redirect::to(AUTHENTICATION_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_body() {
        assert_eq!(token_from_body("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(token_from_body("  abc.def.ghi\n"), "abc.def.ghi");
        assert_eq!(token_from_body("\"abc.def.ghi\""), "abc.def.ghi");
    }

    #[test]
    fn test_login_request_validation() {
        let ok = LoginRequest {
            email: "teacher@school.test".to_string(),
            password: "secret".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = LoginRequest {
            email: "not-an-email".to_string(),
            password: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }
}
