use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use service_core::error::AppError;
use validator::Validate;

use crate::session::{Role, AUTHENTICATION_PATH};
use crate::AppState;

const REGISTER_PATH: &str = "/api/users/register";
const SCHOOLS_PATH: &str = "/api/schools";

/// Roles a visitor may pick when signing up. Administrators are provisioned
/// by the backend only.
pub const SELF_SERVICE_ROLES: [Role; 3] = [Role::Student, Role::Teacher, Role::SchoolAdmin];

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
    pub role: String,
    #[serde(rename = "schoolId")]
    #[validate(required(message = "A school must be selected"))]
    pub school_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchoolOption {
    pub school_id: i64,
    pub name: String,
}

/// Registration screen descriptor with the school picker filled in.
pub async fn register_page(State(state): State<AppState>) -> Result<Response, AppError> {
    let response = state
        .backend
        .get_json(SCHOOLS_PATH)
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(status = %status, "School list unavailable");
        return Err(AppError::BadGateway(format!(
            "School list request failed with status {}",
            status
        )));
    }

    let schools: Vec<SchoolOption> = response
        .json()
        .await
        .map_err(|e| AppError::BadGateway(format!("Unreadable school list: {}", e)))?;

    Ok(Json(json!({
        "screen": "register",
        "roles": SELF_SERVICE_ROLES,
        "schools": schools,
    }))
    .into_response())
}

pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;
    let role = self_service_role(&payload.role)?;

    let response = state
        .backend
        .post_json(
            REGISTER_PATH,
            json!({
                "name": payload.name,
                "email": payload.email,
                "password": payload.password,
                "role": role,
                "schoolId": payload.school_id,
            }),
        )
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "Registration rejected by backend");
        let message = if body.trim().is_empty() {
            "Registration failed".to_string()
        } else {
            body
        };
        return Err(AppError::BadRequest(anyhow::anyhow!(message)));
    }

    tracing::info!(role = %role, "User registered");
    Ok(Redirect::to(AUTHENTICATION_PATH).into_response())
}

/// Exact role name, limited to the roles open to sign-up.
fn self_service_role(raw: &str) -> Result<Role, AppError> {
    let role: Role = raw
        .parse()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("{}", e)))?;

    if SELF_SERVICE_ROLES.contains(&role) {
        Ok(role)
    } else {
        Err(AppError::Forbidden(anyhow::anyhow!(
            "Role {} cannot be self-registered",
            role
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: &str, school_id: Option<i64>) -> RegisterRequest {
        RegisterRequest {
            name: "Asha Rao".to_string(),
            email: "asha@school.test".to_string(),
            password: "secret".to_string(),
            role: role.to_string(),
            school_id,
        }
    }

    #[test]
    fn test_self_service_role() {
        assert_eq!(self_service_role("STUDENT").unwrap(), Role::Student);
        assert_eq!(self_service_role("SCHOOLADMIN").unwrap(), Role::SchoolAdmin);
        assert!(matches!(self_service_role("ADMIN"), Err(AppError::Forbidden(_))));
        assert!(matches!(self_service_role("PRINCIPAL"), Err(AppError::BadRequest(_))));
        assert!(matches!(self_service_role("teacher"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_register_request_validation() {
        assert!(request("TEACHER", Some(4)).validate().is_ok());

        let errors = request("TEACHER", None).validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);

        let mut bad = request("TEACHER", Some(4));
        bad.name = String::new();
        bad.email = "nope".to_string();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("email"));
    }
}
