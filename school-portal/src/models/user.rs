use std::collections::HashMap;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use crate::policy::NavigationItem;
use crate::session::{Role, SessionClaims, AUTHENTICATION_PATH};

/// Identity shown in the portal chrome.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub user_id: i64,
    pub role: Role,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub school_id: Option<i64>,
    pub classroom_id: Option<i64>,
    pub school_name: Option<String>,
    pub initials: String,
}

impl From<&SessionClaims> for UserContext {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            user_id: claims.subject_id(),
            role: claims.role(),
            name: claims.display_name().to_string(),
            email: claims.email().map(str::to_string),
            school_id: claims.school_id(),
            classroom_id: claims.classroom_id(),
            school_name: claims.school_name().map(str::to_string),
            initials: initials(claims.display_name()),
        }
    }
}

/// Up to two letters: first and last word of the name.
pub fn initials(name: &str) -> String {
    let mut words = name.split_whitespace().filter_map(|word| word.chars().next());
    let first = words.next();
    let last = words.last();

    match (first, last) {
        (Some(first), Some(last)) => format!("{first}{last}").to_uppercase(),
        (Some(first), None) => first.to_uppercase().collect(),
        _ => "U".to_string(),
    }
}

/// Descriptor a gated screen returns.
#[derive(Debug, Serialize, Clone)]
pub struct ScreenView {
    pub screen: String,
    pub user: UserContext,
    pub navigation: Vec<NavigationItem>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,
}

/// Claims the route gate validated for this request.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<SessionClaims>() {
            Some(claims) => Ok(CurrentSession(claims.clone())),
            // Only reachable on a route mounted without the gate.
            None => Err(Redirect::to(AUTHENTICATION_PATH).into_response()),
        }
    }
}
