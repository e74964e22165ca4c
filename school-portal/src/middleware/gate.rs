use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use crate::session::{snapshot, RoleRequirement, TokenDecoder};

/// Per-route gate configuration.
#[derive(Clone)]
pub struct GateState {
    pub tokens: Arc<TokenDecoder>,
    pub requirement: RoleRequirement,
}

impl GateState {
    pub fn new(tokens: Arc<TokenDecoder>, requirement: RoleRequirement) -> Self {
        Self {
            tokens,
            requirement,
        }
    }
}

/// Decode the session token and either pass the request on with its claims
/// attached or redirect.
pub async fn gate_middleware(
    State(gate): State<GateState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let sessions = snapshot::request_gate(&session, gate.tokens.clone()).await;

    match sessions.admit(&gate.requirement) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(target) => {
            tracing::debug!(
                path = %request.uri().path(),
                target = target.path(),
                "Redirecting gated request"
            );
            Redirect::to(target.path()).into_response()
        }
    }
}
