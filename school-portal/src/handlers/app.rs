use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use tower_sessions::Session;

use crate::session::{snapshot, HOME_PATH};
use crate::AppState;

pub async fn health_check() -> &'static str {
    "OK"
}

/// Generic home route: send the visitor to their role's landing screen.
pub async fn landing(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let target = snapshot::request_gate(&session, state.tokens.clone())
        .await
        .resolve_home();

    Redirect::to(target.path())
}

pub async fn fallback() -> impl IntoResponse {
    Redirect::to(HOME_PATH)
}
