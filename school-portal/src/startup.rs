use axum::{
    extract::{Path, State},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use service_core::middleware::request_id_middleware;
use std::collections::HashMap;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    app::{fallback, health_check, landing},
    auth::{login_handler, login_page, logout_handler},
    register::{register_handler, register_page},
    screens::render_screen,
};
use crate::middleware::{gate_middleware, GateState};
use crate::models::CurrentSession;
use crate::session::HOME_PATH;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.session.secure_cookie)
        .with_expiry(Expiry::OnInactivity(state.session.inactivity()));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/login", get(login_page).post(login_handler))
        .route("/logout", get(logout_handler).post(logout_handler))
        .route("/register", get(register_page).post(register_handler))
        .route(HOME_PATH, get(landing));

    // Every other policy entry is a gated screen.
    for entry in state.policy.entries() {
        if entry.path == HOME_PATH {
            continue;
        }

        let screen = entry.screen.clone();
        let gate = GateState::new(state.tokens.clone(), entry.requirement.clone());

        router = router.route(
            &entry.path,
            get(
                move |session: CurrentSession,
                      state: State<AppState>,
                      params: Option<Path<HashMap<String, String>>>| {
                    render_screen(screen.clone(), session, state, params)
                },
            )
            .layer(from_fn_with_state(gate, gate_middleware)),
        );
    }

    router
        .fallback(fallback)
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost, so the trace span sees the request id.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
