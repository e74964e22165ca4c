use axum::{
    extract::{Path, State},
    Json,
};
use std::collections::HashMap;

use crate::models::{CurrentSession, ScreenView, UserContext};
use crate::AppState;

/// Descriptor for a gated screen: who is looking and where they may go next.
pub async fn render_screen(
    screen: String,
    CurrentSession(claims): CurrentSession,
    State(state): State<AppState>,
    params: Option<Path<HashMap<String, String>>>,
) -> Json<ScreenView> {
    let navigation = state.policy.screens_for(claims.role());

    Json(ScreenView {
        screen,
        user: UserContext::from(&claims),
        navigation,
        params: params.map(|Path(params)| params).unwrap_or_default(),
    })
}
