use crate::api::{normalize_user, ApiError, AppState};
use crate::state::{ActionOutcome, GameState, Pet};
use axum::{
    extract::State,
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Action request body
#[derive(Deserialize)]
pub struct ActionRequest {
    pub user: Option<String>,
}

/// Action response: the caller-facing message and the resulting pet
#[derive(Serialize)]
pub struct ActionResponse {
    pub message: String,
    pub pet: Pet,
}

/// Create action API router
pub fn create_action_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/pet/feed", post(feed))
        .route("/api/pet/pet", post(caress))
        .route("/api/pet/hit", post(strike))
        .with_state(state)
}

fn run_action(
    state: &AppState,
    request: ActionRequest,
    name: &str,
    action: fn(&GameState, &str) -> ActionOutcome,
) -> Result<Json<ActionResponse>, ApiError> {
    let user = normalize_user(request.user.as_deref())?;
    let ActionOutcome { message, pet } = action(&state.game, &user);

    info!(user = %user, action = name, "Action received");

    Ok(Json(ActionResponse { message, pet }))
}

/// POST /api/pet/feed - Feed (or revive) the pet
async fn feed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(&state, request, "feed", GameState::feed_outcome)
}

/// POST /api/pet/pet - Pet the pet
async fn caress(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(&state, request, "pet", GameState::caress_outcome)
}

/// POST /api/pet/hit - Hit the pet
async fn strike(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    run_action(&state, request, "hit", GameState::strike_outcome)
}
