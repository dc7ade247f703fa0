use crate::api::AppState;
use crate::state::Pet;
use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Connected users response
#[derive(Serialize)]
pub struct UsersResponse {
    pub count: usize,
    pub users: Vec<String>,
}

/// Create query API router
pub fn create_query_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/pet", get(get_pet))
        .route("/api/users", get(list_users))
        .with_state(state)
}

/// GET /api/pet - Current pet snapshot
async fn get_pet(State(state): State<Arc<AppState>>) -> Json<Pet> {
    Json(state.game.snapshot())
}

/// GET /api/users - Identities with a live subscription
async fn list_users(State(state): State<Arc<AppState>>) -> Json<UsersResponse> {
    let users = state.game.connected_users();
    Json(UsersResponse {
        count: users.len(),
        users,
    })
}
