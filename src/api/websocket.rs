use crate::api::{normalize_user, AppState};
use crate::subscription::SessionManager;
use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        Query, Request, State,
    },
    Extension,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Query parameters for WebSocket upgrade
#[derive(Deserialize)]
pub struct WsQuery {
    user: Option<String>,
}

/// Normalized identity attached to the request by `ws_identity`
#[derive(Clone, Debug)]
struct SessionUser(String);

/// Identity middleware: rejects a missing or invalid ?user= with 400.
///
/// Runs as a tower layer BEFORE WebSocket upgrade extraction so the error is
/// returned cleanly instead of an upgrade failure. On success the normalized
/// name is stored as a `SessionUser` request extension.
async fn ws_identity(Query(params): Query<WsQuery>, mut req: Request, next: Next) -> Response {
    match normalize_user(params.user.as_deref()) {
        Ok(user) => {
            req.extensions_mut().insert(SessionUser(user));
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// GET /api/ws?user=<name> - WebSocket upgrade handler (identity checked by ws_identity)
async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(SessionUser(user)): Extension<SessionUser>,
    State(state): State<Arc<AppState>>,
) -> Response {
    info!(user = %user, "WebSocket upgrade request received");
    ws.on_upgrade(move |socket| handle_socket(socket, user, state))
}

/// Create WebSocket router with identity middleware applied
pub fn create_ws_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/ws", get(ws_handler))
        .route_layer(middleware::from_fn(ws_identity))
        .with_state(state)
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, user: String, state: Arc<AppState>) {
    // Subscribe before the initial snapshot so no update is missed
    let updates = state.game.subscribe(&user);

    let manager = SessionManager::new(user, Arc::clone(&state.game));
    manager.handle(socket, updates).await;
}
