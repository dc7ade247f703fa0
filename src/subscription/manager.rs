use crate::state::{GameState, GameUpdate, Pet};
use crate::subscription::protocol::{ClientMessage, ServerMessage};
use crate::view;
use axum::extract::ws::{Message, WebSocket};
use futures::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Manages a single player session over a WebSocket
pub struct SessionManager {
    user: String,
    state: Arc<GameState>,
    /// Most recent message shown in the rendered view
    last_message: Option<String>,
}

impl SessionManager {
    pub fn new(user: impl Into<String>, state: Arc<GameState>) -> Self {
        Self {
            user: user.into(),
            state,
            last_message: None,
        }
    }

    /// Handle the session lifecycle until the client quits, disconnects or
    /// the subscription channel is closed.
    pub async fn handle(mut self, socket: WebSocket, mut updates: mpsc::Receiver<GameUpdate>) {
        info!(user = %self.user, "Session started");

        let (mut sender, mut receiver) = socket.split();

        let initial = self.render_update(self.state.snapshot(), None);
        if let Err(e) = send_message(&mut sender, &initial).await {
            error!(user = %self.user, error = %e, "Failed to send initial state");
            self.close(&updates);
            return;
        }

        loop {
            tokio::select! {
                // Handle incoming client messages
                msg = receiver.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            let Some(reply) = self.handle_client_message(&text) else {
                                info!(user = %self.user, "Client quit");
                                break;
                            };
                            if let Err(e) = send_message(&mut sender, &reply).await {
                                error!(user = %self.user, error = %e, "Failed to send reply");
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(user = %self.user, "WebSocket client disconnected");
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = sender.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Some(Ok(_)) => {
                            // Ignore binary, pong messages
                        }
                        Some(Err(e)) => {
                            warn!(user = %self.user, error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                // Forward fan-out updates
                update = updates.recv() => {
                    match update {
                        Some(update) => {
                            let msg = self.on_update(update);
                            if let Err(e) = send_message(&mut sender, &msg).await {
                                error!(user = %self.user, error = %e, "Failed to send update");
                                break;
                            }
                        }
                        None => {
                            info!(user = %self.user, "Subscription closed");
                            break;
                        }
                    }
                }
            }
        }

        self.close(&updates);
        info!(user = %self.user, "Session ended");
    }

    /// Unsubscribe unless a newer session has taken over this identity
    fn close(&self, updates: &mpsc::Receiver<GameUpdate>) {
        self.state.unsubscribe_if_current(&self.user, updates);
    }

    /// Apply a client command. Returns `None` when the client quits.
    pub fn handle_client_message(&mut self, text: &str) -> Option<ServerMessage> {
        let command = match ClientMessage::parse(text) {
            Ok(command) => command,
            Err(e) => {
                debug!(user = %self.user, error = %e, "Invalid client message");
                return Some(ServerMessage::error(e.to_string()));
            }
        };

        let outcome = match command {
            ClientMessage::Feed => self.state.feed_outcome(&self.user),
            ClientMessage::Pet => self.state.caress_outcome(&self.user),
            ClientMessage::Hit => self.state.strike_outcome(&self.user),
            ClientMessage::Quit => return None,
        };

        self.last_message = Some(outcome.message.clone());
        let view = view::render(&outcome.pet, &self.user, Some(&outcome.message));
        Some(ServerMessage::ActionResult {
            message: outcome.message,
            view,
        })
    }

    /// Turn a fan-out update into a frame for this client
    pub fn on_update(&mut self, update: GameUpdate) -> ServerMessage {
        if let Some(message) = update.message.as_ref().filter(|m| !m.is_empty()) {
            self.last_message = Some(message.clone());
        }
        self.render_update(update.pet, update.message)
    }

    fn render_update(&self, pet: Pet, message: Option<String>) -> ServerMessage {
        let view = view::render(&pet, &self.user, self.last_message.as_deref());
        ServerMessage::Update { pet, message, view }
    }
}

async fn send_message<S>(sender: &mut S, msg: &ServerMessage) -> anyhow::Result<()>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg)?;
    sender.send(Message::Text(json)).await?;
    Ok(())
}
