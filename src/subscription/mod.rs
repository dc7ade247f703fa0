// Player sessions over WebSocket

pub mod manager;
pub mod protocol;

pub use manager::SessionManager;
pub use protocol::{ClientMessage, ServerMessage};
