use crate::state::Pet;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Client → Server message types
///
/// Accepts JSON (`{"type": "feed"}`) or the single-key shorthand used by
/// terminal clients (`f`, `p`, `h`, `q`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Feed,
    Pet,
    Hit,
    Quit,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        match trimmed {
            "f" => return Ok(ClientMessage::Feed),
            "p" => return Ok(ClientMessage::Pet),
            "h" => return Ok(ClientMessage::Hit),
            "q" => return Ok(ClientMessage::Quit),
            _ => {}
        }

        if !trimmed.starts_with('{') {
            bail!("unknown command '{}'", trimmed);
        }
        Ok(serde_json::from_str(trimmed)?)
    }
}

/// Server → Client message types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// A state change pushed from the fan-out
    Update {
        pet: Pet,
        message: Option<String>,
        view: String,
    },
    /// Reply to this client's own action
    #[serde(rename = "result")]
    ActionResult { message: String, view: String },
    Error { error: String },
}

impl ServerMessage {
    pub fn error(error: impl Into<String>) -> Self {
        ServerMessage::Error {
            error: error.into(),
        }
    }
}
