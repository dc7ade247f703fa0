use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Number of actions retained in a pet's history
pub const HISTORY_LIMIT: usize = 5;

/// Reserved identity used for scheduler-driven actions
pub const SYSTEM_USER: &str = "system";

/// Mood of the pet, derived from health and the most recent action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Neutral,
    Happy,
    Content,
    Sad,
    Dying,
    Angry,
    Dead,
    Revived,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::Content => "content",
            Mood::Sad => "sad",
            Mood::Dying => "dying",
            Mood::Angry => "angry",
            Mood::Dead => "dead",
            Mood::Revived => "revived",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of mutation recorded in the action log
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fed,
    Petted,
    Hit,
    Killed,
    Revived,
    Died,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Fed => "fed",
            ActionKind::Petted => "petted",
            ActionKind::Hit => "hit",
            ActionKind::Killed => "killed",
            ActionKind::Revived => "revived",
            ActionKind::Died => "died",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in the pet's action log
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Identity that triggered the action (`system` for decay deaths)
    pub user: String,

    #[serde(rename = "type")]
    pub kind: ActionKind,

    pub timestamp: DateTime<Utc>,
}

/// The single shared pet.
///
/// Cloning produces an independent snapshot that can be handed to any
/// consumer without further synchronization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,

    /// Always within `0..=max_health`; zero means dead
    pub health: u32,

    pub max_health: u32,

    pub mood: Mood,

    pub last_fed: DateTime<Utc>,

    pub last_pet: DateTime<Utc>,

    /// Most recent actions, oldest first, at most `HISTORY_LIMIT` long
    pub actions: VecDeque<Action>,
}

impl Pet {
    /// Create a fresh pet with an empty history.
    ///
    /// The mood starts neutral, or dead when the capped health is zero.
    pub fn new(name: impl Into<String>, health: u32, max_health: u32) -> Self {
        let now = Utc::now();
        let health = health.min(max_health);
        Self {
            name: name.into(),
            health,
            max_health,
            mood: if health == 0 { Mood::Dead } else { Mood::Neutral },
            last_fed: now,
            last_pet: now,
            actions: VecDeque::with_capacity(HISTORY_LIMIT + 1),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Append an action and evict from the front past the history limit
    pub(crate) fn record_action(&mut self, user: &str, kind: ActionKind) {
        self.actions.push_back(Action {
            user: user.to_string(),
            kind,
            timestamp: Utc::now(),
        });
        while self.actions.len() > HISTORY_LIMIT {
            self.actions.pop_front();
        }
    }

    /// Add health, saturating at `max_health`
    pub(crate) fn heal(&mut self, amount: u32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }

    /// Remove health, saturating at zero
    pub(crate) fn wound(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }
}

/// Update message fanned out to every subscriber
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameUpdate {
    pub pet: Pet,

    /// Human-readable description; `None` for decay ticks
    pub message: Option<String>,
}
