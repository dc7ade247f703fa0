// Shared pet state, decay scheduler and subscriber fan-out

mod decay;
mod engine;
mod entity;
mod subscribers;

pub use decay::run_decay_scheduler;
pub use engine::{
    ActionOutcome, GameState, CARESS_AMOUNT, FEED_AMOUNT, REVIVE_HEALTH, STRIKE_DAMAGE,
};
pub use entity::{Action, ActionKind, GameUpdate, Mood, Pet, HISTORY_LIMIT, SYSTEM_USER};
pub use subscribers::{FanOutReport, SubscriberRegistry, SUBSCRIBER_CAPACITY};

#[cfg(test)]
mod tests;
