use crate::state::{GameState, GameUpdate};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, trace};

/// Periodically decay the pet's health and broadcast the result
///
/// Runs for the lifetime of the process. Every tick broadcasts a snapshot
/// with no message, including ticks where the pet is already dead and
/// nothing changed.
pub async fn run_decay_scheduler(state: Arc<GameState>, period: Duration) {
    let mut ticker = interval(period);

    // Skip missed ticks to prevent a burst of decay after a stall
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick completes immediately; decay starts one period in
    ticker.tick().await;

    info!(period_ms = period.as_millis() as u64, "Decay scheduler started");

    loop {
        ticker.tick().await;

        let pet = state.decay_tick();
        trace!(health = pet.health, mood = %pet.mood, "Decay tick");

        state.broadcast(GameUpdate { pet, message: None });
    }
}
