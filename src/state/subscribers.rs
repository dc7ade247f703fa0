use crate::state::entity::GameUpdate;
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::trace;

/// Queued updates per subscriber before further updates are dropped
pub const SUBSCRIBER_CAPACITY: usize = 10;

/// Outcome of a single fan-out pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FanOutReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// Registry of connected observers and their delivery channels.
///
/// Every identity in `channels` is also in `connected` and vice versa.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    channels: HashMap<String, mpsc::Sender<GameUpdate>>,
    connected: HashSet<String>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user`, replacing any existing channel for that identity.
    ///
    /// The replaced sender is dropped, which closes the previous receiver.
    pub fn register(&mut self, user: &str) -> mpsc::Receiver<GameUpdate> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.channels.insert(user.to_string(), tx);
        self.connected.insert(user.to_string());
        rx
    }

    /// Remove `user`, closing its channel. Unknown identities are ignored.
    pub fn deregister(&mut self, user: &str) -> bool {
        let removed = self.channels.remove(user).is_some();
        self.connected.remove(user);
        removed
    }

    /// Try to enqueue `update` on every channel without blocking.
    ///
    /// Full queues drop this update for that subscriber only.
    pub fn fan_out(&self, update: &GameUpdate) -> FanOutReport {
        let mut report = FanOutReport::default();

        for (user, tx) in &self.channels {
            match tx.try_send(update.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    trace!(user = %user, "Subscriber queue full, dropping update");
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    trace!(user = %user, "Subscriber receiver gone, dropping update");
                    report.dropped += 1;
                }
            }
        }

        report
    }

    pub fn is_connected(&self, user: &str) -> bool {
        self.connected.contains(user)
    }

    /// Connected identities in sorted order
    pub fn connected_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.connected.iter().cloned().collect();
        users.sort();
        users
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
