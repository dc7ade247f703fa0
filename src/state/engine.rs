use crate::config::GameConfig;
use crate::state::entity::{ActionKind, GameUpdate, Mood, Pet, SYSTEM_USER};
use crate::state::subscribers::{FanOutReport, SubscriberRegistry};
use chrono::Utc;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Health restored by feeding
pub const FEED_AMOUNT: u32 = 15;

/// Health restored by petting
pub const CARESS_AMOUNT: u32 = 5;

/// Health removed by a hit
pub const STRIKE_DAMAGE: u32 = 20;

/// Health a dead pet comes back with when fed
pub const REVIVE_HEALTH: u32 = 30;

/// Health removed per decay tick
pub const DECAY_AMOUNT: u32 = 1;

/// Below this health the decay tick sets the mood to `dying`
pub const DYING_THRESHOLD: u32 = 20;

/// Below this health the decay tick sets the mood to `sad`
pub const SAD_THRESHOLD: u32 = 40;

/// Result of a player action: the caller-facing message and the pet
/// exactly as that action left it
#[derive(Clone, Debug)]
pub struct ActionOutcome {
    pub message: String,
    pub pet: Pet,
}

struct Inner {
    pet: Pet,
    subscribers: SubscriberRegistry,
}

/// Game state holds the one shared pet and the subscriber registry.
///
/// A single read/write lock guards both. Mutations hold the write lock only
/// long enough to update the pet and copy a snapshot; fan-out runs after the
/// write lock is released, under the read lock.
pub struct GameState {
    inner: RwLock<Inner>,
}

impl GameState {
    /// Create game state with a fresh pet built from `config`
    pub fn new(config: &GameConfig) -> Self {
        let pet = Pet::new(
            config.pet_name.clone(),
            config.initial_health,
            config.max_health,
        );

        info!(
            name = %pet.name,
            health = pet.health,
            max_health = pet.max_health,
            "Pet created"
        );

        Self {
            inner: RwLock::new(Inner {
                pet,
                subscribers: SubscriberRegistry::new(),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `user` and return its delivery channel.
    ///
    /// Subscribing an identity that is already registered replaces its
    /// channel and closes the previous one.
    pub fn subscribe(&self, user: &str) -> mpsc::Receiver<GameUpdate> {
        let mut inner = self.write();
        let replaced = inner.subscribers.is_connected(user);
        let rx = inner.subscribers.register(user);

        info!(
            user = %user,
            replaced = replaced,
            subscribers = inner.subscribers.len(),
            "User subscribed"
        );
        rx
    }

    /// Deregister `user` and close its channel. Unknown users are a no-op.
    pub fn unsubscribe(&self, user: &str) {
        let mut inner = self.write();
        if inner.subscribers.deregister(user) {
            info!(
                user = %user,
                subscribers = inner.subscribers.len(),
                "User unsubscribed"
            );
        }
    }

    /// Deregister `user` only while `updates` is still its live channel.
    ///
    /// A later subscription under the same identity drops the previous
    /// sender under the write lock, so a closed `updates` means the
    /// registration now belongs to another session. Returns whether the
    /// identity was removed.
    pub fn unsubscribe_if_current(
        &self,
        user: &str,
        updates: &mpsc::Receiver<GameUpdate>,
    ) -> bool {
        let mut inner = self.write();
        if updates.is_closed() {
            debug!(user = %user, "Channel already replaced, keeping registration");
            return false;
        }

        let removed = inner.subscribers.deregister(user);
        if removed {
            info!(
                user = %user,
                subscribers = inner.subscribers.len(),
                "User unsubscribed"
            );
        }
        removed
    }

    /// Point-in-time copy of the pet
    pub fn snapshot(&self) -> Pet {
        self.read().pet.clone()
    }

    /// Identities currently subscribed, sorted
    pub fn connected_users(&self) -> Vec<String> {
        self.read().subscribers.connected_users()
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().subscribers.len()
    }

    /// Deliver `update` to every subscriber without blocking.
    pub fn broadcast(&self, update: GameUpdate) -> FanOutReport {
        let report = self.read().subscribers.fan_out(&update);
        if report.dropped > 0 {
            debug!(
                delivered = report.delivered,
                dropped = report.dropped,
                "Broadcast dropped updates for slow subscribers"
            );
        }
        report
    }

    /// Feed the pet, reviving it if it is dead
    pub fn feed(&self, user: &str) -> String {
        self.feed_outcome(user).message
    }

    /// Feed the pet and return the message with the pet as this feed left it
    pub fn feed_outcome(&self, user: &str) -> ActionOutcome {
        let (pet, revived) = {
            let mut inner = self.write();
            let pet = &mut inner.pet;

            let revived = if pet.is_dead() {
                pet.health = REVIVE_HEALTH.min(pet.max_health);
                pet.mood = Mood::Revived;
                pet.record_action(user, ActionKind::Revived);
                true
            } else {
                pet.heal(FEED_AMOUNT);
                pet.last_fed = Utc::now();
                pet.mood = Mood::Happy;
                pet.record_action(user, ActionKind::Fed);
                false
            };

            (pet.clone(), revived)
        };

        let name = pet.name.clone();
        debug!(user = %user, revived = revived, health = pet.health, "Pet fed");

        let (broadcast, message) = if revived {
            (
                format!("{} revived {}!", user, name),
                format!("You revived {}!", name),
            )
        } else {
            (
                format!("{} fed {}!", user, name),
                format!("You fed {}!", name),
            )
        };

        self.broadcast(GameUpdate {
            pet: pet.clone(),
            message: Some(broadcast),
        });
        ActionOutcome { message, pet }
    }

    /// Pet the pet. Dead pets cannot be petted.
    pub fn caress(&self, user: &str) -> String {
        self.caress_outcome(user).message
    }

    pub fn caress_outcome(&self, user: &str) -> ActionOutcome {
        let pet = {
            let mut inner = self.write();
            let pet = &mut inner.pet;

            if pet.is_dead() {
                return ActionOutcome {
                    message: "Can't pet a dead pet!".to_string(),
                    pet: pet.clone(),
                };
            }

            pet.heal(CARESS_AMOUNT);
            pet.last_pet = Utc::now();
            if pet.mood != Mood::Happy {
                pet.mood = Mood::Content;
            }
            pet.record_action(user, ActionKind::Petted);

            pet.clone()
        };

        let name = pet.name.clone();
        debug!(user = %user, health = pet.health, mood = %pet.mood, "Pet petted");

        self.broadcast(GameUpdate {
            pet: pet.clone(),
            message: Some(format!("{} petted {}!", user, name)),
        });
        ActionOutcome {
            message: format!("You petted {}!", name),
            pet,
        }
    }

    /// Hit the pet, killing it if health drops to zero
    pub fn strike(&self, user: &str) -> String {
        self.strike_outcome(user).message
    }

    pub fn strike_outcome(&self, user: &str) -> ActionOutcome {
        let pet = {
            let mut inner = self.write();
            let pet = &mut inner.pet;

            if pet.is_dead() {
                return ActionOutcome {
                    message: "Stop! It's already dead!".to_string(),
                    pet: pet.clone(),
                };
            }

            pet.wound(STRIKE_DAMAGE);
            if pet.is_dead() {
                pet.mood = Mood::Dead;
                pet.record_action(user, ActionKind::Killed);
            } else {
                pet.mood = Mood::Angry;
                pet.record_action(user, ActionKind::Hit);
            }

            pet.clone()
        };

        let name = pet.name.clone();
        let killed = pet.is_dead();
        debug!(user = %user, health = pet.health, killed = killed, "Pet hit");

        self.broadcast(GameUpdate {
            pet: pet.clone(),
            message: Some(format!("{} hit {}!", user, name)),
        });

        let message = if killed {
            format!("You killed {}! 💀", name)
        } else {
            format!("You hit {}! 😢", name)
        };
        ActionOutcome { message, pet }
    }

    /// Apply one decay step and return the resulting snapshot.
    ///
    /// Dead pets are left untouched. Decay only lowers the mood tier.
    pub fn decay_tick(&self) -> Pet {
        let mut inner = self.write();
        let pet = &mut inner.pet;

        if !pet.is_dead() {
            pet.wound(DECAY_AMOUNT);

            if pet.is_dead() {
                pet.mood = Mood::Dead;
                pet.record_action(SYSTEM_USER, ActionKind::Died);
                info!(name = %pet.name, "Pet died from neglect");
            } else if pet.health < DYING_THRESHOLD {
                pet.mood = Mood::Dying;
            } else if pet.health < SAD_THRESHOLD {
                pet.mood = Mood::Sad;
            }
        }

        pet.clone()
    }

    #[cfg(test)]
    pub(crate) fn set_health(&self, health: u32) {
        let mut inner = self.write();
        inner.pet.health = health.min(inner.pet.max_health);
        if inner.pet.health == 0 {
            inner.pet.mood = Mood::Dead;
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}
