use super::*;
use crate::config::GameConfig;
use std::sync::Arc;
use std::thread;

fn assert_invariants(pet: &Pet) {
    assert!(pet.health <= pet.max_health);
    assert!(pet.actions.len() <= HISTORY_LIMIT);
    if pet.mood == Mood::Dead {
        assert_eq!(pet.health, 0);
    }
    if pet.health == 0 {
        assert_eq!(pet.mood, Mood::Dead);
    }
}

#[test]
fn test_initial_pet() {
    let state = GameState::default();
    let pet = state.snapshot();

    assert_eq!(pet.name, "Jankypet");
    assert_eq!(pet.health, 50);
    assert_eq!(pet.max_health, 100);
    assert_eq!(pet.mood, Mood::Neutral);
    assert!(pet.actions.is_empty());
}

#[test]
fn test_feed_heals_and_makes_happy() {
    let state = GameState::default();

    let msg = state.feed("alice");
    assert_eq!(msg, "You fed Jankypet!");

    let pet = state.snapshot();
    assert_eq!(pet.health, 50 + FEED_AMOUNT);
    assert_eq!(pet.mood, Mood::Happy);
    assert_eq!(pet.actions.back().unwrap().kind, ActionKind::Fed);
    assert_eq!(pet.actions.back().unwrap().user, "alice");
}

#[test]
fn test_feed_clamps_to_max_health() {
    let state = GameState::default();
    for _ in 0..10 {
        state.feed("alice");
    }
    assert_eq!(state.snapshot().health, 100);
}

#[test]
fn test_feed_revives_dead_pet() {
    let state = GameState::default();
    state.set_health(0);

    let msg = state.feed("bob");
    assert_eq!(msg, "You revived Jankypet!");

    let pet = state.snapshot();
    assert_eq!(pet.health, REVIVE_HEALTH);
    assert_eq!(pet.mood, Mood::Revived);
    assert_eq!(pet.actions.back().unwrap().kind, ActionKind::Revived);
}

#[test]
fn test_revive_after_fatal_hit_always_yields_thirty() {
    let state = GameState::default();
    state.set_health(100);
    for _ in 0..5 {
        state.strike("mallory");
    }
    assert!(state.snapshot().is_dead());

    state.feed("alice");
    let pet = state.snapshot();
    assert_eq!(pet.health, 30);
    assert_eq!(pet.mood, Mood::Revived);
}

#[test]
fn test_caress_sets_content_unless_happy() {
    let state = GameState::default();

    assert_eq!(state.caress("alice"), "You petted Jankypet!");
    let pet = state.snapshot();
    assert_eq!(pet.health, 50 + CARESS_AMOUNT);
    assert_eq!(pet.mood, Mood::Content);
    assert_eq!(pet.actions.back().unwrap().kind, ActionKind::Petted);

    state.feed("alice");
    state.caress("alice");
    assert_eq!(state.snapshot().mood, Mood::Happy);
}

#[test]
fn test_caress_dead_pet_is_noop() {
    let state = GameState::default();
    state.set_health(0);
    let mut rx = state.subscribe("watcher");

    assert_eq!(state.caress("alice"), "Can't pet a dead pet!");

    let pet = state.snapshot();
    assert_eq!(pet.health, 0);
    assert!(pet.actions.is_empty());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_strike_survivable() {
    let state = GameState::default();

    assert_eq!(state.strike("mallory"), "You hit Jankypet! 😢");
    let pet = state.snapshot();
    assert_eq!(pet.health, 50 - STRIKE_DAMAGE);
    assert_eq!(pet.mood, Mood::Angry);
    assert_eq!(pet.actions.back().unwrap().kind, ActionKind::Hit);
}

#[test]
fn test_strike_at_fifteen_kills() {
    let state = GameState::default();
    state.set_health(15);

    assert_eq!(state.strike("mallory"), "You killed Jankypet! 💀");
    let pet = state.snapshot();
    assert_eq!(pet.health, 0);
    assert_eq!(pet.mood, Mood::Dead);
    assert_eq!(pet.actions.back().unwrap().kind, ActionKind::Killed);
}

#[test]
fn test_strike_at_exactly_twenty_kills() {
    let state = GameState::default();
    state.set_health(20);

    state.strike("mallory");
    let pet = state.snapshot();
    assert_eq!(pet.health, 0);
    assert_eq!(pet.actions.back().unwrap().kind, ActionKind::Killed);
}

#[test]
fn test_strike_dead_pet_is_noop() {
    let state = GameState::default();
    state.set_health(0);
    let mut rx = state.subscribe("watcher");

    assert_eq!(state.strike("mallory"), "Stop! It's already dead!");
    assert!(state.snapshot().actions.is_empty());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_actions_broadcast_with_message() {
    let state = GameState::default();
    let mut rx = state.subscribe("watcher");

    state.feed("alice");
    state.caress("bob");
    state.strike("carol");

    let fed = rx.try_recv().unwrap();
    assert_eq!(fed.message.as_deref(), Some("alice fed Jankypet!"));
    assert_eq!(fed.pet.health, 65);

    let petted = rx.try_recv().unwrap();
    assert_eq!(petted.message.as_deref(), Some("bob petted Jankypet!"));

    let hit = rx.try_recv().unwrap();
    assert_eq!(hit.message.as_deref(), Some("carol hit Jankypet!"));
    assert_eq!(hit.pet.health, 50);
}

#[test]
fn test_revive_broadcast_message() {
    let state = GameState::default();
    state.set_health(0);
    let mut rx = state.subscribe("watcher");

    state.feed("alice");
    let update = rx.try_recv().unwrap();
    assert_eq!(update.message.as_deref(), Some("alice revived Jankypet!"));
}

#[test]
fn test_fatal_hit_broadcasts_hit_message() {
    let state = GameState::default();
    state.set_health(10);
    let mut rx = state.subscribe("watcher");

    state.strike("mallory");
    let update = rx.try_recv().unwrap();
    assert_eq!(update.message.as_deref(), Some("mallory hit Jankypet!"));
    assert!(update.pet.is_dead());
}

#[test]
fn test_snapshot_is_independent_copy() {
    let state = GameState::default();
    let before = state.snapshot();

    state.feed("alice");

    assert_eq!(before.health, 50);
    assert!(before.actions.is_empty());
}

#[test]
fn test_history_bounded_to_most_recent() {
    let state = GameState::default();
    for i in 0..12 {
        state.caress(&format!("user_{}", i));
    }

    let pet = state.snapshot();
    assert_eq!(pet.actions.len(), HISTORY_LIMIT);
    let users: Vec<&str> = pet.actions.iter().map(|a| a.user.as_str()).collect();
    assert_eq!(users, vec!["user_7", "user_8", "user_9", "user_10", "user_11"]);
}

#[test]
fn test_decay_tick_mood_thresholds() {
    let state = GameState::default();

    state.set_health(41);
    state.feed("alice");
    state.set_health(41);
    let pet = state.decay_tick();
    assert_eq!(pet.health, 40);
    assert_eq!(pet.mood, Mood::Happy);

    let pet = state.decay_tick();
    assert_eq!(pet.health, 39);
    assert_eq!(pet.mood, Mood::Sad);

    state.set_health(20);
    let pet = state.decay_tick();
    assert_eq!(pet.health, 19);
    assert_eq!(pet.mood, Mood::Dying);
}

#[test]
fn test_decay_tick_death_and_no_further_decay() {
    let state = GameState::default();
    state.set_health(1);

    let pet = state.decay_tick();
    assert_eq!(pet.health, 0);
    assert_eq!(pet.mood, Mood::Dead);
    let died = pet.actions.back().unwrap();
    assert_eq!(died.kind, ActionKind::Died);
    assert_eq!(died.user, SYSTEM_USER);

    let pet = state.decay_tick();
    assert_eq!(pet.health, 0);
    assert_eq!(pet.actions.len(), 1);
}

#[test]
fn test_unsubscribe_twice_is_noop() {
    let state = GameState::default();
    let _rx = state.subscribe("alice");
    assert_eq!(state.connected_users(), vec!["alice"]);

    state.unsubscribe("alice");
    state.unsubscribe("alice");
    state.unsubscribe("never-subscribed");

    assert!(state.connected_users().is_empty());
    assert_eq!(state.subscriber_count(), 0);
}

#[test]
fn test_unsubscribe_closes_channel() {
    let state = GameState::default();
    let mut rx = state.subscribe("alice");
    state.feed("bob");
    state.unsubscribe("alice");

    // Queued updates drain, then the channel reports closed
    assert!(rx.try_recv().is_ok());
    assert!(matches!(
        rx.try_recv(),
        Err(tokio::sync::mpsc::error::TryRecvError::Disconnected)
    ));
}

#[test]
fn test_resubscribe_replaces_and_closes_previous_channel() {
    let state = GameState::default();
    let mut first = state.subscribe("alice");
    let mut second = state.subscribe("alice");

    assert_eq!(state.subscriber_count(), 1);
    assert!(matches!(
        first.try_recv(),
        Err(tokio::sync::mpsc::error::TryRecvError::Disconnected)
    ));

    state.feed("bob");
    assert!(second.try_recv().is_ok());
}

#[test]
fn test_slow_subscriber_does_not_block_others() {
    let state = GameState::default();
    let _stalled = state.subscribe("stalled");
    let mut active = state.subscribe("active");

    for _ in 0..(SUBSCRIBER_CAPACITY * 3) {
        state.caress("alice");
        // Active reader keeps up; the stalled one never reads
        assert!(active.try_recv().is_ok());
    }

    let report = state.broadcast(GameUpdate {
        pet: state.snapshot(),
        message: None,
    });
    assert_eq!(report, FanOutReport { delivered: 1, dropped: 1 });
}

#[test]
fn test_concurrent_feed_and_hit() {
    let state = Arc::new(GameState::default());
    let mut handles = vec![];

    for i in 0..10 {
        let state_clone = Arc::clone(&state);
        let handle = thread::spawn(move || {
            let user = format!("user_{}", i);
            if i % 2 == 0 {
                state_clone.feed(&user);
            } else {
                state_clone.strike(&user);
            }
            assert_invariants(&state_clone.snapshot());
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let pet = state.snapshot();
    assert_invariants(&pet);
    assert_eq!(pet.actions.len(), HISTORY_LIMIT);
}

#[test]
fn test_concurrent_pair_records_both_actions() {
    let state = Arc::new(GameState::default());

    let feeder = {
        let state = Arc::clone(&state);
        thread::spawn(move || state.feed("alice"))
    };
    let hitter = {
        let state = Arc::clone(&state);
        thread::spawn(move || state.strike("mallory"))
    };
    feeder.join().unwrap();
    hitter.join().unwrap();

    let pet = state.snapshot();
    assert_eq!(pet.health, 45);
    assert_eq!(pet.actions.len(), 2);
    let users: Vec<&str> = pet.actions.iter().map(|a| a.user.as_str()).collect();
    assert!(users.contains(&"alice"));
    assert!(users.contains(&"mallory"));
}

#[test]
fn test_concurrent_mixed_operations_keep_invariants() {
    let state = Arc::new(GameState::new(&GameConfig::default()));
    let mut handles = vec![];

    for i in 0..8 {
        let state_clone = Arc::clone(&state);
        handles.push(thread::spawn(move || {
            let user = format!("user_{}", i);
            let _rx = state_clone.subscribe(&user);
            for step in 0..50 {
                match (i + step) % 4 {
                    0 => {
                        state_clone.feed(&user);
                    }
                    1 => {
                        state_clone.caress(&user);
                    }
                    2 => {
                        state_clone.strike(&user);
                    }
                    _ => {
                        state_clone.decay_tick();
                    }
                }
                assert_invariants(&state_clone.snapshot());
            }
            state_clone.unsubscribe(&user);
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_invariants(&state.snapshot());
    assert!(state.connected_users().is_empty());
}

#[test]
fn test_unsubscribe_if_current_keeps_takeover() {
    let state = GameState::default();
    let old_rx = state.subscribe("alice");
    let mut new_rx = state.subscribe("alice");

    assert!(!state.unsubscribe_if_current("alice", &old_rx));
    assert_eq!(state.connected_users(), vec!["alice"]);
    assert!(!new_rx.is_closed());

    state.feed("bob");
    assert!(new_rx.try_recv().is_ok());
}

#[test]
fn test_unsubscribe_if_current_removes_live_channel() {
    let state = GameState::default();
    let rx = state.subscribe("alice");

    assert!(state.unsubscribe_if_current("alice", &rx));
    assert!(state.connected_users().is_empty());
    assert!(rx.is_closed());
    assert!(!state.unsubscribe_if_current("alice", &rx));
}

#[test]
fn test_concurrent_takeover_and_close_keeps_new_session() {
    for _ in 0..200 {
        let state = Arc::new(GameState::default());
        let old_rx = state.subscribe("alice");

        let state_clone = Arc::clone(&state);
        let takeover = thread::spawn(move || state_clone.subscribe("alice"));

        state.unsubscribe_if_current("alice", &old_rx);
        let new_rx = takeover.join().unwrap();

        assert!(!new_rx.is_closed());
        assert_eq!(state.connected_users(), vec!["alice"]);
    }
}

#[test]
fn test_outcome_pet_reflects_own_action_under_contention() {
    let state = Arc::new(GameState::default());
    let mut handles = vec![];

    for i in 0..8 {
        let state_clone = Arc::clone(&state);
        handles.push(thread::spawn(move || {
            let user = format!("user_{}", i);
            for step in 0..50 {
                if (i + step) % 2 == 0 {
                    let outcome = state_clone.feed_outcome(&user);
                    let last = outcome.pet.actions.back().unwrap();
                    assert_eq!(last.user, user);
                    assert!(matches!(last.kind, ActionKind::Fed | ActionKind::Revived));
                    assert_invariants(&outcome.pet);
                } else {
                    let outcome = state_clone.strike_outcome(&user);
                    assert_invariants(&outcome.pet);
                    if outcome.message.starts_with("Stop!") {
                        assert!(outcome.pet.is_dead());
                    } else {
                        let last = outcome.pet.actions.back().unwrap();
                        assert_eq!(last.user, user);
                        assert!(matches!(last.kind, ActionKind::Hit | ActionKind::Killed));
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_rejected_outcome_returns_current_pet() {
    let state = GameState::default();
    state.set_health(0);

    let outcome = state.caress_outcome("alice");
    assert_eq!(outcome.message, "Can't pet a dead pet!");
    assert_eq!(outcome.pet.mood, Mood::Dead);
    assert!(outcome.pet.actions.is_empty());
}

#[test]
fn test_zero_initial_health_starts_dead() {
    let config = GameConfig {
        initial_health: 0,
        ..GameConfig::default()
    };
    let state = GameState::new(&config);

    assert_invariants(&state.snapshot());
    assert_eq!(state.caress("alice"), "Can't pet a dead pet!");
    assert_eq!(state.feed("alice"), "You revived Jankypet!");
}
