//! Plain-text rendering of the pet for terminal-style clients.
//!
//! Produces the same layout for every transport: title, name, health bar,
//! mood, recent actions (newest first), last message and controls.

use crate::state::{ActionKind, Mood, Pet};
use std::fmt::Write;

const TITLE: &str = "🐾 JANKYPET 🐾";
const CONTROLS: &str = "f=feed  p=pet  h=hit  q=quit";
const BAR_WIDTH: u32 = 20;

pub fn mood_emoji(mood: Mood) -> &'static str {
    match mood {
        Mood::Happy => "😊",
        Mood::Content => "😌",
        Mood::Neutral => "😐",
        Mood::Sad => "😢",
        Mood::Angry => "😠",
        Mood::Dying => "💀",
        Mood::Dead => "☠️",
        Mood::Revived => "✨",
    }
}

/// Phrase shown after the acting user in the recent actions list
pub fn action_text(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Fed => "fed me! 🍎",
        ActionKind::Petted => "petted me! 💕",
        ActionKind::Hit => "hit me! 💥",
        ActionKind::Killed => "killed me! ☠️",
        ActionKind::Revived => "revived me! ✨",
        ActionKind::Died => "I died from neglect! 💀",
    }
}

/// Render a 20 cell health bar followed by `health/max`
pub fn health_bar(pet: &Pet) -> String {
    let filled = if pet.max_health == 0 {
        0
    } else {
        pet.health.min(pet.max_health) * BAR_WIDTH / pet.max_health
    };

    let mut bar = String::from("Health: ");
    for i in 0..BAR_WIDTH {
        bar.push(if i < filled { '█' } else { '░' });
    }
    let _ = write!(bar, " {}/{}", pet.health, pet.max_health);
    bar
}

/// Render the full view for `username`
pub fn render(pet: &Pet, username: &str, last_message: Option<&str>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}\n", TITLE);
    let _ = writeln!(out, "Name: {}", pet.name);
    let _ = writeln!(out, "{}", health_bar(pet));
    let _ = writeln!(out, "Mood: {} {}\n", mood_emoji(pet.mood), pet.mood);

    out.push_str("Recent Actions:\n");
    if pet.actions.is_empty() {
        out.push_str("  No actions yet...\n");
    } else {
        for action in pet.actions.iter().rev() {
            let _ = writeln!(out, "  {} {}", action.user, action_text(action.kind));
        }
    }
    out.push('\n');

    if let Some(message) = last_message.filter(|m| !m.is_empty()) {
        let _ = writeln!(out, ">>> {}\n", message);
    }

    let _ = writeln!(out, "{}", CONTROLS);
    let _ = write!(out, "Connected as: {}", username);

    out
}
