//! Presence tracking: who was heard from, and when.
//!
//! Presence is ephemeral bookkeeping — a last-seen timestamp per player
//! plus the round their connection is waiting on. It is never persisted
//! and never authoritative for duel state; its one job is feeding the
//! idle sweep that decides which duels to abort for abandonment.
//!
//! # Concurrency note
//!
//! `PresenceTracker` is NOT thread-safe by itself — it uses a plain
//! `HashMap`, not a concurrent one. It is owned by the engine and
//! accessed under the engine's mutex; keeping it simple here avoids
//! hidden locking overhead.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use quizduel_protocol::{DuelId, PlayerId};

/// One player's presence entry.
#[derive(Debug, Clone, Copy)]
pub struct Presence {
    pub player_id: PlayerId,
    /// When the player was last heard from.
    pub last_seen: Instant,
    /// The round the player's connection is waiting on, if it told us.
    pub waiting_round: Option<(DuelId, u32)>,
}

/// Tracks last-seen heartbeats for every player the engine knows about.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    seen: HashMap<PlayerId, Presence>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a heartbeat, creating the entry on first contact.
    ///
    /// `waiting_round` replaces the stored value every time: a heartbeat
    /// that doesn't name a round clears it, since the connection is
    /// evidently no longer blocked on one.
    pub fn heartbeat(
        &mut self,
        player_id: PlayerId,
        waiting_round: Option<(DuelId, u32)>,
    ) {
        let entry = Presence {
            player_id,
            last_seen: Instant::now(),
            waiting_round,
        };
        self.seen.insert(player_id, entry);
        tracing::trace!(%player_id, ?waiting_round, "heartbeat");
    }

    /// Drops a player's entry entirely, e.g. when their duel ends.
    pub fn forget(&mut self, player_id: PlayerId) {
        self.seen.remove(&player_id);
    }

    /// Players not heard from within `grace`.
    ///
    /// Pure scan, no mutation: the caller decides what an idle player
    /// means (abort their duel, drop their queue entry) and calls
    /// [`forget`](Self::forget) once it has acted.
    pub fn idle_players(&self, grace: Duration) -> Vec<PlayerId> {
        self.seen
            .values()
            .filter(|p| p.last_seen.elapsed() > grace)
            .map(|p| p.player_id)
            .collect()
    }

    pub fn get(&self, player_id: &PlayerId) -> Option<&Presence> {
        self.seen.get(player_id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
