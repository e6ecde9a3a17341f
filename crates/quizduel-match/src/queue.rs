//! The waiting set and the pairing scan.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use quizduel_protocol::{CategoryId, DuelId, PlayerId};
use rand::Rng;

use crate::MatchError;

/// Counter for generating unique duel IDs.
static NEXT_DUEL_ID: AtomicU64 = AtomicU64::new(1);

/// An inclusive rating range a player is willing to be paired within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBand {
    pub min: u32,
    pub max: u32,
}

impl RatingBand {
    /// Two bands are compatible when they overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// A duel sitting in the queue, waiting for an opponent.
#[derive(Debug, Clone)]
pub struct WaitingDuel {
    pub duel_id: DuelId,
    /// Durable, unique duel code (32 hex chars).
    pub code: String,
    pub initiator: PlayerId,
    /// `None` means any category.
    pub category: Option<CategoryId>,
    pub rating_band: Option<RatingBand>,
}

impl WaitingDuel {
    /// Whether a request with this filter/band can join this duel.
    ///
    /// Categories are compatible when equal or when either side accepts
    /// any; rating bands when both are present and overlap, or when
    /// either side didn't constrain rating. FIFO order decides among
    /// multiple compatible entries.
    fn accepts(
        &self,
        category: Option<CategoryId>,
        rating_band: Option<RatingBand>,
    ) -> bool {
        let category_ok = match (self.category, category) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        let rating_ok = match (self.rating_band, rating_band) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => true,
        };
        category_ok && rating_ok
    }
}

/// What a matchmaking request resolved to.
#[derive(Debug)]
pub enum MatchDecision {
    /// No compatible duel was waiting; the requester is now the initiator
    /// of a fresh waiting duel.
    Enqueued(WaitingDuel),

    /// The requester was bound as opponent of the oldest compatible
    /// waiting duel, which has been removed from the queue.
    Paired {
        duel: WaitingDuel,
        opponent: PlayerId,
    },
}

/// The ordered waiting set.
///
/// Entries are kept oldest-first; the pairing scan walks from the front so
/// the player who has waited longest is served first.
pub struct Matchmaker {
    waiting: VecDeque<WaitingDuel>,
    /// One waiting duel per player (key invariant).
    by_player: HashMap<PlayerId, DuelId>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self {
            waiting: VecDeque::new(),
            by_player: HashMap::new(),
        }
    }

    /// Handles a matchmaking request: pair with the oldest compatible
    /// waiting duel, or enqueue a new one.
    ///
    /// A player never pairs with themselves — their own waiting entry is
    /// unreachable because a duplicate request is rejected before the scan.
    pub fn request(
        &mut self,
        player: PlayerId,
        category: Option<CategoryId>,
        rating_band: Option<RatingBand>,
    ) -> Result<MatchDecision, MatchError> {
        if self.by_player.contains_key(&player) {
            return Err(MatchError::DuplicateMatchmaking(player));
        }

        let found = self.waiting.iter().position(|duel| {
            duel.initiator != player && duel.accepts(category, rating_band)
        });

        if let Some(index) = found {
            let duel = self
                .waiting
                .remove(index)
                .expect("position came from this deque");
            self.by_player.remove(&duel.initiator);

            tracing::info!(
                duel_id = %duel.duel_id,
                initiator = %duel.initiator,
                opponent = %player,
                "players paired"
            );
            return Ok(MatchDecision::Paired {
                duel,
                opponent: player,
            });
        }

        let duel = WaitingDuel {
            duel_id: DuelId(NEXT_DUEL_ID.fetch_add(1, Ordering::Relaxed)),
            code: generate_code(),
            initiator: player,
            category,
            rating_band,
        };
        self.by_player.insert(player, duel.duel_id);
        self.waiting.push_back(duel.clone());

        tracing::info!(
            duel_id = %duel.duel_id,
            initiator = %player,
            category = ?category,
            "duel waiting for opponent"
        );
        Ok(MatchDecision::Enqueued(duel))
    }

    /// Removes a still-waiting duel from the queue.
    ///
    /// Only waiting duels can be cancelled this way; once paired, a duel
    /// is out of the queue's hands.
    pub fn cancel_waiting(
        &mut self,
        duel_id: DuelId,
    ) -> Result<WaitingDuel, MatchError> {
        let index = self
            .waiting
            .iter()
            .position(|d| d.duel_id == duel_id)
            .ok_or(MatchError::NotWaiting(duel_id))?;

        let duel = self
            .waiting
            .remove(index)
            .expect("position came from this deque");
        self.by_player.remove(&duel.initiator);

        tracing::info!(%duel_id, "waiting duel cancelled");
        Ok(duel)
    }

    /// The waiting duel a player initiated, if any.
    pub fn waiting_duel_of(&self, player: &PlayerId) -> Option<DuelId> {
        self.by_player.get(player).copied()
    }

    pub fn is_waiting(&self, duel_id: DuelId) -> bool {
        self.waiting.iter().any(|d| d.duel_id == duel_id)
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }
}

impl Default for Matchmaker {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a random 32-character hex duel code (128 bits of entropy).
/// Collisions are computationally implausible, which is what makes the
/// code usable as the duel's durable unique identity.
fn generate_code() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
