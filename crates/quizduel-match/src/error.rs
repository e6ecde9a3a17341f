//! Error types for the matchmaking layer.

use quizduel_protocol::{DuelId, PlayerId};

/// Errors that can occur during matchmaking operations.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The player already has a waiting duel in the queue.
    #[error("player {0} is already matchmaking")]
    DuplicateMatchmaking(PlayerId),

    /// The duel is not in the waiting set — it was already paired,
    /// cancelled, or never existed. Matched duels can only be forfeited
    /// or aborted, not cancelled through the queue.
    #[error("duel {0} is not waiting")]
    NotWaiting(DuelId),
}
