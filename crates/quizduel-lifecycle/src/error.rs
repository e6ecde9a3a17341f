//! Error types for the duel lifecycle layer.

use quizduel_protocol::{DuelId, PlayerId};
use quizduel_round::RoundError;

/// Errors that can occur while commanding a running duel.
#[derive(Debug, thiserror::Error)]
pub enum DuelError {
    /// The submission was rejected by the round (duplicate, closed,
    /// unknown answer).
    #[error(transparent)]
    Round(#[from] RoundError),

    /// The player is not one of the duel's two participants.
    #[error("player {0} is not a participant of duel {1}")]
    NotParticipant(PlayerId, DuelId),

    /// The submission names a round that is not the current one and not
    /// a past one either.
    #[error("round {1} is not the current round of duel {0}")]
    InvalidRoundNumber(DuelId, u32),

    /// The duel already reached a terminal state.
    #[error("duel {0} already ended")]
    Ended(DuelId),

    /// The duel's command channel is full or its actor is gone.
    #[error("duel {0} is unavailable")]
    Unavailable(DuelId),
}
