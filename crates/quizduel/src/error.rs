//! Unified error type for the Quizduel engine.

use quizduel_lifecycle::DuelError;
use quizduel_match::MatchError;
use quizduel_protocol::PlayerId;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `quizduel` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant auto-generates `From` impls, so the `?`
/// operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuizduelError {
    /// A matchmaking error (duplicate request, not waiting).
    #[error(transparent)]
    Match(#[from] MatchError),

    /// A duel lifecycle error (bad submission, ended, unavailable).
    #[error(transparent)]
    Duel(#[from] DuelError),

    /// The player has no live duel the engine could route to.
    #[error("player {0} is not in a duel")]
    NotInDuel(PlayerId),
}
