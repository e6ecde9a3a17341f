//! Error types for the round layer.

use quizduel_protocol::{AnswerId, Side};

/// Errors a submission can be rejected with. All of these are caller
/// errors — the round's own state never becomes invalid because of them.
#[derive(Debug, thiserror::Error)]
pub enum RoundError {
    /// The side already submitted; the first submission stands.
    #[error("{0} already submitted an answer for this round")]
    DuplicateAnswer(Side),

    /// The round has been closed; late submissions are not scored.
    #[error("round is closed")]
    RoundClosed,

    /// The answer id is not one of the question's options.
    #[error("answer {0} is not an option of this round's question")]
    UnknownAnswer(AnswerId),
}
