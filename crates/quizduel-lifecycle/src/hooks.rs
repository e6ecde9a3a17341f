//! The seams to external collaborators.
//!
//! The engine does not fetch questions, deliver notifications, or keep
//! ratings itself. It consumes a [`QuestionSource`] and pushes facts into
//! a [`NotificationSink`] and an [`EventSink`]; hosts implement these
//! three traits against whatever storage and delivery they run.

use quizduel_protocol::{
    CategoryId, Difficulty, DomainEvent, PlayerEvent, PlayerId, Question,
    QuestionId,
};

/// Errors a question source can fail with.
#[derive(Debug, thiserror::Error)]
pub enum QuestionSourceError {
    /// The filtered pool is exhausted — every matching question was
    /// already used in this duel. The lifecycle manager cancels the duel
    /// rather than stalling.
    #[error("no question available for the requested filters")]
    NoQuestionAvailable,
}

/// Supplies questions for rounds.
///
/// `exclude` carries the question ids already used in the requesting
/// duel, so a match never repeats a question.
pub trait QuestionSource: Send + Sync + 'static {
    fn next_question(
        &self,
        category: Option<CategoryId>,
        difficulty: Option<Difficulty>,
        exclude: &[QuestionId],
    ) -> impl std::future::Future<Output = Result<Question, QuestionSourceError>>
    + Send;
}

/// Delivers player-addressed notifications.
///
/// Fire-and-forget, at-most-once: the engine never retries delivery and
/// assumes no acknowledgement. Implementations must not block — push into
/// a channel or queue and return.
pub trait NotificationSink: Send + Sync + 'static {
    fn send(&self, player: PlayerId, event: PlayerEvent);
}

/// Receives domain facts for rating/stats/achievement bookkeeping.
///
/// Same delivery contract as [`NotificationSink`]: non-blocking,
/// fire-and-forget.
pub trait EventSink: Send + Sync + 'static {
    fn publish(&self, event: DomainEvent);
}
