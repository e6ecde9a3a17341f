//! # Quizduel
//!
//! Real-time two-player quiz duel engine: matchmaking, duel lifecycle,
//! timed rounds, and scoring.
//!
//! Hosts implement three seams — a [`QuestionSource`], a
//! [`NotificationSink`], and an [`EventSink`] — and drive everything
//! through a [`DuelEngine`]. The engine pairs matchmaking requests,
//! runs each duel as its own Tokio task, and routes answers by player.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use quizduel::prelude::*;
//!
//! # async fn run<Q: QuestionSource, N: NotificationSink, E: EventSink>(
//! #     source: Arc<Q>, notify: Arc<N>, events: Arc<E>,
//! # ) -> Result<(), QuizduelError> {
//! let engine = DuelEngine::new(DuelSettings::default(), source, notify, events);
//!
//! let ticket = engine.request_duel(PlayerId(1), None, None).await?;
//! match ticket {
//!     DuelTicket::Waiting { code, .. } => println!("waiting, code {code}"),
//!     DuelTicket::Started { opponent, .. } => println!("matched with {opponent}"),
//! }
//! # Ok(())
//! # }
//! ```

mod engine;
mod error;
mod presence;

pub use engine::{DuelEngine, DuelTicket};
pub use error::QuizduelError;
pub use presence::{Presence, PresenceTracker};

pub use quizduel_lifecycle::{
    DuelError, DuelHandle, DuelResult, DuelSettings, DuelState, DuelStatus,
    EventSink, NotificationSink, QuestionSource, QuestionSourceError,
    RoundRecord,
};
pub use quizduel_match::{MatchError, RatingBand, WaitingDuel};
pub use quizduel_protocol::{
    AnswerChoice, AnswerId, AnswerOption, CategoryId, Difficulty,
    DomainEvent, DuelId, DuelOutcome, PlayerEvent, PlayerId, Question,
    QuestionId, QuestionKind, QuestionView, Side, SideSlots,
};
pub use quizduel_round::{RoundError, RoundScore};
pub use quizduel_scoring::{AnswerOutcome, ScoringRules};

/// The common imports, for hosts that want one `use` line.
pub mod prelude {
    pub use crate::{
        AnswerId, AnswerOutcome, CategoryId, Difficulty, DomainEvent,
        DuelEngine, DuelId, DuelOutcome, DuelResult, DuelSettings,
        DuelState, DuelStatus, DuelTicket, EventSink, NotificationSink,
        PlayerEvent, PlayerId, Question, QuestionSource, QuestionView,
        QuizduelError, RatingBand, ScoringRules, Side,
    };
}

/// Installs a `tracing` subscriber reading `RUST_LOG`, defaulting to
/// `info`. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
