//! Matchmaking queue: pairs players wanting a duel.
//!
//! The [`Matchmaker`] owns the set of duels still waiting for an opponent.
//! Pairing is FIFO — oldest compatible waiting duel first — which trades
//! rating-optimality for fairness and bounded wait times.
//!
//! # Concurrency note
//!
//! `Matchmaker` is NOT thread-safe by itself — it is a plain single-owner
//! structure. The engine wraps it in a `Mutex`, which is what makes
//! "never double-match the same waiting duel" hold: only one request can
//! scan and claim an entry at a time.

mod error;
mod queue;

pub use error::MatchError;
pub use queue::{MatchDecision, Matchmaker, RatingBand, WaitingDuel};
