//! One round of a duel: question out, up to two answers in, one close.
//!
//! A [`Round`] owns the collection window for a single question. The duel
//! actor races [`Round::deadline`] against incoming submissions in a
//! `tokio::select!` loop; whichever trigger fires first calls
//! [`Round::close`], and the close is guarded so a second trigger observes
//! the recorded outcome and no-ops.
//!
//! Rounds use the Tokio clock for all timing, so tests drive them with a
//! paused clock instead of real sleeps.

mod error;
mod round;

pub use error::RoundError;
pub use round::{Round, RoundScore, Submission};
