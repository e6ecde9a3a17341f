//! Duel lifecycle management for Quizduel.
//!
//! Each duel runs as an isolated Tokio task (actor model) that owns the
//! duel's state: the status machine, the currently open round, running
//! tallies, and the round history. The outside world talks to it through
//! a [`DuelHandle`].
//!
//! # Key types
//!
//! - [`DuelStatus`] — the lifecycle state machine
//! - [`DuelSettings`] — per-duel knobs (rounds to win, time limit, scoring)
//! - [`DuelHandle`] / [`spawn_duel`] — command a running duel actor
//! - [`DuelResult`] — the immutable final record, one per finished duel
//! - [`QuestionSource`] / [`NotificationSink`] / [`EventSink`] — the seams
//!   to external collaborators

mod duel;
mod error;
mod hooks;
mod record;
mod result;
mod settings;
mod status;

pub use duel::{DuelHandle, DuelParams, spawn_duel};
pub use error::DuelError;
pub use hooks::{
    EventSink, NotificationSink, QuestionSource, QuestionSourceError,
};
pub use record::{DuelState, RoundRecord};
pub use result::{DuelResult, finalize};
pub use settings::DuelSettings;
pub use status::DuelStatus;
