//! Shared types for the Quizduel engine.
//!
//! This crate defines everything the other layers talk in terms of:
//!
//! - **Identity** ([`PlayerId`], [`DuelId`], [`QuestionId`], …) — newtype
//!   wrappers so the compiler keeps the id spaces apart.
//! - **Sides** ([`Side`], [`SideSlots`]) — a duel always has exactly two
//!   seats, addressed symmetrically.
//! - **Questions** ([`Question`], [`QuestionView`]) — the read-only model
//!   consumed by the round controller, plus the player-facing projection
//!   that never carries the answer key.
//! - **Events** ([`PlayerEvent`], [`DomainEvent`]) — what crosses the
//!   notification and stats boundaries.
//!
//! The crate is deliberately free of async and I/O; it only describes data.

mod events;
mod question;
mod types;

pub use events::{DomainEvent, PlayerEvent};
pub use question::{
    AnswerChoice, AnswerOption, Difficulty, Question, QuestionKind,
    QuestionView,
};
pub use types::{
    AnswerId, CategoryId, DuelId, DuelOutcome, PlayerId, QuestionId, Side,
    SideSlots,
};
