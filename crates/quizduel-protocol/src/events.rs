//! Events crossing the engine's two outbound boundaries.
//!
//! [`PlayerEvent`] goes to the notification sink, addressed to a single
//! player; delivery is fire-and-forget, at most once. [`DomainEvent`] goes
//! to the stats/rating boundary and describes facts about finished rounds
//! and duels.
//!
//! Both enums are internally tagged (`#[serde(tag = "type")]`) so a
//! consumer can switch on a single `type` field.

use serde::{Deserialize, Serialize};

use crate::{AnswerId, DuelId, DuelOutcome, PlayerId, QuestionView};

/// A notification addressed to one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerEvent {
    /// An opponent was found; the duel is about to start.
    DuelMatched {
        duel_id: DuelId,
        code: String,
        opponent: PlayerId,
    },

    /// A round opened. The collection window starts now.
    QuestionDispatched {
        duel_id: DuelId,
        round_number: u32,
        question: QuestionView,
    },

    /// A round closed. Scores for both seats plus the revealed key —
    /// correctness is only disclosed once no submission can change.
    RoundClosed {
        duel_id: DuelId,
        round_number: u32,
        initiator_score: i64,
        opponent_score: i64,
        correct_answer: AnswerId,
    },

    /// The duel reached a result. Terminal.
    DuelFinished {
        duel_id: DuelId,
        outcome: DuelOutcome,
        winner: Option<PlayerId>,
        initiator_score: i64,
        opponent_score: i64,
    },

    /// The duel was aborted without a result. Terminal.
    DuelCancelled { duel_id: DuelId, reason: String },
}

/// A fact emitted for external rating/stats/achievement consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    /// Per-round scores, useful for live spectating and analytics.
    RoundClosed {
        duel_id: DuelId,
        round_number: u32,
        initiator_score: i64,
        opponent_score: i64,
    },

    /// The authoritative final record of a duel.
    DuelFinished {
        duel_id: DuelId,
        initiator: PlayerId,
        opponent: PlayerId,
        outcome: DuelOutcome,
        winner: Option<PlayerId>,
        initiator_score: i64,
        opponent_score: i64,
        initiator_correct: u32,
        opponent_correct: u32,
    },
}

// =========================================================================
// Tests
// =========================================================================
