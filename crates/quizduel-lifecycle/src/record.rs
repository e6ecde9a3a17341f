//! Durable-shaped records: the round history and duel state snapshots.

use std::time::SystemTime;

use quizduel_protocol::{
    AnswerId, CategoryId, DuelId, PlayerId, QuestionId, Side, SideSlots,
};
use quizduel_round::RoundScore;
use serde::{Deserialize, Serialize};

use crate::{DuelSettings, DuelStatus};

/// One closed round, as the duel actor records it.
///
/// Rounds are recorded exactly once, at close, and never touched again —
/// the result aggregator recomputes totals from this history so the final
/// record is consistent with it by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based, contiguous within the duel.
    pub round_number: u32,
    pub question_id: QuestionId,
    pub question_sent_at: SystemTime,
    pub closed_at: SystemTime,
    /// What each seat submitted; `None` is an explicit no-answer.
    pub answers: SideSlots<Option<AnswerId>>,
    pub scores: SideSlots<RoundScore>,
}

impl RoundRecord {
    /// Which seat won this round, if either. Equal scores credit no one.
    pub fn round_winner(&self) -> Option<Side> {
        let (i, o) = (self.scores.initiator.score, self.scores.opponent.score);
        if i > o {
            Some(Side::Initiator)
        } else if o > i {
            Some(Side::Opponent)
        } else {
            None
        }
    }
}

/// A snapshot of a duel's current state, served by the actor on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelState {
    pub duel_id: DuelId,
    /// Durable unique code.
    pub code: String,
    pub status: DuelStatus,
    pub players: SideSlots<PlayerId>,
    pub category: Option<CategoryId>,
    pub settings: DuelSettings,
    pub matched_at: SystemTime,
    pub started_at: Option<SystemTime>,
    pub finished_at: Option<SystemTime>,
    /// Number of the round currently open, or of the last closed round
    /// when none is open.
    pub current_round: u32,
    pub round_wins: SideSlots<u32>,
    pub total_score: SideSlots<i64>,
}

impl DuelState {
    /// The seat a player occupies, if they are a participant.
    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        if self.players.initiator == player {
            Some(Side::Initiator)
        } else if self.players.opponent == player {
            Some(Side::Opponent)
        } else {
            None
        }
    }
}
