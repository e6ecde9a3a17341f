//! The result aggregator: turns a closed round history into the one
//! immutable record a finished duel gets.

use quizduel_protocol::{DuelId, DuelOutcome, PlayerId, Side, SideSlots};
use serde::{Deserialize, Serialize};

use crate::RoundRecord;

/// The authoritative final record of a duel. Exactly one per finished
/// duel; cancelled duels get none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelResult {
    pub duel_id: DuelId,
    pub outcome: DuelOutcome,
    pub winner: Option<PlayerId>,
    pub total_score: SideSlots<i64>,
    pub correct: SideSlots<u32>,
}

/// Computes the final result from the round history.
///
/// Totals and correct counts are sums over the history, so the
/// "totals equal the sum of per-round scores" law holds by construction.
/// The outcome comes from round-win tallies; a tie there is broken by
/// total score, and a tie in total score is a draw. A forfeit overrides
/// the tallies entirely — the responsive side wins regardless of score.
///
/// This function is pure; the duel actor guarantees it runs once per
/// duel and caches the returned record (idempotent finalize).
pub fn finalize(
    duel_id: DuelId,
    players: SideSlots<PlayerId>,
    rounds: &[RoundRecord],
    forfeited_by: Option<Side>,
) -> DuelResult {
    let mut total_score = SideSlots::new(0i64, 0i64);
    let mut correct = SideSlots::new(0u32, 0u32);
    let mut round_wins = SideSlots::new(0u32, 0u32);

    for round in rounds {
        for side in [Side::Initiator, Side::Opponent] {
            total_score[side] += round.scores[side].score;
            if round.scores[side].outcome.is_correct() {
                correct[side] += 1;
            }
        }
        if let Some(winner) = round.round_winner() {
            round_wins[winner] += 1;
        }
    }

    let (outcome, winning_side) = if let Some(loser) = forfeited_by {
        (DuelOutcome::Forfeit, Some(loser.other()))
    } else if round_wins.initiator != round_wins.opponent {
        decided(round_wins.initiator > round_wins.opponent)
    } else if total_score.initiator != total_score.opponent {
        decided(total_score.initiator > total_score.opponent)
    } else {
        (DuelOutcome::Draw, None)
    };

    DuelResult {
        duel_id,
        outcome,
        winner: winning_side.map(|side| players[side]),
        total_score,
        correct,
    }
}

fn decided(initiator_won: bool) -> (DuelOutcome, Option<Side>) {
    if initiator_won {
        (DuelOutcome::InitiatorWin, Some(Side::Initiator))
    } else {
        (DuelOutcome::OpponentWin, Some(Side::Opponent))
    }
}

// =========================================================================
// Tests
// =========================================================================
