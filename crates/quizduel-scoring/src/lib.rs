//! Pure scoring for Quizduel rounds.
//!
//! One deterministic function: given how a side answered and how fast,
//! produce its score for the round. No clocks, no I/O, no state — the
//! round controller feeds in the elapsed time it measured.
//!
//! Policy:
//! - incorrect or missing answer → 0
//! - correct answer → base score (the answer's own delta when present,
//!   otherwise [`ScoringRules::base_score`]) plus a speed bonus that decays
//!   linearly from [`ScoringRules::max_speed_bonus`] at elapsed = 0 down to
//!   zero at elapsed ≥ time limit. The bonus never goes negative.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AnswerOutcome
// ---------------------------------------------------------------------------

/// How a side's submission slot ended up when the round closed.
///
/// `NoAnswer` is deliberately distinct from `Incorrect`: both score 0, but
/// stats consumers count them differently (an unanswered round feeds the
/// forfeit detector, a wrong answer does not).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    NoAnswer,
}

impl AnswerOutcome {
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }

    /// Whether the side submitted anything at all.
    pub fn answered(self) -> bool {
        !matches!(self, Self::NoAnswer)
    }
}

// ---------------------------------------------------------------------------
// ScoringRules
// ---------------------------------------------------------------------------

/// Scoring parameters. Part of a duel's settings, fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    /// Base score for a correct answer with no per-answer delta.
    pub base_score: i64,
    /// Bonus awarded for an instant correct answer, decaying to zero over
    /// the time limit.
    pub max_speed_bonus: i64,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            base_score: 100,
            max_speed_bonus: 50,
        }
    }
}

impl ScoringRules {
    /// Clamps negative parameters to zero so the rules are safe to use.
    pub fn validated(mut self) -> Self {
        self.base_score = self.base_score.max(0);
        self.max_speed_bonus = self.max_speed_bonus.max(0);
        self
    }

    /// Scores one side of a round.
    ///
    /// `base_override` is the answer's own `score_delta`, when the question
    /// defines one. Elapsed time beyond the limit is clamped to the limit.
    pub fn score(
        &self,
        outcome: AnswerOutcome,
        base_override: Option<i64>,
        elapsed_ms: u64,
        time_limit_ms: u64,
    ) -> i64 {
        if !outcome.is_correct() {
            return 0;
        }
        let base = base_override.unwrap_or(self.base_score).max(0);
        base + self.speed_bonus(elapsed_ms, time_limit_ms)
    }

    /// Linear speed bonus: `max_speed_bonus * remaining / time_limit`,
    /// floored at zero. A zero time limit yields no bonus.
    pub fn speed_bonus(&self, elapsed_ms: u64, time_limit_ms: u64) -> i64 {
        if time_limit_ms == 0 || self.max_speed_bonus <= 0 {
            return 0;
        }
        let elapsed = elapsed_ms.min(time_limit_ms);
        let remaining = (time_limit_ms - elapsed) as i64;
        self.max_speed_bonus.saturating_mul(remaining) / time_limit_ms as i64
    }
}
