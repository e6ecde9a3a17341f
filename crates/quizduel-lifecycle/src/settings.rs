//! Per-duel settings, fixed at creation time.

use std::time::Duration;

use quizduel_protocol::Difficulty;
use quizduel_scoring::ScoringRules;
use serde::{Deserialize, Serialize};

/// Settings for one duel. Bound when the duel is created and never
/// changed afterwards, so both sides play under identical rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuelSettings {
    /// Round wins needed to take the match.
    pub rounds_to_win: u32,

    /// Per-round collection window. `None` means each question's own
    /// time limit applies.
    pub time_limit: Option<Duration>,

    /// Hard cap on rounds played. `None` means the default
    /// `2 * rounds_to_win - 1`; reaching the cap without a decision falls
    /// back to aggregate-score comparison, then a draw.
    pub max_rounds: Option<u32>,

    /// Question difficulty filter passed to the question source.
    pub difficulty: Option<Difficulty>,

    pub scoring: ScoringRules,
}

impl Default for DuelSettings {
    fn default() -> Self {
        Self {
            rounds_to_win: 3,
            time_limit: None,
            max_rounds: None,
            difficulty: None,
            scoring: ScoringRules::default(),
        }
    }
}

impl DuelSettings {
    /// Clamps out-of-range values so the settings are safe to drive a
    /// duel with. At least one round win is required; the cap can never
    /// be below one round.
    pub fn validated(mut self) -> Self {
        self.rounds_to_win = self.rounds_to_win.max(1);
        if let Some(cap) = self.max_rounds {
            self.max_rounds = Some(cap.max(1));
        }
        self.scoring = self.scoring.validated();
        self
    }

    /// The effective round cap. Saturates rather than overflowing for
    /// absurd `rounds_to_win` values.
    pub fn round_cap(&self) -> u32 {
        self.max_rounds
            .unwrap_or(self.rounds_to_win.saturating_mul(2).saturating_sub(1))
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cap_is_best_of_five_for_three_wins() {
        let settings = DuelSettings::default();
        assert_eq!(settings.rounds_to_win, 3);
        assert_eq!(settings.round_cap(), 5);
    }

    #[test]
    fn test_explicit_cap_overrides_formula() {
        let settings = DuelSettings {
            max_rounds: Some(7),
            ..DuelSettings::default()
        };
        assert_eq!(settings.round_cap(), 7);
    }

    #[test]
    fn test_round_cap_saturates_for_huge_rounds_to_win() {
        let settings = DuelSettings {
            rounds_to_win: u32::MAX,
            ..DuelSettings::default()
        };
        assert_eq!(settings.round_cap(), u32::MAX - 1);
    }

    #[test]
    fn test_validated_enforces_minimums() {
        let settings = DuelSettings {
            rounds_to_win: 0,
            max_rounds: Some(0),
            ..DuelSettings::default()
        }
        .validated();
        assert_eq!(settings.rounds_to_win, 1);
        assert_eq!(settings.round_cap(), 1);
    }
}
