//! The duel lifecycle state machine.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a duel.
///
/// ```text
/// Waiting → Matched → Active → Finished
///    │         │         │
///    └─────────┴─────────┴──→ Cancelled
/// ```
///
/// - **Waiting**: created by a matchmaking request, no opponent bound yet.
/// - **Matched**: opponent bound, first round not dispatched yet.
/// - **Active**: rounds in progress.
/// - **Finished**: a result exists (win, draw, or forfeit). Terminal.
/// - **Cancelled**: aborted without a result. Terminal.
///
/// Status is monotonic along the top row; the only sideways move is
/// cancellation, and nothing leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelStatus {
    Waiting,
    Matched,
    Active,
    Finished,
    Cancelled,
}

impl DuelStatus {
    /// `true` once the duel can never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }

    /// `true` while the duel still has an opponent slot open.
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::Waiting, Self::Matched)
            | (Self::Matched, Self::Active)
            | (Self::Active, Self::Finished) => true,
            // Cancellation is allowed from every non-terminal state.
            (from, Self::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for DuelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Matched => write!(f, "matched"),
            Self::Active => write!(f, "active"),
            Self::Finished => write!(f, "finished"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}
