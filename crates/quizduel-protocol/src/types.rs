//! Identity newtypes and the two-seat addressing scheme.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// `#[serde(transparent)]` keeps the JSON representation a plain number,
/// so `PlayerId(42)` serializes as `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a duel (one two-player match).
///
/// This is the in-memory handle; the durable `code` string lives on the
/// duel record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DuelId(pub u64);

impl fmt::Display for DuelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D-{}", self.0)
    }
}

/// A unique identifier for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q-{}", self.0)
    }
}

/// A unique identifier for one answer option of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerId(pub u64);

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

/// A question category. Duels may be bound to one category or to any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u32);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the two seats in a duel.
///
/// The initiator is the player whose matchmaking request created the duel;
/// the opponent is the player who got paired into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Initiator,
    Opponent,
}

impl Side {
    /// The seat across the table.
    pub fn other(self) -> Self {
        match self {
            Self::Initiator => Self::Opponent,
            Self::Opponent => Self::Initiator,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiator => write!(f, "initiator"),
            Self::Opponent => write!(f, "opponent"),
        }
    }
}

/// A symmetric pair of per-side values, indexed by [`Side`].
///
/// Rounds, tallies, and results all keep one value per seat; indexing by
/// `Side` instead of two named fields keeps the round logic free of
/// copy-pasted initiator/opponent branches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideSlots<T> {
    pub initiator: T,
    pub opponent: T,
}

impl<T> SideSlots<T> {
    pub fn new(initiator: T, opponent: T) -> Self {
        Self {
            initiator,
            opponent,
        }
    }

    /// Both values, initiator first.
    pub fn as_pair(&self) -> (&T, &T) {
        (&self.initiator, &self.opponent)
    }

    /// Applies `f` to both slots, preserving seat order.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> SideSlots<U> {
        SideSlots {
            initiator: f(&self.initiator),
            opponent: f(&self.opponent),
        }
    }
}

impl<T> Index<Side> for SideSlots<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::Initiator => &self.initiator,
            Side::Opponent => &self.opponent,
        }
    }
}

impl<T> IndexMut<Side> for SideSlots<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Initiator => &mut self.initiator,
            Side::Opponent => &mut self.opponent,
        }
    }
}

// ---------------------------------------------------------------------------
// DuelOutcome
// ---------------------------------------------------------------------------

/// The authoritative result of a finished duel.
///
/// `Pending` only ever appears on a result row that has not been finalized;
/// the engine never publishes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelOutcome {
    InitiatorWin,
    OpponentWin,
    Draw,
    Forfeit,
    Pending,
}

impl DuelOutcome {
    /// The winning seat, if the outcome names one.
    ///
    /// `Forfeit` carries its winner on the result record, not here, since
    /// either side can be forfeited against.
    pub fn winning_side(self) -> Option<Side> {
        match self {
            Self::InitiatorWin => Some(Side::Initiator),
            Self::OpponentWin => Some(Side::Opponent),
            Self::Draw | Self::Forfeit | Self::Pending => None,
        }
    }
}

impl fmt::Display for DuelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitiatorWin => write!(f, "initiator_win"),
            Self::OpponentWin => write!(f, "opponent_win"),
            Self::Draw => write!(f, "draw"),
            Self::Forfeit => write!(f, "forfeit"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
