//! The read-only question model.
//!
//! Questions are owned by an external question source; the engine never
//! mutates them. A [`Question`] carries the full answer key and is only
//! ever held server-side. What players see is the [`QuestionView`]
//! projection, which strips correctness and score data.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AnswerId, CategoryId, QuestionId};

/// How a question is presented. Rendering is the client's problem — the
/// round controller consumes every kind through the same projection
/// (prompt + candidate answers + one correct id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    TrueFalse,
    StoryBranch,
}

/// Question difficulty, used only as a source-side filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One candidate answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: AnswerId,
    pub text: String,
    pub is_correct: bool,
    /// Per-answer base score. `None` means the scoring rules' default
    /// base applies.
    pub score_delta: Option<i64>,
}

/// A question with its full answer set.
///
/// Invariant (enforced by the source, checked by [`Question::correct`]):
/// exactly one option has `is_correct == true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub category: Option<CategoryId>,
    pub difficulty: Option<Difficulty>,
    pub prompt: String,
    pub answers: Vec<AnswerOption>,
    /// Default collection window for a round built on this question.
    /// A duel's settings may override it.
    pub time_limit_ms: u64,
}

impl Question {
    /// The designated correct option.
    ///
    /// # Panics
    /// Panics if the question carries no correct option — a malformed
    /// question is a source bug, not a condition rounds can score against.
    pub fn correct(&self) -> &AnswerOption {
        self.answers
            .iter()
            .find(|a| a.is_correct)
            .expect("question has no correct answer")
    }

    /// Looks up an option by id.
    pub fn answer(&self, id: AnswerId) -> Option<&AnswerOption> {
        self.answers.iter().find(|a| a.id == id)
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    /// The player-facing projection: same prompt and choices, no key.
    pub fn view(&self) -> QuestionView {
        QuestionView {
            id: self.id,
            kind: self.kind,
            prompt: self.prompt.clone(),
            choices: self
                .answers
                .iter()
                .map(|a| AnswerChoice {
                    id: a.id,
                    text: a.text.clone(),
                })
                .collect(),
            time_limit_ms: self.time_limit_ms,
        }
    }
}

/// An answer option as players see it — id and text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerChoice {
    pub id: AnswerId,
    pub text: String,
}

/// What gets dispatched to both players when a round opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub kind: QuestionKind,
    pub prompt: String,
    pub choices: Vec<AnswerChoice>,
    pub time_limit_ms: u64,
}

// =========================================================================
// Tests
// =========================================================================
