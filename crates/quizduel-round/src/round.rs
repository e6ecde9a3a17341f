//! Round state: submission slots, deadline, and the single atomic close.

use std::time::{Duration, SystemTime};

use quizduel_protocol::{AnswerId, Question, Side, SideSlots};
use quizduel_scoring::{AnswerOutcome, ScoringRules};
use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};

use crate::RoundError;

/// One side's recorded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub answer: AnswerId,
    /// Time from question dispatch to submission, as measured by the
    /// round's own clock. This is what the speed bonus is computed from.
    pub elapsed: Duration,
}

/// One side's score for a closed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundScore {
    pub score: i64,
    pub outcome: AnswerOutcome,
}

/// A single round's collection window and result.
///
/// Lifecycle: [`Round::open`] records `question_sent_at` and arms the
/// deadline; [`Round::submit`] fills at most one slot per side;
/// [`Round::close`] computes both scores exactly once. A closed round is
/// immutable — submissions are rejected and a repeated close returns the
/// recorded scores unchanged.
pub struct Round {
    round_number: u32,
    question: Question,
    time_limit: Duration,
    opened_at: Instant,
    deadline: Instant,
    question_sent_at: SystemTime,
    closed_at: Option<SystemTime>,
    submissions: SideSlots<Option<Submission>>,
    scores: Option<SideSlots<RoundScore>>,
}

impl Round {
    /// Opens the collection window now.
    ///
    /// `time_limit_override` is the duel-level setting; when `None`, the
    /// question's own limit applies.
    pub fn open(
        round_number: u32,
        question: Question,
        time_limit_override: Option<Duration>,
    ) -> Self {
        let time_limit =
            time_limit_override.unwrap_or_else(|| question.time_limit());
        let opened_at = Instant::now();

        tracing::debug!(
            round_number,
            question_id = %question.id,
            time_limit_ms = time_limit.as_millis() as u64,
            "round opened"
        );

        Self {
            round_number,
            question,
            time_limit,
            opened_at,
            deadline: opened_at + time_limit,
            question_sent_at: SystemTime::now(),
            closed_at: None,
            submissions: SideSlots::new(None, None),
            scores: None,
        }
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn question_sent_at(&self) -> SystemTime {
        self.question_sent_at
    }

    pub fn closed_at(&self) -> Option<SystemTime> {
        self.closed_at
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    pub fn submission(&self, side: Side) -> Option<&Submission> {
        self.submissions[side].as_ref()
    }

    /// `true` once both seats have an answer recorded.
    pub fn both_submitted(&self) -> bool {
        self.submissions.initiator.is_some()
            && self.submissions.opponent.is_some()
    }

    /// Scores for both seats, present once the round is closed.
    pub fn scores(&self) -> Option<&SideSlots<RoundScore>> {
        self.scores.as_ref()
    }

    /// Records a side's answer. At most one per side; the first stands.
    ///
    /// Returns the elapsed time the submission was stamped with.
    pub fn submit(
        &mut self,
        side: Side,
        answer: AnswerId,
    ) -> Result<Duration, RoundError> {
        if self.is_closed() {
            return Err(RoundError::RoundClosed);
        }
        if self.submissions[side].is_some() {
            return Err(RoundError::DuplicateAnswer(side));
        }
        if self.question.answer(answer).is_none() {
            return Err(RoundError::UnknownAnswer(answer));
        }

        let elapsed = self.opened_at.elapsed();
        self.submissions[side] = Some(Submission { answer, elapsed });

        tracing::debug!(
            round_number = self.round_number,
            %side,
            %answer,
            elapsed_ms = elapsed.as_millis() as u64,
            "answer recorded"
        );
        Ok(elapsed)
    }

    /// Resolves when the collection window's deadline elapses.
    ///
    /// Meant to be raced against command arrival in the duel actor's
    /// `tokio::select!`; the deadline firing is a normal closing trigger,
    /// not a fault.
    pub async fn deadline(&self) {
        time::sleep_until(self.deadline).await;
    }

    /// Closes the round and computes both scores.
    ///
    /// Exactly one close takes effect. The both-answered trigger and the
    /// deadline trigger may race; the loser of that race observes
    /// `closed_at` already set and gets the recorded scores back unchanged.
    /// Seats without a submission score 0 with a [`AnswerOutcome::NoAnswer`]
    /// outcome.
    pub fn close(&mut self, rules: &ScoringRules) -> SideSlots<RoundScore> {
        if let Some(scores) = self.scores {
            tracing::trace!(
                round_number = self.round_number,
                "close on already-closed round ignored"
            );
            return scores;
        }

        let time_limit_ms = self.time_limit.as_millis() as u64;
        let scores = self.submissions.map(|slot| match slot {
            None => RoundScore {
                score: 0,
                outcome: AnswerOutcome::NoAnswer,
            },
            Some(sub) => {
                let option = self
                    .question
                    .answer(sub.answer)
                    .expect("submit validated the answer id");
                let outcome = if option.is_correct {
                    AnswerOutcome::Correct
                } else {
                    AnswerOutcome::Incorrect
                };
                RoundScore {
                    score: rules.score(
                        outcome,
                        option.score_delta,
                        sub.elapsed.as_millis() as u64,
                        time_limit_ms,
                    ),
                    outcome,
                }
            }
        });

        self.scores = Some(scores);
        self.closed_at = Some(SystemTime::now());

        tracing::info!(
            round_number = self.round_number,
            initiator_score = scores.initiator.score,
            opponent_score = scores.opponent.score,
            "round closed"
        );
        scores
    }
}

// =========================================================================
// Tests
// =========================================================================
