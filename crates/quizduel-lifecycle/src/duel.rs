//! Duel actor: an isolated Tokio task that owns one duel.
//!
//! Each duel runs in its own task, communicating with the outside world
//! through an mpsc channel — no shared mutable state, just message
//! passing. Work within a duel is serialized by round: the actor plays
//! rounds strictly one after another, and inside a round it races the
//! collection deadline against incoming commands with `tokio::select!`.
//!
//! The actor is spawned at pairing time, so its state machine starts at
//! [`DuelStatus::Matched`]; the waiting phase lives in the matchmaking
//! queue, before an actor exists.

use std::sync::Arc;
use std::time::SystemTime;

use quizduel_protocol::{
    AnswerId, CategoryId, DomainEvent, DuelId, PlayerEvent, PlayerId,
    QuestionId, Side, SideSlots,
};
use quizduel_round::{Round, RoundError};
use tokio::sync::{mpsc, oneshot, watch};

use crate::{
    DuelError, DuelResult, DuelSettings, DuelState, DuelStatus, EventSink,
    NotificationSink, QuestionSource, QuestionSourceError, RoundRecord,
    finalize,
};

/// Default command channel size for duel actors.
const COMMAND_CHANNEL_SIZE: usize = 64;

/// Consecutive unanswered rounds before a side is forfeited.
const FORFEIT_MISSES: u32 = 2;

/// Everything needed to start a freshly paired duel.
#[derive(Debug, Clone)]
pub struct DuelParams {
    pub duel_id: DuelId,
    /// Durable unique code, generated at matchmaking time.
    pub code: String,
    pub players: SideSlots<PlayerId>,
    pub category: Option<CategoryId>,
    pub settings: DuelSettings,
}

/// Commands sent to a duel actor through its channel.
pub(crate) enum DuelCommand {
    Submit {
        player: PlayerId,
        round_number: u32,
        answer: AnswerId,
        reply: oneshot::Sender<Result<(), DuelError>>,
    },
    Abort {
        reason: String,
        reply: oneshot::Sender<Result<(), DuelError>>,
    },
    GetState {
        reply: oneshot::Sender<DuelState>,
    },
    GetResult {
        reply: oneshot::Sender<Option<DuelResult>>,
    },
}

/// Handle to a running duel actor. Cheap to clone.
#[derive(Debug, Clone)]
pub struct DuelHandle {
    duel_id: DuelId,
    sender: mpsc::Sender<DuelCommand>,
    status: watch::Receiver<DuelStatus>,
}

impl DuelHandle {
    pub fn duel_id(&self) -> DuelId {
        self.duel_id
    }

    /// The status as of the actor's last transition.
    pub fn status(&self) -> DuelStatus {
        *self.status.borrow()
    }

    /// Submits a player's answer for a round.
    pub async fn submit(
        &self,
        player: PlayerId,
        round_number: u32,
        answer: AnswerId,
    ) -> Result<(), DuelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(DuelCommand::Submit {
                player,
                round_number,
                answer,
                reply: reply_tx,
            })
            .await
            .map_err(|_| DuelError::Unavailable(self.duel_id))?;
        reply_rx
            .await
            .map_err(|_| DuelError::Unavailable(self.duel_id))?
    }

    /// Aborts the duel: interrupts any open round, skips scoring, and
    /// routes the duel straight to cancelled.
    pub async fn abort(
        &self,
        reason: impl Into<String>,
    ) -> Result<(), DuelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(DuelCommand::Abort {
                reason: reason.into(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| DuelError::Unavailable(self.duel_id))?;
        reply_rx
            .await
            .map_err(|_| DuelError::Unavailable(self.duel_id))?
    }

    /// Requests a state snapshot.
    pub async fn state(&self) -> Result<DuelState, DuelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(DuelCommand::GetState { reply: reply_tx })
            .await
            .map_err(|_| DuelError::Unavailable(self.duel_id))?;
        reply_rx
            .await
            .map_err(|_| DuelError::Unavailable(self.duel_id))
    }

    /// The final result, once the duel is finished. `None` while running
    /// and for cancelled duels (cancellation produces no result).
    pub async fn result(&self) -> Result<Option<DuelResult>, DuelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(DuelCommand::GetResult { reply: reply_tx })
            .await
            .map_err(|_| DuelError::Unavailable(self.duel_id))?;
        reply_rx
            .await
            .map_err(|_| DuelError::Unavailable(self.duel_id))
    }

    /// Resolves once the duel reaches a terminal status.
    pub async fn wait_terminal(&self) -> DuelStatus {
        let mut rx = self.status.clone();
        loop {
            let status = *rx.borrow_and_update();
            if status.is_terminal() {
                return status;
            }
            if rx.changed().await.is_err() {
                // Actor gone; report whatever it last published.
                return *rx.borrow();
            }
        }
    }
}

/// How a round's collection loop ended.
enum RoundEnd {
    /// Round closed normally (both answered or deadline).
    Closed,
    /// The duel went terminal mid-round (abort, source exhaustion,
    /// host shutdown); the round was discarded unscored.
    Aborted,
}

/// The internal duel actor state. Runs inside a Tokio task.
struct DuelActor<Q, N, E> {
    duel_id: DuelId,
    code: String,
    players: SideSlots<PlayerId>,
    category: Option<CategoryId>,
    settings: DuelSettings,

    status: DuelStatus,
    matched_at: SystemTime,
    started_at: Option<SystemTime>,
    finished_at: Option<SystemTime>,

    used_questions: Vec<QuestionId>,
    history: Vec<RoundRecord>,
    round_wins: SideSlots<u32>,
    total_score: SideSlots<i64>,
    consecutive_misses: SideSlots<u32>,
    result: Option<DuelResult>,

    receiver: mpsc::Receiver<DuelCommand>,
    status_tx: watch::Sender<DuelStatus>,

    source: Arc<Q>,
    notify: Arc<N>,
    events: Arc<E>,
}

impl<Q, N, E> DuelActor<Q, N, E>
where
    Q: QuestionSource,
    N: NotificationSink,
    E: EventSink,
{
    async fn run(mut self) {
        tracing::info!(
            duel_id = %self.duel_id,
            initiator = %self.players.initiator,
            opponent = %self.players.opponent,
            "duel actor started"
        );

        for side in [Side::Initiator, Side::Opponent] {
            self.notify.send(
                self.players[side],
                PlayerEvent::DuelMatched {
                    duel_id: self.duel_id,
                    code: self.code.clone(),
                    opponent: self.players[side.other()],
                },
            );
        }

        while !self.status.is_terminal() {
            let round_number = self.history.len() as u32 + 1;
            match self.play_round(round_number).await {
                RoundEnd::Closed => self.check_terminal(),
                RoundEnd::Aborted => break,
            }
        }

        self.serve_after_terminal().await;

        tracing::info!(
            duel_id = %self.duel_id,
            status = %self.status,
            "duel actor stopped"
        );
    }

    /// Plays one round start to finish: fetch question, dispatch, collect
    /// answers until both arrive or the deadline elapses, close, score,
    /// record, and emit.
    async fn play_round(&mut self, round_number: u32) -> RoundEnd {
        let question = match self
            .source
            .next_question(
                self.category,
                self.settings.difficulty,
                &self.used_questions,
            )
            .await
        {
            Ok(q) => q,
            Err(QuestionSourceError::NoQuestionAvailable) => {
                tracing::warn!(
                    duel_id = %self.duel_id,
                    round_number,
                    "question pool exhausted, cancelling duel"
                );
                self.cancel("no question available");
                return RoundEnd::Aborted;
            }
        };
        self.used_questions.push(question.id);

        if self.status == DuelStatus::Matched {
            self.set_status(DuelStatus::Active);
            self.started_at = Some(SystemTime::now());
        }

        let mut round =
            Round::open(round_number, question, self.settings.time_limit);
        let view = round.question().view();
        for side in [Side::Initiator, Side::Opponent] {
            self.notify.send(
                self.players[side],
                PlayerEvent::QuestionDispatched {
                    duel_id: self.duel_id,
                    round_number,
                    question: view.clone(),
                },
            );
        }

        // Collection window: both-answered and deadline are independent
        // closing triggers; whichever fires first ends the loop, and
        // Round::close arbitrates if they ever race.
        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    None => {
                        // Every handle dropped: the host is gone. Players
                        // still get a terminal notification.
                        self.cancel("duel host shut down");
                        return RoundEnd::Aborted;
                    }
                    Some(DuelCommand::Submit { player, round_number: rn, answer, reply }) => {
                        let result =
                            self.handle_submit(&mut round, player, rn, answer);
                        let _ = reply.send(result);
                        if round.both_submitted() {
                            break;
                        }
                    }
                    Some(DuelCommand::Abort { reason, reply }) => {
                        let _ = reply.send(Ok(()));
                        self.cancel(&reason);
                        return RoundEnd::Aborted;
                    }
                    Some(DuelCommand::GetState { reply }) => {
                        let _ = reply.send(self.snapshot(Some(&round)));
                    }
                    Some(DuelCommand::GetResult { reply }) => {
                        let _ = reply.send(self.result.clone());
                    }
                },
                _ = round.deadline() => break,
            }
        }

        let scores = round.close(&self.settings.scoring);

        let record = RoundRecord {
            round_number,
            question_id: round.question().id,
            question_sent_at: round.question_sent_at(),
            closed_at: round.closed_at().expect("round just closed"),
            answers: SideSlots::new(
                round.submission(Side::Initiator).map(|s| s.answer),
                round.submission(Side::Opponent).map(|s| s.answer),
            ),
            scores,
        };

        for side in [Side::Initiator, Side::Opponent] {
            self.total_score[side] += scores[side].score;
            if scores[side].outcome.answered() {
                self.consecutive_misses[side] = 0;
            } else {
                self.consecutive_misses[side] += 1;
            }
        }
        if let Some(winner) = record.round_winner() {
            self.round_wins[winner] += 1;
        }

        let correct_answer = round.question().correct().id;
        for side in [Side::Initiator, Side::Opponent] {
            self.notify.send(
                self.players[side],
                PlayerEvent::RoundClosed {
                    duel_id: self.duel_id,
                    round_number,
                    initiator_score: scores.initiator.score,
                    opponent_score: scores.opponent.score,
                    correct_answer,
                },
            );
        }
        self.events.publish(DomainEvent::RoundClosed {
            duel_id: self.duel_id,
            round_number,
            initiator_score: scores.initiator.score,
            opponent_score: scores.opponent.score,
        });

        self.history.push(record);
        RoundEnd::Closed
    }

    fn handle_submit(
        &mut self,
        round: &mut Round,
        player: PlayerId,
        round_number: u32,
        answer: AnswerId,
    ) -> Result<(), DuelError> {
        let side = self
            .side_of(player)
            .ok_or(DuelError::NotParticipant(player, self.duel_id))?;

        // A submission for an earlier round arrived after that round
        // closed; a later round hasn't been dispatched yet.
        if round_number < round.round_number() {
            return Err(RoundError::RoundClosed.into());
        }
        if round_number > round.round_number() {
            return Err(DuelError::InvalidRoundNumber(
                self.duel_id,
                round_number,
            ));
        }

        round.submit(side, answer)?;
        Ok(())
    }

    /// Decides whether the duel is over after a closed round.
    ///
    /// Order matters: forfeits are checked before win conditions so an
    /// unresponsive side can't back into a win, and a both-sides timeout
    /// cancels rather than crowning anyone.
    fn check_terminal(&mut self) {
        let initiator_gone =
            self.consecutive_misses.initiator >= FORFEIT_MISSES;
        let opponent_gone =
            self.consecutive_misses.opponent >= FORFEIT_MISSES;

        if initiator_gone && opponent_gone {
            self.cancel("both players unresponsive");
            return;
        }
        if initiator_gone {
            self.finish(Some(Side::Initiator));
            return;
        }
        if opponent_gone {
            self.finish(Some(Side::Opponent));
            return;
        }

        let rounds_to_win = self.settings.rounds_to_win;
        let decided = self.round_wins.initiator >= rounds_to_win
            || self.round_wins.opponent >= rounds_to_win;
        let capped = self.history.len() as u32 >= self.settings.round_cap();
        if decided || capped {
            self.finish(None);
        }
    }

    /// Finalizes the duel. Runs exactly once.
    ///
    /// # Panics
    /// Panics if the duel is not active or already has a result — either
    /// means the round sequencing is broken, which must surface, not be
    /// papered over.
    fn finish(&mut self, forfeited_by: Option<Side>) {
        assert_eq!(
            self.status,
            DuelStatus::Active,
            "finalizing duel {} in status {}",
            self.duel_id,
            self.status
        );
        assert!(
            self.result.is_none(),
            "duel {} finalized twice",
            self.duel_id
        );

        let result = finalize(
            self.duel_id,
            self.players,
            &self.history,
            forfeited_by,
        );

        self.set_status(DuelStatus::Finished);
        self.finished_at = Some(SystemTime::now());

        for side in [Side::Initiator, Side::Opponent] {
            self.notify.send(
                self.players[side],
                PlayerEvent::DuelFinished {
                    duel_id: self.duel_id,
                    outcome: result.outcome,
                    winner: result.winner,
                    initiator_score: result.total_score.initiator,
                    opponent_score: result.total_score.opponent,
                },
            );
        }
        self.events.publish(DomainEvent::DuelFinished {
            duel_id: self.duel_id,
            initiator: self.players.initiator,
            opponent: self.players.opponent,
            outcome: result.outcome,
            winner: result.winner,
            initiator_score: result.total_score.initiator,
            opponent_score: result.total_score.opponent,
            initiator_correct: result.correct.initiator,
            opponent_correct: result.correct.opponent,
        });

        tracing::info!(
            duel_id = %self.duel_id,
            outcome = %result.outcome,
            rounds = self.history.len(),
            "duel finished"
        );
        self.result = Some(result);
    }

    /// Cancels the duel: no scoring, no result, explicit notification.
    fn cancel(&mut self, reason: &str) {
        if self.status.is_terminal() {
            return;
        }
        self.set_status(DuelStatus::Cancelled);
        self.finished_at = Some(SystemTime::now());

        for side in [Side::Initiator, Side::Opponent] {
            self.notify.send(
                self.players[side],
                PlayerEvent::DuelCancelled {
                    duel_id: self.duel_id,
                    reason: reason.to_string(),
                },
            );
        }

        tracing::info!(duel_id = %self.duel_id, reason, "duel cancelled");
    }

    /// Keeps answering queries after the duel ended, until every handle
    /// is dropped. Submissions and aborts are rejected.
    async fn serve_after_terminal(&mut self) {
        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                DuelCommand::Submit { reply, .. }
                | DuelCommand::Abort { reply, .. } => {
                    let _ = reply.send(Err(DuelError::Ended(self.duel_id)));
                }
                DuelCommand::GetState { reply } => {
                    let _ = reply.send(self.snapshot(None));
                }
                DuelCommand::GetResult { reply } => {
                    let _ = reply.send(self.result.clone());
                }
            }
        }
    }

    fn side_of(&self, player: PlayerId) -> Option<Side> {
        if self.players.initiator == player {
            Some(Side::Initiator)
        } else if self.players.opponent == player {
            Some(Side::Opponent)
        } else {
            None
        }
    }

    /// Applies a status transition, publishing it to watchers.
    ///
    /// # Panics
    /// Panics on an illegal transition — the state machine is this
    /// actor's core invariant.
    fn set_status(&mut self, next: DuelStatus) {
        assert!(
            self.status.can_transition_to(next),
            "illegal duel status transition {} -> {} for {}",
            self.status,
            next,
            self.duel_id
        );
        self.status = next;
        self.status_tx.send_replace(next);
        tracing::debug!(duel_id = %self.duel_id, status = %next, "status");
    }

    fn snapshot(&self, open_round: Option<&Round>) -> DuelState {
        DuelState {
            duel_id: self.duel_id,
            code: self.code.clone(),
            status: self.status,
            players: self.players,
            category: self.category,
            settings: self.settings,
            matched_at: self.matched_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            current_round: open_round
                .map(|r| r.round_number())
                .unwrap_or(self.history.len() as u32),
            round_wins: self.round_wins,
            total_score: self.total_score,
        }
    }
}

/// Spawns a duel actor for a freshly paired duel and returns its handle.
///
/// The actor immediately notifies both players of the match and drives
/// rounds until the duel reaches a terminal state.
pub fn spawn_duel<Q, N, E>(
    params: DuelParams,
    source: Arc<Q>,
    notify: Arc<N>,
    events: Arc<E>,
) -> DuelHandle
where
    Q: QuestionSource,
    N: NotificationSink,
    E: EventSink,
{
    let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let (status_tx, status_rx) = watch::channel(DuelStatus::Matched);

    let actor = DuelActor {
        duel_id: params.duel_id,
        code: params.code,
        players: params.players,
        category: params.category,
        settings: params.settings.validated(),
        status: DuelStatus::Matched,
        matched_at: SystemTime::now(),
        started_at: None,
        finished_at: None,
        used_questions: Vec::new(),
        history: Vec::new(),
        round_wins: SideSlots::new(0, 0),
        total_score: SideSlots::new(0, 0),
        consecutive_misses: SideSlots::new(0, 0),
        result: None,
        receiver: rx,
        status_tx,
        source,
        notify,
        events,
    };

    let duel_id = actor.duel_id;
    tokio::spawn(actor.run());

    DuelHandle {
        duel_id,
        sender: tx,
        status: status_rx,
    }
}
