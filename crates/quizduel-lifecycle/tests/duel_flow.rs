//! End-to-end duel actor flows on a paused clock: forfeits, draws,
//! aborts, pool exhaustion, and submission routing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use quizduel_lifecycle::{
    DuelHandle, DuelParams, DuelSettings, DuelStatus, EventSink,
    NotificationSink, QuestionSource, QuestionSourceError, spawn_duel,
};
use quizduel_protocol::{
    AnswerId, AnswerOption, CategoryId, Difficulty, DomainEvent, DuelId,
    DuelOutcome, PlayerEvent, PlayerId, Question, QuestionId, QuestionKind,
    SideSlots,
};
use tokio::sync::mpsc;
use tokio::time;

const INITIATOR: PlayerId = PlayerId(1);
const OPPONENT: PlayerId = PlayerId(2);

/// Answer ids for question `n`: correct is `n * 10 + 1`, wrong `n * 10 + 2`.
fn correct_answer(n: u64) -> AnswerId {
    AnswerId(n * 10 + 1)
}

fn wrong_answer(n: u64) -> AnswerId {
    AnswerId(n * 10 + 2)
}

fn fixture_question(n: u64) -> Question {
    Question {
        id: QuestionId(n),
        kind: QuestionKind::MultipleChoice,
        category: Some(CategoryId(7)),
        difficulty: Some(Difficulty::Medium),
        prompt: format!("question {n}"),
        answers: vec![
            AnswerOption {
                id: correct_answer(n),
                text: "right".into(),
                is_correct: true,
                score_delta: None,
            },
            AnswerOption {
                id: wrong_answer(n),
                text: "wrong".into(),
                is_correct: false,
                score_delta: None,
            },
        ],
        time_limit_ms: 30_000,
    }
}

/// Serves from a fixed pool, honouring the exclude list.
struct FixtureSource {
    pool: Vec<Question>,
}

impl FixtureSource {
    fn with_questions(count: u64) -> Arc<Self> {
        Arc::new(Self {
            pool: (1..=count).map(fixture_question).collect(),
        })
    }
}

impl QuestionSource for FixtureSource {
    async fn next_question(
        &self,
        _category: Option<CategoryId>,
        _difficulty: Option<Difficulty>,
        exclude: &[QuestionId],
    ) -> Result<Question, QuestionSourceError> {
        self.pool
            .iter()
            .find(|q| !exclude.contains(&q.id))
            .cloned()
            .ok_or(QuestionSourceError::NoQuestionAvailable)
    }
}

/// Forwards every notification into an unbounded channel the test drains.
struct ChannelNotifier {
    tx: mpsc::UnboundedSender<(PlayerId, PlayerEvent)>,
}

impl NotificationSink for ChannelNotifier {
    fn send(&self, player: PlayerId, event: PlayerEvent) {
        let _ = self.tx.send((player, event));
    }
}

struct MemoryEvents {
    published: Mutex<Vec<DomainEvent>>,
}

impl EventSink for MemoryEvents {
    fn publish(&self, event: DomainEvent) {
        self.published.lock().unwrap().push(event);
    }
}

struct Harness {
    handle: DuelHandle,
    notifications: mpsc::UnboundedReceiver<(PlayerId, PlayerEvent)>,
    events: Arc<MemoryEvents>,
}

impl Harness {
    fn start(questions: u64, settings: DuelSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let events = Arc::new(MemoryEvents {
            published: Mutex::new(Vec::new()),
        });
        let handle = spawn_duel(
            DuelParams {
                duel_id: DuelId(1),
                code: "00d1ce".into(),
                players: SideSlots::new(INITIATOR, OPPONENT),
                category: Some(CategoryId(7)),
                settings,
            },
            FixtureSource::with_questions(questions),
            Arc::new(ChannelNotifier { tx }),
            Arc::clone(&events),
        );
        Self {
            handle,
            notifications: rx,
            events,
        }
    }

    /// Waits until the initiator's copy of the next `QuestionDispatched`
    /// arrives, returning its round number and question id.
    async fn next_dispatch(&mut self) -> (u32, QuestionId) {
        loop {
            let (player, event) = self
                .notifications
                .recv()
                .await
                .expect("notification stream ended unexpectedly");
            if player != INITIATOR {
                continue;
            }
            if let PlayerEvent::QuestionDispatched {
                round_number,
                question,
                ..
            } = event
            {
                return (round_number, question.id);
            }
        }
    }

    /// Drains everything the actor has sent so far, after termination.
    async fn drain_notifications(&mut self) -> Vec<(PlayerId, PlayerEvent)> {
        let mut all = Vec::new();
        while let Ok(pair) = self.notifications.try_recv() {
            all.push(pair);
        }
        all
    }
}

#[tokio::test(start_paused = true)]
async fn test_matched_notifications_name_the_other_player() {
    let mut harness = Harness::start(5, DuelSettings::default());

    let mut seen = Vec::new();
    while seen.len() < 2 {
        let (player, event) = harness.notifications.recv().await.unwrap();
        if let PlayerEvent::DuelMatched { opponent, code, .. } = event {
            assert_eq!(code, "00d1ce");
            seen.push((player, opponent));
        }
    }
    assert!(seen.contains(&(INITIATOR, OPPONENT)));
    assert!(seen.contains(&(OPPONENT, INITIATOR)));

    harness.handle.abort("test over").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_one_sided_timeout_decides_a_short_duel() {
    let settings = DuelSettings {
        rounds_to_win: 1,
        ..DuelSettings::default()
    };
    let mut harness = Harness::start(3, settings);

    let (round_number, question_id) = harness.next_dispatch().await;
    assert_eq!(round_number, 1);

    time::advance(Duration::from_secs(5)).await;
    harness
        .handle
        .submit(INITIATOR, 1, correct_answer(question_id.0))
        .await
        .unwrap();

    // The opponent stays silent; the paused clock runs the deadline out.
    let status = harness.handle.wait_terminal().await;
    assert_eq!(status, DuelStatus::Finished);

    let result = harness.handle.result().await.unwrap().unwrap();
    assert_eq!(result.outcome, DuelOutcome::InitiatorWin);
    assert_eq!(result.winner, Some(INITIATOR));
    // 100 base + 50 * 25/30 speed bonus.
    assert_eq!(result.total_score.initiator, 141);
    assert_eq!(result.total_score.opponent, 0);
    assert_eq!(result.correct, SideSlots::new(1, 0));
}

#[tokio::test(start_paused = true)]
async fn test_two_missed_rounds_forfeit_the_silent_side() {
    let mut harness = Harness::start(5, DuelSettings::default());

    // Round 1: both answer, so the opponent's miss streak starts at zero.
    let (_, q1) = harness.next_dispatch().await;
    harness
        .handle
        .submit(INITIATOR, 1, correct_answer(q1.0))
        .await
        .unwrap();
    harness
        .handle
        .submit(OPPONENT, 1, wrong_answer(q1.0))
        .await
        .unwrap();

    // Rounds 2 and 3: only the initiator answers. Waiting on the next
    // dispatch lets the paused clock run each deadline out.
    for expected_round in 2..=3u32 {
        let (round_number, qid) = harness.next_dispatch().await;
        assert_eq!(round_number, expected_round);
        harness
            .handle
            .submit(INITIATOR, round_number, correct_answer(qid.0))
            .await
            .unwrap();
    }

    let status = harness.handle.wait_terminal().await;
    assert_eq!(status, DuelStatus::Finished);

    let result = harness.handle.result().await.unwrap().unwrap();
    assert_eq!(result.outcome, DuelOutcome::Forfeit);
    assert_eq!(result.winner, Some(INITIATOR));
    assert_eq!(result.correct.initiator, 3);
}

#[tokio::test(start_paused = true)]
async fn test_every_round_tied_ends_in_a_draw_at_the_cap() {
    // rounds_to_win 3 caps the duel at 5 rounds.
    let mut harness = Harness::start(5, DuelSettings::default());

    let mut dispatched = Vec::new();
    for expected_round in 1..=5u32 {
        let (round_number, qid) = harness.next_dispatch().await;
        assert_eq!(round_number, expected_round);
        dispatched.push(qid);

        // Both submit the correct answer back to back on the paused
        // clock, so elapsed times and scores are identical.
        harness
            .handle
            .submit(INITIATOR, round_number, correct_answer(qid.0))
            .await
            .unwrap();
        harness
            .handle
            .submit(OPPONENT, round_number, correct_answer(qid.0))
            .await
            .unwrap();
    }

    let status = harness.handle.wait_terminal().await;
    assert_eq!(status, DuelStatus::Finished);

    let result = harness.handle.result().await.unwrap().unwrap();
    assert_eq!(result.outcome, DuelOutcome::Draw);
    assert_eq!(result.winner, None);
    assert_eq!(result.total_score.initiator, result.total_score.opponent);

    // No question repeated across the duel.
    let mut unique = dispatched.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), dispatched.len());

    // One domain event per closed round plus the final one.
    let published = harness.events.published.lock().unwrap();
    let round_events = published
        .iter()
        .filter(|e| matches!(e, DomainEvent::RoundClosed { .. }))
        .count();
    assert_eq!(round_events, 5);
    assert!(matches!(
        published.last(),
        Some(DomainEvent::DuelFinished {
            outcome: DuelOutcome::Draw,
            winner: None,
            ..
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_both_sides_unresponsive_cancels_the_duel() {
    // Nobody ever answers: the paused clock runs every deadline out.
    // After two missed rounds on each side the duel is cancelled, not
    // forfeited to either player, and no result exists.
    let mut harness = Harness::start(5, DuelSettings::default());

    let status = harness.handle.wait_terminal().await;
    assert_eq!(status, DuelStatus::Cancelled);
    assert_eq!(harness.handle.result().await.unwrap(), None);

    let cancelled: Vec<_> = harness
        .drain_notifications()
        .await
        .into_iter()
        .filter_map(|(player, event)| match event {
            PlayerEvent::DuelCancelled { reason, .. } => {
                Some((player, reason))
            }
            _ => None,
        })
        .collect();
    assert_eq!(cancelled.len(), 2);
    assert!(
        cancelled
            .iter()
            .all(|(_, reason)| reason == "both players unresponsive")
    );

    // Exactly the two missed rounds closed; no final record was emitted.
    let published = harness.events.published.lock().unwrap();
    let round_events = published
        .iter()
        .filter(|e| matches!(e, DomainEvent::RoundClosed { .. }))
        .count();
    assert_eq!(round_events, 2);
    assert!(
        !published
            .iter()
            .any(|e| matches!(e, DomainEvent::DuelFinished { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn test_abort_cancels_without_scoring_the_open_round() {
    let mut harness = Harness::start(5, DuelSettings::default());

    let (_, q1) = harness.next_dispatch().await;
    harness
        .handle
        .submit(INITIATOR, 1, correct_answer(q1.0))
        .await
        .unwrap();

    harness.handle.abort("player left").await.unwrap();

    let status = harness.handle.wait_terminal().await;
    assert_eq!(status, DuelStatus::Cancelled);
    assert_eq!(harness.handle.result().await.unwrap(), None);

    let cancelled: Vec<_> = harness
        .drain_notifications()
        .await
        .into_iter()
        .filter_map(|(player, event)| match event {
            PlayerEvent::DuelCancelled { reason, .. } => {
                Some((player, reason))
            }
            _ => None,
        })
        .collect();
    assert_eq!(cancelled.len(), 2);
    assert!(cancelled.iter().all(|(_, r)| r == "player left"));

    // The interrupted round produced no scores and no domain events.
    assert!(harness.events.published.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_question_pool_cancels_the_duel() {
    // One question, three rounds needed: the second fetch must fail.
    let mut harness = Harness::start(1, DuelSettings::default());

    let (_, q1) = harness.next_dispatch().await;
    harness
        .handle
        .submit(INITIATOR, 1, correct_answer(q1.0))
        .await
        .unwrap();
    harness
        .handle
        .submit(OPPONENT, 1, correct_answer(q1.0))
        .await
        .unwrap();

    let status = harness.handle.wait_terminal().await;
    assert_eq!(status, DuelStatus::Cancelled);

    let reasons: Vec<_> = harness
        .drain_notifications()
        .await
        .into_iter()
        .filter_map(|(_, event)| match event {
            PlayerEvent::DuelCancelled { reason, .. } => Some(reason),
            _ => None,
        })
        .collect();
    assert_eq!(reasons.len(), 2);
    assert!(reasons.iter().all(|r| r == "no question available"));
}

#[tokio::test(start_paused = true)]
async fn test_submission_routing_rejects_strangers_and_stale_rounds() {
    let mut harness = Harness::start(5, DuelSettings::default());

    let (_, q1) = harness.next_dispatch().await;

    // Not a participant.
    let err = harness
        .handle
        .submit(PlayerId(99), 1, correct_answer(q1.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        quizduel_lifecycle::DuelError::NotParticipant(PlayerId(99), _)
    ));

    // A round that hasn't been dispatched yet.
    let err = harness
        .handle
        .submit(INITIATOR, 4, correct_answer(q1.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        quizduel_lifecycle::DuelError::InvalidRoundNumber(_, 4)
    ));

    // Second answer from the same seat.
    harness
        .handle
        .submit(INITIATOR, 1, correct_answer(q1.0))
        .await
        .unwrap();
    let err = harness
        .handle
        .submit(INITIATOR, 1, wrong_answer(q1.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        quizduel_lifecycle::DuelError::Round(
            quizduel_round::RoundError::DuplicateAnswer(_)
        )
    ));

    // Let round 1 time out; a late answer for it is rejected as closed.
    let (round_number, _) = harness.next_dispatch().await;
    assert_eq!(round_number, 2);
    let err = harness
        .handle
        .submit(OPPONENT, 1, correct_answer(q1.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        quizduel_lifecycle::DuelError::Round(
            quizduel_round::RoundError::RoundClosed
        )
    ));

    harness.handle.abort("test over").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_commands_after_the_end_report_ended() {
    let settings = DuelSettings {
        rounds_to_win: 1,
        ..DuelSettings::default()
    };
    let mut harness = Harness::start(3, settings);

    let (_, q1) = harness.next_dispatch().await;
    harness
        .handle
        .submit(INITIATOR, 1, correct_answer(q1.0))
        .await
        .unwrap();
    harness
        .handle
        .submit(OPPONENT, 1, wrong_answer(q1.0))
        .await
        .unwrap();

    let status = harness.handle.wait_terminal().await;
    assert_eq!(status, DuelStatus::Finished);

    let err = harness
        .handle
        .submit(INITIATOR, 2, correct_answer(2))
        .await
        .unwrap_err();
    assert!(matches!(err, quizduel_lifecycle::DuelError::Ended(_)));

    let err = harness.handle.abort("too late").await.unwrap_err();
    assert!(matches!(err, quizduel_lifecycle::DuelError::Ended(_)));

    // State queries still work.
    let state = harness.handle.state().await.unwrap();
    assert_eq!(state.status, DuelStatus::Finished);
    assert!(state.finished_at.is_some());
}
