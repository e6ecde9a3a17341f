//! `DuelEngine`: the facade that ties the layers together.
//!
//! The engine owns the matchmaking queue, an index of running duel
//! actors, and the presence tracker, all behind one mutex. Duel actors
//! themselves run as independent tasks; the engine only holds their
//! handles and routes commands by player. When a duel reaches a terminal
//! status, a small watcher task removes it from the index, so the
//! one-live-duel-per-player invariant frees itself up automatically.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use quizduel_lifecycle::{
    DuelError, DuelHandle, DuelParams, DuelResult, DuelSettings, DuelState,
    EventSink, NotificationSink, QuestionSource, spawn_duel,
};
use quizduel_match::{MatchDecision, Matchmaker, RatingBand, WaitingDuel};
use quizduel_protocol::{
    AnswerId, CategoryId, DuelId, PlayerId, Side, SideSlots,
};
use tokio::sync::Mutex;

use crate::{PresenceTracker, QuizduelError};

/// What a matchmaking request resolved to, as the engine reports it.
#[derive(Debug)]
pub enum DuelTicket {
    /// No compatible duel was waiting; the player initiates a fresh one.
    Waiting { duel_id: DuelId, code: String },

    /// Paired immediately; the duel actor is already running.
    Started {
        handle: DuelHandle,
        code: String,
        opponent: PlayerId,
    },
}

impl DuelTicket {
    pub fn duel_id(&self) -> DuelId {
        match self {
            DuelTicket::Waiting { duel_id, .. } => *duel_id,
            DuelTicket::Started { handle, .. } => handle.duel_id(),
        }
    }
}

/// Mutable engine state, guarded by one mutex.
struct EngineIndex {
    matchmaker: Matchmaker,
    duels: HashMap<DuelId, DuelHandle>,
    /// One live duel per player (key invariant).
    players: HashMap<PlayerId, DuelId>,
    presence: PresenceTracker,
}

/// The duel engine. Cheap to clone; clones share state.
pub struct DuelEngine<Q, N, E> {
    settings: DuelSettings,
    source: Arc<Q>,
    notify: Arc<N>,
    events: Arc<E>,
    index: Arc<Mutex<EngineIndex>>,
}

impl<Q, N, E> Clone for DuelEngine<Q, N, E> {
    fn clone(&self) -> Self {
        Self {
            settings: self.settings,
            source: Arc::clone(&self.source),
            notify: Arc::clone(&self.notify),
            events: Arc::clone(&self.events),
            index: Arc::clone(&self.index),
        }
    }
}

impl<Q, N, E> DuelEngine<Q, N, E>
where
    Q: QuestionSource,
    N: NotificationSink,
    E: EventSink,
{
    /// Creates an engine with the given default duel settings and the
    /// three external seams.
    pub fn new(
        settings: DuelSettings,
        source: Arc<Q>,
        notify: Arc<N>,
        events: Arc<E>,
    ) -> Self {
        Self {
            settings: settings.validated(),
            source,
            notify,
            events,
            index: Arc::new(Mutex::new(EngineIndex {
                matchmaker: Matchmaker::new(),
                duels: HashMap::new(),
                players: HashMap::new(),
                presence: PresenceTracker::new(),
            })),
        }
    }

    /// Handles a matchmaking request: pair with the oldest compatible
    /// waiting duel, or enqueue a new one.
    ///
    /// Rejected with `DuplicateMatchmaking` if the player is already
    /// waiting or already bound to a live duel.
    pub async fn request_duel(
        &self,
        player: PlayerId,
        category: Option<CategoryId>,
        rating_band: Option<RatingBand>,
    ) -> Result<DuelTicket, QuizduelError> {
        let mut index = self.index.lock().await;

        // The cleanup watcher unbinds players asynchronously; a bound duel
        // that already went terminal no longer blocks a new request.
        if let Some(duel_id) = index.players.get(&player).copied() {
            let still_live = index
                .duels
                .get(&duel_id)
                .is_some_and(|handle| !handle.status().is_terminal());
            if still_live {
                return Err(
                    quizduel_match::MatchError::DuplicateMatchmaking(player)
                        .into(),
                );
            }
            index.players.remove(&player);
        }
        index.presence.heartbeat(player, None);

        match index.matchmaker.request(player, category, rating_band)? {
            MatchDecision::Enqueued(duel) => Ok(DuelTicket::Waiting {
                duel_id: duel.duel_id,
                code: duel.code,
            }),
            MatchDecision::Paired { duel, opponent } => {
                let code = duel.code.clone();
                let initiator = duel.initiator;
                let handle = self.start_duel(&mut index, duel, opponent);
                Ok(DuelTicket::Started {
                    handle,
                    code,
                    opponent: initiator,
                })
            }
        }
    }

    /// Spawns the actor for a freshly paired duel and indexes it.
    fn start_duel(
        &self,
        index: &mut EngineIndex,
        duel: WaitingDuel,
        opponent: PlayerId,
    ) -> DuelHandle {
        let players = SideSlots::new(duel.initiator, opponent);
        let handle = spawn_duel(
            DuelParams {
                duel_id: duel.duel_id,
                code: duel.code,
                players,
                category: duel.category,
                settings: self.settings,
            },
            Arc::clone(&self.source),
            Arc::clone(&self.notify),
            Arc::clone(&self.events),
        );

        index.duels.insert(duel.duel_id, handle.clone());
        index.players.insert(players.initiator, duel.duel_id);
        index.players.insert(players.opponent, duel.duel_id);

        self.watch_for_cleanup(handle.clone(), players);
        handle
    }

    /// Spawns the task that unindexes a duel once it goes terminal.
    ///
    /// Holds only a weak reference to the index so a dropped engine
    /// doesn't keep watcher tasks alive.
    fn watch_for_cleanup(
        &self,
        handle: DuelHandle,
        players: SideSlots<PlayerId>,
    ) {
        let weak = Arc::downgrade(&self.index);
        tokio::spawn(async move {
            let status = handle.wait_terminal().await;
            let Some(index) = weak.upgrade() else {
                return;
            };
            let mut index = index.lock().await;
            let duel_id = handle.duel_id();
            index.duels.remove(&duel_id);
            for side in [Side::Initiator, Side::Opponent] {
                let player = players[side];
                if index.players.get(&player) == Some(&duel_id) {
                    index.players.remove(&player);
                }
                index.presence.forget(player);
            }
            tracing::debug!(
                %duel_id,
                %status,
                "duel removed from engine index"
            );
        });
    }

    /// Withdraws a still-waiting duel from the queue.
    pub async fn cancel_waiting(
        &self,
        duel_id: DuelId,
    ) -> Result<WaitingDuel, QuizduelError> {
        let mut index = self.index.lock().await;
        let duel = index.matchmaker.cancel_waiting(duel_id)?;
        index.presence.forget(duel.initiator);
        Ok(duel)
    }

    /// Routes a player's answer to their live duel.
    pub async fn submit_answer(
        &self,
        player: PlayerId,
        round_number: u32,
        answer: AnswerId,
    ) -> Result<(), QuizduelError> {
        let handle = {
            let mut index = self.index.lock().await;
            index.presence.heartbeat(player, None);
            let duel_id = *index
                .players
                .get(&player)
                .ok_or(QuizduelError::NotInDuel(player))?;
            index
                .duels
                .get(&duel_id)
                .cloned()
                .ok_or(QuizduelError::Duel(DuelError::Unavailable(duel_id)))?
        };
        // Lock released before awaiting the actor.
        handle.submit(player, round_number, answer).await?;
        Ok(())
    }

    /// Aborts a live duel.
    pub async fn abort(
        &self,
        duel_id: DuelId,
        reason: impl Into<String>,
    ) -> Result<(), QuizduelError> {
        let handle = self
            .duel_handle(duel_id)
            .await
            .ok_or(QuizduelError::Duel(DuelError::Unavailable(duel_id)))?;
        handle.abort(reason).await?;
        Ok(())
    }

    /// A snapshot of a live duel's state.
    pub async fn duel_state(
        &self,
        duel_id: DuelId,
    ) -> Result<DuelState, QuizduelError> {
        let handle = self
            .duel_handle(duel_id)
            .await
            .ok_or(QuizduelError::Duel(DuelError::Unavailable(duel_id)))?;
        Ok(handle.state().await?)
    }

    /// The final result of a live-indexed duel, if it has one yet.
    pub async fn duel_result(
        &self,
        duel_id: DuelId,
    ) -> Result<Option<DuelResult>, QuizduelError> {
        let handle = self
            .duel_handle(duel_id)
            .await
            .ok_or(QuizduelError::Duel(DuelError::Unavailable(duel_id)))?;
        Ok(handle.result().await?)
    }

    /// The live duel a player is bound to, if any.
    pub async fn duel_of(&self, player: PlayerId) -> Option<DuelId> {
        self.index.lock().await.players.get(&player).copied()
    }

    /// Handle to a live duel, while it is still indexed.
    pub async fn duel_handle(&self, duel_id: DuelId) -> Option<DuelHandle> {
        self.index.lock().await.duels.get(&duel_id).cloned()
    }

    pub async fn waiting_count(&self) -> usize {
        self.index.lock().await.matchmaker.waiting_count()
    }

    /// Records a heartbeat, with the round the player's connection is
    /// waiting on, if it reported one.
    pub async fn heartbeat(
        &self,
        player: PlayerId,
        waiting_round: Option<(DuelId, u32)>,
    ) {
        self.index
            .lock()
            .await
            .presence
            .heartbeat(player, waiting_round);
    }

    /// Players not heard from within `grace`. The caller decides what to
    /// do about them (usually abort their duels).
    pub async fn idle_players(&self, grace: Duration) -> Vec<PlayerId> {
        self.index.lock().await.presence.idle_players(grace)
    }
}
