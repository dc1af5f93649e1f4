// Draft orchestration: the central event loop.
//
// Coordinates user commands, the once-per-second countdown tick, and
// completions from spawned provider tasks. All draft mutations happen here,
// serialized through a single `tokio::select!` loop, so a timer tick can
// never observe state from before an action that has already committed.
//
// Provider fetches are reconciled with turn progression by index tagging:
// every outgoing request records the turn it was issued for, and completions
// whose tag no longer matches the current turn are discarded. Superseded
// tasks are additionally aborted to save bandwidth, but correctness never
// depends on the abort landing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::{ChampionCatalog, ChampionId};
use crate::config::DraftConfig;
use crate::draft::sequence::DraftSequence;
use crate::draft::state::{DraftState, Slot};
use crate::draft::timer::{CountdownTimer, TimerState};
use crate::draft::turn::{Action, Side, Turn};
use crate::protocol::{ProviderEvent, TurnInfo, UiUpdate, UserCommand};
use crate::provider::{PredictRequest, Provider, RecommendRequest};

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The complete engine state: the immutable sequence, the mutable draft, the
/// countdown, and the provider plumbing.
pub struct Engine {
    sequence: DraftSequence,
    state: DraftState,
    timer: CountdownTimer,
    catalog: Arc<ChampionCatalog>,
    provider: Arc<dyn Provider>,
    /// Sender side of the provider event channel; spawned tasks use clones
    /// of this to report completions back to the loop.
    provider_tx: mpsc::Sender<ProviderEvent>,
    current_fetch: Option<JoinHandle<()>>,
    current_prediction: Option<JoinHandle<()>>,
    /// Whether the automatic prediction already fired for this draft.
    predicted: bool,
}

impl Engine {
    /// Build an engine from the draft configuration. The sequence is
    /// generated here, once, and never changes for the life of the engine.
    pub fn new(
        config: &DraftConfig,
        catalog: Arc<ChampionCatalog>,
        provider: Arc<dyn Provider>,
        provider_tx: mpsc::Sender<ProviderEvent>,
    ) -> Self {
        let sequence = DraftSequence::generate(config.ban_count_per_side, &config.roles);
        let state = DraftState::new(config.elo_bracket, config.patch.clone());
        let timer = CountdownTimer::new(config.turn_duration);

        Engine {
            sequence,
            state,
            timer,
            catalog,
            provider,
            provider_tx,
            current_fetch: None,
            current_prediction: None,
            predicted: false,
        }
    }

    /// The generated turn order (primarily for inspection in tests).
    pub fn sequence(&self) -> &DraftSequence {
        &self.sequence
    }

    // -- command handling ---------------------------------------------------

    async fn handle_command(&mut self, cmd: UserCommand, ui_tx: &mpsc::Sender<UiUpdate>) {
        match cmd {
            UserCommand::StartDraft => self.start_draft(ui_tx).await,
            UserCommand::ApplyChampion { champion } => self.apply_champion(champion, ui_tx).await,
            UserCommand::Retract { side, slot } => self.retract(side, slot, ui_tx).await,
            UserCommand::PauseTimer => self.pause_timer(ui_tx).await,
            UserCommand::ResumeTimer => self.resume_timer(ui_tx).await,
            UserCommand::ResetDraft => self.reset_draft(ui_tx).await,
            UserCommand::Predict => self.fire_prediction(true, ui_tx).await,
            // Quit is consumed by the run loop before dispatch.
            UserCommand::Quit => {}
        }
    }

    async fn start_draft(&mut self, ui_tx: &mpsc::Sender<UiUpdate>) {
        if self.state.is_started() {
            let _ = ui_tx
                .send(UiUpdate::ActionRejected {
                    reason: "draft is already started".into(),
                })
                .await;
            return;
        }

        self.state.start();
        self.timer.start();
        info!(
            "Draft started: {} turns, {}s per turn",
            self.sequence.len(),
            self.timer.remaining()
        );
        let _ = ui_tx.send(UiUpdate::DraftStarted).await;
        self.on_cursor_changed(ui_tx).await;
    }

    async fn apply_champion(&mut self, champion: ChampionId, ui_tx: &mpsc::Sender<UiUpdate>) {
        if !self.catalog.contains(champion) {
            let _ = ui_tx
                .send(UiUpdate::ActionRejected {
                    reason: format!("champion {} is not in the catalog", champion),
                })
                .await;
            return;
        }

        match self.state.apply(&self.sequence, champion) {
            Ok(turn) => {
                let committed_index = self.state.turn_index - 1;
                info!(
                    "Turn {}: {} {} -> {}",
                    committed_index,
                    turn.side,
                    turn.action,
                    self.catalog.display_name(champion)
                );
                // The committed action and the timer reset happen in the same
                // loop iteration; no tick can land between them.
                self.timer.reset();
                let _ = ui_tx
                    .send(UiUpdate::ActionApplied {
                        index: committed_index,
                        side: turn.side,
                        action: turn.action,
                        champion,
                    })
                    .await;
                self.on_cursor_changed(ui_tx).await;
            }
            Err(e) => {
                debug!("action rejected: {}", e);
                let _ = ui_tx
                    .send(UiUpdate::ActionRejected {
                        reason: e.to_string(),
                    })
                    .await;
            }
        }
    }

    async fn retract(&mut self, side: Side, slot: Slot, ui_tx: &mpsc::Sender<UiUpdate>) {
        match self.state.retract(side, slot) {
            Ok(champion) => {
                info!(
                    "Retracted {} from {} (champion is free again)",
                    self.catalog.display_name(champion),
                    side
                );
                let _ = ui_tx
                    .send(UiUpdate::ChampionRetracted {
                        side,
                        slot,
                        champion,
                    })
                    .await;
            }
            Err(e) => {
                debug!("retract rejected: {}", e);
                let _ = ui_tx
                    .send(UiUpdate::ActionRejected {
                        reason: e.to_string(),
                    })
                    .await;
            }
        }
    }

    async fn pause_timer(&mut self, ui_tx: &mpsc::Sender<UiUpdate>) {
        let was_running = self.timer.state() == TimerState::Running;
        self.timer.pause();
        if was_running {
            let _ = ui_tx
                .send(UiUpdate::TimerPaused {
                    remaining: self.timer.remaining(),
                })
                .await;
        }
    }

    async fn resume_timer(&mut self, ui_tx: &mpsc::Sender<UiUpdate>) {
        let was_paused = self.timer.state() == TimerState::Paused;
        self.timer.resume();
        if was_paused {
            let _ = ui_tx
                .send(UiUpdate::TimerResumed {
                    remaining: self.timer.remaining(),
                })
                .await;
        }
    }

    async fn reset_draft(&mut self, ui_tx: &mpsc::Sender<UiUpdate>) {
        self.cancel_fetch();
        self.cancel_prediction();
        self.state.reset();
        self.timer.stop();
        self.predicted = false;
        info!("Draft reset");
        let _ = ui_tx.send(UiUpdate::DraftReset).await;
    }

    // -- cursor-driven side effects ----------------------------------------

    /// React to the turn cursor moving: either announce the new turn and
    /// fetch recommendations for it, or declare the draft complete and fire
    /// the prediction.
    async fn on_cursor_changed(&mut self, ui_tx: &mpsc::Sender<UiUpdate>) {
        match self.sequence.turn_at(self.state.turn_index).copied() {
            Some(turn) => {
                let _ = ui_tx
                    .send(UiUpdate::TurnChanged(TurnInfo {
                        index: self.state.turn_index,
                        side: turn.side,
                        action: turn.action,
                    }))
                    .await;
                self.trigger_recommendations(&turn);
            }
            None => {
                // Any fetch still in flight is for a turn that no longer
                // exists.
                self.cancel_fetch();
                self.timer.stop();
                info!("Draft complete after {} turns", self.sequence.len());
                let _ = ui_tx.send(UiUpdate::DraftComplete).await;
                self.fire_prediction(false, ui_tx).await;
            }
        }
    }

    /// Spawn a recommendation fetch for the current turn, tagged with the
    /// turn index so a late completion can be recognized as stale.
    fn trigger_recommendations(&mut self, turn: &Turn) {
        self.cancel_fetch();

        let request = RecommendRequest::for_turn(&self.state, turn);
        let turn_index = self.state.turn_index;
        let provider = Arc::clone(&self.provider);
        let tx = self.provider_tx.clone();

        let handle = tokio::spawn(async move {
            let result = provider.recommend(&request).await;
            let _ = tx
                .send(ProviderEvent::Recommendations { turn_index, result })
                .await;
        });
        self.current_fetch = Some(handle);
        debug!("requested recommendations for turn {}", turn_index);
    }

    /// Send the completed draft to the prediction endpoint. The automatic
    /// trigger fires at most once per draft; `forced` is the explicit
    /// user-driven retry and bypasses that latch.
    async fn fire_prediction(&mut self, forced: bool, ui_tx: &mpsc::Sender<UiUpdate>) {
        if self.predicted && !forced {
            return;
        }

        // The cursor reaching the end should guarantee a fully populated
        // draft; re-check anyway since retraction can hollow out slots.
        if !self.draft_is_fully_populated() {
            warn!("prediction skipped: draft is not fully populated");
            if forced {
                let _ = ui_tx
                    .send(UiUpdate::PredictionError {
                        message: "draft is not complete".into(),
                    })
                    .await;
            }
            return;
        }

        self.predicted = true;
        self.cancel_prediction();

        let request = PredictRequest::from_state(&self.state);
        let provider = Arc::clone(&self.provider);
        let tx = self.provider_tx.clone();

        let handle = tokio::spawn(async move {
            let result = provider.predict(&request).await;
            let _ = tx.send(ProviderEvent::Prediction { result }).await;
        });
        self.current_prediction = Some(handle);
        info!("requested win prediction for completed draft");
    }

    /// Every turn the sequence names has its slot filled, and both ban lists
    /// match the sequence's ban allocation.
    fn draft_is_fully_populated(&self) -> bool {
        if !self.state.is_complete(&self.sequence) {
            return false;
        }
        let picks_filled = self.sequence.turns().iter().all(|turn| match turn.action {
            Action::Ban => true,
            Action::Pick(role) => self.state.composition(turn.side).get(role).is_some(),
        });
        picks_filled
            && self.state.blue_bans.len() == self.sequence.ban_count(Side::Blue)
            && self.state.red_bans.len() == self.sequence.ban_count(Side::Red)
    }

    // -- provider completions -----------------------------------------------

    async fn handle_provider_event(
        &mut self,
        event: ProviderEvent,
        ui_tx: &mpsc::Sender<UiUpdate>,
    ) {
        match event {
            ProviderEvent::Recommendations { turn_index, result } => {
                // Stale-response suppression: the turn moved on (or the draft
                // was reset) while this fetch was in flight.
                if !self.state.is_started() || turn_index != self.state.turn_index {
                    debug!(
                        "discarding stale recommendations for turn {} (current {})",
                        turn_index, self.state.turn_index
                    );
                    return;
                }
                match result {
                    Ok(entries) => {
                        info!(
                            "{} recommendations for turn {}",
                            entries.len(),
                            turn_index
                        );
                        let _ = ui_tx
                            .send(UiUpdate::Recommendations {
                                turn_index,
                                entries,
                            })
                            .await;
                    }
                    Err(e) => {
                        warn!("recommendations unavailable: {}", e);
                        let _ = ui_tx
                            .send(UiUpdate::RecommendationsError {
                                message: e.to_string(),
                            })
                            .await;
                    }
                }
            }
            ProviderEvent::Prediction { result } => {
                // A prediction completing after a reset belongs to a draft
                // that no longer exists.
                if !self.state.is_complete(&self.sequence) {
                    debug!("discarding prediction for a draft that is no longer complete");
                    return;
                }
                match result {
                    Ok(prediction) => {
                        info!(
                            "prediction: blue {:.1}% / red {:.1}%",
                            prediction.blue_win_probability * 100.0,
                            prediction.red_win_probability * 100.0
                        );
                        let _ = ui_tx.send(UiUpdate::PredictionReady(prediction)).await;
                    }
                    Err(e) => {
                        warn!("prediction unavailable: {}", e);
                        let _ = ui_tx
                            .send(UiUpdate::PredictionError {
                                message: e.to_string(),
                            })
                            .await;
                    }
                }
            }
        }
    }

    // -- timer --------------------------------------------------------------

    async fn handle_tick(&mut self, ui_tx: &mpsc::Sender<UiUpdate>) {
        if !self.timer.is_running() {
            return;
        }
        let expired = self.timer.tick();
        let _ = ui_tx
            .send(UiUpdate::TimerTick {
                remaining: self.timer.remaining(),
            })
            .await;
        if expired {
            // Observable only: expiry never commits a champion on its own.
            info!("turn timer expired");
            let _ = ui_tx.send(UiUpdate::TimerExpired).await;
        }
    }

    // -- task management ----------------------------------------------------

    fn cancel_fetch(&mut self) {
        if let Some(handle) = self.current_fetch.take() {
            handle.abort();
            debug!("cancelled in-flight recommendation fetch");
        }
    }

    fn cancel_prediction(&mut self) {
        if let Some(handle) = self.current_prediction.take() {
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the engine event loop.
///
/// Listens on two channels plus a once-per-second countdown tick using
/// `tokio::select!`:
/// 1. User commands from the console/UI
/// 2. Completions from spawned provider tasks
///
/// Pushes UI updates through `ui_tx`. Returns when a `Quit` command arrives
/// or the command channel closes.
pub async fn run(
    mut engine: Engine,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut provider_rx: mpsc::Receiver<ProviderEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
) -> anyhow::Result<()> {
    info!("Draft engine event loop started");

    // Default missed-tick behavior (burst) keeps the countdown aligned with
    // elapsed time even if the loop stalls: every elapsed second produces a
    // tick, so the timer never drifts relative to turn changes.
    let mut tick_interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately; consume it so the countdown
    // loses its first second a full second after start.
    tick_interval.tick().await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        engine.handle_command(cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            event = provider_rx.recv() => {
                match event {
                    Some(event) => {
                        engine.handle_provider_event(event, &ui_tx).await;
                    }
                    None => {
                        // Unreachable while the engine holds provider_tx, but
                        // don't spin if it ever happens.
                        info!("Provider channel closed, shutting down");
                        break;
                    }
                }
            }

            _ = tick_interval.tick() => {
                engine.handle_tick(&ui_tx).await;
            }
        }
    }

    engine.cancel_fetch();
    engine.cancel_prediction();
    info!("Draft engine event loop exiting");
    Ok(())
}
