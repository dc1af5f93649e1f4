// Integration tests for the draft engine.
//
// These tests exercise the full system end-to-end through the library's
// public API: the engine event loop is spawned with real channels and driven
// by user commands, with a scripted provider standing in for the external
// recommendation/prediction service. Timer behavior is verified under
// tokio's paused clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use pickban::catalog::{Champion, ChampionCatalog, ChampionId};
use pickban::config::DraftConfig;
use pickban::draft::state::Slot;
use pickban::draft::turn::{Action, EloBracket, Role, Side};
use pickban::engine::{self, Engine};
use pickban::protocol::{ProviderEvent, TurnInfo, UiUpdate, UserCommand};
use pickban::provider::{
    PredictRequest, Prediction, Provider, ProviderError, Recommendation, RecommendRequest,
};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Scripted stand-in for the external provider. Supports an optional
/// response delay (for racing against turn changes under a paused clock),
/// forced recommendation failures, and predict-call recording.
struct ScriptedProvider {
    delay: Option<Duration>,
    fail_recommend: bool,
    recommend_calls: AtomicUsize,
    predict_requests: Mutex<Vec<PredictRequest>>,
}

impl ScriptedProvider {
    fn instant() -> Self {
        ScriptedProvider {
            delay: None,
            fail_recommend: false,
            recommend_calls: AtomicUsize::new(0),
            predict_requests: Mutex::new(Vec::new()),
        }
    }

    fn delayed(delay: Duration) -> Self {
        ScriptedProvider {
            delay: Some(delay),
            ..Self::instant()
        }
    }

    fn failing() -> Self {
        ScriptedProvider {
            fail_recommend: true,
            ..Self::instant()
        }
    }

    fn predict_count(&self) -> usize {
        self.predict_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn recommend(
        &self,
        _request: &RecommendRequest,
    ) -> Result<Vec<Recommendation>, ProviderError> {
        self.recommend_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_recommend {
            return Err(ProviderError::Status(500));
        }
        Ok(vec![Recommendation {
            champion_id: ChampionId(42),
            score: 0.9,
            reasons: vec!["scripted".into()],
        }])
    }

    async fn predict(&self, request: &PredictRequest) -> Result<Prediction, ProviderError> {
        self.predict_requests.lock().unwrap().push(request.clone());
        Ok(Prediction {
            blue_win_probability: 0.52,
            red_win_probability: 0.48,
            confidence: 0.66,
            explanations: vec![],
        })
    }
}

/// Catalog with champion ids 1..=60 -- plenty for two full drafts.
fn test_catalog() -> Arc<ChampionCatalog> {
    let champions = (1..=60)
        .map(|id| Champion {
            id: ChampionId(id),
            name: format!("Champion {id}"),
            roles: vec![],
            tags: serde_json::Map::new(),
        })
        .collect();
    Arc::new(ChampionCatalog::from_champions(champions).unwrap())
}

fn standard_config() -> DraftConfig {
    DraftConfig {
        ban_count_per_side: 5,
        roles: Role::ALL.to_vec(),
        turn_duration: 30,
        elo_bracket: EloBracket::Emerald,
        patch: Some("14.23".into()),
    }
}

fn short_timer_config() -> DraftConfig {
    DraftConfig {
        turn_duration: 10,
        ..standard_config()
    }
}

struct TestHarness {
    cmd_tx: mpsc::Sender<UserCommand>,
    /// Clone of the channel the engine's spawned tasks report through; lets
    /// tests inject hand-crafted (e.g. stale) completions.
    provider_tx: mpsc::Sender<ProviderEvent>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    provider: Arc<ScriptedProvider>,
    engine_handle: JoinHandle<()>,
}

fn spawn_engine(provider: ScriptedProvider, config: DraftConfig) -> TestHarness {
    let provider = Arc::new(provider);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (provider_tx, provider_rx) = mpsc::channel(256);
    let (ui_tx, ui_rx) = mpsc::channel(2048);

    let engine = Engine::new(
        &config,
        test_catalog(),
        Arc::clone(&provider) as Arc<dyn Provider>,
        provider_tx.clone(),
    );
    let engine_handle = tokio::spawn(async move {
        let _ = engine::run(engine, cmd_rx, provider_rx, ui_tx).await;
    });

    TestHarness {
        cmd_tx,
        provider_tx,
        ui_rx,
        provider,
        engine_handle,
    }
}

impl TestHarness {
    async fn send(&self, cmd: UserCommand) {
        self.cmd_tx.send(cmd).await.expect("engine should be alive");
    }

    async fn select(&self, id: u32) {
        self.send(UserCommand::ApplyChampion {
            champion: ChampionId(id),
        })
        .await;
    }

    /// Collect updates until one matches `pred` (inclusive). Panics after
    /// ten seconds of silence.
    async fn wait_for(&mut self, pred: impl Fn(&UiUpdate) -> bool) -> Vec<UiUpdate> {
        let mut seen = Vec::new();
        loop {
            match tokio::time::timeout(Duration::from_secs(10), self.ui_rx.recv()).await {
                Ok(Some(update)) => {
                    let done = pred(&update);
                    seen.push(update);
                    if done {
                        return seen;
                    }
                }
                Ok(None) => panic!("ui channel closed while waiting; saw {seen:?}"),
                Err(_) => panic!("timed out waiting for update; saw {seen:?}"),
            }
        }
    }

    /// Let the engine and its spawned tasks settle, then drain whatever is
    /// queued without blocking. Safe under a paused clock: the test task
    /// never parks on an empty channel, so timers don't auto-advance.
    async fn drain(&mut self) -> Vec<UiUpdate> {
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        let mut updates = Vec::new();
        while let Ok(update) = self.ui_rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    async fn shutdown(self) {
        let _ = self.cmd_tx.send(UserCommand::Quit).await;
        let _ = self.engine_handle.await;
    }
}

fn applied_count(updates: &[UiUpdate]) -> usize {
    updates
        .iter()
        .filter(|u| matches!(u, UiUpdate::ActionApplied { .. }))
        .count()
}

// ===========================================================================
// End-to-end draft flow
// ===========================================================================

#[tokio::test]
async fn full_draft_end_to_end() {
    let mut h = spawn_engine(ScriptedProvider::instant(), standard_config());

    h.send(UserCommand::StartDraft).await;
    for id in 1..=20 {
        h.select(id).await;
    }

    let updates = h
        .wait_for(|u| matches!(u, UiUpdate::PredictionReady(_)))
        .await;

    // Twenty committed actions, one completion, one prediction.
    assert_eq!(applied_count(&updates), 20);
    assert_eq!(
        updates
            .iter()
            .filter(|u| matches!(u, UiUpdate::DraftComplete))
            .count(),
        1
    );
    assert_eq!(h.provider.predict_count(), 1);

    // The recorded predict request is fully populated.
    let requests = h.provider.predict_requests.lock().unwrap();
    let request = &requests[0];
    assert_eq!(request.blue_bans.len(), 5);
    assert_eq!(request.red_bans.len(), 5);
    assert!(request.blue_composition.top.is_some());
    assert!(request.blue_composition.support.is_some());
    assert!(request.red_composition.top.is_some());
    assert!(request.red_composition.support.is_some());
    assert_eq!(request.elo_bracket, EloBracket::Emerald);
    assert_eq!(request.patch.as_deref(), Some("14.23"));
    drop(requests);

    // Turn announcements follow the generated order: bans alternate from
    // blue, picks snake per role.
    let turn_infos: Vec<&TurnInfo> = updates
        .iter()
        .filter_map(|u| match u {
            UiUpdate::TurnChanged(info) => Some(info),
            _ => None,
        })
        .collect();
    assert_eq!(turn_infos[0].index, 0);
    assert_eq!(turn_infos[0].side, Side::Blue);
    assert_eq!(turn_infos[0].action, Action::Ban);

    let turn_12 = turn_infos.iter().find(|t| t.index == 12).unwrap();
    assert_eq!(turn_12.side, Side::Red);
    assert_eq!(turn_12.action, Action::Pick(Role::Jungle));
    let turn_13 = turn_infos.iter().find(|t| t.index == 13).unwrap();
    assert_eq!(turn_13.side, Side::Blue);
    assert_eq!(turn_13.action, Action::Pick(Role::Jungle));

    h.shutdown().await;
}

#[tokio::test]
async fn rejected_duplicate_leaves_draft_unchanged() {
    let mut h = spawn_engine(ScriptedProvider::instant(), standard_config());

    h.send(UserCommand::StartDraft).await;
    h.select(7).await;
    h.select(7).await; // same champion again

    let updates = h
        .wait_for(|u| matches!(u, UiUpdate::ActionRejected { .. }))
        .await;
    assert_eq!(applied_count(&updates), 1);
    assert!(updates.iter().any(|u| matches!(
        u,
        UiUpdate::ActionRejected { reason } if reason.contains("already picked or banned")
    )));

    // The draft is still consistent: the next distinct champion lands on
    // turn 1.
    h.select(8).await;
    let updates = h
        .wait_for(|u| matches!(u, UiUpdate::ActionApplied { .. }))
        .await;
    assert!(updates.iter().any(|u| matches!(
        u,
        UiUpdate::ActionApplied { index: 1, side: Side::Red, .. }
    )));

    h.shutdown().await;
}

#[tokio::test]
async fn retract_then_reuse_through_the_loop() {
    let mut h = spawn_engine(ScriptedProvider::instant(), standard_config());

    h.send(UserCommand::StartDraft).await;
    h.select(5).await; // blue ban 0
    h.send(UserCommand::Retract {
        side: Side::Blue,
        slot: Slot::Ban(0),
    })
    .await;

    let updates = h
        .wait_for(|u| matches!(u, UiUpdate::ChampionRetracted { .. }))
        .await;
    assert!(updates.iter().any(|u| matches!(
        u,
        UiUpdate::ChampionRetracted { side: Side::Blue, slot: Slot::Ban(0), champion }
            if *champion == ChampionId(5)
    )));

    // The freed champion is selectable again on the next turn (red ban).
    h.select(5).await;
    let updates = h
        .wait_for(|u| matches!(u, UiUpdate::ActionApplied { .. }))
        .await;
    assert!(updates.iter().any(|u| matches!(
        u,
        UiUpdate::ActionApplied { index: 1, side: Side::Red, champion, .. }
            if *champion == ChampionId(5)
    )));

    h.shutdown().await;
}

#[tokio::test]
async fn provider_failure_never_blocks_manual_selection() {
    let mut h = spawn_engine(ScriptedProvider::failing(), standard_config());

    h.send(UserCommand::StartDraft).await;
    let updates = h
        .wait_for(|u| matches!(u, UiUpdate::RecommendationsError { .. }))
        .await;
    assert!(updates
        .iter()
        .any(|u| matches!(u, UiUpdate::RecommendationsError { .. })));

    // Manual selection proceeds regardless of provider health.
    h.select(1).await;
    let updates = h
        .wait_for(|u| matches!(u, UiUpdate::ActionApplied { .. }))
        .await;
    assert_eq!(applied_count(&updates), 1);

    h.shutdown().await;
}

#[tokio::test]
async fn reset_mid_draft_then_complete_fires_one_prediction() {
    let mut h = spawn_engine(ScriptedProvider::instant(), standard_config());

    h.send(UserCommand::StartDraft).await;
    for id in 1..=5 {
        h.select(id).await;
    }
    h.send(UserCommand::ResetDraft).await;
    h.wait_for(|u| matches!(u, UiUpdate::DraftReset)).await;

    // Second run uses a disjoint champion set; the first (abandoned) draft
    // must not have produced a prediction.
    h.send(UserCommand::StartDraft).await;
    for id in 21..=40 {
        h.select(id).await;
    }
    h.wait_for(|u| matches!(u, UiUpdate::PredictionReady(_)))
        .await;
    assert_eq!(h.provider.predict_count(), 1);

    h.shutdown().await;
}

// ===========================================================================
// Stale-response suppression
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn slow_fetch_for_an_earlier_turn_is_never_rendered() {
    // Provider takes 10 virtual seconds per fetch.
    let mut h = spawn_engine(
        ScriptedProvider::delayed(Duration::from_secs(10)),
        standard_config(),
    );

    h.send(UserCommand::StartDraft).await;
    h.drain().await;

    // Advance the turn while the turn-0 fetch is still in flight.
    h.select(1).await;
    h.drain().await;

    // Let both fetch timers elapse.
    tokio::time::advance(Duration::from_secs(11)).await;
    let updates = h.drain().await;

    // Whatever arrived, nothing may be rendered against turn 0.
    for update in &updates {
        if let UiUpdate::Recommendations { turn_index, .. } = update {
            assert_eq!(*turn_index, 1, "stale turn-0 recommendations leaked through");
        }
    }

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn injected_stale_completion_is_discarded() {
    let mut h = spawn_engine(ScriptedProvider::instant(), standard_config());

    h.send(UserCommand::StartDraft).await;
    h.select(1).await; // cursor now at turn 1
    h.drain().await;

    // Hand-craft a completion tagged for turn 0, as if a slow response
    // arrived long after the cursor moved on.
    h.provider_tx
        .send(ProviderEvent::Recommendations {
            turn_index: 0,
            result: Ok(vec![Recommendation {
                champion_id: ChampionId(9),
                score: 1.0,
                reasons: vec![],
            }]),
        })
        .await
        .unwrap();

    let updates = h.drain().await;
    assert!(
        !updates
            .iter()
            .any(|u| matches!(u, UiUpdate::Recommendations { turn_index: 0, .. })),
        "stale completion must be suppressed"
    );

    h.shutdown().await;
}

// ===========================================================================
// Countdown behavior under a paused clock
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn timer_expires_after_the_configured_duration() {
    let mut h = spawn_engine(ScriptedProvider::instant(), short_timer_config());

    h.send(UserCommand::StartDraft).await;
    h.drain().await;

    tokio::time::advance(Duration::from_secs(10)).await;
    let updates = h.drain().await;

    assert!(updates.contains(&UiUpdate::TimerExpired));
    // Expiry commits nothing.
    assert_eq!(applied_count(&updates), 0);

    // Selection is still open after expiry.
    h.select(1).await;
    let updates = h.drain().await;
    assert_eq!(applied_count(&updates), 1);

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn committed_action_restarts_the_countdown() {
    let mut h = spawn_engine(ScriptedProvider::instant(), short_timer_config());

    h.send(UserCommand::StartDraft).await;
    h.drain().await;

    // Burn 6 of 10 seconds, then commit an action.
    tokio::time::advance(Duration::from_secs(6)).await;
    h.drain().await;
    h.select(1).await;
    h.drain().await;

    // 9 more seconds: would have expired on the old clock, must not on the
    // refilled one.
    tokio::time::advance(Duration::from_secs(9)).await;
    let updates = h.drain().await;
    assert!(
        !updates.contains(&UiUpdate::TimerExpired),
        "timer must restart from full duration on commit"
    );

    // One more second finishes the refilled countdown.
    tokio::time::advance(Duration::from_secs(1)).await;
    let updates = h.drain().await;
    assert!(updates.contains(&UiUpdate::TimerExpired));

    h.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn pause_freezes_the_countdown_and_resume_continues_it() {
    let mut h = spawn_engine(ScriptedProvider::instant(), short_timer_config());

    h.send(UserCommand::StartDraft).await;
    h.drain().await;

    tokio::time::advance(Duration::from_secs(3)).await;
    h.drain().await;
    h.send(UserCommand::PauseTimer).await;
    let updates = h.drain().await;
    assert!(updates.contains(&UiUpdate::TimerPaused { remaining: 7 }));

    // A paused timer ignores a long stretch of wall time.
    tokio::time::advance(Duration::from_secs(60)).await;
    let updates = h.drain().await;
    assert!(!updates.contains(&UiUpdate::TimerExpired));

    h.send(UserCommand::ResumeTimer).await;
    let updates = h.drain().await;
    assert!(updates.contains(&UiUpdate::TimerResumed { remaining: 7 }));

    tokio::time::advance(Duration::from_secs(7)).await;
    let updates = h.drain().await;
    assert!(updates.contains(&UiUpdate::TimerExpired));

    h.shutdown().await;
}

// ===========================================================================
// Alternate formats
// ===========================================================================

#[tokio::test]
async fn no_ban_format_runs_to_prediction() {
    let config = DraftConfig {
        ban_count_per_side: 0,
        ..standard_config()
    };
    let mut h = spawn_engine(ScriptedProvider::instant(), config);

    h.send(UserCommand::StartDraft).await;
    for id in 1..=10 {
        h.select(id).await;
    }

    let updates = h
        .wait_for(|u| matches!(u, UiUpdate::PredictionReady(_)))
        .await;
    assert_eq!(applied_count(&updates), 10);
    assert_eq!(h.provider.predict_count(), 1);

    let requests = h.provider.predict_requests.lock().unwrap();
    assert!(requests[0].blue_bans.is_empty());
    assert!(requests[0].red_bans.is_empty());
    drop(requests);

    h.shutdown().await;
}
