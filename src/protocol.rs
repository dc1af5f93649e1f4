// Channel message types exchanged between the engine loop, spawned provider
// tasks, and the console/UI layer.
//
// Provider completions carry the turn index they were issued for; the engine
// compares it against the current index and silently discards stale results.

use serde::{Deserialize, Serialize};

use crate::catalog::ChampionId;
use crate::draft::state::Slot;
use crate::draft::turn::{Action, Side};
use crate::provider::{Prediction, ProviderError, Recommendation};

/// Commands from the user (console, UI, or test harness) to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Explicit start signal; actions are rejected until it arrives.
    StartDraft,
    /// Commit a champion to the current turn (ban or pick, per the cursor).
    ApplyChampion { champion: ChampionId },
    /// Out-of-band removal of a committed pick or ban.
    Retract { side: Side, slot: Slot },
    PauseTimer,
    ResumeTimer,
    /// Discard the draft and return to the initial state.
    ResetDraft,
    /// Re-fire the win-probability call for a completed draft.
    Predict,
    Quit,
}

/// Completions from spawned provider tasks back to the engine loop.
#[derive(Debug)]
pub enum ProviderEvent {
    Recommendations {
        /// Turn index the request was issued for. Compared against the
        /// current index on arrival; mismatches are discarded.
        turn_index: usize,
        result: Result<Vec<Recommendation>, ProviderError>,
    },
    Prediction {
        result: Result<Prediction, ProviderError>,
    },
}

/// Everything the current turn's consumer needs to render the highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInfo {
    pub index: usize,
    pub side: Side,
    pub action: Action,
}

/// Updates pushed from the engine to the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    DraftStarted,
    /// The cursor moved to a new turn.
    TurnChanged(TurnInfo),
    /// The cursor ran off the end of the sequence.
    DraftComplete,
    /// A champion was committed to a turn.
    ActionApplied {
        index: usize,
        side: Side,
        action: Action,
        champion: ChampionId,
    },
    /// A mutation was rejected; state is unchanged.
    ActionRejected { reason: String },
    ChampionRetracted {
        side: Side,
        slot: Slot,
        champion: ChampionId,
    },
    TimerTick { remaining: u32 },
    TimerExpired,
    TimerPaused { remaining: u32 },
    TimerResumed { remaining: u32 },
    /// Fresh ranked candidates for the current turn.
    Recommendations {
        turn_index: usize,
        entries: Vec<Recommendation>,
    },
    /// Recommendations are unavailable for the current turn; manual
    /// selection is unaffected.
    RecommendationsError { message: String },
    PredictionReady(Prediction),
    PredictionError { message: String },
    DraftReset,
}
