// External recommendation/prediction provider boundary.
//
// The engine consumes the provider through two logical operations:
// `recommend` for the current turn and `predict` for a completed draft.
// Transport, encoding, and retry policy belong to the implementation behind
// the `Provider` trait; the engine only assumes the calls may take
// arbitrarily long or never return.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::ChampionId;
use crate::draft::state::{DraftState, TeamComposition};
use crate::draft::turn::{EloBracket, Role, Side, Turn};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Provider failures are recoverable and scoped: they never touch draft
/// state, and manual selection continues regardless.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider is not configured")]
    Disabled,

    #[error("provider request timed out")]
    Timeout,

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("network error: {0}")]
    Http(#[source] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Wire payloads
// ---------------------------------------------------------------------------

/// One team's picks as the provider sees them: role keyed, `null` for
/// still-empty slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionPayload {
    pub top: Option<ChampionId>,
    pub jungle: Option<ChampionId>,
    pub mid: Option<ChampionId>,
    pub adc: Option<ChampionId>,
    pub support: Option<ChampionId>,
}

impl CompositionPayload {
    pub fn from_composition(composition: &TeamComposition) -> Self {
        CompositionPayload {
            top: composition.get(Role::Top),
            jungle: composition.get(Role::Jungle),
            mid: composition.get(Role::Mid),
            adc: composition.get(Role::Adc),
            support: composition.get(Role::Support),
        }
    }
}

/// Request for ranked candidates for the turn being acted on. Carries the
/// full partial draft so the provider sees every locked-in champion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub elo_bracket: EloBracket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    pub side: Side,
    pub action_kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub blue_composition: CompositionPayload,
    pub red_composition: CompositionPayload,
    pub blue_bans: Vec<ChampionId>,
    pub red_bans: Vec<ChampionId>,
}

impl RecommendRequest {
    /// Build the request for `turn` from the current partial state.
    pub fn for_turn(state: &DraftState, turn: &Turn) -> Self {
        RecommendRequest {
            elo_bracket: state.elo_bracket,
            patch: state.patch.clone(),
            side: turn.side,
            action_kind: turn.action.kind_str().to_string(),
            role: turn.action.role(),
            blue_composition: CompositionPayload::from_composition(&state.blue),
            red_composition: CompositionPayload::from_composition(&state.red),
            blue_bans: state.blue_bans.entries().to_vec(),
            red_bans: state.red_bans.entries().to_vec(),
        }
    }
}

/// Request for win probabilities over a completed draft: same shape as a
/// recommendation request, every slot filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub elo_bracket: EloBracket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    pub blue_composition: CompositionPayload,
    pub red_composition: CompositionPayload,
    pub blue_bans: Vec<ChampionId>,
    pub red_bans: Vec<ChampionId>,
}

impl PredictRequest {
    pub fn from_state(state: &DraftState) -> Self {
        PredictRequest {
            elo_bracket: state.elo_bracket,
            patch: state.patch.clone(),
            blue_composition: CompositionPayload::from_composition(&state.blue),
            red_composition: CompositionPayload::from_composition(&state.red),
            blue_bans: state.blue_bans.entries().to_vec(),
            red_bans: state.red_bans.entries().to_vec(),
        }
    }
}

/// A single ranked candidate for the current turn. Superseded wholesale on
/// every turn change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub champion_id: ChampionId,
    pub score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Win probabilities for a completed draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub blue_win_probability: f64,
    pub red_win_probability: f64,
    pub confidence: f64,
    #[serde(default)]
    pub explanations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// The external recommendation/prediction service, seen as two async
/// operations. Implemented by the HTTP client in production and by scripted
/// stand-ins in tests.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn recommend(
        &self,
        request: &RecommendRequest,
    ) -> Result<Vec<Recommendation>, ProviderError>;

    async fn predict(&self, request: &PredictRequest) -> Result<Prediction, ProviderError>;
}
