use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::state::game::GameState;

/// Pitch classification the scorer may attach to a play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PitchType {
    /// Four- or two-seam fastball.
    Fastball,
    /// Curveball.
    Curveball,
    /// Changeup.
    Changeup,
    /// Slider.
    Slider,
    /// Anything else.
    Other,
}

/// Play about to be appended to the log, captured before its patch is applied.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayEvent {
    /// Inning before the play.
    pub inning: u32,
    /// Half before the play.
    pub is_top_inning: bool,
    /// Pitch classification, when given.
    pub pitch_type: Option<PitchType>,
    /// Play description.
    pub result: String,
    /// Batter display name.
    pub batter_name: Option<String>,
    /// Pitcher display name.
    pub pitcher_name: Option<String>,
    /// Runner on first before the play.
    pub on_first: bool,
    /// Runner on second before the play.
    pub on_second: bool,
    /// Runner on third before the play.
    pub on_third: bool,
    /// Full state as it was before this play.
    pub prev_game_state: Value,
}

impl NewPlayEvent {
    /// Capture the half-inning context, base occupancy and a full snapshot of
    /// `before` for a play described by `result`.
    pub fn capture(before: &GameState, result: impl Into<String>) -> serde_json::Result<Self> {
        Ok(Self {
            inning: before.inning,
            is_top_inning: before.is_top_inning,
            pitch_type: None,
            result: result.into(),
            batter_name: None,
            pitcher_name: None,
            on_first: before.on_first,
            on_second: before.on_second,
            on_third: before.on_third,
            prev_game_state: serde_json::to_value(before)?,
        })
    }

    /// Attach the pitch classification.
    pub fn with_pitch_type(mut self, pitch_type: Option<PitchType>) -> Self {
        self.pitch_type = pitch_type;
        self
    }

    /// Attach batter and pitcher display names.
    pub fn with_players(mut self, batter: Option<String>, pitcher: Option<String>) -> Self {
        self.batter_name = batter;
        self.pitcher_name = pitcher;
        self
    }
}

/// Logged play as read back from storage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    /// Store-generated identifier, filled from the document key.
    #[serde(skip)]
    pub id: String,
    /// Inning before the play.
    pub inning: u32,
    /// Half before the play.
    pub is_top_inning: bool,
    /// Pitch classification, when given.
    #[serde(default)]
    pub pitch_type: Option<PitchType>,
    /// Play description.
    pub result: String,
    /// Batter display name.
    #[serde(default)]
    pub batter_name: Option<String>,
    /// Pitcher display name.
    #[serde(default)]
    pub pitcher_name: Option<String>,
    /// Runner on first before the play.
    #[serde(default)]
    pub on_first: bool,
    /// Runner on second before the play.
    #[serde(default)]
    pub on_second: bool,
    /// Runner on third before the play.
    #[serde(default)]
    pub on_third: bool,
    /// Opaque pre-play snapshot; absent on plays logged before undo existed.
    #[serde(default)]
    pub prev_game_state: Option<Value>,
    /// Server-assigned ordering key (microseconds since the Unix epoch).
    #[serde(default)]
    pub timestamp: u64,
}

impl PlayEvent {
    /// Decode a stored play, keeping the document identifier.
    pub fn from_document(id: impl Into<String>, data: Value) -> serde_json::Result<Self> {
        let mut event: PlayEvent = serde_json::from_value(data)?;
        event.id = id.into();
        Ok(event)
    }

    /// Parse the pre-play snapshot, returning `None` when it is absent or malformed.
    pub fn snapshot(&self) -> Option<GameState> {
        let raw = self.prev_game_state.as_ref()?;
        serde_json::from_value(raw.clone()).ok()
    }
}
