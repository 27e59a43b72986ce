use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::format_micros,
    state::play::{PitchType, PlayEvent},
};

/// Logged play as exposed to clients; the pre-play snapshot stays server side.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayEventDto {
    /// Play identifier, used by undo ordering.
    pub id: String,
    /// Inning the play happened in.
    pub inning: u32,
    /// Half the play happened in.
    pub is_top_inning: bool,
    /// Pitch classification when the scorer gave one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch_type: Option<PitchType>,
    /// Play description, as shown in `lastPlay`.
    pub result: String,
    /// Batter resolved from the batting lineup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batter_name: Option<String>,
    /// Pitcher resolved from the fielding lineup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitcher_name: Option<String>,
    /// Runner on first before the play.
    pub on_first: bool,
    /// Runner on second before the play.
    pub on_second: bool,
    /// Runner on third before the play.
    pub on_third: bool,
    /// RFC 3339 rendering of the server timestamp.
    pub recorded_at: String,
    /// Whether undoing this play can restore the previous state.
    pub undoable: bool,
}

impl From<PlayEvent> for PlayEventDto {
    fn from(event: PlayEvent) -> Self {
        let undoable = event.snapshot().is_some();
        Self {
            recorded_at: format_micros(event.timestamp),
            undoable,
            id: event.id,
            inning: event.inning,
            is_top_inning: event.is_top_inning,
            pitch_type: event.pitch_type,
            result: event.result,
            batter_name: event.batter_name,
            pitcher_name: event.pitcher_name,
            on_first: event.on_first,
            on_second: event.on_second,
            on_third: event.on_third,
        }
    }
}
