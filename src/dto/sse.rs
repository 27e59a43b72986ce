use serde::Serialize;
use utoipa::ToSchema;

use crate::state::half_inning::HalfInningChange;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name.
    pub event: Option<String>,
    /// JSON encoded payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Initial frame sent to an SSE client when it connects.
pub struct Handshake {
    /// Game the stream follows.
    pub game_id: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast once when the side is retired and the other team comes up.
pub struct HalfInningEvent {
    /// Inning now being played.
    pub inning: u32,
    /// Half now being played.
    pub is_top_inning: bool,
    /// Name of the team coming up to bat.
    pub batting_team: String,
    /// e.g. `Top 4th — Hawks up to bat`.
    pub banner: String,
    /// Away runs at the change.
    pub away_score: u32,
    /// Home runs at the change.
    pub home_score: u32,
}

impl From<HalfInningChange> for HalfInningEvent {
    fn from(change: HalfInningChange) -> Self {
        Self {
            banner: change.banner(),
            inning: change.inning,
            is_top_inning: change.is_top_inning,
            batting_team: change.batting_team,
            away_score: change.away_score,
            home_score: change.home_score,
        }
    }
}
