use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    game::{GameState, TeamState},
    linescore::HalfInningRuns,
};

/// Runs scored in one half-inning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HalfInningRunsDto {
    /// Inning number, from 1.
    pub inning: u32,
    /// True for the away team's half.
    pub is_top_inning: bool,
    /// Runs scored.
    pub runs: u32,
}

impl From<HalfInningRuns> for HalfInningRunsDto {
    fn from(value: HalfInningRuns) -> Self {
        Self {
            inning: value.inning,
            is_top_inning: value.is_top_inning,
            runs: value.runs,
        }
    }
}

/// R/H/E totals of one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TeamTotals {
    /// Team display name.
    pub name: String,
    /// Runs scored.
    pub runs: u32,
    /// Team hits.
    pub hits: u32,
    /// Errors charged to the team.
    pub errors: u32,
}

impl From<&TeamState> for TeamTotals {
    fn from(team: &TeamState) -> Self {
        Self {
            name: team.name.clone(),
            runs: team.score,
            hits: team.hits,
            errors: team.errors,
        }
    }
}

/// Box score: runs per half-inning from the play log plus the live totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct LinescoreResponse {
    /// Half-innings with at least one logged play, in log order.
    pub innings: Vec<HalfInningRunsDto>,
    /// Away totals.
    pub away: TeamTotals,
    /// Home totals.
    pub home: TeamTotals,
}

impl LinescoreResponse {
    /// Combine per-half runs with the totals of `state`.
    pub fn new(innings: Vec<HalfInningRuns>, state: &GameState) -> Self {
        Self {
            innings: innings.into_iter().map(Into::into).collect(),
            away: (&state.away_team).into(),
            home: (&state.home_team).into(),
        }
    }
}
