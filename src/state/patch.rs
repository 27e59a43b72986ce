use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use crate::state::game::{BatterStat, GameState, TeamSide, TeamState};

/// Partial update of a [`GameState`], carrying only the fields a transition changed.
///
/// Nested values (team lines, batter stats) are always complete replacements so the
/// patch can be shipped to a document store as a shallow merge.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatePatch {
    /// Replacement for `homeTeam`.
    pub home_team: Option<TeamState>,
    /// Replacement for `awayTeam`.
    pub away_team: Option<TeamState>,
    /// Replacement for `inning`.
    pub inning: Option<u32>,
    /// Replacement for `isTopInning`.
    pub is_top_inning: Option<bool>,
    /// Replacement for `balls`.
    pub balls: Option<u8>,
    /// Replacement for `strikes`.
    pub strikes: Option<u8>,
    /// Replacement for `outs`.
    pub outs: Option<u8>,
    /// Replacement for `onFirst`.
    pub on_first: Option<bool>,
    /// Replacement for `onSecond`.
    pub on_second: Option<bool>,
    /// Replacement for `onThird`.
    pub on_third: Option<bool>,
    /// Replacement for `lastPlay`.
    pub last_play: Option<String>,
    /// Replacement for `isActive`.
    pub is_active: Option<bool>,
    /// Replacement for `pitchCount`.
    pub pitch_count: Option<u32>,
    /// Whole map; entries are never merged one by one.
    pub batter_stats: Option<BTreeMap<String, BatterStat>>,
}

impl GameStatePatch {
    /// Patch overwriting every field with the values of `state`.
    pub fn replace_with(state: &GameState) -> Self {
        Self {
            home_team: Some(state.home_team.clone()),
            away_team: Some(state.away_team.clone()),
            inning: Some(state.inning),
            is_top_inning: Some(state.is_top_inning),
            balls: Some(state.balls),
            strikes: Some(state.strikes),
            outs: Some(state.outs),
            on_first: Some(state.on_first),
            on_second: Some(state.on_second),
            on_third: Some(state.on_third),
            last_play: Some(state.last_play.clone()),
            is_active: Some(state.is_active),
            pitch_count: Some(state.pitch_count),
            batter_stats: Some(state.batter_stats.clone()),
        }
    }

    /// Description of the play recorded by this patch, if any.
    pub fn last_play(&self) -> Option<&str> {
        self.last_play.as_deref()
    }

    /// Set the team line of one side.
    pub fn set_team(&mut self, side: TeamSide, team: TeamState) {
        match side {
            TeamSide::Home => self.home_team = Some(team),
            TeamSide::Away => self.away_team = Some(team),
        }
    }

    /// Team line of one side as carried by this patch.
    pub fn team(&self, side: TeamSide) -> Option<&TeamState> {
        match side {
            TeamSide::Home => self.home_team.as_ref(),
            TeamSide::Away => self.away_team.as_ref(),
        }
    }

    /// True when the patch does not touch any field.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer `other` on top of this patch; fields set in `other` win.
    pub fn merge(mut self, other: GameStatePatch) -> Self {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        take!(
            home_team,
            away_team,
            inning,
            is_top_inning,
            balls,
            strikes,
            outs,
            on_first,
            on_second,
            on_third,
            last_play,
            is_active,
            pitch_count,
            batter_stats,
        );
        self
    }

    /// Render the patch as the top-level field map of a shallow document merge.
    pub fn to_merge_fields(&self) -> serde_json::Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            _ => Ok(Map::new()),
        }
    }
}

impl GameState {
    /// Produce the state obtained by applying `patch` on top of `self`.
    ///
    /// This is the only place where transition results are folded into a state.
    pub fn apply(&self, patch: &GameStatePatch) -> GameState {
        let mut next = self.clone();
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &patch.$field {
                    next.$field = value.clone();
                })*
            };
        }
        set!(
            home_team,
            away_team,
            inning,
            is_top_inning,
            balls,
            strikes,
            outs,
            on_first,
            on_second,
            on_third,
            last_play,
            is_active,
            pitch_count,
            batter_stats,
        );
        next
    }
}
