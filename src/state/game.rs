use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Display name used for the home side until the scorer renames it.
pub const DEFAULT_HOME_NAME: &str = "Home";
/// Display name used for the away side until the scorer renames it.
pub const DEFAULT_AWAY_NAME: &str = "Away";

/// Which side of the matchup a team, roster, or half-inning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    /// Home team, bats in the bottom half.
    Home,
    /// Away team, bats in the top half.
    Away,
}

impl TeamSide {
    /// Stable lowercase label used in document paths and route parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }

    /// The opposing side.
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }
}

/// Running totals for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamState {
    /// Display name shown on the scoreboard.
    pub name: String,
    /// Runs scored.
    pub score: u32,
    /// Hits recorded by the engine.
    pub hits: u32,
    /// Errors charged, adjusted manually by the scorer.
    pub errors: u32,
}

impl TeamState {
    /// Fresh team line with the provided display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: 0,
            hits: 0,
            errors: 0,
        }
    }
}

/// Per-batter at-bat and hit counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatterStat {
    /// Official at-bats.
    #[serde(alias = "ab")]
    pub at_bats: u32,
    /// Hits.
    pub hits: u32,
}

/// Live scoring state of a single game.
///
/// Persisted values always keep `balls <= 3`, `strikes <= 2` and `outs <= 2`:
/// reaching the terminal value of any counter resolves into a walk, a
/// strikeout, or a half-inning flip within the same transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Home side totals.
    pub home_team: TeamState,
    /// Away side totals.
    pub away_team: TeamState,
    /// Current inning, starting at 1.
    pub inning: u32,
    /// True while the away team bats.
    pub is_top_inning: bool,
    /// Balls in the current count.
    pub balls: u8,
    /// Strikes in the current count.
    pub strikes: u8,
    /// Outs in the current half-inning.
    pub outs: u8,
    /// Runner on first base.
    pub on_first: bool,
    /// Runner on second base.
    pub on_second: bool,
    /// Runner on third base.
    pub on_third: bool,
    /// Human readable description of the most recent play.
    pub last_play: String,
    /// Whether the game is currently being scored.
    pub is_active: bool,
    /// Pitches thrown by the current pitcher this half-inning.
    #[serde(default)]
    pub pitch_count: u32,
    /// Batting line per player identifier.
    #[serde(default)]
    pub batter_stats: BTreeMap<String, BatterStat>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_team_names(DEFAULT_HOME_NAME, DEFAULT_AWAY_NAME)
    }
}

impl GameState {
    /// Initial state of a game seeded with the scoreboard names of both teams.
    pub fn with_team_names(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home_team: TeamState::named(home),
            away_team: TeamState::named(away),
            inning: 1,
            is_top_inning: true,
            balls: 0,
            strikes: 0,
            outs: 0,
            on_first: false,
            on_second: false,
            on_third: false,
            last_play: String::new(),
            is_active: true,
            pitch_count: 0,
            batter_stats: BTreeMap::new(),
        }
    }

    /// Side currently at bat.
    pub fn batting_side(&self) -> TeamSide {
        if self.is_top_inning {
            TeamSide::Away
        } else {
            TeamSide::Home
        }
    }

    /// Side currently in the field.
    pub fn fielding_side(&self) -> TeamSide {
        self.batting_side().opponent()
    }

    /// Totals of the requested side.
    pub fn team(&self, side: TeamSide) -> &TeamState {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    /// Totals of the side currently at bat.
    pub fn batting_team(&self) -> &TeamState {
        self.team(self.batting_side())
    }

    /// Number of occupied bases.
    pub fn runners_on(&self) -> u32 {
        u32::from(self.on_first) + u32::from(self.on_second) + u32::from(self.on_third)
    }

    /// Batting line of a player, zeroed when the player has not batted yet.
    pub fn batter_stat(&self, batter_id: &str) -> BatterStat {
        self.batter_stats
            .get(batter_id)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_state_starts_top_of_first() {
        let state = GameState::default();
        assert_eq!(state.inning, 1);
        assert!(state.is_top_inning);
        assert_eq!(state.batting_side(), TeamSide::Away);
        assert_eq!(state.home_team.name, "Home");
        assert_eq!(state.away_team.name, "Away");
        assert!(state.is_active);
        assert_eq!(state.runners_on(), 0);
    }

    #[test]
    fn legacy_document_fills_missing_fields() {
        let raw = json!({
            "homeTeam": { "name": "Owls", "score": 2, "hits": 3, "errors": 0 },
            "awayTeam": { "name": "Hawks", "score": 1, "hits": 1, "errors": 1 },
            "inning": 3,
            "isTopInning": false,
            "balls": 1,
            "strikes": 2,
            "outs": 1,
            "onFirst": true,
            "onSecond": false,
            "onThird": false,
            "lastPlay": "Single",
            "isActive": true,
            "updatedAt": 1_700_000_000_000u64
        });

        let state: GameState = serde_json::from_value(raw).unwrap();
        assert_eq!(state.pitch_count, 0);
        assert!(state.batter_stats.is_empty());
        assert_eq!(state.batting_team().name, "Owls");
    }

    #[test]
    fn batter_stat_accepts_short_at_bat_key() {
        let stat: BatterStat = serde_json::from_value(json!({ "ab": 4, "hits": 2 })).unwrap();
        assert_eq!(stat.at_bats, 4);
        assert_eq!(stat.hits, 2);

        let encoded = serde_json::to_value(stat).unwrap();
        assert_eq!(encoded, json!({ "atBats": 4, "hits": 2 }));
    }
}
