use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::game::TeamSide;

/// A player as listed on a game's lineup card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Player {
    /// Roster identifier referenced by scoring requests.
    pub id: String,
    /// Display name written into the play log.
    pub name: String,
    /// Jersey number; kept as text so `00` survives.
    pub number: String,
    /// Fielding position such as `SS`, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// Zero-based batting order.
    #[serde(default)]
    pub order: u32,
}

/// Stored document for one side's lineup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterDocument {
    /// Players in stored order.
    #[serde(default)]
    pub players: Vec<Player>,
}

/// Both lineups of a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Roster {
    /// Home lineup in batting order.
    pub home: Vec<Player>,
    /// Away lineup in batting order.
    pub away: Vec<Player>,
}

impl Roster {
    /// Lineup of one side.
    pub fn side(&self, side: TeamSide) -> &[Player] {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    /// Look a player up on `side` only; ids are not unique across lineups.
    pub fn find_player(&self, side: TeamSide, id: &str) -> Option<&Player> {
        self.side(side).iter().find(|player| player.id == id)
    }
}
