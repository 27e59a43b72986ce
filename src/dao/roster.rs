use std::sync::Arc;

use serde_json::Value;

use crate::{
    dao::{
        document_store::DocumentStore,
        models::{Player, Roster, RosterDocument},
        paths,
        storage::{StorageError, StorageResult},
    },
    state::game::TeamSide,
};

/// Read access to the per-side lineup documents of a game.
#[derive(Clone)]
pub struct RosterRepository {
    store: Arc<dyn DocumentStore>,
}

impl RosterRepository {
    /// Repository over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch both sides; a missing side reads as an empty lineup.
    pub async fn fetch(&self, game_id: &str) -> StorageResult<Roster> {
        let (home, away) = futures::future::try_join(
            self.side(game_id, TeamSide::Home),
            self.side(game_id, TeamSide::Away),
        )
        .await?;
        Ok(Roster { home, away })
    }

    async fn side(&self, game_id: &str, side: TeamSide) -> StorageResult<Vec<Player>> {
        let path = paths::roster(game_id, side);
        let Some(raw) = self.store.get(path.clone()).await? else {
            return Ok(Vec::new());
        };
        let mut document: RosterDocument = decode(path.as_str(), raw)?;
        document.players.sort_by_key(|player| player.order);
        Ok(document.players)
    }
}

fn decode(path: &str, raw: Value) -> StorageResult<RosterDocument> {
    serde_json::from_value(raw).map_err(|source| StorageError::malformed(path, source))
}
