use std::sync::Arc;

use futures::{StreamExt, stream::BoxStream};
use serde_json::Value;

use crate::{
    dao::{
        document_store::DocumentStore,
        paths,
        storage::{StorageError, StorageResult},
    },
    state::{game::GameState, patch::GameStatePatch},
};

/// Typed access to the live scoring document of a game.
#[derive(Clone)]
pub struct ScoringRepository {
    store: Arc<dyn DocumentStore>,
}

impl ScoringRepository {
    /// Repository over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Current state, `None` when the game was never initialized.
    pub async fn load(&self, game_id: &str) -> StorageResult<Option<GameState>> {
        let path = paths::game_state(game_id);
        let raw = self.store.get(path.clone()).await?;
        raw.map(|raw| decode(path.as_str(), raw)).transpose()
    }

    /// Write `state` as the whole document.
    pub async fn create(&self, game_id: &str, state: &GameState) -> StorageResult<()> {
        let path = paths::game_state(game_id);
        let data = serde_json::to_value(state)
            .map_err(|source| StorageError::malformed(path.as_str(), source))?;
        self.store.set(path, data).await
    }

    /// Merge the fields carried by `patch`; an empty patch writes nothing.
    pub async fn merge(&self, game_id: &str, patch: &GameStatePatch) -> StorageResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let path = paths::game_state(game_id);
        let fields = patch
            .to_merge_fields()
            .map_err(|source| StorageError::malformed(path.as_str(), source))?;
        self.store.merge(path, fields).await
    }

    /// Overwrite every top-level field with the values of `state`.
    pub async fn restore(&self, game_id: &str, state: &GameState) -> StorageResult<()> {
        self.merge(game_id, &GameStatePatch::replace_with(state))
            .await
    }

    /// Live state; `None` while the document does not exist.
    pub fn subscribe(&self, game_id: &str) -> BoxStream<'static, StorageResult<Option<GameState>>> {
        let path = paths::game_state(game_id);
        self.store
            .subscribe(path.clone())
            .map(move |update| {
                update.and_then(|raw| raw.map(|raw| decode(path.as_str(), raw)).transpose())
            })
            .boxed()
    }
}

fn decode(path: &str, raw: Value) -> StorageResult<GameState> {
    serde_json::from_value(raw).map_err(|source| StorageError::malformed(path, source))
}
