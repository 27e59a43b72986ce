use std::sync::Arc;

use futures::{StreamExt, stream::BoxStream};

use crate::{
    dao::{
        document_store::{DocumentStore, StoredDocument},
        paths,
        storage::{StorageError, StorageResult},
    },
    state::play::{NewPlayEvent, PlayEvent},
};

/// Append-only access to a game's play-by-play collection.
#[derive(Clone)]
pub struct PlayLogRepository {
    store: Arc<dyn DocumentStore>,
}

impl PlayLogRepository {
    /// Repository over `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Append `event` and return its generated id.
    pub async fn append(&self, game_id: &str, event: &NewPlayEvent) -> StorageResult<String> {
        let collection = paths::plays(game_id);
        let data = serde_json::to_value(event)
            .map_err(|source| StorageError::malformed(collection.as_str(), source))?;
        let stored = self.store.append(collection, data).await?;
        Ok(stored.id)
    }

    /// Every play, oldest first.
    pub async fn list(&self, game_id: &str) -> StorageResult<Vec<PlayEvent>> {
        let documents = self.store.list(paths::plays(game_id)).await?;
        Ok(decode_all(game_id, documents))
    }

    /// Most recent play as stored, undecoded so that even an unreadable entry
    /// can be removed.
    pub async fn latest(&self, game_id: &str) -> StorageResult<Option<StoredDocument>> {
        self.store.latest(paths::plays(game_id)).await
    }

    /// Remove one play; a missing play is not an error.
    pub async fn delete(&self, game_id: &str, play_id: &str) -> StorageResult<()> {
        self.store
            .delete(paths::plays(game_id).document(play_id))
            .await
    }

    /// The full ordered log on subscription and after every append or delete.
    pub fn subscribe(&self, game_id: &str) -> BoxStream<'static, StorageResult<Vec<PlayEvent>>> {
        let game_id = game_id.to_string();
        self.store
            .subscribe_collection(paths::plays(&game_id))
            .map(move |update| update.map(|documents| decode_all(&game_id, documents)))
            .boxed()
    }
}

/// Plays that fail to decode are skipped so one bad entry does not hide the log.
fn decode_all(game_id: &str, documents: Vec<StoredDocument>) -> Vec<PlayEvent> {
    documents
        .into_iter()
        .filter_map(|StoredDocument { id, data }| {
            match PlayEvent::from_document(id.clone(), data) {
                Ok(event) => Some(event),
                Err(err) => {
                    tracing::warn!(game_id, play_id = %id, error = %err, "skipping unreadable play");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{dao::document_store::memory::MemoryDocumentStore, state::game::GameState};

    #[tokio::test]
    async fn appended_plays_list_oldest_first_with_ids() {
        let repo = PlayLogRepository::new(Arc::new(MemoryDocumentStore::new()));
        let state = GameState::default();
        let first = repo
            .append("g1", &NewPlayEvent::capture(&state, "Ball").unwrap())
            .await
            .unwrap();
        let second = repo
            .append("g1", &NewPlayEvent::capture(&state, "Strike").unwrap())
            .await
            .unwrap();

        let plays = repo.list("g1").await.unwrap();
        let ids: Vec<_> = plays.iter().map(|play| play.id.clone()).collect();
        assert_eq!(ids, [first, second.clone()]);
        assert!(plays[0].timestamp < plays[1].timestamp);
        assert_eq!(repo.latest("g1").await.unwrap().unwrap().id, second);
    }

    #[tokio::test]
    async fn unreadable_plays_are_skipped_in_listings() {
        let store = Arc::new(MemoryDocumentStore::new());
        store
            .append(paths::plays("g1"), json!({ "note": "not a play" }))
            .await
            .unwrap();
        let repo = PlayLogRepository::new(store);
        repo.append(
            "g1",
            &NewPlayEvent::capture(&GameState::default(), "Ball").unwrap(),
        )
        .await
        .unwrap();

        let plays = repo.list("g1").await.unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].result, "Ball");
    }
}
