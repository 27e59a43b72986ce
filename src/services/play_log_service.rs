use tracing::{info, warn};

use crate::{
    dao::{play_log::PlayLogRepository, scoring::ScoringRepository},
    dto::{linescore::LinescoreResponse, plays::PlayEventDto},
    error::ServiceError,
    state::{SharedState, game::GameState, linescore::linescore, play::PlayEvent},
};

/// Remove the most recent play and hand back the state captured before it.
///
/// Returns `None` when the log is empty, or when the removed play had no
/// readable snapshot. In the latter case the play is still deleted.
pub async fn undo_last(
    plays: &PlayLogRepository,
    game_id: &str,
) -> Result<Option<GameState>, ServiceError> {
    let Some(latest) = plays.latest(game_id).await? else {
        info!(game_id, "undo requested on an empty play log");
        return Ok(None);
    };

    plays.delete(game_id, &latest.id).await?;

    let snapshot = match PlayEvent::from_document(latest.id.clone(), latest.data) {
        Ok(event) => event.snapshot(),
        Err(err) => {
            warn!(game_id, play_id = %latest.id, error = %err, "removed play could not be decoded");
            None
        }
    };

    if snapshot.is_none() {
        warn!(game_id, play_id = %latest.id, "removed play carried no usable snapshot; state left as is");
    }
    Ok(snapshot)
}

/// Ordered play log of a game.
pub async fn list_plays(state: &SharedState, game_id: &str) -> Result<Vec<PlayEventDto>, ServiceError> {
    let store = state.require_document_store().await?;
    let plays = PlayLogRepository::new(store).list(game_id).await?;
    Ok(plays.into_iter().map(Into::into).collect())
}

/// Runs per half-inning from the log, with the live R/H/E totals.
pub async fn linescore_for(
    state: &SharedState,
    game_id: &str,
) -> Result<LinescoreResponse, ServiceError> {
    let store = state.require_document_store().await?;
    let (plays, current) = futures::future::try_join(
        PlayLogRepository::new(store.clone()).list(game_id),
        ScoringRepository::new(store).load(game_id),
    )
    .await?;
    let current = current.unwrap_or_else(|| state.config().default_game_state());
    Ok(LinescoreResponse::new(linescore(&plays), &current))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            document_store::{DocumentStore, memory::MemoryDocumentStore},
            paths,
        },
        state::{AppState, play::NewPlayEvent},
    };

    fn repo() -> (Arc<MemoryDocumentStore>, PlayLogRepository) {
        let store = Arc::new(MemoryDocumentStore::new());
        (store.clone(), PlayLogRepository::new(store))
    }

    fn state_with(balls: u8) -> GameState {
        GameState {
            balls,
            ..GameState::default()
        }
    }

    #[tokio::test]
    async fn undo_on_empty_log_returns_none() {
        let (_, plays) = repo();
        assert_eq!(undo_last(&plays, "g1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn undo_removes_latest_and_returns_its_snapshot() {
        let (_, plays) = repo();
        for balls in 0..3 {
            let event = NewPlayEvent::capture(&state_with(balls), "Ball").unwrap();
            plays.append("g1", &event).await.unwrap();
        }

        let restored = undo_last(&plays, "g1").await.unwrap();
        assert_eq!(restored, Some(state_with(2)));
        assert_eq!(plays.list("g1").await.unwrap().len(), 2);

        let restored = undo_last(&plays, "g1").await.unwrap();
        assert_eq!(restored, Some(state_with(1)));
        assert_eq!(plays.list("g1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn undo_without_snapshot_still_removes_the_play() {
        let (store, plays) = repo();
        store
            .append(
                paths::plays("g1"),
                json!({ "inning": 1, "isTopInning": true, "result": "Ball" }),
            )
            .await
            .unwrap();
        store
            .append(
                paths::plays("g1"),
                json!({
                    "inning": 1, "isTopInning": true, "result": "Strike",
                    "prevGameState": { "balls": "many" }
                }),
            )
            .await
            .unwrap();

        assert_eq!(undo_last(&plays, "g1").await.unwrap(), None);
        assert_eq!(plays.list("g1").await.unwrap().len(), 1);
        assert_eq!(undo_last(&plays, "g1").await.unwrap(), None);
        assert!(plays.list("g1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn linescore_combines_log_and_totals() {
        let state = AppState::new(AppConfig::default());
        let store = Arc::new(MemoryDocumentStore::new());
        state.set_document_store(store.clone()).await;

        let mut before = GameState::default();
        before.on_first = true;
        let plays = PlayLogRepository::new(store.clone());
        plays
            .append("g1", &NewPlayEvent::capture(&before, "Home Run — 2 Runs Scored").unwrap())
            .await
            .unwrap();

        let mut current = GameState::default();
        current.away_team.score = 2;
        current.away_team.hits = 1;
        ScoringRepository::new(store).create("g1", &current).await.unwrap();

        let line = linescore_for(&state, "g1").await.unwrap();
        assert_eq!(line.innings.len(), 1);
        assert_eq!(line.innings[0].runs, 2);
        assert_eq!(line.away.runs, 2);
        assert_eq!(line.away.hits, 1);
        assert_eq!(line.home.runs, 0);
    }
}
