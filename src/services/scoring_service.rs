//! Scoring workflow: read the live state, run the engine, persist the patch and
//! log the play.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    dao::{
        document_store::DocumentStore, models::Roster, play_log::PlayLogRepository,
        roster::RosterRepository, scoring::ScoringRepository, storage::StorageError,
    },
    dto::scoring::{InitScoringResponse, ScoringEventResponse, UndoResponse},
    error::ServiceError,
    services::play_log_service,
    state::{
        SharedState,
        adjustments::{self, Base, TeamAdjustment},
        game::{GameState, TeamSide},
        patch::GameStatePatch,
        play::{NewPlayEvent, PitchType},
        transitions::{ScoringEvent, compute_transition},
    },
};

/// One scoring action with the players involved.
#[derive(Debug, Clone)]
pub struct EventCommand {
    /// Event to run through the engine.
    pub event: ScoringEvent,
    /// Batter credited with the plate appearance.
    pub batter_id: Option<String>,
    /// Pitcher named in the log.
    pub pitcher_id: Option<String>,
    /// Pitch classification stored with the play.
    pub pitch_type: Option<PitchType>,
}

impl From<ScoringEvent> for EventCommand {
    fn from(event: ScoringEvent) -> Self {
        Self {
            event,
            batter_id: None,
            pitcher_id: None,
            pitch_type: None,
        }
    }
}

/// Create the scoring document unless it already exists.
pub async fn init_game(
    state: &SharedState,
    game_id: &str,
    home_name: Option<String>,
    away_name: Option<String>,
) -> Result<InitScoringResponse, ServiceError> {
    let scoring = ScoringRepository::new(state.require_document_store().await?);
    if let Some(existing) = scoring.load(game_id).await? {
        return Ok(InitScoringResponse {
            created: false,
            state: existing,
        });
    }

    let config = state.config();
    let initial = GameState::with_team_names(
        home_name.unwrap_or_else(|| config.default_home_name.clone()),
        away_name.unwrap_or_else(|| config.default_away_name.clone()),
    );
    scoring.create(game_id, &initial).await?;
    info!(game_id, "scoring initialized");
    Ok(InitScoringResponse {
        created: true,
        state: initial,
    })
}

/// Live state, or configured defaults when the game was never initialized.
pub async fn current_state(state: &SharedState, game_id: &str) -> Result<GameState, ServiceError> {
    let scoring = ScoringRepository::new(state.require_document_store().await?);
    Ok(scoring
        .load(game_id)
        .await?
        .unwrap_or_else(|| state.config().default_game_state()))
}

/// Run `command` through the engine, then merge the patch and append the play
/// concurrently. Either write failing fails the call; the other is not rolled back.
pub async fn apply_event(
    state: &SharedState,
    game_id: &str,
    command: EventCommand,
) -> Result<ScoringEventResponse, ServiceError> {
    let store = state.require_document_store().await?;
    let scoring = ScoringRepository::new(store.clone());
    let plays = PlayLogRepository::new(store.clone());

    let current = load_existing(&scoring, game_id).await?;
    let patch = compute_transition(&current, &command.event, command.batter_id.as_deref())?;

    let (batter_name, pitcher_name) = player_names(&store, game_id, &current, &command).await;
    let result = patch.last_play().unwrap_or_default().to_string();
    let play = NewPlayEvent::capture(&current, result)
        .map_err(|err| ServiceError::CorruptData(err.to_string()))?
        .with_pitch_type(command.pitch_type)
        .with_players(batter_name, pitcher_name);

    let (merged, appended) = futures::join!(scoring.merge(game_id, &patch), plays.append(game_id, &play));
    match (merged, appended) {
        (Ok(()), Ok(play_id)) => {
            info!(game_id, play_id = %play_id, result = %play.result, "play recorded");
            Ok(ScoringEventResponse {
                state: current.apply(&patch),
                play_id,
            })
        }
        (Err(err), Ok(play_id)) => {
            warn!(game_id, play_id = %play_id, error = %err, "play logged but state update failed");
            Err(err.into())
        }
        (Ok(()), Err(err)) => {
            warn!(game_id, error = %err, "state updated but play could not be logged");
            Err(err.into())
        }
        (Err(merge_err), Err(append_err)) => {
            warn!(game_id, error = %append_err, "play could not be logged");
            Err(merge_err.into())
        }
    }
}

/// Remove the last play and restore the state captured before it.
pub async fn undo(state: &SharedState, game_id: &str) -> Result<UndoResponse, ServiceError> {
    let store = state.require_document_store().await?;
    let scoring = ScoringRepository::new(store.clone());
    let plays = PlayLogRepository::new(store);

    let Some(snapshot) = play_log_service::undo_last(&plays, game_id).await? else {
        let current = scoring
            .load(game_id)
            .await?
            .unwrap_or_else(|| state.config().default_game_state());
        return Ok(UndoResponse {
            restored: false,
            state: current,
        });
    };

    match scoring.restore(game_id, &snapshot).await {
        Ok(()) => {}
        Err(StorageError::NotFound { .. }) => scoring.create(game_id, &snapshot).await?,
        Err(err) => return Err(err.into()),
    }
    info!(game_id, last_play = %snapshot.last_play, "play undone");
    Ok(UndoResponse {
        restored: true,
        state: snapshot,
    })
}

/// Flip one base.
pub async fn toggle_base(state: &SharedState, game_id: &str, base: Base) -> Result<GameState, ServiceError> {
    adjust(state, game_id, |current| adjustments::toggle_base(current, base)).await
}

/// Force the other half-inning.
pub async fn switch_half(state: &SharedState, game_id: &str) -> Result<GameState, ServiceError> {
    adjust(state, game_id, adjustments::switch_half).await
}

/// Zero the count of the current at-bat.
pub async fn reset_count(state: &SharedState, game_id: &str) -> Result<GameState, ServiceError> {
    adjust(state, game_id, |_| adjustments::reset_count()).await
}

/// Mark the game live or finished.
pub async fn set_active(
    state: &SharedState,
    game_id: &str,
    is_active: bool,
) -> Result<GameState, ServiceError> {
    adjust(state, game_id, |_| adjustments::set_active(is_active)).await
}

/// Rename a team or correct its score and errors.
pub async fn adjust_team(
    state: &SharedState,
    game_id: &str,
    side: TeamSide,
    adjustment: TeamAdjustment,
) -> Result<GameState, ServiceError> {
    adjust(state, game_id, |current| {
        adjustments::adjust_team(current, side, &adjustment)
    })
    .await
}

/// Both lineups of a game.
pub async fn roster(state: &SharedState, game_id: &str) -> Result<Roster, ServiceError> {
    let store = state.require_document_store().await?;
    Ok(RosterRepository::new(store).fetch(game_id).await?)
}

/// Manual corrections skip the play log and cannot be undone.
async fn adjust<F>(state: &SharedState, game_id: &str, build: F) -> Result<GameState, ServiceError>
where
    F: FnOnce(&GameState) -> GameStatePatch,
{
    let scoring = ScoringRepository::new(state.require_document_store().await?);
    let current = load_existing(&scoring, game_id).await?;
    let patch = build(&current);
    scoring.merge(game_id, &patch).await?;
    info!(game_id, "manual adjustment applied");
    Ok(current.apply(&patch))
}

async fn load_existing(scoring: &ScoringRepository, game_id: &str) -> Result<GameState, ServiceError> {
    scoring
        .load(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{game_id}` has no scoring state")))
}

/// Resolve display names from the roster: the batter on the batting side, the
/// pitcher on the fielding side. A roster failure only costs the names.
async fn player_names(
    store: &Arc<dyn DocumentStore>,
    game_id: &str,
    current: &GameState,
    command: &EventCommand,
) -> (Option<String>, Option<String>) {
    if command.batter_id.is_none() && command.pitcher_id.is_none() {
        return (None, None);
    }

    let roster = match RosterRepository::new(store.clone()).fetch(game_id).await {
        Ok(roster) => roster,
        Err(err) => {
            warn!(game_id, error = %err, "roster unavailable; logging play without names");
            return (None, None);
        }
    };
    let batting = current.batting_side();
    let name_of = |side: TeamSide, id: &Option<String>| {
        id.as_deref()
            .and_then(|id| roster.find_player(side, id))
            .map(|player| player.name.clone())
    };
    (
        name_of(batting, &command.batter_id),
        name_of(batting.opponent(), &command.pitcher_id),
    )
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;
    use serde_json::{Map, Value, json};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            document_store::{
                CollectionStream, DocumentStream, StoredDocument, memory::MemoryDocumentStore,
            },
            paths::{self, CollectionPath, DocumentPath},
            storage::StorageResult,
        },
        state::{
            AppState,
            transitions::StrikeKind,
        },
    };

    async fn app_with(store: Arc<dyn DocumentStore>) -> SharedState {
        let state = AppState::new(AppConfig {
            default_home_name: "Owls".into(),
            default_away_name: "Hawks".into(),
            ..AppConfig::default()
        });
        state.set_document_store(store).await;
        state
    }

    async fn app() -> (SharedState, Arc<MemoryDocumentStore>) {
        let store = Arc::new(MemoryDocumentStore::new());
        (app_with(store.clone()).await, store)
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let (state, _) = app().await;
        let first = init_game(&state, "g1", None, Some("Jays".into())).await.unwrap();
        assert!(first.created);
        assert_eq!(first.state.home_team.name, "Owls");
        assert_eq!(first.state.away_team.name, "Jays");

        let second = init_game(&state, "g1", Some("Other".into()), None).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.state, first.state);
    }

    #[tokio::test]
    async fn current_state_defaults_before_init() {
        let (state, _) = app().await;
        let current = current_state(&state, "g1").await.unwrap();
        assert_eq!(current.home_team.name, "Owls");
        assert_eq!(current.inning, 1);
    }

    #[tokio::test]
    async fn events_require_an_initialized_game() {
        let (state, _) = app().await;
        let err = apply_event(&state, "g1", ScoringEvent::Ball.into()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn apply_event_persists_state_and_logs_play() {
        let (state, store) = app().await;
        store
            .set(
                paths::roster("g1", TeamSide::Away),
                json!({ "players": [{ "id": "p1", "name": "Ana", "number": "7", "order": 0 }] }),
            )
            .await
            .unwrap();
        init_game(&state, "g1", None, None).await.unwrap();

        let response = apply_event(
            &state,
            "g1",
            EventCommand {
                event: ScoringEvent::Hit { bases: 2 },
                batter_id: Some("p1".into()),
                pitcher_id: Some("unknown".into()),
                pitch_type: Some(PitchType::Fastball),
            },
        )
        .await
        .unwrap();

        assert!(response.state.on_second);
        assert_eq!(response.state.away_team.hits, 1);
        assert_eq!(current_state(&state, "g1").await.unwrap(), response.state);

        let plays = PlayLogRepository::new(store).list("g1").await.unwrap();
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].id, response.play_id);
        assert_eq!(plays[0].result, "Double");
        assert_eq!(plays[0].batter_name.as_deref(), Some("Ana"));
        assert_eq!(plays[0].pitcher_name, None);
        assert_eq!(plays[0].pitch_type, Some(PitchType::Fastball));
        assert!(!plays[0].on_second);
    }

    #[tokio::test]
    async fn player_names_resolve_against_the_right_lineup() {
        let (state, store) = app().await;
        for (side, name) in [(TeamSide::Away, "Away Ana"), (TeamSide::Home, "Home Ana")] {
            store
                .set(
                    paths::roster("g1", side),
                    json!({ "players": [{ "id": "p1", "name": name, "number": "7", "order": 0 }] }),
                )
                .await
                .unwrap();
        }
        init_game(&state, "g1", None, None).await.unwrap();

        apply_event(
            &state,
            "g1",
            EventCommand {
                event: ScoringEvent::Ball,
                batter_id: Some("p1".into()),
                pitcher_id: Some("p1".into()),
                pitch_type: None,
            },
        )
        .await
        .unwrap();

        let plays = PlayLogRepository::new(store).list("g1").await.unwrap();
        assert_eq!(plays[0].batter_name.as_deref(), Some("Away Ana"));
        assert_eq!(plays[0].pitcher_name.as_deref(), Some("Home Ana"));
    }

    #[tokio::test]
    async fn invalid_hit_writes_nothing() {
        let (state, store) = app().await;
        init_game(&state, "g1", None, None).await.unwrap();
        let before = current_state(&state, "g1").await.unwrap();

        let err = apply_event(&state, "g1", ScoringEvent::Hit { bases: 0 }.into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(current_state(&state, "g1").await.unwrap(), before);
        assert!(PlayLogRepository::new(store).list("g1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn undo_restores_the_state_before_each_play() {
        let (state, _) = app().await;
        init_game(&state, "g1", None, None).await.unwrap();
        let start = current_state(&state, "g1").await.unwrap();

        apply_event(&state, "g1", ScoringEvent::Ball.into()).await.unwrap();
        let after_ball = current_state(&state, "g1").await.unwrap();
        apply_event(&state, "g1", ScoringEvent::Strike(StrikeKind::Called).into())
            .await
            .unwrap();

        let undone = undo(&state, "g1").await.unwrap();
        assert!(undone.restored);
        assert_eq!(undone.state, after_ball);
        assert_eq!(current_state(&state, "g1").await.unwrap(), after_ball);

        let undone = undo(&state, "g1").await.unwrap();
        assert_eq!(undone.state, start);

        let empty = undo(&state, "g1").await.unwrap();
        assert!(!empty.restored);
        assert_eq!(empty.state, start);
    }

    #[tokio::test]
    async fn undo_of_legacy_play_leaves_state_untouched() {
        let (state, store) = app().await;
        init_game(&state, "g1", None, None).await.unwrap();
        apply_event(&state, "g1", ScoringEvent::Ball.into()).await.unwrap();
        store
            .append(
                paths::plays("g1"),
                json!({ "inning": 1, "isTopInning": true, "result": "Strike" }),
            )
            .await
            .unwrap();
        let before = current_state(&state, "g1").await.unwrap();

        let undone = undo(&state, "g1").await.unwrap();
        assert!(!undone.restored);
        assert_eq!(undone.state, before);
        assert_eq!(PlayLogRepository::new(store).list("g1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn manual_adjustments_are_not_logged() {
        let (state, store) = app().await;
        init_game(&state, "g1", None, None).await.unwrap();

        let toggled = toggle_base(&state, "g1", Base::Third).await.unwrap();
        assert!(toggled.on_third);
        let renamed = adjust_team(
            &state,
            "g1",
            TeamSide::Home,
            TeamAdjustment {
                name: Some("Cardinals".into()),
                score_delta: -1,
                errors_delta: 1,
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.home_team.name, "Cardinals");
        assert_eq!(renamed.home_team.score, 0);
        let switched = switch_half(&state, "g1").await.unwrap();
        assert!(!switched.is_top_inning);
        assert!(!switched.on_third);
        let paused = set_active(&state, "g1", false).await.unwrap();
        assert!(!paused.is_active);
        let reset = reset_count(&state, "g1").await.unwrap();
        assert_eq!(reset.last_play, "At-bat reset");

        assert_eq!(current_state(&state, "g1").await.unwrap(), reset);
        assert!(PlayLogRepository::new(store).list("g1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn degraded_without_store() {
        let state = AppState::new(AppConfig::default());
        let err = current_state(&state, "g1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }

    /// Memory store whose state merges or collection appends can be made to fail.
    #[derive(Clone, Default)]
    struct FailingStore {
        inner: MemoryDocumentStore,
        fail_merge: bool,
        fail_append: bool,
    }

    fn offline(message: &str) -> StorageError {
        StorageError::unavailable(message.into(), std::io::Error::other("offline"))
    }

    impl DocumentStore for FailingStore {
        fn get(&self, path: DocumentPath) -> BoxFuture<'static, StorageResult<Option<Value>>> {
            self.inner.get(path)
        }
        fn set(&self, path: DocumentPath, data: Value) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.set(path, data)
        }
        fn merge(
            &self,
            path: DocumentPath,
            fields: Map<String, Value>,
        ) -> BoxFuture<'static, StorageResult<()>> {
            if self.fail_merge {
                return Box::pin(async { Err(offline("merge rejected")) });
            }
            self.inner.merge(path, fields)
        }
        fn subscribe(&self, path: DocumentPath) -> DocumentStream {
            self.inner.subscribe(path)
        }
        fn append(
            &self,
            collection: CollectionPath,
            data: Value,
        ) -> BoxFuture<'static, StorageResult<StoredDocument>> {
            if self.fail_append {
                return Box::pin(async { Err(offline("append rejected")) });
            }
            self.inner.append(collection, data)
        }
        fn list(
            &self,
            collection: CollectionPath,
        ) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>> {
            self.inner.list(collection)
        }
        fn latest(
            &self,
            collection: CollectionPath,
        ) -> BoxFuture<'static, StorageResult<Option<StoredDocument>>> {
            self.inner.latest(collection)
        }
        fn subscribe_collection(&self, collection: CollectionPath) -> CollectionStream {
            self.inner.subscribe_collection(collection)
        }
        fn delete(&self, path: DocumentPath) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.delete(path)
        }
        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }
        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    #[tokio::test]
    async fn failed_append_is_surfaced() {
        let store = FailingStore {
            fail_append: true,
            ..FailingStore::default()
        };
        let state = app_with(Arc::new(store)).await;
        init_game(&state, "g1", None, None).await.unwrap();

        let err = apply_event(&state, "g1", ScoringEvent::Ball.into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
    }

    #[tokio::test]
    async fn failed_state_merge_is_surfaced_while_play_stays_logged() {
        let store = FailingStore {
            fail_merge: true,
            ..FailingStore::default()
        };
        let inner = store.inner.clone();
        let state = app_with(Arc::new(store)).await;
        init_game(&state, "g1", None, None).await.unwrap();

        let err = apply_event(&state, "g1", ScoringEvent::Ball.into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));

        let inner: Arc<dyn DocumentStore> = Arc::new(inner);
        assert_eq!(PlayLogRepository::new(inner.clone()).list("g1").await.unwrap().len(), 1);
        let unchanged = ScoringRepository::new(inner).load("g1").await.unwrap().unwrap();
        assert_eq!(unchanged.balls, 0);
    }
}
