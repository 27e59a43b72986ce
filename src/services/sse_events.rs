//! Per-game event feed merged from the live state and play log subscriptions.

use std::sync::Arc;

use futures::{StreamExt, stream::{self, BoxStream}};
use serde::Serialize;
use tracing::warn;

use crate::{
    config::AppConfig,
    dao::{document_store::DocumentStore, play_log::PlayLogRepository, scoring::ScoringRepository},
    dto::{
        plays::PlayEventDto,
        sse::{HalfInningEvent, ServerEvent},
    },
    state::half_inning::HalfInningWatcher,
};

/// Full live state.
pub const EVENT_GAME_STATE: &str = "game_state";
/// Ordered play log.
pub const EVENT_PLAYS: &str = "plays";
/// Side retired, other team up.
pub const EVENT_HALF_INNING: &str = "half_inning";

/// Events for one game: `game_state` and `plays` on every change, plus
/// `half_inning` once per retired side. Ends when either subscription fails.
pub fn game_events(
    store: Arc<dyn DocumentStore>,
    config: &AppConfig,
    game_id: &str,
) -> BoxStream<'static, ServerEvent> {
    let defaults = config.default_game_state();
    let state_game_id = game_id.to_string();
    let mut watcher = HalfInningWatcher::new();

    let states = ScoringRepository::new(store.clone())
        .subscribe(game_id)
        .take_while(move |update| {
            if let Err(err) = update {
                warn!(game_id = %state_game_id, error = %err, "game state subscription ended");
            }
            futures::future::ready(update.is_ok())
        })
        .flat_map(move |update| {
            let current = update.ok().flatten().unwrap_or_else(|| defaults.clone());
            let mut frames = Vec::with_capacity(2);
            frames.extend(encode(EVENT_GAME_STATE, &current));
            if let Some(change) = watcher.observe(&current) {
                frames.extend(encode(EVENT_HALF_INNING, &HalfInningEvent::from(change)));
            }
            stream::iter(frames)
        });

    let plays_game_id = game_id.to_string();
    let plays = PlayLogRepository::new(store)
        .subscribe(game_id)
        .take_while(move |update| {
            if let Err(err) = update {
                warn!(game_id = %plays_game_id, error = %err, "play log subscription ended");
            }
            futures::future::ready(update.is_ok())
        })
        .filter_map(|update| {
            let frame = update.ok().and_then(|plays| {
                let plays: Vec<PlayEventDto> = plays.into_iter().map(Into::into).collect();
                encode(EVENT_PLAYS, &plays)
            });
            futures::future::ready(frame)
        });

    stream::select(states, plays).boxed()
}

fn encode<T: Serialize>(name: &str, payload: &T) -> Option<ServerEvent> {
    match ServerEvent::json(Some(name.to_string()), payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event = name, error = %err, "failed to encode SSE payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::Stream;
    use serde_json::Value;

    use super::*;
    use crate::{
        dao::document_store::memory::MemoryDocumentStore,
        services::scoring_service::{self, EventCommand},
        state::{
            AppState, SharedState,
            transitions::{ScoringEvent, StrikeKind},
        },
    };

    async fn next_named(
        events: &mut (impl Stream<Item = ServerEvent> + Unpin),
        name: &str,
    ) -> Value {
        loop {
            let event = events.next().await.unwrap();
            if event.event.as_deref() == Some(name) {
                return serde_json::from_str(&event.data).unwrap();
            }
        }
    }

    async fn app() -> (SharedState, Arc<MemoryDocumentStore>) {
        let state = AppState::new(AppConfig {
            default_home_name: "Owls".into(),
            ..AppConfig::default()
        });
        let store = Arc::new(MemoryDocumentStore::new());
        state.set_document_store(store.clone()).await;
        (state, store)
    }

    #[tokio::test]
    async fn missing_state_is_sent_as_configured_defaults() {
        let (state, store) = app().await;
        let mut events = game_events(store, state.config(), "g1");

        let first = next_named(&mut events, EVENT_GAME_STATE).await;
        assert_eq!(first["homeTeam"]["name"], "Owls");
        assert_eq!(first["inning"], 1);
        let plays = next_named(&mut events, EVENT_PLAYS).await;
        assert_eq!(plays, Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn third_out_emits_half_inning_banner() {
        let (state, store) = app().await;
        scoring_service::init_game(&state, "g1", None, Some("Hawks".into()))
            .await
            .unwrap();
        let mut events = game_events(store, state.config(), "g1");
        next_named(&mut events, EVENT_GAME_STATE).await;

        for event in [
            ScoringEvent::Out { description: None },
            ScoringEvent::Out { description: None },
            ScoringEvent::Strike(StrikeKind::Swinging),
            ScoringEvent::Strike(StrikeKind::Swinging),
        ] {
            scoring_service::apply_event(&state, "g1", event.into())
                .await
                .unwrap();
            // Consume each update so the watcher observes every intermediate state.
            next_named(&mut events, EVENT_GAME_STATE).await;
        }
        scoring_service::apply_event(
            &state,
            "g1",
            EventCommand::from(ScoringEvent::Strike(StrikeKind::Swinging)),
        )
        .await
        .unwrap();

        let change = next_named(&mut events, EVENT_HALF_INNING).await;
        assert_eq!(change["banner"], "Bottom 1st — Owls up to bat");
        assert_eq!(change["isTopInning"], false);
        assert_eq!(change["battingTeam"], "Owls");
    }
}
