use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt, stream::BoxStream};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use crate::{
    dto::sse::{Handshake, ServerEvent},
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

const EVENT_HANDSHAKE: &str = "handshake";

/// Open the live feed of one game.
pub async fn subscribe_game(
    state: &SharedState,
    game_id: &str,
) -> Result<BoxStream<'static, ServerEvent>, ServiceError> {
    let store = state.require_document_store().await?;
    let handshake = ServerEvent::json(
        Some(EVENT_HANDSHAKE.to_string()),
        &Handshake {
            game_id: game_id.to_string(),
            degraded: state.is_degraded(),
        },
    )
    .map_err(|err| ServiceError::CorruptData(err.to_string()))?;

    let events = sse_events::game_events(store, state.config(), game_id);
    Ok(futures::stream::once(async move { handshake })
        .chain(events)
        .boxed())
}

/// Forward `events` into an SSE response until the client disconnects or the
/// feed ends.
pub fn to_sse_stream<S>(
    events: S,
    capacity: usize,
    game_id: String,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: Stream<Item = ServerEvent> + Send + 'static,
{
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(capacity.max(1));

    // forwarder task: reads from the game feed and pushes into mpsc
    tokio::spawn(async move {
        let mut events = Box::pin(events);
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                next = events.next() => {
                    let Some(payload) = next else { break };
                    let mut event = Event::default().data(payload.data);
                    if let Some(name) = payload.event {
                        event = event.event(name);
                    }

                    if tx.send(Ok(event)).await.is_err() {
                        break;
                    }
                }
            }
        }

        info!(game_id = %game_id, "game SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::document_store::memory::MemoryDocumentStore,
        services::sse_events::EVENT_GAME_STATE,
        state::AppState,
    };

    #[tokio::test]
    async fn feed_starts_with_handshake() {
        let state = AppState::new(AppConfig::default());
        state
            .set_document_store(Arc::new(MemoryDocumentStore::new()))
            .await;

        let mut events = subscribe_game(&state, "g1").await.unwrap();
        let handshake = events.next().await.unwrap();
        assert_eq!(handshake.event.as_deref(), Some(EVENT_HANDSHAKE));
        assert!(handshake.data.contains("\"gameId\":\"g1\""));

        let mut names = Vec::new();
        for _ in 0..2 {
            names.push(events.next().await.unwrap().event.unwrap());
        }
        assert!(names.iter().any(|name| name == EVENT_GAME_STATE));
    }

    #[tokio::test]
    async fn feed_requires_storage() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            subscribe_game(&state, "g1").await.map(|_| ()),
            Err(ServiceError::Degraded)
        ));
    }
}
