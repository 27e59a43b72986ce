use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{document_store::DocumentStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Doubling backoff capped at [`MAX_DELAY`].
struct Backoff(Duration);

impl Backoff {
    fn new() -> Self {
        Self(INITIAL_DELAY)
    }

    async fn wait(&mut self) {
        sleep(self.0).await;
        self.0 = (self.0 * 2).min(MAX_DELAY);
    }
}

/// Keep a document store installed in `state`, connecting with `connect` and
/// flipping degraded mode while the backend is unreachable. Never returns.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn DocumentStore>, StorageError>> + Send,
{
    let mut backoff = Backoff::new();

    loop {
        let store = match connect().await {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                backoff.wait().await;
                continue;
            }
        };

        state.set_document_store(store.clone()).await;
        info!("storage connection established; leaving degraded mode");
        backoff = Backoff::new();

        watch_health(&state, store.as_ref()).await;

        warn!("exhausted storage reconnect attempts; dropping the store");
        state.clear_document_store().await;
        backoff.wait().await;
    }
}

/// Poll the store until it stays unreachable through every reconnect attempt.
async fn watch_health(state: &SharedState, store: &dyn DocumentStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                if !reconnect(state, store).await {
                    return;
                }
                state.update_degraded(false);
            }
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

async fn reconnect(state: &SharedState, store: &dyn DocumentStore) -> bool {
    let mut backoff = Backoff::new();
    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(attempt, error = %err, "storage reconnect failed; entering degraded mode");
                    state.update_degraded(true);
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                backoff.wait().await;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::{
        config::AppConfig, dao::document_store::memory::MemoryDocumentStore, state::AppState,
    };

    #[tokio::test]
    async fn installs_store_once_connected() {
        let state = AppState::new(AppConfig::default());
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let supervisor = tokio::spawn(run(state.clone(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
                Ok(store)
            }
        }));

        for _ in 0..100 {
            if !state.is_degraded() {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        supervisor.abort();

        assert!(!state.is_degraded());
        assert!(state.document_store().await.is_some());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
