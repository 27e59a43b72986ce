/// Manual scorer corrections.
pub mod adjustments;
/// Live game document.
pub mod game;
/// Half-inning change detection.
pub mod half_inning;
/// Runs per half-inning from the play log.
pub mod linescore;
/// Partial updates of the live document.
pub mod patch;
/// Play log entries.
pub mod play;
/// Scoring rules.
pub mod transitions;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::document_store::DocumentStore, error::ServiceError};

/// Handle passed to every handler and service.
pub type SharedState = Arc<AppState>;

/// Central application state: the storage handle, configuration and degraded flag.
pub struct AppState {
    document_store: RwLock<Option<Arc<dyn DocumentStore>>>,
    config: AppConfig,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            document_store: RwLock::new(None),
            config,
            degraded: degraded_tx,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current document store, if one is installed.
    pub async fn document_store(&self) -> Option<Arc<dyn DocumentStore>> {
        let guard = self.document_store.read().await;
        guard.as_ref().cloned()
    }

    /// Like [`AppState::document_store`] but failing with [`ServiceError::Degraded`].
    pub async fn require_document_store(&self) -> Result<Arc<dyn DocumentStore>, ServiceError> {
        self.document_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a document store implementation and leave degraded mode.
    pub async fn set_document_store(&self, store: Arc<dyn DocumentStore>) {
        {
            let mut guard = self.document_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current document store and enter degraded mode.
    pub async fn clear_document_store(&self) {
        {
            let mut guard = self.document_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub(crate) fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::document_store::memory::MemoryDocumentStore;

    #[tokio::test]
    async fn degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded());
        assert!(matches!(
            state.require_document_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .set_document_store(Arc::new(MemoryDocumentStore::new()))
            .await;
        assert!(!state.is_degraded());
        assert!(state.require_document_store().await.is_ok());

        state.clear_document_store().await;
        assert!(state.is_degraded());
    }
}
