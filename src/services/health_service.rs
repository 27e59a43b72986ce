use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report health, pinging the document store and logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let Ok(store) = state.require_document_store().await else {
        warn!("storage unavailable (degraded mode)");
        return HealthResponse::degraded(false);
    };

    if let Err(err) = store.health_check().await {
        warn!(error = %err, "storage health check failed");
        return HealthResponse::degraded(true);
    }

    if state.is_degraded() {
        HealthResponse::degraded(true)
    } else {
        HealthResponse::ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::document_store::memory::MemoryDocumentStore,
        dto::health::HealthStatus, state::AppState,
    };

    #[tokio::test]
    async fn reports_degraded_until_storage_is_installed() {
        let state = AppState::new(AppConfig::default());
        let response = health_status(&state).await;
        assert_eq!(response.status, HealthStatus::Degraded);
        assert!(!response.storage);

        state
            .set_document_store(Arc::new(MemoryDocumentStore::new()))
            .await;
        assert_eq!(health_status(&state).await.status, HealthStatus::Ok);
    }
}
