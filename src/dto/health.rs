use serde::Serialize;
use utoipa::ToSchema;

/// Overall service status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Storage connected and reachable.
    Ok,
    /// Running without a usable document store.
    Degraded,
}

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status.
    pub status: HealthStatus,
    /// Whether a document store is currently installed.
    pub storage: bool,
}

impl HealthResponse {
    /// Healthy response.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
            storage: true,
        }
    }

    /// Degraded response; `storage` tells whether a store is installed.
    pub fn degraded(storage: bool) -> Self {
        Self {
            status: HealthStatus::Degraded,
            storage,
        }
    }
}
