//! Library crate for live-scorer-back, exposing modules for binaries and integration tests.

/// Runtime configuration.
pub mod config;
/// Document store access.
pub mod dao;
/// HTTP and SSE payloads.
pub mod dto;
/// Service and HTTP errors.
pub mod error;
/// axum routers.
pub mod routes;
/// Application services.
pub mod services;
/// Game model, scoring rules and shared state.
pub mod state;
