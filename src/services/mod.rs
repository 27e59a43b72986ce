/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Undo and read-side queries over the play log.
pub mod play_log_service;
/// Scoring workflow driving the transition engine against storage.
pub mod scoring_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming to clients.
pub mod sse_service;
/// Background supervision of the document store connection.
pub mod storage_supervisor;
