/// Hosted document database abstraction and its backends.
pub mod document_store;
/// Roster and player documents.
pub mod models;
/// Logical document locations.
pub mod paths;
/// Play-by-play collection access.
pub mod play_log;
/// Lineup document access.
pub mod roster;
/// Live scoring document access.
pub mod scoring;
/// Store-agnostic error types.
pub mod storage;
