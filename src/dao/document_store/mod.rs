/// CouchDB backend.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-process backend used by tests and `STORE_BACKEND=memory`.
pub mod memory;

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use futures::{future::BoxFuture, stream::BoxStream};
use serde_json::{Map, Value};

use crate::dao::{
    paths::{CollectionPath, DocumentPath},
    storage::StorageResult,
};

/// Field stamped by the store on every merge into a document.
pub const UPDATED_AT_FIELD: &str = "updatedAt";
/// Field stamped by the store on every document appended to a collection.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// A collection member together with its store-generated identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Identifier of the member inside its collection.
    pub id: String,
    /// Stored body, including the stamped timestamp.
    pub data: Value,
}

impl StoredDocument {
    /// Server-assigned ordering key, `0` when missing.
    pub fn timestamp(&self) -> u64 {
        self.data
            .get(TIMESTAMP_FIELD)
            .and_then(Value::as_u64)
            .unwrap_or_default()
    }
}

/// Live view of one document: the current value first, then every change.
/// `None` means the document does not exist (yet, or anymore).
pub type DocumentStream = BoxStream<'static, StorageResult<Option<Value>>>;

/// Live view of a collection ordered by ascending timestamp.
pub type CollectionStream = BoxStream<'static, StorageResult<Vec<StoredDocument>>>;

/// Abstraction over the hosted document database holding scoring data.
///
/// Writes are last-writer-wins; no operation takes a lock or a transaction.
pub trait DocumentStore: Send + Sync {
    /// Read a document, `None` when it does not exist.
    fn get(&self, path: DocumentPath) -> BoxFuture<'static, StorageResult<Option<Value>>>;

    /// Create or fully replace a document.
    fn set(&self, path: DocumentPath, data: Value) -> BoxFuture<'static, StorageResult<()>>;

    /// Shallow-merge `fields` into an existing document and stamp [`UPDATED_AT_FIELD`].
    /// Fails with `NotFound` when the document does not exist.
    fn merge(
        &self,
        path: DocumentPath,
        fields: Map<String, Value>,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Subscribe to a document.
    fn subscribe(&self, path: DocumentPath) -> DocumentStream;

    /// Append a document with a generated id, stamping [`TIMESTAMP_FIELD`].
    fn append(
        &self,
        collection: CollectionPath,
        data: Value,
    ) -> BoxFuture<'static, StorageResult<StoredDocument>>;

    /// All members of a collection, oldest first.
    fn list(&self, collection: CollectionPath)
    -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>>;

    /// The member with the greatest timestamp.
    fn latest(
        &self,
        collection: CollectionPath,
    ) -> BoxFuture<'static, StorageResult<Option<StoredDocument>>>;

    /// Subscribe to a collection.
    fn subscribe_collection(&self, collection: CollectionPath) -> CollectionStream;

    /// Delete a document. Deleting a missing document is not an error.
    fn delete(&self, path: DocumentPath) -> BoxFuture<'static, StorageResult<()>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Source of strictly increasing microsecond timestamps.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: AtomicU64,
}

impl MonotonicClock {
    /// Wall-clock microseconds, bumped past the previous value when the clock
    /// stalls or steps backwards.
    pub fn next(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_micros() as u64)
            .unwrap_or_default();
        let mut previous = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(previous + 1);
            match self.last.compare_exchange_weak(
                previous,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => previous = actual,
            }
        }
    }
}

/// Sort collection members oldest first, ties broken by id.
pub(crate) fn sort_by_timestamp(documents: &mut [StoredDocument]) {
    documents.sort_by(|a, b| {
        a.timestamp()
            .cmp(&b.timestamp())
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn clock_never_repeats() {
        let clock = MonotonicClock::default();
        let mut previous = 0;
        for _ in 0..1_000 {
            let next = clock.next();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn sorts_by_timestamp_then_id() {
        let mut docs = vec![
            StoredDocument {
                id: "b".into(),
                data: json!({ "timestamp": 2 }),
            },
            StoredDocument {
                id: "c".into(),
                data: json!({ "timestamp": 1 }),
            },
            StoredDocument {
                id: "a".into(),
                data: json!({ "timestamp": 2 }),
            },
        ];
        sort_by_timestamp(&mut docs);
        let ids: Vec<_> = docs.iter().map(|doc| doc.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }
}
