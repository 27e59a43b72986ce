//! Process-local [`DocumentStore`] used for development and tests.

use std::sync::Arc;

use dashmap::DashMap;
use futures::{future::BoxFuture, stream::BoxStream};
use serde_json::{Map, Value};
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::dao::{
    document_store::{
        CollectionStream, DocumentStore, DocumentStream, MonotonicClock, StoredDocument,
        TIMESTAMP_FIELD, UPDATED_AT_FIELD, sort_by_timestamp,
    },
    paths::{CollectionPath, DocumentPath},
    storage::{StorageError, StorageResult},
};

const CHANGE_CAPACITY: usize = 256;

/// Process-local [`DocumentStore`]; clones share the same documents.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    inner: Arc<Inner>,
}

struct Inner {
    documents: DashMap<String, Value>,
    changes: broadcast::Sender<String>,
    clock: MonotonicClock,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    /// Empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                documents: DashMap::new(),
                changes,
                clock: MonotonicClock::default(),
            }),
        }
    }

    fn read(&self, path: &str) -> Option<Value> {
        self.inner
            .documents
            .get(path)
            .map(|entry| entry.value().clone())
    }

    fn members(&self, collection: &CollectionPath) -> Vec<StoredDocument> {
        let prefix = collection.member_prefix();
        let mut documents: Vec<StoredDocument> = self
            .inner
            .documents
            .iter()
            .filter(|entry| collection.contains(entry.key()))
            .map(|entry| StoredDocument {
                id: entry.key()[prefix.len()..].to_string(),
                data: entry.value().clone(),
            })
            .collect();
        sort_by_timestamp(&mut documents);
        documents
    }

    fn notify(&self, path: &str) {
        // No receivers is fine: nobody is watching yet.
        let _ = self.inner.changes.send(path.to_string());
    }

    /// Re-read on each change notification matching `is_relevant`. A lagged
    /// receiver re-reads too since it may have missed a relevant change.
    fn watch<T, F, R>(&self, is_relevant: F, read: R) -> BoxStream<'static, StorageResult<T>>
    where
        T: Send + 'static,
        F: Fn(&str) -> bool + Send + 'static,
        R: Fn(&MemoryDocumentStore) -> T + Send + 'static,
    {
        let store = self.clone();
        let mut changes = self.inner.changes.subscribe();
        Box::pin(async_stream::stream! {
            let initial: StorageResult<T> = Ok(read(&store));
            yield initial;
            loop {
                match changes.recv().await {
                    Ok(changed) if is_relevant(&changed) => yield Ok(read(&store)),
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "memory store subscriber lagged; re-reading");
                        yield Ok(read(&store));
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, path: DocumentPath) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.read(path.as_str())) })
    }

    fn set(&self, path: DocumentPath, data: Value) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .documents
                .insert(path.as_str().to_string(), data);
            store.notify(path.as_str());
            Ok(())
        })
    }

    fn merge(
        &self,
        path: DocumentPath,
        fields: Map<String, Value>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            {
                let mut entry = store.inner.documents.get_mut(path.as_str()).ok_or_else(|| {
                    StorageError::NotFound {
                        path: path.to_string(),
                    }
                })?;
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                if let Value::Object(document) = entry.value_mut() {
                    document.extend(fields);
                    document.insert(
                        UPDATED_AT_FIELD.to_string(),
                        Value::from(store.inner.clock.next()),
                    );
                }
            }
            store.notify(path.as_str());
            Ok(())
        })
    }

    fn subscribe(&self, path: DocumentPath) -> DocumentStream {
        let watched = path.as_str().to_string();
        self.watch(
            move |changed| changed == watched,
            move |store| store.read(path.as_str()),
        )
    }

    fn append(
        &self,
        collection: CollectionPath,
        data: Value,
    ) -> BoxFuture<'static, StorageResult<StoredDocument>> {
        let store = self.clone();
        Box::pin(async move {
            let timestamp = store.inner.clock.next();
            let mut document = match data {
                Value::Object(map) => map,
                other => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), other);
                    map
                }
            };
            document.insert(TIMESTAMP_FIELD.to_string(), Value::from(timestamp));

            let id = Uuid::new_v4().simple().to_string();
            let path = collection.document(&id);
            let data = Value::Object(document);
            store
                .inner
                .documents
                .insert(path.as_str().to_string(), data.clone());
            store.notify(path.as_str());
            Ok(StoredDocument { id, data })
        })
    }

    fn list(
        &self,
        collection: CollectionPath,
    ) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.members(&collection)) })
    }

    fn latest(
        &self,
        collection: CollectionPath,
    ) -> BoxFuture<'static, StorageResult<Option<StoredDocument>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.members(&collection).pop()) })
    }

    fn subscribe_collection(&self, collection: CollectionPath) -> CollectionStream {
        let watched = collection.clone();
        self.watch(
            move |changed| watched.contains(changed),
            move |store| store.members(&collection),
        )
    }

    fn delete(&self, path: DocumentPath) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if store.inner.documents.remove(path.as_str()).is_some() {
                store.notify(path.as_str());
            }
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
