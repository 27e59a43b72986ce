use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::dao::{
    document_store::{
        CollectionStream, DocumentStore, DocumentStream, MonotonicClock, StoredDocument,
        TIMESTAMP_FIELD, UPDATED_AT_FIELD, sort_by_timestamp,
    },
    paths::{CollectionPath, DocumentPath},
    storage::{StorageError, StorageResult},
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, ChangesResponse, DatabaseInfo, END_SUFFIX, RevisionOnly, encode_doc_id,
        into_body, seq_param, with_revision,
    },
};

const ALL_DOCS: &str = "_all_docs";
const CHANGES: &str = "_changes";

/// [`DocumentStore`] backed by a CouchDB database over HTTP.
#[derive(Clone)]
pub struct CouchDocumentStore {
    client: Client,
    base_url: Arc<str>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
    changes_timeout: Duration,
    clock: Arc<MonotonicClock>,
}

impl CouchDocumentStore {
    /// Establish a connection to CouchDB and ensure the database exists.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Arc::<str>::from(config.base_url.trim_end_matches('/'));
        let database = Arc::<str>::from(config.database);
        let auth = config
            .username
            .zip(config.password)
            .map(|(u, p)| (Arc::<str>::from(u), Arc::<str>::from(p)));

        let store = Self {
            client,
            base_url,
            database,
            auth,
            changes_timeout: config.changes_timeout,
            clock: Arc::new(MonotonicClock::default()),
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.database_url(), path);
        self.authorized(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseUnreachable {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .authorized(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::DatabaseCreation {
                        database: database.clone(),
                        source,
                    })?;
                // 412 means another instance created it first.
                if create.status().is_success() || create.status() == StatusCode::PRECONDITION_FAILED
                {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseRejected {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseRejected {
                database,
                status: other,
            }),
        }
    }

    async fn fetch<T>(&self, path: &str, query: &[(&str, String)]) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, path)
            .query(query)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: path.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::Decode {
                        path: path.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::UnexpectedStatus {
                path: path.to_string(),
                status: other,
            }),
        }
    }

    async fn get_document(&self, doc_path: &str) -> CouchResult<Option<Value>> {
        self.fetch(&encode_doc_id(doc_path), &[]).await
    }

    async fn put_document<T>(&self, doc_path: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, &encode_doc_id(doc_path))
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                path: doc_path.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(CouchDaoError::Conflict {
                path: doc_path.to_string(),
            }),
            other => Err(CouchDaoError::UnexpectedStatus {
                path: doc_path.to_string(),
                status: other,
            }),
        }
    }

    async fn current_revision(&self, doc_path: &str) -> CouchResult<Option<String>> {
        let revision: Option<RevisionOnly> = self.fetch(&encode_doc_id(doc_path), &[]).await?;
        Ok(revision.map(|revision| revision.rev))
    }

    async fn replace(&self, path: &DocumentPath, data: Value) -> CouchResult<()> {
        let Value::Object(body) = data else {
            return Err(CouchDaoError::NotAnObject {
                path: path.to_string(),
            });
        };
        let rev = self.current_revision(path.as_str()).await?;
        self.put_document(path.as_str(), &with_revision(body, rev))
            .await
    }

    async fn merge_fields(
        &self,
        path: &DocumentPath,
        fields: Map<String, Value>,
    ) -> StorageResult<()> {
        let existing = self
            .get_document(path.as_str())
            .await?
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            })?;
        let (rev, body) = into_body(existing);
        let mut body = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        body.extend(fields);
        body.insert(
            UPDATED_AT_FIELD.to_string(),
            Value::from(self.clock.next()),
        );
        self.put_document(path.as_str(), &with_revision(body, rev))
            .await
            .map_err(Into::into)
    }

    async fn list_members(
        &self,
        collection: &CollectionPath,
        latest_only: bool,
    ) -> CouchResult<Vec<StoredDocument>> {
        let prefix = collection.member_prefix();
        let (start, end) = (
            format!("\"{}\"", prefix),
            format!("\"{}{}\"", prefix, END_SUFFIX),
        );
        let mut query = vec![("include_docs", "true".to_string())];
        if latest_only {
            query.extend([
                ("descending", "true".to_string()),
                ("limit", "1".to_string()),
                ("startkey", end),
                ("endkey", start),
            ]);
        } else {
            query.extend([("startkey", start), ("endkey", end)]);
        }

        let payload: AllDocsResponse = self
            .fetch(ALL_DOCS, &query)
            .await?
            .ok_or_else(|| CouchDaoError::UnexpectedStatus {
                path: ALL_DOCS.to_string(),
                status: StatusCode::NOT_FOUND,
            })?;

        let mut documents: Vec<StoredDocument> = payload
            .rows
            .into_iter()
            .filter(|row| collection.contains(&row.id))
            .filter_map(|row| {
                let (_, data) = into_body(row.doc?);
                Some(StoredDocument {
                    id: row.id[prefix.len()..].to_string(),
                    data,
                })
            })
            .collect();
        sort_by_timestamp(&mut documents);
        Ok(documents)
    }

    async fn update_seq(&self) -> CouchResult<Value> {
        let database = self.database.to_string();
        let response = self
            .authorized(self.client.get(self.database_url()))
            .send()
            .await
            .map_err(|source| CouchDaoError::DatabaseUnreachable {
                database: database.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::DatabaseRejected {
                database,
                status: response.status(),
            });
        }

        let info = response
            .json::<DatabaseInfo>()
            .await
            .map_err(|source| CouchDaoError::Decode {
                path: database,
                source,
            })?;
        Ok(info.update_seq)
    }

    /// Block until something changes after `since` or the long-poll times out.
    async fn poll_changes(&self, since: &Value) -> CouchResult<ChangesResponse> {
        let query = [
            ("feed", "longpoll".to_string()),
            ("since", seq_param(since)),
            ("timeout", self.changes_timeout.as_millis().to_string()),
        ];
        self.fetch(CHANGES, &query)
            .await?
            .ok_or_else(|| CouchDaoError::UnexpectedStatus {
                path: CHANGES.to_string(),
                status: StatusCode::NOT_FOUND,
            })
    }
}

impl DocumentStore for CouchDocumentStore {
    fn get(&self, path: DocumentPath) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store.get_document(path.as_str()).await?;
            Ok(document.map(|document| into_body(document).1))
        })
    }

    fn set(&self, path: DocumentPath, data: Value) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.replace(&path, data).await.map_err(Into::into) })
    }

    fn merge(
        &self,
        path: DocumentPath,
        fields: Map<String, Value>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.merge_fields(&path, fields).await })
    }

    fn subscribe(&self, path: DocumentPath) -> DocumentStream {
        let store = self.clone();
        Box::pin(async_stream::stream! {
            let mut since = match store.update_seq().await {
                Ok(seq) => seq,
                Err(err) => {
                    yield Err::<Option<Value>, StorageError>(err.into());
                    return;
                }
            };
            yield store.get(path.clone()).await;

            loop {
                let changes = match store.poll_changes(&since).await {
                    Ok(changes) => changes,
                    Err(err) => {
                        yield Err(err.into());
                        return;
                    }
                };
                since = changes.last_seq;
                if changes.results.iter().any(|row| row.id == path.as_str()) {
                    yield store.get(path.clone()).await;
                }
            }
        })
    }

    fn append(
        &self,
        collection: CollectionPath,
        data: Value,
    ) -> BoxFuture<'static, StorageResult<StoredDocument>> {
        let store = self.clone();
        Box::pin(async move {
            let timestamp = store.clock.next();
            let mut body = match data {
                Value::Object(map) => map,
                other => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), other);
                    map
                }
            };
            body.insert(TIMESTAMP_FIELD.to_string(), Value::from(timestamp));

            // Zero-padded so `_all_docs` key order matches timestamp order.
            let id = format!("{timestamp:020}-{}", Uuid::new_v4().simple());
            let path = collection.document(&id);
            store
                .put_document(path.as_str(), &Value::Object(body.clone()))
                .await?;
            Ok(StoredDocument {
                id,
                data: Value::Object(body),
            })
        })
    }

    fn list(
        &self,
        collection: CollectionPath,
    ) -> BoxFuture<'static, StorageResult<Vec<StoredDocument>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_members(&collection, false)
                .await
                .map_err(Into::into)
        })
    }

    fn latest(
        &self,
        collection: CollectionPath,
    ) -> BoxFuture<'static, StorageResult<Option<StoredDocument>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut members = store.list_members(&collection, true).await?;
            Ok(members.pop())
        })
    }

    fn subscribe_collection(&self, collection: CollectionPath) -> CollectionStream {
        let store = self.clone();
        Box::pin(async_stream::stream! {
            let mut since = match store.update_seq().await {
                Ok(seq) => seq,
                Err(err) => {
                    yield Err::<Vec<StoredDocument>, StorageError>(err.into());
                    return;
                }
            };
            yield store.list(collection.clone()).await;

            loop {
                let changes = match store.poll_changes(&since).await {
                    Ok(changes) => changes,
                    Err(err) => {
                        yield Err(err.into());
                        return;
                    }
                };
                since = changes.last_seq;
                if changes.results.iter().any(|row| collection.contains(&row.id)) {
                    yield store.list(collection.clone()).await;
                }
            }
        })
    }

    fn delete(&self, path: DocumentPath) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let Some(rev) = store.current_revision(path.as_str()).await? else {
                return Ok(());
            };
            let doc_id = encode_doc_id(path.as_str());
            let response = store
                .request(Method::DELETE, &doc_id)
                .query(&[("rev", rev)])
                .send()
                .await
                .map_err(|source| CouchDaoError::Transport {
                    path: path.to_string(),
                    source,
                })?;

            match response.status() {
                status if status.is_success() => Ok(()),
                StatusCode::NOT_FOUND => Ok(()),
                other => Err(CouchDaoError::UnexpectedStatus {
                    path: path.to_string(),
                    status: other,
                }
                .into()),
            }
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.database_url();
            let response = store
                .authorized(store.client.get(&url))
                .send()
                .await
                .map_err(|source| CouchDaoError::Transport {
                    path: url.clone(),
                    source,
                })?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(CouchDaoError::UnexpectedStatus {
                    path: url,
                    status: response.status(),
                }
                .into())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
