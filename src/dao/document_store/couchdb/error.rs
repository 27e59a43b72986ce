//! Error types of the CouchDB document store.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Result alias for CouchDB operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures talking to CouchDB. All of them surface as
/// [`StorageError::Unavailable`] above the DAO layer.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// Required environment variable missing.
    #[error("CouchDB store needs `{var}` to be set")]
    MissingEnvVar {
        /// Variable name.
        var: &'static str,
    },
    /// HTTP client construction failed.
    #[error("could not build the CouchDB HTTP client")]
    ClientBuilder {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Database lookup failed at the transport level.
    #[error("CouchDB database `{database}` is unreachable")]
    DatabaseUnreachable {
        /// Database name.
        database: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Database did not exist and could not be created.
    #[error("could not create CouchDB database `{database}`")]
    DatabaseCreation {
        /// Database name.
        database: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Server refused the database request.
    #[error("CouchDB answered {status} for database `{database}`")]
    DatabaseRejected {
        /// Database name.
        database: String,
        /// Status returned.
        status: StatusCode,
    },
    /// Request to a document path failed in transit.
    #[error("CouchDB request for `{path}` did not complete")]
    Transport {
        /// Document path.
        path: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Status outside what the caller handles.
    #[error("CouchDB answered {status} for `{path}`")]
    UnexpectedStatus {
        /// Document path.
        path: String,
        /// Status returned.
        status: StatusCode,
    },
    /// Response body could not be parsed.
    #[error("CouchDB body for `{path}` is not valid JSON")]
    Decode {
        /// Document path.
        path: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Another writer replaced the document between our read and write.
    #[error("revision conflict on `{path}`")]
    Conflict {
        /// Document path.
        path: String,
    },
    /// Merge targets must be JSON objects.
    #[error("document `{path}` is not a JSON object")]
    NotAnObject {
        /// Document path.
        path: String,
    },
}

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
