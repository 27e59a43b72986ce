use std::{env, time::Duration};

use super::error::{CouchDaoError, CouchResult};

const DEFAULT_CHANGES_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the scoring database lives and how to log into it.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server root, e.g. `http://localhost:5984`.
    pub base_url: String,
    /// Database holding every game document.
    pub database: String,
    /// Basic-auth user, paired with `password`.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// How long a `_changes` long-poll may stay open before being re-issued.
    pub changes_timeout: Duration,
}

impl CouchConfig {
    /// Anonymous access to `database` on `base_url`.
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            username: None,
            password: None,
            changes_timeout: DEFAULT_CHANGES_TIMEOUT,
        }
    }

    /// Authenticate every request with basic auth.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Read `COUCH_BASE_URL`, `COUCH_DB` and the optional `COUCH_USERNAME`,
    /// `COUCH_PASSWORD` and `COUCH_CHANGES_TIMEOUT_MS`.
    pub fn from_env() -> CouchResult<Self> {
        let mut config = Self::new(required("COUCH_BASE_URL")?, required("COUCH_DB")?);

        // Credentials only count as a pair.
        if let (Ok(username), Ok(password)) = (env::var("COUCH_USERNAME"), env::var("COUCH_PASSWORD")) {
            config = config.with_credentials(username, password);
        }

        config.changes_timeout = env::var("COUCH_CHANGES_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|millis| *millis > 0)
            .map_or(DEFAULT_CHANGES_TIMEOUT, Duration::from_millis);

        Ok(config)
    }
}

fn required(var: &'static str) -> CouchResult<String> {
    env::var(var).map_err(|_| CouchDaoError::MissingEnvVar { var })
}
