//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::game::{DEFAULT_AWAY_NAME, DEFAULT_HOME_NAME, GameState};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LIVE_SCORER_CONFIG_PATH";
const DEFAULT_SSE_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Home team name used when a game is initialized without one.
    pub default_home_name: String,
    /// Away team name used when a game is initialized without one.
    pub default_away_name: String,
    /// Buffered frames per SSE connection before the forwarder waits.
    pub sse_capacity: usize,
    /// Shared secret required on mutating scoring routes, open when unset.
    pub scorer_token: Option<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        scorer_token = app_config.scorer_token.is_some(),
                        "loaded application config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent keys keep their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Fresh game state carrying the configured team names.
    pub fn default_game_state(&self) -> GameState {
        GameState::with_team_names(&self.default_home_name, &self.default_away_name)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_home_name: DEFAULT_HOME_NAME.to_string(),
            default_away_name: DEFAULT_AWAY_NAME.to_string(),
            sse_capacity: DEFAULT_SSE_CAPACITY,
            scorer_token: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    default_home_name: Option<String>,
    default_away_name: Option<String>,
    sse_capacity: Option<usize>,
    scorer_token: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            default_home_name: value
                .default_home_name
                .unwrap_or(defaults.default_home_name),
            default_away_name: value
                .default_away_name
                .unwrap_or(defaults.default_away_name),
            sse_capacity: value
                .sse_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(defaults.sse_capacity),
            scorer_token: value.scorer_token.filter(|token| !token.is_empty()),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "default_home_name": "Owls" }"#).unwrap();
        assert_eq!(config.default_home_name, "Owls");
        assert_eq!(config.default_away_name, DEFAULT_AWAY_NAME);
        assert_eq!(config.sse_capacity, DEFAULT_SSE_CAPACITY);
        assert_eq!(config.scorer_token, None);
    }

    #[test]
    fn empty_token_and_zero_capacity_are_ignored() {
        let config =
            AppConfig::from_json(r#"{ "scorer_token": "", "sse_capacity": 0 }"#).unwrap();
        assert_eq!(config.scorer_token, None);
        assert_eq!(config.sse_capacity, DEFAULT_SSE_CAPACITY);
    }

    #[test]
    fn default_game_state_uses_configured_names() {
        let config = AppConfig::from_json(
            r#"{ "default_home_name": "Owls", "default_away_name": "Hawks", "scorer_token": "s3cret" }"#,
        )
        .unwrap();
        let state = config.default_game_state();
        assert_eq!(state.home_team.name, "Owls");
        assert_eq!(state.away_team.name, "Hawks");
        assert_eq!(config.scorer_token.as_deref(), Some("s3cret"));
    }
}
