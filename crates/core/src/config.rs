use crate::fusion::{FusionConfig, DEFAULT_HISTORY_CAPACITY};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use url::Url;

pub const DEFAULT_WINDOW_MS: u64 = 5_000;
pub const MAX_HISTORY_CAPACITY: usize = 10_000;
pub const ENV_WINDOW_MS: &str = "NEUROBRIDGE_WINDOW_MS";
pub const ENV_HISTORY_CAPACITY: &str = "NEUROBRIDGE_HISTORY_CAPACITY";
pub const ENV_SESSION_ID: &str = "NEUROBRIDGE_SESSION_ID";
pub const ENV_SUMMARY_URL: &str = "NEUROBRIDGE_SUMMARY_URL";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptySessionId);
        }
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FusionWindow {
    pub window_ms: u64,
}

impl FusionWindow {
    pub fn new(window_ms: u64) -> Result<Self, ConfigError> {
        if window_ms == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        Ok(Self { window_ms })
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

impl Default for FusionWindow {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryCapacity(usize);

impl HistoryCapacity {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if capacity > MAX_HISTORY_CAPACITY {
            return Err(ConfigError::CapacityTooLarge {
                capacity,
                max: MAX_HISTORY_CAPACITY,
            });
        }
        Ok(Self(capacity))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for HistoryCapacity {
    fn default() -> Self {
        Self(DEFAULT_HISTORY_CAPACITY)
    }
}

/// Base URL of the relay's REST API. Always stored with a trailing slash so
/// relative paths resolve underneath it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryEndpoint(Url);

impl SummaryEndpoint {
    pub fn new(raw: &str) -> Result<Self, ConfigError> {
        let mut url =
            Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEndpoint(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint(format!(
                "unsupported scheme {:?}",
                url.scheme()
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self(url))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn summary_url(&self) -> Result<Url, ConfigError> {
        self.0
            .join("emotion-summary")
            .map_err(|e| ConfigError::InvalidEndpoint(e.to_string()))
    }

    pub fn dashboard_url(&self, session_id: &SessionId) -> Result<Url, ConfigError> {
        let mut url = self.0.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigError::InvalidEndpoint("endpoint cannot be a base".to_owned()))?
            .pop_if_empty()
            .push("dashboard")
            .push(session_id.as_str());
        Ok(url)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub session_id: SessionId,
    pub window: FusionWindow,
    pub history_capacity: HistoryCapacity,
    pub summary_endpoint: Option<SummaryEndpoint>,
}

impl AppConfig {
    pub fn fusion(&self) -> FusionConfig {
        FusionConfig {
            window: self.window.duration(),
            history_capacity: self.history_capacity.get(),
            ..FusionConfig::default()
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("session id must not be empty")]
    EmptySessionId,
    #[error("fusion window must be > 0 ms")]
    ZeroWindow,
    #[error("history capacity must be > 0")]
    ZeroCapacity,
    #[error("history capacity {capacity} exceeds the maximum of {max}")]
    CapacityTooLarge { capacity: usize, max: usize },
    #[error("invalid summary endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidNumber { key: String, value: String },
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_optional_string(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Option<String> {
    cli_value.or_else(|| env.var(env_key))
}

pub fn resolve_u64(
    cli_value: Option<u64>,
    env_key: &str,
    env: &impl Env,
    default: u64,
) -> Result<u64, ConfigError> {
    if let Some(v) = cli_value {
        return Ok(v);
    }
    match env.var(env_key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            key: env_key.to_owned(),
            value: raw,
        }),
        None => Ok(default),
    }
}

pub fn resolve_endpoint(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<SummaryEndpoint>, ConfigError> {
    resolve_optional_string(cli_value, env_key, env)
        .map(|raw| SummaryEndpoint::new(&raw))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_takes_precedence_over_env() {
        let env = MapEnv::default().with_var(ENV_WINDOW_MS, "2000");
        assert_eq!(resolve_u64(Some(750), ENV_WINDOW_MS, &env, DEFAULT_WINDOW_MS), Ok(750));
    }

    #[test]
    fn env_used_when_cli_missing() {
        let env = MapEnv::default().with_var(ENV_WINDOW_MS, " 2000 ");
        assert_eq!(resolve_u64(None, ENV_WINDOW_MS, &env, DEFAULT_WINDOW_MS), Ok(2000));
    }

    #[test]
    fn default_used_when_both_missing() {
        let env = MapEnv::default();
        assert_eq!(resolve_u64(None, ENV_WINDOW_MS, &env, DEFAULT_WINDOW_MS), Ok(DEFAULT_WINDOW_MS));
    }

    #[test]
    fn garbage_env_number_is_rejected() {
        let env = MapEnv::default().with_var(ENV_HISTORY_CAPACITY, "lots");
        let err = resolve_u64(None, ENV_HISTORY_CAPACITY, &env, 100).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn validated_newtypes() {
        assert_eq!(FusionWindow::new(0), Err(ConfigError::ZeroWindow));
        assert_eq!(FusionWindow::new(1500).unwrap().duration(), Duration::from_millis(1500));
        assert_eq!(HistoryCapacity::new(0), Err(ConfigError::ZeroCapacity));
        assert_eq!(HistoryCapacity::new(MAX_HISTORY_CAPACITY).map(|c| c.get()), Ok(MAX_HISTORY_CAPACITY));
        assert_eq!(
            HistoryCapacity::new(usize::MAX / 2),
            Err(ConfigError::CapacityTooLarge {
                capacity: usize::MAX / 2,
                max: MAX_HISTORY_CAPACITY,
            })
        );
        assert_eq!(SessionId::new("  "), Err(ConfigError::EmptySessionId));
        assert_eq!(FusionWindow::default().window_ms, DEFAULT_WINDOW_MS);
    }

    #[test]
    fn session_id_rejects_empty_on_deserialize() {
        assert!(serde_json::from_str::<SessionId>(r#""""#).is_err());
        let id: SessionId = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(id.as_str(), "abc");
    }

    #[test]
    fn endpoint_urls() {
        let endpoint = SummaryEndpoint::new("https://relay.example.com/api").unwrap();
        assert_eq!(
            endpoint.summary_url().unwrap().as_str(),
            "https://relay.example.com/api/emotion-summary"
        );
        let id = SessionId::new("a b/c").unwrap();
        assert_eq!(
            endpoint.dashboard_url(&id).unwrap().as_str(),
            "https://relay.example.com/api/dashboard/a%20b%2Fc"
        );
    }

    #[test]
    fn endpoint_rejects_other_schemes() {
        assert!(SummaryEndpoint::new("ftp://relay.example.com").is_err());
        assert!(SummaryEndpoint::new("not a url").is_err());
        let env = MapEnv::default().with_var(ENV_SUMMARY_URL, "http://localhost:3001/");
        let endpoint = resolve_endpoint(None, ENV_SUMMARY_URL, &env).unwrap().unwrap();
        assert_eq!(endpoint.as_url().as_str(), "http://localhost:3001/");
    }

    #[test]
    fn app_config_builds_fusion_config() {
        let cfg = AppConfig {
            session_id: SessionId::new("s").unwrap(),
            window: FusionWindow::new(2500).unwrap(),
            history_capacity: HistoryCapacity::new(10).unwrap(),
            summary_endpoint: None,
        };
        let fusion = cfg.fusion();
        assert_eq!(fusion.window, Duration::from_millis(2500));
        assert_eq!(fusion.history_capacity, 10);
        assert_eq!(fusion.change_threshold, 0.7);
    }
}
