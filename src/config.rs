use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Wardwatch";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Cap on a single remote summary call.
pub const DEFAULT_PER_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(8);
/// Wall-clock budget for a whole summary request, races and retry included.
pub const DEFAULT_OVERALL_DEADLINE: Duration = Duration::from_secs(15);
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 600;
/// Largest accepted per-attempt timeout or overall deadline.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

const ENV_PER_ATTEMPT: &str = "WARDWATCH_PER_ATTEMPT_TIMEOUT_SECS";
const ENV_OVERALL: &str = "WARDWATCH_OVERALL_DEADLINE_SECS";
const ENV_TEMPERATURE: &str = "WARDWATCH_TEMPERATURE";
const ENV_MAX_TOKENS: &str = "WARDWATCH_MAX_TOKENS";
const ENV_BACKENDS: &str = "WARDWATCH_BACKENDS";
const ENV_API_KEY: &str = "WARDWATCH_API_KEY";
const ENV_BIND: &str = "WARDWATCH_BIND";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,wardwatch_lib=debug"
    } else {
        "warn,wardwatch_lib=info"
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{var}: expected {expected}, got {value:?}")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("Unknown backend kind: {0}")]
    UnknownBackendKind(String),

    #[error("Malformed backend entry {0:?} (expected kind=name@base_url#model)")]
    MalformedBackend(String),

    #[error("Per-attempt timeout and overall deadline must be non-zero")]
    ZeroTimeout,

    #[error("Per-attempt timeout and overall deadline must not exceed {0:?}")]
    TimeoutTooLarge(Duration),
}

// ═══════════════════════════════════════════════════════════
// Backends
// ═══════════════════════════════════════════════════════════

/// Wire protocol spoken by a summary backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Ollama `/api/chat`.
    Ollama,
    /// Any `/v1/chat/completions` endpoint.
    OpenAiCompatible,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::OpenAiCompatible => "openai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ollama" => Some(BackendKind::Ollama),
            "openai" | "openai_compatible" => Some(BackendKind::OpenAiCompatible),
            _ => None,
        }
    }
}

/// One candidate backend in the summary race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub name: String,
    pub base_url: String,
    pub model: String,
    /// Bearer token, sent only by OpenAI-compatible backends.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl BackendConfig {
    /// Parse `kind=name@base_url#model`.
    pub fn parse(entry: &str) -> Result<Self, ConfigError> {
        let malformed = || ConfigError::MalformedBackend(entry.to_string());

        let (kind, rest) = entry.trim().split_once('=').ok_or_else(malformed)?;
        let (name, rest) = rest.split_once('@').ok_or_else(malformed)?;
        let (base_url, model) = rest.rsplit_once('#').ok_or_else(malformed)?;

        let kind = BackendKind::from_str(kind.trim())
            .ok_or_else(|| ConfigError::UnknownBackendKind(kind.trim().to_string()))?;

        if name.trim().is_empty() || base_url.trim().is_empty() || model.trim().is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            kind,
            name: name.trim().to_string(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            model: model.trim().to_string(),
            api_key: None,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Summary orchestration
// ═══════════════════════════════════════════════════════════

/// Everything the summary orchestrator needs, passed in at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub per_attempt_timeout: Duration,
    pub overall_deadline: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    pub backends: Vec<BackendConfig>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            per_attempt_timeout: DEFAULT_PER_ATTEMPT_TIMEOUT,
            overall_deadline: DEFAULT_OVERALL_DEADLINE,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            backends: Vec::new(),
        }
    }
}

impl SummaryConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset variables keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup(ENV_PER_ATTEMPT) {
            config.per_attempt_timeout = parse_secs(ENV_PER_ATTEMPT, &v)?;
        }
        if let Some(v) = lookup(ENV_OVERALL) {
            config.overall_deadline = parse_secs(ENV_OVERALL, &v)?;
        }
        if let Some(v) = lookup(ENV_TEMPERATURE) {
            config.temperature = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: ENV_TEMPERATURE,
                expected: "a number",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup(ENV_MAX_TOKENS) {
            config.max_tokens = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: ENV_MAX_TOKENS,
                expected: "a positive integer",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup(ENV_BACKENDS) {
            let api_key = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty());
            config.backends = v
                .split(',')
                .filter(|e| !e.trim().is_empty())
                .map(|e| {
                    BackendConfig::parse(e).map(|mut b| {
                        if b.kind == BackendKind::OpenAiCompatible {
                            b.api_key = api_key.clone();
                        }
                        b
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_attempt_timeout.is_zero() || self.overall_deadline.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.per_attempt_timeout > MAX_TIMEOUT || self.overall_deadline > MAX_TIMEOUT {
            return Err(ConfigError::TimeoutTooLarge(MAX_TIMEOUT));
        }
        Ok(())
    }

    /// Bound on the initial race: the lesser of the two caps.
    pub fn race_window(&self) -> Duration {
        self.per_attempt_timeout.min(self.overall_deadline)
    }
}

fn parse_secs(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|s| Duration::try_from_secs_f64(s).ok())
        .filter(|d| *d <= MAX_TIMEOUT)
        .ok_or_else(|| ConfigError::InvalidValue {
            var,
            expected: "seconds, at most one hour",
            value: value.to_string(),
        })
}

// ═══════════════════════════════════════════════════════════
// HTTP server
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(ENV_BIND).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: ENV_BIND,
            expected: "host:port",
            value: raw.clone(),
        })?;
        Ok(Self { bind_addr })
    }
}
