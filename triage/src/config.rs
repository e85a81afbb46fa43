//! Portal configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. Environment variable overrides (e.g. `PORTAL_BASE_URL`)
//! 2. Values from the TOML config file, when one is given
//! 3. Built-in defaults (services on `http://127.0.0.1:5000`)
//!
//! ## Example file
//!
//! ```toml
//! greeting = "Hi! Describe your problem and I'll help."
//!
//! [service]
//! base_url = "http://support.campus.local:5000"
//! timeout_secs = 20
//!
//! [presentation]
//! offer_delay_ms = 1500
//! dismiss_delay_ms = 2000
//!
//! [escalation]
//! phrases = ["formal complaint", "submit a complaint"]
//! patterns = ['escalat(e|ion) to (the )?warden']
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::escalation::{EscalationDetector, TriggerSet};

/// Default base URL shared by both services.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
/// Per-call timeout. A service that never answers resolves as a
/// connectivity failure after this long.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Pause before the escalation offer turn is shown.
const DEFAULT_OFFER_DELAY_MS: u64 = 1_500;
/// Pause after a successful complaint before returning to the chat.
const DEFAULT_DISMISS_DELAY_MS: u64 = 2_000;

const DEFAULT_GREETING: &str = "Hi! I'm your Smart Troubleshooting Assistant.\n\n\
I can help you with:\n\
- WiFi and network issues\n\
- Technical problems\n\
- Mess and dining concerns\n\
- Academic issues\n\
- Safety and security\n\n\
Describe your problem in detail and I'll provide step-by-step solutions!";

pub const ENV_BASE_URL: &str = "PORTAL_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "PORTAL_TIMEOUT_SECS";
pub const ENV_OFFER_DELAY_MS: &str = "PORTAL_OFFER_DELAY_MS";
pub const ENV_DISMISS_DELAY_MS: &str = "PORTAL_DISMISS_DELAY_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid escalation pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the two services live and how long to wait for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL for both endpoints (no trailing path).
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join the base URL with an endpoint path, tolerating a trailing slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Presentation delays for scheduled effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    pub offer_delay_ms: u64,
    pub dismiss_delay_ms: u64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            offer_delay_ms: DEFAULT_OFFER_DELAY_MS,
            dismiss_delay_ms: DEFAULT_DISMISS_DELAY_MS,
        }
    }
}

impl PresentationConfig {
    pub fn offer_delay(&self) -> Duration {
        Duration::from_millis(self.offer_delay_ms)
    }

    pub fn dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.dismiss_delay_ms)
    }
}

/// Top-level configuration consumed by the conductor, form and CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub service: ServiceConfig,
    pub presentation: PresentationConfig,
    pub escalation: TriggerSet,
    /// First assistant turn of every chat session.
    pub greeting: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            presentation: PresentationConfig::default(),
            escalation: TriggerSet::default(),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

impl PortalConfig {
    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// Apply `PORTAL_*` overrides from `lookup` (the environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.service.base_url = url;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECS) {
            self.service.timeout_secs = parse_u64(ENV_TIMEOUT_SECS, v)?;
        }
        if let Some(v) = lookup(ENV_OFFER_DELAY_MS) {
            self.presentation.offer_delay_ms = parse_u64(ENV_OFFER_DELAY_MS, v)?;
        }
        if let Some(v) = lookup(ENV_DISMISS_DELAY_MS) {
            self.presentation.dismiss_delay_ms = parse_u64(ENV_DISMISS_DELAY_MS, v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("service.base_url must not be empty".into()));
        }
        if self.service.timeout_secs == 0 {
            return Err(ConfigError::Invalid("service.timeout_secs must be > 0".into()));
        }
        if self.greeting.trim().is_empty() {
            return Err(ConfigError::Invalid("greeting must not be empty".into()));
        }
        // A blank phrase is a substring of every reply.
        if let Some(blank) = self.escalation.phrases.iter().find(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                key: "escalation.phrases",
                value: blank.clone(),
            });
        }
        self.detector()?;
        Ok(())
    }

    /// Compile the configured escalation triggers.
    pub fn detector(&self) -> Result<EscalationDetector, ConfigError> {
        Ok(EscalationDetector::from_set(&self.escalation)?)
    }
}

fn parse_u64(key: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}
