//! Error types shared across the crate.
//!
//! Registration-time mistakes (bad property keys, malformed recipe patterns,
//! bad ability entries) fail fast with one of these. Expected gameplay
//! outcomes such as "not enough mana" or "no recipe matches" are plain
//! return values, not errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// A property key part was empty or contained characters outside `[A-Za-z0-9_:.-]`.
    #[error("invalid property key part '{part}': {reason}")]
    InvalidKey { part: String, reason: &'static str },

    /// A recipe pattern failed validation at registration.
    #[error("malformed recipe pattern: {0}")]
    MalformedPattern(String),

    /// An ability entry failed validation at registration.
    #[error("invalid ability '{id}': {reason}")]
    InvalidAbility { id: String, reason: String },

    /// A config file parsed but holds values the ledgers cannot use.
    #[error("invalid config {path:?}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid stored JSON under '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ForgeError>;

impl ForgeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ForgeError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        ForgeError::Toml {
            path: path.into(),
            source,
        }
    }
}
