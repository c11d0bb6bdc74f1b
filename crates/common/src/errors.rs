//! Error taxonomy shared by the orchestration crates.
//!
//! Provider failures are absorbed or retried by the router according to where
//! they happen; only [`OrchestrationError`] ever reaches the caller of
//! `orchestrate`. [`ParseError`] never leaves the emotion overlay.

use std::fmt;
use thiserror::Error;

/// Classification of a failed backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Connection refused, DNS failure, broken transport
    Network,
    /// Connect or total timeout exceeded
    Timeout,
    /// 401 / 403, or a missing/invalid API key
    Authentication,
    /// 429
    RateLimited,
    /// Any other non-success status
    Status(u16),
    /// Body could not be decoded or carried no content
    InvalidResponse,
    /// No backend registered for the model's provider
    NotConfigured,
}

impl ProviderErrorKind {
    pub fn from_status(code: u16) -> Self {
        match code {
            401 | 403 => ProviderErrorKind::Authentication,
            429 => ProviderErrorKind::RateLimited,
            _ => ProviderErrorKind::Status(code),
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::Network => write!(f, "network"),
            ProviderErrorKind::Timeout => write!(f, "timeout"),
            ProviderErrorKind::Authentication => write!(f, "authentication"),
            ProviderErrorKind::RateLimited => write!(f, "rate limited"),
            ProviderErrorKind::Status(code) => write!(f, "status {code}"),
            ProviderErrorKind::InvalidResponse => write!(f, "invalid response"),
            ProviderErrorKind::NotConfigured => write!(f, "not configured"),
        }
    }
}

/// Failure of a single backend `generate` call
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{provider} backend error ({kind}): {message}")]
pub struct ProviderError {
    pub provider: String,
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ProviderErrorKind::Timeout, message)
    }

    pub fn not_configured(provider: impl Into<String>, model: &str) -> Self {
        let provider = provider.into();
        let message = format!("no backend registered for provider '{provider}' (model '{model}')");
        Self::new(provider, ProviderErrorKind::NotConfigured, message)
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ProviderErrorKind::Timeout
    }
}

/// No viable candidate could be picked from a routing configuration
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("routing configuration has no candidate models")]
    NoCandidates,

    #[error("routing configuration contains an empty model id")]
    EmptyModelId,
}

/// Failure to read the free-text emotion overlay
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("overlay response contained no labeled fields")]
    NoLabeledFields,

    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: String, value: String },
}

/// Terminal orchestration failure: the strategy and the primary fallback both failed
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrchestrationError {
    #[error("orchestration failed: {cause} (strategy error: {strategy_error})")]
    Failed {
        cause: ProviderError,
        strategy_error: String,
    },

    #[error("orchestration cancelled by caller")]
    Cancelled,
}

impl OrchestrationError {
    pub fn cause(&self) -> Option<&ProviderError> {
        match self {
            OrchestrationError::Failed { cause, .. } => Some(cause),
            OrchestrationError::Cancelled => None,
        }
    }
}

/// Configuration loading / validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
pub type SelectionResult<T> = Result<T, SelectionError>;
pub type ParseResult<T> = Result<T, ParseError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
