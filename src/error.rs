//! Error types for guise

use thiserror::Error;

use crate::headers::HeaderSet;

/// Result type for guise operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for guise
#[derive(Debug, Error)]
pub enum Error {
    /// Proxy address could not be turned into a transport agent
    #[error("Proxy configuration error for '{proxy}': {reason}")]
    ProxyConfiguration { proxy: String, reason: String },

    /// Fixed user agent without a `Chrome/<major>` token
    #[error("Invalid user agent (no Chrome/<version> token): {0}")]
    InvalidUserAgent(String),

    /// Request could not be built (bad method, URL or header)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Connection, DNS, TLS or timeout failure
    #[error("Transport error: {context}")]
    Transport {
        context: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned HTTP {status}")]
    Upstream {
        status: u16,
        headers: HeaderSet,
        body: bytes::Bytes,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a transport error with context only
    pub fn transport(context: impl Into<String>) -> Self {
        Self::Transport {
            context: context.into(),
            source: None,
        }
    }

    /// Create a transport error wrapping the engine's error
    pub fn transport_source(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            context: context.into(),
            source: Some(source),
        }
    }

    /// Create a proxy configuration error
    pub fn proxy_config(proxy: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProxyConfiguration {
            proxy: proxy.into(),
            reason: reason.into(),
        }
    }

    /// Create an upstream (non-2xx) error
    pub fn upstream(status: u16, body: impl Into<bytes::Bytes>) -> Self {
        Self::Upstream {
            status,
            headers: HeaderSet::new(),
            body: body.into(),
        }
    }

    /// Whether another attempt may succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Upstream { .. })
    }

    /// Check if this is a timeout reported by the transport
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport {
                source: Some(e), ..
            } => e.is_timeout(),
            _ => false,
        }
    }

    /// HTTP status of an upstream error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
