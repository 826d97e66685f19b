//! # Guise
//!
//! Fingerprint-randomizing, proxy-aware HTTP request layer.
//!
//! Every [`RequestManager`] picks one realistic Chrome header set for its
//! lifetime, routes through an optional HTTP or SOCKS proxy, and retries
//! transient failures with jittered backoff.
//!
//! ## Features
//!
//! - **Consistent fingerprints** - Chrome version matches across `User-Agent` and `Sec-Ch-Ua`
//! - **Proxy routing** - `socks4/4a/5/5h` and `http/https` proxies, or direct
//! - **Bounded retries** - small budget, uniform jitter, explicit exhaustion policy
//! - **Per-call overrides** - caller headers win over the fingerprint, key by key
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use guise::{RequestConfig, RequestManager};
//!
//! #[tokio::main]
//! async fn main() -> guise::Result<()> {
//!     // Direct connection, random fingerprint
//!     let manager = RequestManager::new(None, None)?;
//!
//!     let body = manager
//!         .request_text(RequestConfig::get("https://httpbin.org/headers"))
//!         .await?;
//!     println!("{}", body);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust,no_run
//! use guise::{ClientConfig, ExhaustedPolicy, RequestManager, RetryPolicy};
//!
//! # fn main() -> guise::Result<()> {
//! let config = ClientConfig {
//!     retry: RetryPolicy {
//!         max_retries: 5,
//!         ..Default::default()
//!     },
//!     on_exhausted: ExhaustedPolicy::ReturnUpstreamBody,
//!     ..ClientConfig::proxied("socks5://127.0.0.1:1080")
//! };
//!
//! let manager = RequestManager::with_config(config)?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

pub mod error;
pub mod headers;
pub mod manager;
pub mod proxy;
pub mod request;
pub mod retry;
pub mod stealth;
pub mod transport;

// Re-exports
pub use error::{Error, Result};
pub use headers::HeaderSet;
pub use manager::RequestManager;
pub use proxy::{build_agent, ProxyAgent, ProxyKind};
pub use request::{Body, RequestConfig, Response};
pub use retry::{ExhaustedPolicy, RetryPolicy};
pub use stealth::{
    random_accept_language, random_chrome_version, random_headers, random_user_agent,
    Fingerprint, FingerprintGenerator, Platform,
};
pub use transport::{build_transport, HttpTransport, Transport, DEFAULT_TIMEOUT};

/// Configuration for a [`RequestManager`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Proxy address (`socks5://...`, `http://...`); None = direct
    pub proxy: Option<String>,
    /// Fixed user agent (None = random realistic). Must contain `Chrome/<major>`.
    pub user_agent: Option<String>,
    /// Per-call timeout
    pub timeout: Duration,
    /// Retry budget and backoff
    pub retry: RetryPolicy,
    /// Result of a call whose retries are spent
    pub on_exhausted: ExhaustedPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            user_agent: None,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            on_exhausted: ExhaustedPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Direct connection with defaults
    pub fn direct() -> Self {
        Self::default()
    }

    /// Route through a proxy
    pub fn proxied(proxy: impl Into<String>) -> Self {
        Self {
            proxy: Some(proxy.into()),
            ..Default::default()
        }
    }
}
