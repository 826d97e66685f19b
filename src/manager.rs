//! Request Manager
//!
//! Long-lived façade owning one fingerprint and one transport. Every call
//! lays its header overrides over the fingerprint and runs through a bounded
//! retry loop with jittered backoff.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::headers::HeaderSet;
use crate::proxy::build_agent;
use crate::request::{RequestConfig, Response};
use crate::retry::{ExhaustedPolicy, RetryPolicy};
use crate::stealth::{Fingerprint, FingerprintGenerator};
use crate::transport::{HttpTransport, Transport};
use crate::ClientConfig;

/// Fingerprinted, retrying HTTP client
pub struct RequestManager<T = HttpTransport> {
    fingerprint: Fingerprint,
    transport: T,
    /// Read once at the start of each call; `set_max_retries` races benignly
    /// with calls already in flight.
    max_retries: AtomicU32,
    backoff_base: Duration,
    backoff_jitter: Duration,
    on_exhausted: ExhaustedPolicy,
}

impl RequestManager<HttpTransport> {
    /// Create a manager with an optional proxy and optional fixed user agent
    pub fn new(proxy: Option<&str>, user_agent: Option<&str>) -> Result<Self> {
        Self::with_config(ClientConfig {
            proxy: proxy.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
            ..Default::default()
        })
    }

    /// Create a manager from a full config. Never touches the network.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let fingerprint =
            FingerprintGenerator::thread_local().fingerprint(config.user_agent.as_deref())?;

        let agent = build_agent(config.proxy.as_deref())?;
        match &agent {
            Some(agent) => tracing::info!(
                "Using {:?} proxy {}",
                agent.kind(),
                agent.display_address()
            ),
            None => tracing::info!("No proxy configured, connecting directly"),
        }
        let transport = HttpTransport::from_agent(agent, config.timeout)?;

        tracing::debug!(
            "Fingerprint: Chrome {} ({})",
            fingerprint.chrome_version(),
            fingerprint.user_agent()
        );

        Ok(Self::with_transport(transport, fingerprint)
            .retry_policy(config.retry)
            .on_exhausted(config.on_exhausted))
    }
}

impl<T: Transport> RequestManager<T> {
    /// Create a manager over any transport with the default retry policy
    pub fn with_transport(transport: T, fingerprint: Fingerprint) -> Self {
        let policy = RetryPolicy::default();
        Self {
            fingerprint,
            transport,
            max_retries: AtomicU32::new(policy.max_retries),
            backoff_base: policy.backoff_base,
            backoff_jitter: policy.backoff_jitter,
            on_exhausted: ExhaustedPolicy::default(),
        }
    }

    /// Replace the whole retry policy
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.max_retries = AtomicU32::new(policy.max_retries);
        self.backoff_base = policy.backoff_base;
        self.backoff_jitter = policy.backoff_jitter;
        self
    }

    /// Choose what a call returns once its retries are spent
    pub fn on_exhausted(mut self, policy: ExhaustedPolicy) -> Self {
        self.on_exhausted = policy;
        self
    }

    /// Fingerprint sent with every call
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Transport every attempt goes through
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current retry policy snapshot
    pub fn current_retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries(),
            backoff_base: self.backoff_base,
            backoff_jitter: self.backoff_jitter,
        }
    }

    /// Retry budget new calls start with
    pub fn max_retries(&self) -> u32 {
        self.max_retries.load(Ordering::Relaxed)
    }

    /// Set the retry budget for all subsequent calls
    pub fn set_max_retries(&self, max_retries: u32) {
        self.max_retries.store(max_retries, Ordering::Relaxed);
    }

    /// Fingerprint with `overrides` laid on top
    pub fn merged_headers(&self, overrides: &HeaderSet) -> HeaderSet {
        self.fingerprint.headers().merged(overrides)
    }

    /// Execute a call and return the full response
    pub async fn send(&self, config: RequestConfig) -> Result<Response> {
        let request = RequestConfig {
            headers: self.merged_headers(&config.headers),
            ..config
        };
        tracing::trace!("Merged headers for {}: {:?}", request.url, request.headers);

        let mut retries = self.max_retries();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            tracing::debug!("{} {} (attempt {})", request.method, request.url, attempts);

            let err = match self.transport.execute(&request).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => e,
            };

            retries = retries.saturating_sub(1);
            if retries > 0 {
                let delay = self.backoff_delay();
                tracing::warn!(
                    "Request to {} failed: {} ({} retries left, backing off {:?})",
                    request.url,
                    err,
                    retries,
                    delay
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            tracing::warn!(
                "Request to {} failed after {} attempt(s): {}",
                request.url,
                attempts,
                err
            );
            return self.exhausted(err);
        }
    }

    /// Execute a call and return the response body
    pub async fn request(&self, config: RequestConfig) -> Result<Bytes> {
        Ok(self.send(config).await?.body)
    }

    /// Execute a call and return the body as text
    pub async fn request_text(&self, config: RequestConfig) -> Result<String> {
        Ok(self.send(config).await?.text())
    }

    /// Execute a call and decode the body as JSON
    pub async fn request_json<D: DeserializeOwned>(&self, config: RequestConfig) -> Result<D> {
        self.send(config).await?.json()
    }

    fn backoff_delay(&self) -> Duration {
        self.current_retry_policy().backoff_delay(&mut rand::thread_rng())
    }

    fn exhausted(&self, err: Error) -> Result<Response> {
        match (self.on_exhausted, err) {
            (
                ExhaustedPolicy::ReturnUpstreamBody,
                Error::Upstream {
                    status,
                    headers,
                    body,
                },
            ) => Ok(Response {
                status,
                headers,
                body,
            }),
            (_, err) => Err(err),
        }
    }
}
