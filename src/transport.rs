//! HTTP Transport Layer
//!
//! The [`Transport`] trait is the seam between the retry executor and the
//! engine that actually moves bytes. [`HttpTransport`] is the reqwest-backed
//! implementation, configured once with an optional proxy agent.

use std::future::Future;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::headers::HeaderSet;
use crate::proxy::{build_agent, ProxyAgent};
use crate::request::{Body, RequestConfig, Response};

/// Per-call timeout applied by the transport
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes one HTTP attempt.
///
/// Implementations report a non-2xx answer as [`Error::Upstream`] and any
/// connection-level failure as [`Error::Transport`].
pub trait Transport: Send + Sync {
    fn execute(&self, request: &RequestConfig) -> impl Future<Output = Result<Response>> + Send;
}

/// reqwest-backed transport, direct or through a proxy
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    agent: Option<ProxyAgent>,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport for an optional proxy address
    pub fn new(proxy: Option<&str>, timeout: Duration) -> Result<Self> {
        Self::from_agent(build_agent(proxy)?, timeout)
    }

    /// Build a transport around an already classified agent.
    /// No network I/O happens here.
    pub fn from_agent(agent: Option<ProxyAgent>, timeout: Duration) -> Result<Self> {
        let builder = reqwest::Client::builder().timeout(timeout);
        let builder = match &agent {
            Some(agent) => agent.apply(builder),
            // Direct means direct: ignore HTTP_PROXY and friends
            None => builder.no_proxy(),
        };

        let client = builder.build().map_err(|e| match &agent {
            Some(agent) => Error::proxy_config(agent.display_address(), e.to_string()),
            None => Error::transport_source("failed to build HTTP client", e),
        })?;

        Ok(Self {
            client,
            agent,
            timeout,
        })
    }

    /// Proxy agent in use, `None` for direct connections
    pub fn proxy(&self) -> Option<&ProxyAgent> {
        self.agent.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: &RequestConfig) -> Result<Response> {
        let url = Url::parse(&request.url)
            .map_err(|e| Error::InvalidRequest(format!("URL '{}': {}", request.url, e)))?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.to_header_map()?);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match &request.body {
            Some(Body::Json(value)) => builder.json(value),
            Some(Body::Text(text)) => builder.body(text.clone()),
            Some(Body::Bytes(bytes)) => builder.body(bytes.clone()),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            let context = if e.is_timeout() {
                format!("{} {} timed out", request.method, request.url)
            } else if e.is_connect() {
                format!("{} {} could not connect", request.method, request.url)
            } else {
                format!("{} {} failed", request.method, request.url)
            };
            Error::transport_source(context, e)
        })?;

        let status = response.status();
        let headers = HeaderSet::from_header_map(response.headers());
        let body = response.bytes().await.map_err(|e| {
            Error::transport_source(
                format!("{} {} body read failed", request.method, request.url),
                e,
            )
        })?;

        tracing::trace!("{} {} -> {}", request.method, request.url, status);

        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                headers,
                body,
            });
        }

        Ok(Response {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

/// Fingerprint-less transport factory with the default timeout
pub fn build_transport(proxy: Option<&str>) -> Result<HttpTransport> {
    HttpTransport::new(proxy, DEFAULT_TIMEOUT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyKind;

    #[test]
    fn test_direct_transport() {
        let transport = tokio_test::assert_ok!(build_transport(None));
        assert!(transport.proxy().is_none());
        assert_eq!(transport.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_proxied_transports() {
        let socks = build_transport(Some("socks5://127.0.0.1:1080")).unwrap();
        assert_eq!(socks.proxy().map(|a| a.kind()), Some(ProxyKind::Socks));

        let http = HttpTransport::new(Some("http://127.0.0.1:8080"), Duration::from_secs(5)).unwrap();
        assert_eq!(http.proxy().map(|a| a.kind()), Some(ProxyKind::Http));
        assert_eq!(http.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_bad_proxy_fails_construction() {
        let err = tokio_test::assert_err!(build_transport(Some("gopher://host:70")));
        assert!(matches!(err, Error::ProxyConfiguration { .. }));
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_a_transport_error() {
        let transport = build_transport(None).unwrap();
        let err = transport
            .execute(&RequestConfig::get("not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = HttpTransport::new(None, Duration::from_secs(2)).unwrap();
        let err = transport
            .execute(&RequestConfig::get(format!("http://127.0.0.1:{}/", port)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { .. }), "{:?}", err);
        assert!(err.is_retryable());
    }
}
