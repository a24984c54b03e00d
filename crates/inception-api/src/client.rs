// Inception controller HTTP client
//
// Wraps `reqwest::Client` with URL construction, credential injection,
// per-request timeouts and status translation. Resource endpoints live in
// `control.rs` and `review.rs` as inherent methods so this module stays
// focused on transport mechanics.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use reqwest::header::HeaderValue;
use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::endpoints::{AuthHeader, Endpoints};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Default timeout for the review long-poll. The controller holds the
/// request for up to 60 seconds when nothing new has happened.
pub const DEFAULT_REVIEW_TIMEOUT: Duration = Duration::from_secs(70);

/// Authenticated client for one Inception controller.
///
/// Cheap to share behind an `Arc`: the connection pool is reused by every
/// caller and the token can be swapped in place without rebuilding.
pub struct InceptionClient {
    http: reqwest::Client,
    base_url: Url,
    endpoints: Endpoints,
    auth: AuthHeader,
    token: ArcSwap<SecretString>,
    timeout: Duration,
    review_timeout: Duration,
}

impl InceptionClient {
    /// Create a client from a transport config.
    ///
    /// `base_url` is the controller root, e.g. `https://inception.local`.
    pub fn new(
        base_url: Url,
        token: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_http(http, base_url, token, transport.timeout))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        token: SecretString,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self::with_http(
            http,
            base_url,
            token,
            TransportConfig::default().timeout,
        ))
    }

    fn with_http(
        http: reqwest::Client,
        base_url: Url,
        token: SecretString,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url,
            endpoints: Endpoints::default(),
            auth: AuthHeader::default(),
            token: ArcSwap::from_pointee(token),
            timeout,
            review_timeout: DEFAULT_REVIEW_TIMEOUT,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_auth_header(mut self, auth: AuthHeader) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_review_timeout(mut self, timeout: Duration) -> Self {
        self.review_timeout = timeout;
        self
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn review_timeout(&self) -> Duration {
        self.review_timeout
    }

    /// Swap the API token. In-flight requests keep the token they started with.
    pub fn replace_token(&self, token: SecretString) {
        self.token.store(Arc::new(token));
        debug!("API token replaced");
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/{api_prefix}/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let prefix = self.endpoints.api_prefix.trim_matches('/');
        let path = path.trim_start_matches('/');
        let full = if prefix.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{prefix}/{path}")
        };
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send one request and return the parsed JSON body.
    ///
    /// An empty body decodes as `Value::Null`. Nothing is retried here.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        self.request_with_timeout(method, path, query, body, self.timeout)
            .await
    }

    /// As [`request`](Self::request), overriding the per-request timeout.
    pub async fn request_with_timeout(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        timeout: Duration,
    ) -> Result<Value, Error> {
        let url = self.api_url(path)?;
        debug!("{} {}", method, url);

        let mut builder = self.http.request(method, url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder, path, timeout).await
    }

    pub(crate) async fn get(&self, path: &str) -> Result<Value, Error> {
        self.request(Method::GET, path, &[], None).await
    }

    pub(crate) async fn post(
        &self,
        path: &str,
        body: &impl Serialize,
        timeout: Duration,
    ) -> Result<Value, Error> {
        let body = serde_json::to_value(body).map_err(|e| Error::Rejected {
            status: 0,
            message: format!("failed to encode request body: {e}"),
        })?;
        self.request_with_timeout(Method::POST, path, &[], Some(&body), timeout)
            .await
    }

    pub(crate) fn default_timeout(&self) -> Duration {
        self.timeout
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        path: &str,
        timeout: Duration,
    ) -> Result<Value, Error> {
        let resp = builder
            .header(self.auth.header.as_str(), self.credential()?)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(&e, timeout))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::from_reqwest(&e, timeout))?;

        if !status.is_success() {
            return Err(Error::from_status(status, path, &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| Error::Malformed {
            message: e.to_string(),
            body,
        })
    }

    fn credential(&self) -> Result<HeaderValue, Error> {
        let token = self.token.load();
        let mut value = HeaderValue::from_str(&self.auth.value_for(token.expose_secret()))
            .map_err(|_| Error::Rejected {
                status: 0,
                message: "API token contains characters not allowed in a header".into(),
            })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for InceptionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InceptionClient")
            .field("base_url", &self.base_url.as_str())
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
