//! Backend clients - one capability, four independently configured services
//!
//! Every backend kind is reached through its own [`BackendEndpoint`] (base URL,
//! optional bearer credential, timeout) and its own `reqwest::Client`, so a
//! misconfigured or unavailable backend cannot affect calls to another.

use crate::error::{Error, Result};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path of the single tool endpoint on research/seo/storage backends
const TOOL_PATH: &str = "tool";

/// The external tool services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Research query service
    Research,
    /// SEO analysis service
    Seo,
    /// Asset storage service
    Storage,
    /// Draft read/update service
    Draft,
}

impl BackendKind {
    /// Every kind, in a stable order
    pub const ALL: [BackendKind; 4] = [Self::Research, Self::Seo, Self::Storage, Self::Draft];

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Seo => "seo",
            Self::Storage => "storage",
            Self::Draft => "draft",
        }
    }

    /// Well-known local address used when no base URL is configured
    #[must_use]
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Research => "http://localhost:8101",
            Self::Seo => "http://localhost:8102",
            Self::Storage => "http://localhost:8103",
            Self::Draft => "http://localhost:8104",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bearer credential for a backend. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a credential. Blank input means "no credential".
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Access the raw value for the `Authorization` header
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***)")
    }
}

/// Connection settings for one backend kind
#[derive(Debug, Clone)]
pub struct BackendEndpoint {
    /// Which backend this endpoint addresses
    pub kind: BackendKind,
    /// Base URL, e.g. `http://localhost:8103`
    pub base_url: String,
    /// Bearer credential; `None` means unauthenticated calls
    pub credential: Option<Credential>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl BackendEndpoint {
    /// Endpoint at `base_url` without credential
    #[must_use]
    pub fn new(kind: BackendKind, base_url: impl Into<String>) -> Self {
        Self {
            kind,
            base_url: base_url.into(),
            credential: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Endpoint at the kind's default local address
    #[must_use]
    pub fn default_for(kind: BackendKind) -> Self {
        Self::new(kind, kind.default_base_url())
    }

    /// Set the bearer credential (blank clears it)
    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Credential::new(credential);
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The capability every tool backend offers: take a JSON payload, return JSON.
#[async_trait::async_trait]
pub trait ToolBackend: Send + Sync {
    /// Backend kind served by this implementation
    fn kind(&self) -> BackendKind;

    /// Forward `payload` and return the backend's JSON result unmodified
    async fn invoke(&self, payload: Value) -> Result<Value>;
}

/// HTTP implementation of [`ToolBackend`]
pub struct HttpToolBackend {
    endpoint: BackendEndpoint,
    base: Url,
    client: reqwest::Client,
}

impl HttpToolBackend {
    /// Build a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// `Configuration` if the base URL is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(endpoint: BackendEndpoint) -> Result<Self> {
        let base = Url::parse(&endpoint.base_url).map_err(|e| {
            Error::Configuration(format!(
                "invalid {} base URL '{}': {}",
                endpoint.kind, endpoint.base_url, e
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "{} base URL must use http or https, got '{}'",
                endpoint.kind,
                base.scheme()
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            base,
            client,
        })
    }

    /// The endpoint this client was built from
    #[must_use]
    pub fn endpoint(&self) -> &BackendEndpoint {
        &self.endpoint
    }

    /// Send one request to `{base_url}/{segments..}` and classify the response.
    pub(crate) async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<Value> {
        let kind = self.endpoint.kind;
        let url = self.url_for(segments)?;

        debug!(backend = %kind, method = %method, url = %url, "Calling tool backend");

        let mut request = self.client.request(method, url);
        if let Some(credential) = &self.endpoint.credential {
            request = request.bearer_auth(credential.expose());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(backend = %kind, error = %e, "Tool backend unreachable");
            let message = if e.is_timeout() {
                format!("timed out after {}s", self.endpoint.timeout.as_secs_f32())
            } else {
                e.to_string()
            };
            Error::BackendUnreachable {
                backend: kind,
                message,
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::BackendUnreachable {
                backend: kind,
                message: format!("failed to read response body: {e}"),
            })?;

        classify(kind, status, &text).inspect_err(|e| {
            warn!(backend = %kind, status = status.as_u16(), error = %e, "Tool backend call failed");
        })
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::Configuration(format!(
                    "{} base URL cannot carry a path",
                    self.endpoint.kind
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl ToolBackend for HttpToolBackend {
    fn kind(&self) -> BackendKind {
        self.endpoint.kind
    }

    async fn invoke(&self, payload: Value) -> Result<Value> {
        self.request(Method::POST, &[TOOL_PATH], Some(&payload)).await
    }
}

impl fmt::Debug for HttpToolBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpToolBackend")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Map a backend response onto the result/error taxonomy.
fn classify(backend: BackendKind, status: StatusCode, text: &str) -> Result<Value> {
    let parsed: Option<Value> = if text.trim().is_empty() {
        Some(Value::Null)
    } else {
        serde_json::from_str(text).ok()
    };

    if !status.is_success() {
        let message = error_message(parsed.as_ref(), text, status);
        return Err(match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Error::InvalidPayload { backend, message }
            }
            _ => Error::BackendError {
                backend,
                status: status.as_u16(),
                message,
            },
        });
    }

    let Some(body) = parsed else {
        return Err(Error::BackendError {
            backend,
            status: status.as_u16(),
            message: "response is not valid JSON".to_string(),
        });
    };

    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Err(Error::BackendError {
            backend,
            status: status.as_u16(),
            message: message.to_string(),
        });
    }

    Ok(body)
}

/// Prefer the backend's own `error`/`message` field, then the raw body.
fn error_message(parsed: Option<&Value>, text: &str, status: StatusCode) -> String {
    let field = parsed.and_then(|body| {
        ["error", "message"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
    });

    match field {
        Some(message) => message.to_string(),
        None if !text.trim().is_empty() => text.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}
