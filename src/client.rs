use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Request, Url};

use crate::enums::DecodeMode;
use crate::errors::{ApiErr, Result, UserstackError};
use crate::models::{decode_response, DetectOptions, DetectOutcome, Stack};
use crate::transport::{
    default_transport, HttpTransport, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT,
};

const API_HOST: &str = "api.userstack.com";
const ACCESS_KEY_ENV: &str = "USERSTACK_ACCESS_KEY";
const REDACTED: &str = "hidden";

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use userstack::{ClientBuilder, DecodeMode};
/// use std::time::Duration;
///
/// # fn example() -> userstack::Result<()> {
/// let client = ClientBuilder::new()
///     .access_key("your_access_key")
///     .secure(true)
///     .decode_mode(DecodeMode::Lenient)
///     .timeout(Duration::from_secs(20))
///     .debug(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    access_key: Option<String>,
    secure: bool,
    base_url: Option<String>,
    debug: bool,
    decode_mode: DecodeMode,
    timeout: Duration,
    connect_timeout: Duration,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl ClientBuilder {
    /// Create a new builder with default settings: plain `http`, strict
    /// decoding, debug logging off.
    pub fn new() -> Self {
        Self {
            access_key: None,
            secure: false,
            base_url: None,
            debug: false,
            decode_mode: DecodeMode::default(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            transport: None,
        }
    }

    /// Set the access key.
    pub fn access_key(mut self, key: impl Into<String>) -> Self {
        self.access_key = Some(key.into());
        self
    }

    /// Use `https`. Only paid plans may; free plans get an
    /// `https_access_restricted` error back.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Override the scheme and host (defaults to `http://api.userstack.com`).
    /// Takes precedence over [`secure`](Self::secure).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Log outgoing requests and responses at `DEBUG` through `tracing`.
    /// The access key is always masked.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn decode_mode(mut self, mode: DecodeMode) -> Self {
        self.decode_mode = mode;
        self
    }

    /// `strict(false)` is the same as `decode_mode(DecodeMode::Lenient)`.
    pub fn strict(self, strict: bool) -> Self {
        self.decode_mode(if strict {
            DecodeMode::Strict
        } else {
            DecodeMode::Lenient
        })
    }

    /// Overall timeout of the default transport (defaults to 60 seconds).
    /// Ignored when a custom [`transport`](Self::transport) is set.
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Connect timeout of the default transport (defaults to 10 seconds).
    /// Ignored when a custom [`transport`](Self::transport) is set.
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    /// Send requests through a custom [`HttpTransport`].
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the [`Client`].
    ///
    /// If no access key was set via [`access_key`](Self::access_key), the
    /// builder reads the `USERSTACK_ACCESS_KEY` environment variable.
    ///
    /// Returns [`UserstackError::Api`] with type `missing_access_key` if no
    /// non-empty key is available. No request is made in that case.
    pub fn build(self) -> Result<Client> {
        let access_key = self
            .access_key
            .or_else(|| std::env::var(ACCESS_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
            .ok_or_else(ApiErr::missing_access_key)?;

        let base_url = match self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let scheme = if self.secure { "https" } else { "http" };
                format!("{scheme}://{API_HOST}")
            }
        };
        let detect_url =
            Url::parse(&format!("{base_url}/detect")).map_err(|e| UserstackError::Config {
                message: format!("invalid base URL {base_url:?}: {e}"),
            })?;

        let http: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(default_transport(self.timeout, self.connect_timeout)?),
        };

        Ok(Client {
            detect_url,
            access_key,
            http,
            decode_mode: self.decode_mode,
            debug: self.debug,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The userstack API client.
///
/// Cheap to clone and safe to share across tasks; every call builds its own
/// request.
///
/// # Example
///
/// ```no_run
/// use userstack::Client;
///
/// # async fn example() -> userstack::Result<()> {
/// let client = Client::new("your_access_key", false)?;
///
/// let stack = client
///     .detect("Mozilla/5.0 (iPhone; CPU iPhone OS 12_2 like Mac OS X) AppleWebKit/605.1.15")
///     .await?;
/// println!("{} on {}", stack.browser.name, stack.os.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    detect_url: Url,
    access_key: String,
    http: Arc<dyn HttpTransport>,
    decode_mode: DecodeMode,
    debug: bool,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("detect_url", &self.detect_url.as_str())
            .field("access_key", &REDACTED)
            .field("decode_mode", &self.decode_mode)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client with default settings.
    ///
    /// Non-paying accounts must pass `secure: false`; only paid plans get
    /// `https`. For anything else use [`ClientBuilder`].
    pub fn new(access_key: impl Into<String>, secure: bool) -> Result<Self> {
        ClientBuilder::new()
            .access_key(access_key)
            .secure(secure)
            .build()
    }

    /// The policy applied to classification strings in responses.
    pub fn decode_mode(&self) -> DecodeMode {
        self.decode_mode
    }

    /// Look up a single User-Agent string.
    ///
    /// An empty string is sent as-is; the service answers it with a
    /// `missing_user_agent` error.
    ///
    /// To cancel, drop the future or wrap it in a timeout; a per-call deadline
    /// can also be set with [`detect_with`](Self::detect_with).
    ///
    /// # Errors
    ///
    /// - [`UserstackError::Api`] if the service rejected the request.
    /// - [`UserstackError::Http`] for transport failures, including timeouts.
    /// - [`UserstackError::Decode`] if the body is not JSON.
    /// - [`UserstackError::UnsupportedType`] for unknown classifications in strict mode.
    pub async fn detect(&self, user_agent: &str) -> Result<Stack> {
        self.detect_with(user_agent, &DetectOptions::default()).await
    }

    /// [`detect`](Self::detect) with per-call [`DetectOptions`].
    pub async fn detect_with(&self, user_agent: &str, opts: &DetectOptions) -> Result<Stack> {
        self.detect_outcome(user_agent, opts).await?.into_result()
    }

    /// Like [`detect_with`](Self::detect_with), but hands back an API
    /// rejection as [`DetectOutcome::Failure`] instead of an error.
    pub async fn detect_outcome(
        &self,
        user_agent: &str,
        opts: &DetectOptions,
    ) -> Result<DetectOutcome> {
        let url = self.request_url(user_agent, opts);

        let redacted = self.debug.then(|| redact_access_key(&url));
        if let Some(url) = &redacted {
            tracing::debug!(%url, "userstack: HTTP request");
        }

        let mut request = Request::new(Method::GET, url);
        if let Some(timeout) = opts.timeout {
            *request.timeout_mut() = Some(timeout);
        }

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                // reqwest's Display embeds the unmasked URL, so log flags only.
                if let Some(url) = &redacted {
                    tracing::debug!(
                        %url,
                        timeout = e.is_timeout(),
                        connect = e.is_connect(),
                        "userstack: HTTP request failed"
                    );
                }
                return Err(UserstackError::Http(e));
            }
        };

        if self.debug {
            tracing::debug!(
                status = response.status().as_u16(),
                headers = ?response.headers(),
                "userstack: HTTP response"
            );
        }

        // The API answers 200 for failures too; only the body decides.
        let body = response.bytes().await?;
        decode_response(&body, self.decode_mode)
    }

    fn request_url(&self, user_agent: &str, opts: &DetectOptions) -> Url {
        let mut url = self.detect_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("access_key", &self.access_key)
                .append_pair("ua", user_agent);
            if let Some(fields) = opts.fields.as_deref().filter(|f| !f.is_empty()) {
                query.append_pair("fields", fields);
            }
        }
        url
    }
}

/// Copy of `url` with the `access_key` query parameter masked.
pub(crate) fn redact_access_key(url: &Url) -> Url {
    let mut redacted = url.clone();
    if url.query().is_none() {
        return redacted;
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_key" {
                REDACTED.to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}
