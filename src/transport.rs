use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;

use crate::errors::{Result, UserstackError};

pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(10);
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends a prepared request. Plug in your own to add proxies, middleware or
/// canned responses.
///
/// Implementations must be safe to share between concurrent
/// [`Client::detect`](crate::Client::detect) calls.
///
/// # Example
///
/// ```no_run
/// use async_trait::async_trait;
/// use userstack::{ClientBuilder, HttpTransport};
///
/// struct Logged(reqwest::Client);
///
/// #[async_trait]
/// impl HttpTransport for Logged {
///     async fn execute(
///         &self,
///         request: reqwest::Request,
///     ) -> Result<reqwest::Response, reqwest::Error> {
///         eprintln!("-> {} {}", request.method(), request.url().path());
///         self.0.execute(request).await
///     }
/// }
///
/// # fn example() -> userstack::Result<()> {
/// let client = ClientBuilder::new()
///     .access_key("your_access_key")
///     .transport(Logged(reqwest::Client::new()))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
    async fn execute(&self, request: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        reqwest::Client::execute(self, request).await
    }
}

/// The transport used when none is configured: short connect timeout, a
/// 60s ceiling per request, and redirects returned instead of followed.
pub(crate) fn default_transport(
    timeout: Duration,
    connect_timeout: Duration,
) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .tcp_keepalive(DEFAULT_KEEPALIVE)
        .timeout(timeout)
        .redirect(Policy::none())
        .build()
        .map_err(|e| UserstackError::Config {
            message: format!("failed to build HTTP client: {e}"),
        })
}
