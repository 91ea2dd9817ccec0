use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::{AppError, AppResult};

/// User-Agent sent with every gateway request
const USER_AGENT: &str = concat!("notifier/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by all HTTP-based providers
///
/// One client is created at startup and cloned into each provider, so all of
/// them share the same connection pool.
///
/// # Features
/// - **Timeouts**: whole-call, connect and read timeouts from `[http]`
/// - **Connection pooling**: idle connections are kept per host
/// - **HTTP/2**: adaptive window sizing and keep-alive
/// - **Security**: Rustls for TLS (no OpenSSL dependency)
/// - **Redirects**: never followed
///
/// # Example
/// ```ignore
/// let client = build_http_client(&settings.http)?;
/// let response = client.post(url).send().await?;
/// ```
pub fn build_http_client(config: &HttpConfig) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        // Timeouts
        .timeout(config.call_timeout())
        .connect_timeout(config.connect_timeout())
        .read_timeout(config.read_timeout())
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // HTTP/2 settings
        .http2_adaptive_window(true)
        .http2_keep_alive_interval(Duration::from_secs(10))
        .http2_keep_alive_timeout(Duration::from_secs(20))
        .user_agent(USER_AGENT)
        // 3xx responses are classified, never followed
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| AppError::Internal {
            source: anyhow::Error::new(e).context("Failed to build HTTP client"),
        })
}
