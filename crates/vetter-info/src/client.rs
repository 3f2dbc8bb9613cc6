//! HTTP client wrapper with timeouts and optional rate limiting

use crate::error::{Error, Result};
use governor::{Quota, RateLimiter};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Rate limiter shared by every request made through one client
pub type ServiceRateLimiter = Arc<
    RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>,
>;

/// Default request timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Construction options for [`HttpClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// User agent sent with every request
    pub user_agent: String,
    /// Whole-request timeout; reqwest aborts the request when it elapses
    pub timeout: Duration,
    /// Client-side request budget, `None` disables rate limiting
    pub requests_per_second: Option<u32>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("vetter/{}", env!("CARGO_PKG_VERSION")),
            timeout: DEFAULT_TIMEOUT,
            requests_per_second: None,
        }
    }
}

impl ClientOptions {
    /// Default options with a specific timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// HTTP client wrapper for registry and advisory API requests
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    rate_limiter: Option<ServiceRateLimiter>,
    /// Permits taken by [`HttpClient::reserve`] and not yet spent on a request
    reserved: Arc<AtomicUsize>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration (no rate limiting)
    pub fn new() -> Result<Self> {
        Self::with_options(&ClientOptions::default())
    }

    /// Create a new HTTP client from explicit options
    pub fn with_options(options: &ClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(options.user_agent.as_str())
            .timeout(options.timeout)
            .build()?;

        // A zero budget is treated as "unlimited" rather than rejected
        let rate_limiter = options
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));

        Ok(Self {
            client,
            rate_limiter,
            reserved: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Wait for a rate-limit permit and hold it for the next request.
    ///
    /// Callers that put a deadline on a request await this first, so time
    /// spent queueing behind the limiter is not charged to the request.
    /// Without a limiter this returns immediately.
    pub async fn reserve(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
            self.reserved.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// Spend a reserved permit, or wait for a fresh one
    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.rate_limiter {
            let prepaid = self
                .reserved
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok();
            if !prepaid {
                limiter.until_ready().await;
            }
        }
    }

    /// Make a GET request and deserialize JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.wait_for_rate_limit().await;

        let response = self.client.get(url).send().await?;
        decode(response, url).await
    }

    /// Make a POST request with a JSON body and deserialize JSON response
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.wait_for_rate_limit().await;

        let response = self.client.post(url).json(body).send().await?;
        decode(response, url).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T> {
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(Error::NotFound(url.to_string()));
    }

    // Handle rate limiting (HTTP 429)
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(Error::RateLimitExceeded(url.to_string()));
    }

    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
