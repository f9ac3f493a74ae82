//! Rate-aware HTTP fetching with bounded retry budgets
//!
//! snooker.org does not publish its request ceiling; exceeding it yields a
//! bare HTTP 403. Those responses are retried on a long, capped exponential
//! backoff. Connection failures and timeouts are retried on a separate,
//! shorter budget. Everything else fails immediately with a typed error.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::config::RetrySettings;
use crate::constants::REQUESTED_BY_HEADER;
use crate::error::AppError;

/// Delay primitive used between retries and by paced loops.
///
/// Production code sleeps on the tokio timer; tests inject an
/// implementation that records the requested delays and returns at once.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry budgets for the two transient failure classes.
///
/// `*_max_attempts` counts requests, so a budget of 5 sleeps at most 4 times.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub rate_limit_initial_delay: Duration,
    pub rate_limit_multiplier: u32,
    pub rate_limit_max_delay: Duration,
    pub rate_limit_max_attempts: u32,
    pub network_initial_delay: Duration,
    pub network_max_delay: Duration,
    pub network_max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            rate_limit_initial_delay: Duration::from_secs(settings.rate_limit_initial_delay_seconds),
            rate_limit_multiplier: settings.rate_limit_multiplier.max(1),
            rate_limit_max_delay: Duration::from_secs(settings.rate_limit_max_delay_seconds),
            rate_limit_max_attempts: settings.rate_limit_max_attempts.max(1),
            network_initial_delay: Duration::from_millis(settings.network_initial_delay_ms),
            network_max_delay: Duration::from_millis(settings.network_max_delay_ms),
            network_max_attempts: settings.network_max_attempts.max(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following the `retry_index`-th (0-based) 403 response
    pub fn rate_limit_delay(&self, retry_index: u32) -> Duration {
        grow(
            self.rate_limit_initial_delay,
            self.rate_limit_multiplier,
            retry_index,
            self.rate_limit_max_delay,
        )
    }

    /// Delay before the retry following the `retry_index`-th (0-based) network failure
    pub fn network_delay(&self, retry_index: u32) -> Duration {
        grow(
            self.network_initial_delay,
            2,
            retry_index,
            self.network_max_delay,
        )
    }

    /// Upper bound on time spent sleeping for consecutive 403 responses on one request
    pub fn max_rate_limit_wait(&self) -> Duration {
        (0..self.rate_limit_max_attempts.saturating_sub(1))
            .map(|i| self.rate_limit_delay(i))
            .sum()
    }

    /// Upper bound on time spent sleeping for network failures on one request
    pub fn max_network_wait(&self) -> Duration {
        (0..self.network_max_attempts.saturating_sub(1))
            .map(|i| self.network_delay(i))
            .sum()
    }
}

fn grow(initial: Duration, multiplier: u32, exponent: u32, cap: Duration) -> Duration {
    multiplier
        .checked_pow(exponent)
        .and_then(|factor| initial.checked_mul(factor))
        .map_or(cap, |delay| delay.min(cap))
}

/// Successful (2xx) response body
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Issues GET requests carrying the `X-Requested-By` header and applies the retry budgets.
#[derive(Clone)]
pub struct RateAwareFetcher {
    client: Client,
    requested_by: String,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for RateAwareFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateAwareFetcher")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RateAwareFetcher {
    pub fn new(client: Client, requested_by: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            client,
            requested_by: requested_by.into(),
            policy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replaces the delay primitive
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url`, retrying 403 responses and network failures within their budgets.
    ///
    /// # Errors
    /// * `AppError::Unauthorized` - 401, a 403 whose body rejects the header, or no header value configured
    /// * `AppError::RateLimited` - 403 responses persisted through the whole rate-limit budget
    /// * `AppError::NetworkTimeout` / `AppError::NetworkConnection` - network budget exhausted
    /// * `AppError::UpstreamStatus` - any other non-success status
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<RawResponse, AppError> {
        if self.requested_by.trim().is_empty() {
            error!("No {REQUESTED_BY_HEADER} value configured, refusing to call {url}");
            return Err(AppError::unauthorized(
                url,
                format!("{REQUESTED_BY_HEADER} header value is not configured"),
            ));
        }

        let mut rate_limited = 0u32;
        let mut network_failures = 0u32;

        loop {
            match self.send_once(url).await {
                Ok((status, body)) => {
                    if (200..300).contains(&status) {
                        debug!(status, bytes = body.len(), "Response received");
                        return Ok(RawResponse { status, body });
                    }

                    if status == 401 || (status == 403 && is_auth_rejection(&body)) {
                        let message = summarize_body(&body, status);
                        error!(status, "Request rejected as unauthorized: {message}");
                        return Err(AppError::unauthorized(url, message));
                    }

                    if status == 403 {
                        rate_limited += 1;
                        if rate_limited >= self.policy.rate_limit_max_attempts {
                            error!(
                                attempts = rate_limited,
                                "Rate limit budget exhausted for {url}"
                            );
                            return Err(AppError::rate_limited(url, rate_limited));
                        }
                        let delay = self.policy.rate_limit_delay(rate_limited - 1);
                        warn!(
                            attempt = rate_limited,
                            max_attempts = self.policy.rate_limit_max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            "Rate limited (403), backing off"
                        );
                        self.sleeper.sleep(delay).await;
                        continue;
                    }

                    error!(status, "Unexpected status from {url}");
                    return Err(AppError::upstream_status(status, url));
                }
                Err(e) => {
                    let err = classify_request_error(url, e);
                    if !err.is_network_error() {
                        error!("Request failed for URL {url}: {err}");
                        return Err(err);
                    }

                    network_failures += 1;
                    if network_failures >= self.policy.network_max_attempts {
                        error!(
                            attempts = network_failures,
                            "Network retry budget exhausted: {err}"
                        );
                        return Err(err);
                    }
                    let delay = self.policy.network_delay(network_failures - 1);
                    warn!(
                        attempt = network_failures,
                        max_attempts = self.policy.network_max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Network error ({err}), retrying"
                    );
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }

    /// Fetches and decodes a JSON body, classifying decode failures.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let response = self.fetch(url).await?;
        parse_json(&response.body, url)
    }

    async fn send_once(&self, url: &str) -> Result<(u16, String), reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(REQUESTED_BY_HEADER, &self.requested_by)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Decodes `body`, telling malformed JSON apart from well-formed JSON of the wrong shape.
pub fn parse_json<T: DeserializeOwned>(body: &str, url: &str) -> Result<T, AppError> {
    serde_json::from_str::<T>(body).map_err(|e| {
        error!("Failed to parse API response: {e} (URL: {url})");
        let trimmed = body.trim_start();
        if trimmed.is_empty() {
            AppError::api_malformed_json("Response body is empty", url)
        } else if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            AppError::api_malformed_json("Response is not valid JSON", url)
        } else {
            AppError::api_unexpected_structure(e.to_string(), url)
        }
    })
}

fn classify_request_error(url: &str, e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::network_timeout(url)
    } else if e.is_connect() || e.is_request() || e.is_body() {
        AppError::network_connection(url, e.to_string())
    } else {
        AppError::ApiFetch(e)
    }
}

/// A 403 is an authorization failure, not throttling, when the body says so.
fn is_auth_rejection(body: &str) -> bool {
    const MARKERS: [&str; 5] = [
        "requested-by",
        "unauthori",
        "not authori",
        "authorization",
        "authorisation",
    ];
    let lower = body.to_ascii_lowercase();
    MARKERS.iter().any(|marker| lower.contains(marker))
}

fn summarize_body(body: &str, status: u16) -> String {
    let text: String = body.trim().chars().take(200).collect();
    if text.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {text}")
    }
}
