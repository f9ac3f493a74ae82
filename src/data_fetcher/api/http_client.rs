//! HTTP client creation and configuration utilities

use reqwest::Client;
use std::time::Duration;

/// Creates an HTTP client with connection pooling and a per-request timeout.
///
/// A request exceeding the timeout surfaces as a network timeout from the
/// fetcher, never as a rate-limit response.
pub fn create_http_client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(crate::constants::HTTP_POOL_MAX_IDLE_PER_HOST)
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
}

/// Creates an HTTP client for testing with default timeout
#[cfg(test)]
pub fn create_test_http_client() -> Client {
    create_http_client_with_timeout(Duration::from_secs(
        crate::constants::DEFAULT_HTTP_TIMEOUT_SECONDS,
    ))
    .expect("Failed to create test HTTP client")
}
