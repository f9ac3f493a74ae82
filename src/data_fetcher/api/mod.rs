pub mod client;
pub mod fetch_utils;
pub mod http_client;
pub mod normalize;
pub mod urls;

pub use client::SnookerApi;
pub use fetch_utils::{RateAwareFetcher, RawResponse, RetryPolicy, Sleeper, TokioSleeper};
pub use http_client::create_http_client_with_timeout;
pub use urls::*;
