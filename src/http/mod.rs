//! HTTP transport module
//!
//! Provides the retrying transport used by every network-facing component:
//!
//! - **Automatic Retries**: bounded retry with exponential backoff on
//!   transient failures (timeouts, connection errors, 429/5xx)
//! - **Session Cookies**: a shared cookie jar that persists cookies received
//!   in responses for the rest of the run
//! - **Request Pacing**: token bucket pacer using governor, the polite delay
//!   between successive postbacks
//! - **Transport trait**: seam for substituting deterministic fakes in tests

mod client;
mod rate_limit;

pub use client::{
    BackoffType, FetchResponse, HttpClient, HttpClientConfig, HttpClientConfigBuilder, Transport,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
