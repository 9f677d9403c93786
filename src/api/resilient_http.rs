//! HTTP GET with retry and timeout middleware.
//!
//! Network errors and server errors are retried with exponential backoff, rate limiting (429) is retried
//! after the delay requested by the server. Each attempt is bounded by its own timeout.

use core::time::Duration;
use layered::{Execute, Service, Stack};
use ohno::{IntoAppError, app_err};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use seatbelt::retry::{Backoff, Retry};
use seatbelt::timeout::Timeout;
use seatbelt::{RecoveryInfo, ResilienceContext};
use tick::Clock;

/// Log target for HTTP retries
const LOG_TARGET: &str = "      http";

/// Base delay for exponential backoff between retries.
const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Delay used when a 429 response carries no usable `Retry-After` header.
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);

/// Parse the `Retry-After` header value as seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    let s = headers.get(RETRY_AFTER).and_then(|h| h.to_str().ok())?;
    s.trim().parse::<u64>().ok()
}

/// How long to wait before retrying a rate-limited request.
fn rate_limit_delay(headers: &HeaderMap) -> Duration {
    parse_retry_after(headers).map_or(DEFAULT_RATE_LIMIT_DELAY, Duration::from_secs)
}

/// Classify an HTTP response for retry purposes.
fn should_retry_response(result: &crate::Result<Response>) -> RecoveryInfo {
    match result {
        // Network / connection errors and timeouts are always transient.
        Err(_) => RecoveryInfo::retry(),

        Ok(resp) if resp.status().is_server_error() => RecoveryInfo::retry(),

        Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => RecoveryInfo::retry().delay(rate_limit_delay(resp.headers())),

        // Everything else (success, 4xx client errors) is not retried.
        Ok(_) => RecoveryInfo::never(),
    }
}

/// Send an HTTP GET request, retrying up to `max_retries` times on top of the first attempt and giving up on
/// any attempt that takes longer than `timeout`.
///
/// The final response is returned whatever its status; classifying it as success or failure is up to the caller.
///
/// # Errors
///
/// Returns an error if the last attempt fails at the transport level or times out.
pub async fn resilient_get(client: &Client, url: &str, max_retries: u32, timeout: Duration) -> crate::Result<Response> {
    let clock = Clock::new_tokio();
    let context = ResilienceContext::new(&clock).name("http_get");

    let client = client.clone();
    let logged_url = url.to_string();
    let service = (
        Retry::layer("retry", &context)
            .clone_input()
            .recovery_with(|result: &crate::Result<Response>, _| should_retry_response(result))
            .max_retry_attempts(max_retries)
            .base_delay(RETRY_BASE_DELAY)
            .backoff(Backoff::Exponential)
            .on_retry(move |_output, args| {
                log::debug!(
                    target: LOG_TARGET,
                    "retrying HTTP GET {logged_url} (attempt {}, delay {}ms)",
                    args.attempt().index() + 1,
                    args.retry_delay().as_millis(),
                );
            }),
        Timeout::layer("timeout", &context)
            .timeout_error(move |_| app_err!("HTTP GET timed out after {}s", timeout.as_secs()))
            .timeout(timeout),
        Execute::new(move |url: String| {
            let client = client.clone();
            async move {
                client
                    .get(&url)
                    .send()
                    .await
                    .into_app_err_with(|| format!("HTTP GET {url} failed"))
            }
        }),
    )
        .into_service();

    service.execute(url.to_string()).await
}
