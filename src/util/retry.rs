//! Capped retry with exponential backoff and full jitter for outbound HTTP.

use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

/// Retry policy settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, the first one included.
    pub max_attempts: usize,
    /// Base delay in milliseconds.
    pub base_delay_ms: u64,
    /// Delay ceiling in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 4000,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub const fn new(max_attempts: usize, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// Delay to wait before retry number `attempt` (full jitter).
    ///
    /// `attempt` counts from 0; attempt 0 never waits.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::from_millis(0);
        }

        let shift = u32::try_from(attempt - 1).unwrap_or(u32::MAX);
        let exponential_delay = self
            .base_delay_ms
            .saturating_mul(1_u64.checked_shl(shift).unwrap_or(u64::MAX));
        let capped_delay = exponential_delay.min(self.max_delay_ms);

        let jittered_delay = if capped_delay > 0 {
            rand::rng().random_range(0..=capped_delay)
        } else {
            0
        };

        Duration::from_millis(jittered_delay)
    }

    /// Whether another attempt is allowed after `attempt` attempts have been made.
    #[must_use]
    pub const fn can_retry(&self, attempt: usize) -> bool {
        attempt < self.max_attempts
    }
}

/// Status codes worth another attempt: 429, 500, 502, 503, 504.
#[must_use]
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Transport-level failures (timeouts, refused connections) are retryable.
#[must_use]
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }
    error.status().is_some_and(is_retryable_status)
}

/// Sends the request produced by `build` until it yields a non-retryable
/// outcome or the attempt budget runs out.
///
/// The final response is returned whatever its status; callers decide what a
/// non-success status means for them.
///
/// # Errors
/// Returns the last transport error when every attempt failed to get a response.
pub async fn send_with_retry<F>(config: &RetryConfig, build: F) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;

    loop {
        attempt += 1;
        match build().send().await {
            Ok(response) => {
                let status = response.status();
                if !is_retryable_status(status) || !config.can_retry(attempt) {
                    if attempt > 1 {
                        debug!(attempt, %status, "request finished after retry");
                    }
                    return Ok(response);
                }
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    attempt,
                    %status,
                    delay_ms = delay.as_millis(),
                    "retryable status, retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }
            Err(error) => {
                if !is_retryable_error(&error) || !config.can_retry(attempt) {
                    return Err(error).context(format!("request failed after {attempt} attempt(s)"));
                }
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    attempt,
                    error = %error,
                    delay_ms = delay.as_millis(),
                    "request failed, retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn delay_for_attempt_zero_is_zero() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(0));
    }

    #[test]
    fn delay_for_attempt_grows_and_respects_cap() {
        let config = RetryConfig::new(10, 100, 500);

        assert!(config.delay_for_attempt(1) <= Duration::from_millis(100));
        assert!(config.delay_for_attempt(2) <= Duration::from_millis(200));
        assert!(config.delay_for_attempt(3) <= Duration::from_millis(400));
        assert!(config.delay_for_attempt(70) <= Duration::from_millis(500));
    }

    #[test]
    fn can_retry_respects_max_attempts() {
        let config = RetryConfig::new(3, 100, 1000);

        assert!(config.can_retry(1));
        assert!(config.can_retry(2));
        assert!(!config.can_retry(3));
    }

    #[rstest]
    #[case(429, true)]
    #[case(500, true)]
    #[case(502, true)]
    #[case(503, true)]
    #[case(504, true)]
    #[case(404, false)]
    #[case(401, false)]
    #[case(501, false)]
    fn retryable_status_set(#[case] code: u16, #[case] expected: bool) {
        let status = StatusCode::from_u16(code).expect("valid status");
        assert_eq!(is_retryable_status(status), expected);
    }

    #[tokio::test]
    async fn send_with_retry_recovers_from_503() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/flaky", server.uri());
        let config = RetryConfig::new(3, 1, 2);

        let response = send_with_retry(&config, || client.get(&url))
            .await
            .expect("request succeeds");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.expect("body"), "ok");
    }

    #[tokio::test]
    async fn send_with_retry_does_not_retry_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/missing", server.uri());
        let config = RetryConfig::new(3, 1, 2);

        let response = send_with_retry(&config, || client.get(&url))
            .await
            .expect("response returned");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn send_with_retry_gives_up_after_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/down"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/down", server.uri());
        let config = RetryConfig::new(3, 1, 2);

        let response = send_with_retry(&config, || client.get(&url))
            .await
            .expect("response returned");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
