//! HTTP retry helper shared by the chat transport.

use reqwest::{Response, StatusCode};
use std::time::Duration;
use tracing::warn;

const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Whether a response status is worth another attempt, and with what delay.
/// 429 honors the `Retry-After` header; 5xx uses the caller's backoff.
fn retry_delay(response: &Response, fallback: Duration) -> Option<Duration> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs);
        return Some(after.unwrap_or(fallback));
    }
    if status.is_server_error() {
        return Some(fallback);
    }
    None
}

/// Retries a request closure with exponential backoff.
///
/// Retries on network errors, 429 (respecting `Retry-After`) and 5xx.
/// Other error statuses are returned to the caller to parse; network errors
/// past the retry limit become the error string.
pub async fn request_with_retry<F, Fut>(mut task: F, max_retries: u32) -> Result<Response, String>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 0;
    let mut backoff = Duration::from_millis(1000);

    loop {
        attempt += 1;
        match task().await {
            Ok(response) => {
                if response.status().is_success() || attempt > max_retries {
                    return Ok(response);
                }
                match retry_delay(&response, backoff) {
                    Some(delay) => {
                        warn!(
                            "[HTTP] status {} from request, retrying in {:?} (attempt {}/{})",
                            response.status(),
                            delay,
                            attempt,
                            max_retries
                        );
                        tokio::time::sleep(delay).await;
                        backoff = std::cmp::min(backoff * 2, MAX_BACKOFF);
                    }
                    // Client errors (400, 401, 404...) are likely permanent.
                    None => return Ok(response),
                }
            }
            Err(e) => {
                if attempt > max_retries {
                    return Err(format!(
                        "network request failed after {} attempts: {}",
                        max_retries, e
                    ));
                }
                warn!(
                    "[HTTP] network error: {}, retrying in {:?} (attempt {}/{})",
                    e, backoff, attempt, max_retries
                );
                tokio::time::sleep(backoff).await;
                backoff = std::cmp::min(backoff * 2, MAX_BACKOFF);
            }
        }
    }
}
