//! Shared plumbing for provider HTTP calls.

use std::time::Duration;

/// Base URL of the Google Generative Language API.
pub(crate) const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the Google API key.
pub(crate) const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// POST a JSON body and return the parsed JSON response, retrying transient
/// failures with exponential backoff.
///
/// Retry strategy:
/// - HTTP 429 or 5xx → retry with backoff (1s, 2s, 4s, …, capped at 32s)
/// - other non-success status → fail immediately
/// - network error → retry
///
/// Errors come back as plain strings for the caller to wrap in its own
/// error variant.
pub(crate) async fn post_json_with_retry(
    client: &reqwest::Client,
    url: &str,
    headers: &[(&str, String)],
    body: &serde_json::Value,
    max_retries: u32,
) -> Result<serde_json::Value, String> {
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let mut request = client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return response
                        .json::<serde_json::Value>()
                        .await
                        .map_err(|e| format!("invalid JSON response: {e}"));
                }

                let body_text = response.text().await.unwrap_or_default();
                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(format!("HTTP {status}: {body_text}"));
                    continue;
                }

                return Err(format!("HTTP {status}: {body_text}"));
            }
            Err(e) => {
                last_err = Some(e.to_string());
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| "request failed after retries".to_string()))
}
