use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, DNT, UPGRADE_INSECURE_REQUESTS};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::settings::Settings;

const LOGIN_MARKERS: &[&str] = &["authwall", "/login", "/signup", "/checkpoint"];

/// Source of raw profile markup.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Reject anything that is not a profile URL before a request goes out.
pub fn validate_url(url: &str, prefix: &str) -> Result<(), FetchError> {
    let rest = url.strip_prefix(prefix).unwrap_or("");
    if rest.trim_matches('/').is_empty() {
        return Err(FetchError::InvalidUrl {
            url: url.to_string(),
            prefix: prefix.to_string(),
        });
    }
    Ok(())
}

pub struct HttpFetcher {
    client: reqwest::Client,
    url_prefix: String,
    max_retries: u32,
    backoff: Duration,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(HttpFetcher {
            client,
            url_prefix: settings.url_prefix.clone(),
            max_retries: settings.max_retries,
            backoff: Duration::from_millis(settings.backoff_ms),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        let landed = response.url().as_str();
        if landed != url && LOGIN_MARKERS.iter().any(|m| landed.contains(m)) {
            return Err(FetchError::AuthWall(landed.to_string()));
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

/// `base * 2^attempt`, saturating instead of overflowing on large retry counts.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        validate_url(url, &self.url_prefix)?;

        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let backoff = backoff_delay(self.backoff, attempt);
                    warn!(
                        "{} on {} (attempt {}/{}), backing off {:.1}s",
                        e,
                        url,
                        attempt + 1,
                        self.max_retries,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

// ── Tests ──
