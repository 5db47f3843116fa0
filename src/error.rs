use thiserror::Error;

/// Fatal outcomes of a single extraction call. A missing field is never one of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("input is not HTML markup: {0}")]
    MalformedInput(String),

    #[error("no profile fields found; the profile may be private or unavailable")]
    ExtractionFailed,
}

/// Every variant is a failed fetch; callers only need the message.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not a profile URL (expected prefix {prefix}): {url}")]
    InvalidUrl { url: String, prefix: String },

    #[error("HTTP {0}")]
    Status(u16),

    #[error("redirected to a login wall: {0}")]
    AuthWall(String),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Rate limits, server errors and timeouts are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status(code) => *code == 429 || (500..600).contains(code),
            FetchError::Timeout => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Why one profile in a batch produced no document.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("invalid selector `{selector}`: {reason}")]
    Invalid { selector: String, reason: String },
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_failed_message_is_actionable() {
        let msg = ExtractError::ExtractionFailed.to_string();
        assert!(msg.contains("private or unavailable"));
    }

    #[test]
    fn retryable_statuses() {
        assert!(FetchError::Status(429).is_retryable());
        assert!(FetchError::Status(503).is_retryable());
        assert!(FetchError::Timeout.is_retryable());
        assert!(!FetchError::Status(404).is_retryable());
        assert!(!FetchError::AuthWall("https://x/authwall".into()).is_retryable());
    }
}
