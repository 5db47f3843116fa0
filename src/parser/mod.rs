pub mod extract;
pub mod probe;
pub mod selectors;
pub mod text;

use chrono::{DateTime, Utc};
use scraper::Html;
use tracing::debug;

use crate::error::ExtractError;
use crate::profile::Profile;
use selectors::Selectors;

/// Markup → Profile. Fails only on non-markup input or when no field at all is found.
pub fn extract_profile(
    markup: &[u8],
    url: &str,
    selectors: &Selectors,
) -> Result<Profile, ExtractError> {
    extract_profile_at(markup, url, selectors, Utc::now())
}

/// Same as [`extract_profile`] with a caller-supplied timestamp.
pub fn extract_profile_at(
    markup: &[u8],
    url: &str,
    selectors: &Selectors,
    scraped_at: DateTime<Utc>,
) -> Result<Profile, ExtractError> {
    let doc = parse_markup(markup)?;
    let (profile, trace) = extract::extract_all(&doc, selectors, url, scraped_at);
    if profile.is_empty() {
        debug!(url, "no targeted field present");
        return Err(ExtractError::ExtractionFailed);
    }
    debug!(
        url,
        fields = trace.fields.iter().filter(|f| f.hit.is_some()).count(),
        "profile extracted"
    );
    Ok(profile)
}

/// Check the bytes look like markup, then build the DOM.
pub fn parse_markup(markup: &[u8]) -> Result<Html, ExtractError> {
    let text = std::str::from_utf8(markup)
        .map_err(|e| ExtractError::MalformedInput(format!("not UTF-8 text ({e})")))?;

    if let Some(c) = text
        .chars()
        .find(|c| (*c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r' | '\u{c}'))
    {
        return Err(ExtractError::MalformedInput(format!(
            "control character U+{:04X} in input",
            c as u32
        )));
    }

    if !has_tag(text) {
        return Err(ExtractError::MalformedInput("no markup tags found".into()));
    }

    Ok(Html::parse_document(text))
}

fn has_tag(text: &str) -> bool {
    text.as_bytes()
        .windows(2)
        .any(|w| w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'!' || w[1] == b'/'))
}

// ── Tests ──
