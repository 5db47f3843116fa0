use std::fmt;

use chrono::Utc;
use scraper::Selector;

use super::extract::{self, Trace};
use super::selectors::Selectors;
use super::{parse_markup, text};
use crate::error::ExtractError;

/// What each selector chain found on a page. Used to diagnose markup drift.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub title: Option<String>,
    pub trace: Trace,
}

impl ProbeReport {
    /// True when the page would fail extraction.
    pub fn is_empty(&self) -> bool {
        self.trace.fields.iter().all(|f| f.hit.is_none())
            && self.trace.sections.iter().all(|s| s.kept == 0)
    }
}

/// Run every chain over `markup` without enforcing the all-fields-missing rule.
pub fn probe(markup: &[u8], selectors: &Selectors) -> Result<ProbeReport, ExtractError> {
    let doc = parse_markup(markup)?;
    let (_, trace) = extract::extract_all(&doc, selectors, "", Utc::now());

    let title = Selector::parse("title").ok().and_then(|sel| {
        doc.select(&sel)
            .next()
            .and_then(|el| text::single_line(&text::element_text(el, &[])))
    });

    Ok(ProbeReport { title, trace })
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Page title: {}", self.title.as_deref().unwrap_or("-"))?;
        writeln!(f)?;
        writeln!(f, "{:<10} | {:<4} | {:<32} | value", "field", "cand", "selector")?;
        writeln!(f, "{}", "-".repeat(72))?;
        for field in &self.trace.fields {
            match &field.hit {
                Some(hit) => writeln!(
                    f,
                    "{:<10} | {:>4} | {:<32} | {}",
                    field.field,
                    hit.candidate + 1,
                    truncate(&hit.source, 32),
                    truncate(&hit.value.replace('\n', " "), 60)
                )?,
                None => writeln!(f, "{:<10} | {:>4} | {:<32} | (not found)", field.field, "-", "-")?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:<14} | {:<32} | {:<12} | {:>5} | {:>4}",
            "section", "container", "items", "found", "kept"
        )?;
        writeln!(f, "{}", "-".repeat(78))?;
        for s in &self.trace.sections {
            writeln!(
                f,
                "{:<14} | {:<32} | {:<12} | {:>5} | {:>4}",
                s.section,
                truncate(s.container.as_deref().unwrap_or("(not found)"), 32),
                truncate(s.item_selector.as_deref().unwrap_or("-"), 12),
                s.items,
                s.kept
            )?;
        }
        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──
