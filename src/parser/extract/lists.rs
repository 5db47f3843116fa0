use scraper::ElementRef;

use super::{scan, ItemShape, SectionTrace};
use crate::parser::selectors::CompiledSection;
use crate::parser::text;

/// Text of every leaf item in the section, trimmed; blanks dropped, duplicates kept.
pub fn extract(
    root: ElementRef<'_>,
    section: &'static str,
    rule: &CompiledSection,
) -> (Vec<String>, SectionTrace) {
    let mut scanned = scan(root, section, rule, ItemShape::Leaf);
    let labels: Vec<String> = scanned
        .items
        .iter()
        .filter_map(|el| text::single_line(&text::element_text(*el, &[])))
        .collect();

    scanned.trace.kept = labels.len();
    (labels, scanned.trace)
}

// ── Tests ──
