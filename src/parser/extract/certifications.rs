use scraper::ElementRef;
use tracing::debug;

use super::{first_value, scan, ItemShape, SectionTrace};
use crate::parser::selectors::CompiledCertifications;
use crate::profile::Certification;

pub fn extract(
    root: ElementRef<'_>,
    rules: &CompiledCertifications,
) -> (Vec<Certification>, SectionTrace) {
    let mut scanned = scan(root, "certifications", &rules.section, ItemShape::Outermost);
    let mut entries = Vec::new();

    for (idx, item) in scanned.items.iter().enumerate() {
        let entry = Certification {
            name: first_value(*item, &rules.name, false),
            issuer: first_value(*item, &rules.issuer, false),
        };
        if entry.is_empty() {
            debug!(item = idx, "certification item has no fields, skipped");
            continue;
        }
        entries.push(entry);
    }

    scanned.trace.kept = entries.len();
    (entries, scanned.trace)
}

// ── Tests ──
