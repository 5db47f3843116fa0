use scraper::ElementRef;
use tracing::debug;

use super::{first_value, scan, ItemShape, SectionTrace};
use crate::parser::selectors::CompiledEducation;
use crate::profile::Education;

pub fn extract(root: ElementRef<'_>, rules: &CompiledEducation) -> (Vec<Education>, SectionTrace) {
    let mut scanned = scan(root, "education", &rules.section, ItemShape::Outermost);
    let mut entries = Vec::new();

    for (idx, item) in scanned.items.iter().enumerate() {
        let entry = Education {
            school: first_value(*item, &rules.school, false),
            degree: first_value(*item, &rules.degree, false),
            date_range: first_value(*item, &rules.date_range, false),
        };
        if entry.is_empty() {
            debug!(item = idx, "education item has no fields, skipped");
            continue;
        }
        entries.push(entry);
    }

    scanned.trace.kept = entries.len();
    (entries, scanned.trace)
}

// ── Tests ──
