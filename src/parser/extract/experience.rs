use scraper::ElementRef;
use tracing::debug;

use super::{first_value, scan, ItemShape, SectionTrace};
use crate::parser::selectors::CompiledExperience;
use crate::profile::Experience;

pub fn extract(root: ElementRef<'_>, rules: &CompiledExperience) -> (Vec<Experience>, SectionTrace) {
    let mut scanned = scan(root, "experience", &rules.section, ItemShape::Outermost);
    let mut entries = Vec::new();

    for (idx, item) in scanned.items.iter().enumerate() {
        let entry = Experience {
            title: first_value(*item, &rules.title, false),
            company: first_value(*item, &rules.company, false),
            date_range: first_value(*item, &rules.date_range, false),
            description: first_value(*item, &rules.description, true),
        };
        if entry.is_empty() {
            debug!(item = idx, "experience item has no fields, skipped");
            continue;
        }
        entries.push(entry);
    }

    scanned.trace.kept = entries.len();
    (entries, scanned.trace)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::selectors::Selectors;
    use scraper::Html;

    fn experience(html: &str) -> (Vec<Experience>, SectionTrace) {
        let doc = Html::parse_document(html);
        extract(doc.root_element(), &Selectors::builtin().experience)
    }

    #[test]
    fn items_in_document_order() {
        let (items, trace) = experience(
            r#"<section id="experience-section"><h2>Experience</h2><ul>
                <li><h3 class="job-title">Staff Engineer</h3>
                    <p class="company-name">Acme</p>
                    <span class="date-range">2021 - Present</span>
                    <div class="description"><p>Led the platform team.</p><p>Shipped v2.</p></div></li>
                <li><h3 class="job-title">Engineer</h3>
                    <p class="company-name">Initech</p></li>
            </ul></section>"#,
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("Staff Engineer"));
        assert_eq!(items[0].company.as_deref(), Some("Acme"));
        assert_eq!(items[0].date_range.as_deref(), Some("2021 - Present"));
        assert_eq!(
            items[0].description.as_deref(),
            Some("Led the platform team.\n\nShipped v2.")
        );
        assert_eq!(items[1].title.as_deref(), Some("Engineer"));
        assert_eq!(items[1].date_range, None);
        assert_eq!(trace.item_selector.as_deref(), Some("li"));
        assert_eq!(trace.kept, 2);
    }

    #[test]
    fn empty_item_is_skipped_not_fatal() {
        let (items, trace) = experience(
            r#"<section class="experience"><ul>
                <li><img src="logo.png"></li>
                <li><h4 class="title">Intern</h4></li>
            </ul></section>"#,
        );
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title.as_deref(), Some("Intern"));
        assert_eq!(trace.items, 2);
        assert_eq!(trace.kept, 1);
    }

    #[test]
    fn falls_back_to_div_items() {
        let (items, trace) = experience(
            r#"<section class="experience">
                <div><h3>Consultant</h3><span class="company">Self</span></div>
                <div><h3>Analyst</h3></div>
            </section>"#,
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].title.as_deref(), Some("Analyst"));
        assert_eq!(trace.item_selector.as_deref(), Some("div"));
    }

    #[test]
    fn wrapper_div_keeps_every_entry() {
        let (items, trace) = experience(
            r#"<section class="experience"><div class="list">
                <div><h3>Staff Engineer</h3><span class="company">Acme</span></div>
                <div><h3>Engineer</h3><span class="company">Initech</span></div>
            </div></section>"#,
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("Staff Engineer"));
        assert_eq!(items[1].title.as_deref(), Some("Engineer"));
        assert_eq!(items[1].company.as_deref(), Some("Initech"));
        assert_eq!(trace.kept, 2);
    }

    #[test]
    fn no_section_no_items() {
        let (items, trace) = experience("<h1>Jane</h1>");
        assert!(items.is_empty());
        assert!(trace.container.is_none());
    }
}
