pub mod certifications;
pub mod education;
pub mod experience;
pub mod lists;

use chrono::{DateTime, Utc};
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::selectors::{CompiledSection, Css, Probe, Selectors};
use super::text;
use crate::profile::Profile;

/// A chain candidate that produced a value.
#[derive(Debug, Clone)]
pub struct Hit {
    pub candidate: usize,
    pub source: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct FieldTrace {
    pub field: &'static str,
    pub hit: Option<Hit>,
}

/// How a repeated section was located and how many of its items survived.
#[derive(Debug, Clone, Default)]
pub struct SectionTrace {
    pub section: &'static str,
    pub container: Option<String>,
    pub item_selector: Option<String>,
    pub items: usize,
    pub kept: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Trace {
    pub fields: Vec<FieldTrace>,
    pub sections: Vec<SectionTrace>,
}

/// Run every chain against the document. Never fails: absent fields stay empty.
pub fn extract_all(
    doc: &Html,
    selectors: &Selectors,
    url: &str,
    scraped_at: DateTime<Utc>,
) -> (Profile, Trace) {
    let root = doc.root_element();
    let mut trace = Trace::default();
    let mut profile = Profile::new(url, scraped_at);

    profile.name = scalar(root, "name", &selectors.name, false, &mut trace);
    profile.headline = scalar(root, "headline", &selectors.headline, false, &mut trace);
    profile.location = scalar(root, "location", &selectors.location, false, &mut trace);
    profile.about = scalar(root, "about", &selectors.about, true, &mut trace);

    let (experience, t) = experience::extract(root, &selectors.experience);
    profile.experience = experience;
    trace.sections.push(t);

    let (education, t) = education::extract(root, &selectors.education);
    profile.education = education;
    trace.sections.push(t);

    let (skills, t) = lists::extract(root, "skills", &selectors.skills);
    profile.skills = skills;
    trace.sections.push(t);

    let (languages, t) = lists::extract(root, "languages", &selectors.languages);
    profile.languages = languages;
    trace.sections.push(t);

    let (certifications, t) = certifications::extract(root, &selectors.certifications);
    profile.certifications = certifications;
    trace.sections.push(t);

    (profile, trace)
}

fn scalar(
    scope: ElementRef<'_>,
    field: &'static str,
    chain: &[Probe],
    multiline: bool,
    trace: &mut Trace,
) -> Option<String> {
    let hit = first_hit(scope, chain, multiline);
    match &hit {
        Some(h) => debug!(field, candidate = h.candidate, selector = %h.source, "field matched"),
        None => debug!(field, "field not found"),
    }
    let value = hit.as_ref().map(|h| h.value.clone());
    trace.fields.push(FieldTrace { field, hit });
    value
}

/// Try each candidate in order; the first one yielding non-empty text wins.
pub fn first_hit(scope: ElementRef<'_>, chain: &[Probe], multiline: bool) -> Option<Hit> {
    chain.iter().enumerate().find_map(|(candidate, probe)| {
        run_probe(scope, probe, multiline).map(|value| Hit {
            candidate,
            source: probe.to_string(),
            value,
        })
    })
}

/// Value of the first field-level match, within `scope`.
pub fn first_value(scope: ElementRef<'_>, chain: &[Probe], multiline: bool) -> Option<String> {
    first_hit(scope, chain, multiline).map(|h| h.value)
}

fn run_probe(scope: ElementRef<'_>, probe: &Probe, multiline: bool) -> Option<String> {
    let normalize = |raw: &str| {
        if multiline {
            text::multi_line(raw)
        } else {
            text::single_line(raw)
        }
    };

    match probe {
        Probe::Text { css, skip } => scope
            .select(&css.selector)
            .find_map(|el| normalize(&text::element_text(el, skip))),
        Probe::Attr {
            css,
            attr,
            split,
            strict,
        } => scope.select(&css.selector).find_map(|el| {
            let raw = el.value().attr(attr)?;
            let raw = match split.as_deref() {
                Some(delim) => match raw.split_once(delim) {
                    Some((head, _)) => head,
                    None if *strict => return None,
                    None => raw,
                },
                None => raw,
            };
            normalize(raw)
        }),
    }
}

// ── Section scanning ──

static LIST_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("static selector"));

/// The container of a section and the item elements found under it.
pub struct Scan<'a> {
    pub trace: SectionTrace,
    pub items: Vec<ElementRef<'a>>,
}

#[derive(Clone, Copy)]
pub enum ItemShape {
    /// Outermost matches: a match nested in another match belongs to it.
    Outermost,
    /// Innermost matches: a match containing another match is a wrapper.
    Leaf,
}

/// First container candidate present in the document, then the first item
/// candidate yielding anything inside it.
pub fn scan<'a>(
    root: ElementRef<'a>,
    section: &'static str,
    rule: &CompiledSection,
    shape: ItemShape,
) -> Scan<'a> {
    let mut trace = SectionTrace {
        section,
        ..Default::default()
    };

    let Some((container_css, container)) = rule
        .container
        .iter()
        .find_map(|css| root.select(&css.selector).next().map(|el| (css, el)))
    else {
        debug!(section, "section not found");
        return Scan {
            trace,
            items: Vec::new(),
        };
    };
    trace.container = Some(container_css.source.clone());

    let found = rule.items.iter().find_map(|css: &Css| {
        let items = match shape {
            ItemShape::Outermost => outermost(container, &css.selector),
            ItemShape::Leaf => leaves(container, &css.selector),
        };
        (!items.is_empty()).then_some((css, items))
    });

    let items = match found {
        Some((css, items)) => {
            trace.item_selector = Some(css.source.clone());
            trace.items = items.len();
            items
        }
        None => Vec::new(),
    };
    debug!(
        section,
        container = %container_css.source,
        items = items.len(),
        "section scanned"
    );

    Scan { trace, items }
}

/// Outermost matches under `container`. A lone match holding several matches
/// is a wrapper around the real items, so the search moves inside it.
fn outermost<'a>(container: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    let mut scope = container;
    loop {
        let items = outermost_in(scope, selector);
        match items.as_slice() {
            [only] if outermost_in(*only, selector).len() > 1 => scope = *only,
            _ => return items,
        }
    }
}

fn outermost_in<'a>(scope: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    scope
        .select(selector)
        .filter(|el| {
            !el.ancestors()
                .take_while(|a| *a != *scope)
                .filter_map(ElementRef::wrap)
                .any(|a| selector.matches(&a))
        })
        .collect()
}

/// Innermost matches. Headings and list wrappers are never list items.
fn leaves<'a>(container: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    container
        .select(selector)
        .filter(|el| el.select(selector).next().is_none())
        .filter(|el| !is_heading(el) && el.select(&LIST_ITEM).next().is_none())
        .collect()
}

fn is_heading(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

// ── Tests ──
