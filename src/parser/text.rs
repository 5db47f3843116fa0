use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>").unwrap());

const IGNORED: &[&str] = &["script", "style", "template", "noscript", "svg", "button"];
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "footer", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section",
    "table", "td", "th", "tr", "ul",
];

/// Raw text under `el` with line breaks at `<br>` and block boundaries.
/// Descendants matching any `skip` selector are left out.
pub fn element_text(el: ElementRef<'_>, skip: &[Selector]) -> String {
    let mut out = String::new();
    walk(el, skip, &mut out);
    out
}

fn walk(el: ElementRef<'_>, skip: &[Selector], out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child_el.value().name();
        if IGNORED.contains(&name) || skip.iter().any(|s| s.matches(&child_el)) {
            continue;
        }
        if name == "br" {
            out.push('\n');
            continue;
        }
        let block = BLOCKS.contains(&name);
        if block {
            out.push('\n');
        }
        walk(child_el, skip, out);
        if block {
            out.push('\n');
        }
    }
}

/// Drop anything that still looks like a tag, e.g. from escaped markup.
pub fn strip_tags(s: &str) -> String {
    TAG_RE.replace_all(s, " ").into_owned()
}

/// Collapse every whitespace run (newlines included) into one space.
pub fn single_line(raw: &str) -> Option<String> {
    let collapsed = strip_tags(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// Keep line structure: spaces collapse within a line, blank-line runs become one
/// blank line, and leading/trailing blank lines go.
pub fn multi_line(raw: &str) -> Option<String> {
    let stripped = strip_tags(raw);
    let mut lines: Vec<String> = Vec::new();
    for line in stripped.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    (!lines.is_empty()).then(|| lines.join("\n"))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first<'a>(doc: &'a Html, css: &str) -> ElementRef<'a> {
        doc.select(&Selector::parse(css).unwrap()).next().unwrap()
    }

    #[test]
    fn single_line_collapses_whitespace() {
        assert_eq!(single_line("  Jane   Doe\n").as_deref(), Some("Jane Doe"));
        assert_eq!(single_line("a\n\tb\u{a0}c").as_deref(), Some("a b c"));
    }

    #[test]
    fn single_line_empty_is_none() {
        assert_eq!(single_line(" \n\t "), None);
        assert_eq!(single_line("<b></b>"), None);
    }

    #[test]
    fn residual_tags_are_stripped() {
        assert_eq!(
            single_line("Senior <b>Engineer</b> at <a href=\"x\">Acme</a>").as_deref(),
            Some("Senior Engineer at Acme")
        );
        assert_eq!(single_line("a < b and c > d").as_deref(), Some("a < b and c > d"));
    }

    #[test]
    fn multi_line_keeps_inner_breaks() {
        let raw = "\n\n  First   line\nSecond line\n\n\n\nThird  \n\n";
        assert_eq!(
            multi_line(raw).as_deref(),
            Some("First line\nSecond line\n\nThird")
        );
    }

    #[test]
    fn multi_line_blank_is_none() {
        assert_eq!(multi_line("\n \n\t\n"), None);
    }

    #[test]
    fn element_text_breaks_at_blocks_and_br() {
        let doc = Html::parse_document(
            "<div id=x><p>One <b>bold</b></p><p>Two<br>Three</p><script>var a;</script></div>",
        );
        let raw = element_text(first(&doc, "#x"), &[]);
        assert_eq!(multi_line(&raw).as_deref(), Some("One bold\n\nTwo\nThree"));
    }

    #[test]
    fn element_text_honours_skip() {
        let doc = Html::parse_document("<section id=x><h2>About</h2><p>Hello there</p></section>");
        let skip = vec![Selector::parse("h2").unwrap()];
        let raw = element_text(first(&doc, "#x"), &skip);
        assert_eq!(single_line(&raw).as_deref(), Some("Hello there"));
    }

    #[test]
    fn entities_are_decoded() {
        let doc = Html::parse_document("<h1>Jane&nbsp;&amp;&nbsp;Co</h1>");
        let raw = element_text(first(&doc, "h1"), &[]);
        assert_eq!(single_line(&raw).as_deref(), Some("Jane & Co"));
    }
}
