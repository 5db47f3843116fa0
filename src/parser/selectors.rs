use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::SelectorError;

/// One way of pulling a value out of the page. Chains of these are tried in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Matcher {
    /// Text content of the first matching element, minus any `skip` descendants.
    Text {
        selector: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        skip: Vec<String>,
    },
    /// Attribute value of the first matching element carrying it.
    Attr {
        selector: String,
        attr: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        split: Option<String>,
        #[serde(default)]
        strict: bool,
    },
}

pub type Chain = Vec<Matcher>;

/// Where a repeated section lives and what its items look like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRule {
    pub container: Vec<String>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRules {
    pub section: SectionRule,
    pub title: Chain,
    pub company: Chain,
    pub date_range: Chain,
    pub description: Chain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRules {
    pub section: SectionRule,
    pub school: Chain,
    pub degree: Chain,
    pub date_range: Chain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificationRules {
    pub section: SectionRule,
    pub name: Chain,
    pub issuer: Chain,
}

/// Every selector chain the extractor uses, as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub name: Chain,
    pub headline: Chain,
    pub location: Chain,
    pub about: Chain,
    pub experience: ExperienceRules,
    pub education: EducationRules,
    pub certifications: CertificationRules,
    pub skills: SectionRule,
    pub languages: SectionRule,
}

fn text(selector: &str) -> Matcher {
    Matcher::Text {
        selector: selector.to_string(),
        skip: Vec::new(),
    }
}

fn texts(selectors: &[&str]) -> Chain {
    selectors.iter().map(|s| text(s)).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const DATE_RANGE: &[&str] = &["span[class*=date i]", "p[class*=date i]", "time"];

impl Default for SelectorConfig {
    fn default() -> Self {
        let mut name = texts(&["h1[class*=name i]", "h1[class*=top-card i]", "h1"]);
        name.push(Matcher::Attr {
            selector: r#"meta[property="og:title"]"#.into(),
            attr: "content".into(),
            split: Some("|".into()),
            strict: false,
        });

        let mut headline = texts(&["div[class*=headline i]", "h2[class*=top-card i]"]);
        headline.push(Matcher::Attr {
            selector: r#"meta[name="description"]"#.into(),
            attr: "content".into(),
            split: Some(" - ".into()),
            strict: true,
        });

        let about = ["section[class*=about i]", "div[class*=summary i]"]
            .iter()
            .map(|s| Matcher::Text {
                selector: s.to_string(),
                skip: strings(&["h2", "h3"]),
            })
            .collect();

        SelectorConfig {
            name,
            headline,
            location: texts(&["span[class*=location i]", "div[class*=location i]"]),
            about,
            experience: ExperienceRules {
                section: SectionRule {
                    container: strings(&[
                        "section[id*=experience i]",
                        "section[class*=experience i]",
                    ]),
                    items: strings(&["li", "div"]),
                },
                title: texts(&["h3[class*=title i]", "h4[class*=title i]", "h3", "h4"]),
                company: texts(&["span[class*=company i]", "p[class*=company i]"]),
                date_range: texts(DATE_RANGE),
                description: texts(&["div[class*=description i]", "p[class*=description i]"]),
            },
            education: EducationRules {
                section: SectionRule {
                    container: strings(&[
                        "section[id*=education i]",
                        "section[class*=education i]",
                    ]),
                    items: strings(&["li", "div"]),
                },
                school: texts(&["h3[class*=school i]", "h4[class*=school i]", "h3", "h4"]),
                degree: texts(&["span[class*=degree i]", "p[class*=degree i]"]),
                date_range: texts(DATE_RANGE),
            },
            certifications: CertificationRules {
                section: SectionRule {
                    container: strings(&[
                        "section[id*=certification i]",
                        "section[class*=certification i]",
                    ]),
                    items: strings(&["li", "div"]),
                },
                name: texts(&["h3", "h4"]),
                issuer: texts(&["span[class*=issuer i]", "p[class*=issuer i]"]),
            },
            skills: SectionRule {
                container: strings(&["section[class*=skills i]", "section[id*=skills i]"]),
                items: strings(&["span[class*=skill i]", "p[class*=skill i]", "li"]),
            },
            languages: SectionRule {
                container: strings(&["section[class*=language i]", "section[id*=language i]"]),
                items: strings(&["li", "span, p"]),
            },
        }
    }
}

impl SelectorConfig {
    /// Load chains from a JSON file; keys left out keep their built-in chains.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read selector file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse selector file {}", path.display()))
    }

    pub fn compile(&self) -> Result<Selectors, SelectorError> {
        Ok(Selectors {
            name: compile_chain(&self.name)?,
            headline: compile_chain(&self.headline)?,
            location: compile_chain(&self.location)?,
            about: compile_chain(&self.about)?,
            experience: CompiledExperience {
                section: compile_section(&self.experience.section)?,
                title: compile_chain(&self.experience.title)?,
                company: compile_chain(&self.experience.company)?,
                date_range: compile_chain(&self.experience.date_range)?,
                description: compile_chain(&self.experience.description)?,
            },
            education: CompiledEducation {
                section: compile_section(&self.education.section)?,
                school: compile_chain(&self.education.school)?,
                degree: compile_chain(&self.education.degree)?,
                date_range: compile_chain(&self.education.date_range)?,
            },
            certifications: CompiledCertifications {
                section: compile_section(&self.certifications.section)?,
                name: compile_chain(&self.certifications.name)?,
                issuer: compile_chain(&self.certifications.issuer)?,
            },
            skills: compile_section(&self.skills)?,
            languages: compile_section(&self.languages)?,
        })
    }
}

// ── Compiled form ──

/// A parsed CSS selector that remembers its source text for logs and reports.
#[derive(Debug, Clone)]
pub struct Css {
    pub source: String,
    pub selector: Selector,
}

#[derive(Debug, Clone)]
pub enum Probe {
    Text { css: Css, skip: Vec<Selector> },
    Attr { css: Css, attr: String, split: Option<String>, strict: bool },
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Text { css, .. } => write!(f, "{}", css.source),
            Probe::Attr { css, attr, .. } => write!(f, "{}@{}", css.source, attr),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompiledSection {
    pub container: Vec<Css>,
    pub items: Vec<Css>,
}

#[derive(Debug, Clone)]
pub struct CompiledExperience {
    pub section: CompiledSection,
    pub title: Vec<Probe>,
    pub company: Vec<Probe>,
    pub date_range: Vec<Probe>,
    pub description: Vec<Probe>,
}

#[derive(Debug, Clone)]
pub struct CompiledEducation {
    pub section: CompiledSection,
    pub school: Vec<Probe>,
    pub degree: Vec<Probe>,
    pub date_range: Vec<Probe>,
}

#[derive(Debug, Clone)]
pub struct CompiledCertifications {
    pub section: CompiledSection,
    pub name: Vec<Probe>,
    pub issuer: Vec<Probe>,
}

/// Ready-to-run selector chains. Build once, share across extraction calls.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub name: Vec<Probe>,
    pub headline: Vec<Probe>,
    pub location: Vec<Probe>,
    pub about: Vec<Probe>,
    pub experience: CompiledExperience,
    pub education: CompiledEducation,
    pub certifications: CompiledCertifications,
    pub skills: CompiledSection,
    pub languages: CompiledSection,
}

static BUILTIN: LazyLock<Selectors> = LazyLock::new(|| {
    SelectorConfig::default()
        .compile()
        .expect("built-in selector chains must compile")
});

impl Selectors {
    pub fn builtin() -> &'static Selectors {
        &BUILTIN
    }
}

fn parse_css(source: &str) -> Result<Css, SelectorError> {
    let selector = Selector::parse(source).map_err(|e| SelectorError::Invalid {
        selector: source.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Css {
        source: source.to_string(),
        selector,
    })
}

fn compile_matcher(m: &Matcher) -> Result<Probe, SelectorError> {
    match m {
        Matcher::Text { selector, skip } => Ok(Probe::Text {
            css: parse_css(selector)?,
            skip: skip
                .iter()
                .map(|s| parse_css(s).map(|c| c.selector))
                .collect::<Result<_, _>>()?,
        }),
        Matcher::Attr {
            selector,
            attr,
            split,
            strict,
        } => Ok(Probe::Attr {
            css: parse_css(selector)?,
            attr: attr.clone(),
            split: split.clone(),
            strict: *strict,
        }),
    }
}

fn compile_chain(chain: &[Matcher]) -> Result<Vec<Probe>, SelectorError> {
    chain.iter().map(compile_matcher).collect()
}

fn compile_section(rule: &SectionRule) -> Result<CompiledSection, SelectorError> {
    Ok(CompiledSection {
        container: rule
            .container
            .iter()
            .map(|s| parse_css(s))
            .collect::<Result<_, _>>()?,
        items: rule
            .items
            .iter()
            .map(|s| parse_css(s))
            .collect::<Result<_, _>>()?,
    })
}

// ── Tests ──
