use chrono::SecondsFormat;

use crate::profile::Profile;

pub const TITLE_PLACEHOLDER: &str = "Unknown Profile";

/// Profile → Markdown. Pure: the same record always renders to the same bytes.
pub fn render_markdown(profile: &Profile) -> String {
    let mut md: Vec<String> = Vec::new();

    // ── Header ──
    md.push(format!(
        "# {}",
        profile.name.as_deref().unwrap_or(TITLE_PLACEHOLDER)
    ));
    md.push(String::new());

    if let Some(headline) = &profile.headline {
        md.push(format!("**{}**", headline));
        md.push(String::new());
    }
    if let Some(location) = &profile.location {
        md.push(format!("📍 {}", location));
        md.push(String::new());
    }
    md.push(format!("🔗 [LinkedIn Profile]({})", profile.profile_url));
    md.push(String::new());
    md.push("---".into());
    md.push(String::new());

    // ── Body ──
    if let Some(about) = &profile.about {
        heading(&mut md, "About");
        md.push(about.clone());
        md.push(String::new());
    }

    let experience: Vec<_> = profile.experience.iter().filter(|e| !e.is_empty()).collect();
    if !experience.is_empty() {
        heading(&mut md, "Experience");
        for exp in experience {
            push_opt(&mut md, exp.title.as_deref(), |t| format!("### {}", t));
            push_opt(&mut md, exp.company.as_deref(), |c| format!("**{}**", c));
            push_opt(&mut md, exp.date_range.as_deref(), |d| format!("*{}*", d));
            if let Some(desc) = &exp.description {
                md.push(String::new());
                md.push(desc.clone());
            }
            md.push(String::new());
        }
    }

    let education: Vec<_> = profile.education.iter().filter(|e| !e.is_empty()).collect();
    if !education.is_empty() {
        heading(&mut md, "Education");
        for edu in education {
            push_opt(&mut md, edu.school.as_deref(), |s| format!("### {}", s));
            push_opt(&mut md, edu.degree.as_deref(), |d| format!("**{}**", d));
            push_opt(&mut md, edu.date_range.as_deref(), |d| format!("*{}*", d));
            md.push(String::new());
        }
    }

    bullet_section(&mut md, "Skills", &profile.skills);
    bullet_section(&mut md, "Languages", &profile.languages);

    let certifications: Vec<_> = profile
        .certifications
        .iter()
        .filter(|c| !c.is_empty())
        .collect();
    if !certifications.is_empty() {
        heading(&mut md, "Certifications");
        for cert in certifications {
            push_opt(&mut md, cert.name.as_deref(), |n| format!("### {}", n));
            push_opt(&mut md, cert.issuer.as_deref(), |i| format!("*Issued by: {}*", i));
            md.push(String::new());
        }
    }

    // ── Footer ──
    md.push("---".into());
    md.push(String::new());
    md.push(format!(
        "*Profile scraped on: {}*",
        profile.scraped_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));

    let mut out = md.join("\n");
    out.push('\n');
    out
}

fn heading(md: &mut Vec<String>, title: &str) {
    md.push(format!("## {}", title));
    md.push(String::new());
}

fn push_opt(md: &mut Vec<String>, value: Option<&str>, fmt: impl Fn(&str) -> String) {
    if let Some(v) = value {
        md.push(fmt(v));
    }
}

fn bullet_section(md: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    heading(md, title);
    for item in items {
        md.push(format!("- {}", item));
    }
    md.push(String::new());
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Certification, Education, Experience};

    const HEADINGS: &[&str] = &[
        "## About",
        "## Experience",
        "## Education",
        "## Skills",
        "## Languages",
        "## Certifications",
    ];

    fn base() -> Profile {
        Profile::new(
            "https://www.linkedin.com/in/jane-doe",
            "2026-10-16T09:30:00Z".parse().unwrap(),
        )
    }

    fn full() -> Profile {
        let mut p = base();
        p.name = Some("Jane Doe".into());
        p.headline = Some("Engineer".into());
        p.location = Some("Berlin".into());
        p.about = Some("Line one.\nLine two.".into());
        p.experience = vec![
            Experience {
                title: Some("Staff Engineer".into()),
                company: Some("Acme".into()),
                date_range: Some("2021 - Present".into()),
                description: Some("Storage.".into()),
            },
            Experience {
                title: Some("Engineer".into()),
                company: Some("Initech".into()),
                ..Default::default()
            },
        ];
        p.education = vec![Education {
            school: Some("TU Berlin".into()),
            degree: Some("MSc".into()),
            date_range: Some("2012 - 2014".into()),
        }];
        p.skills = vec!["Rust".into(), "Go".into()];
        p.languages = vec!["English".into()];
        p.certifications = vec![Certification {
            name: Some("CKA".into()),
            issuer: Some("Linux Foundation".into()),
        }];
        p
    }

    #[test]
    fn full_document_layout() {
        let expected = "\
# Jane Doe

**Engineer**

📍 Berlin

🔗 [LinkedIn Profile](https://www.linkedin.com/in/jane-doe)

---

## About

Line one.
Line two.

## Experience

### Staff Engineer
**Acme**
*2021 - Present*

Storage.

### Engineer
**Initech**

## Education

### TU Berlin
**MSc**
*2012 - 2014*

## Skills

- Rust
- Go

## Languages

- English

## Certifications

### CKA
*Issued by: Linux Foundation*

---

*Profile scraped on: 2026-10-16T09:30:00Z*
";
        assert_eq!(render_markdown(&full()), expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let p = full();
        assert_eq!(render_markdown(&p), render_markdown(&p));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let doc = render_markdown(&base());
        for h in HEADINGS {
            assert!(!doc.contains(h), "unexpected heading {h}");
        }
        assert!(doc.starts_with("# Unknown Profile\n"));
        assert!(doc.contains("🔗 [LinkedIn Profile](https://www.linkedin.com/in/jane-doe)"));
        assert!(doc.ends_with("*Profile scraped on: 2026-10-16T09:30:00Z*\n"));
    }

    #[test]
    fn present_headings_appear_once() {
        let doc = render_markdown(&full());
        for h in HEADINGS {
            assert_eq!(doc.matches(&format!("{h}\n")).count(), 1, "heading {h}");
        }
    }

    #[test]
    fn item_order_is_preserved() {
        let mut p = base();
        p.skills = vec!["Zig".into(), "Ada".into(), "Go".into(), "Ada".into()];
        let doc = render_markdown(&p);
        let zig = doc.find("- Zig").unwrap();
        let ada = doc.find("- Ada").unwrap();
        let go = doc.find("- Go").unwrap();
        assert!(zig < ada && ada < go);
        assert_eq!(doc.matches("- Ada").count(), 2);
    }

    #[test]
    fn all_empty_entries_skip_the_section() {
        let mut p = base();
        p.name = Some("Jane".into());
        p.experience = vec![Experience::default()];
        p.certifications = vec![Certification::default()];
        let doc = render_markdown(&p);
        assert!(!doc.contains("## Experience"));
        assert!(!doc.contains("## Certifications"));
    }

    #[test]
    fn certification_without_issuer() {
        let mut p = base();
        p.certifications = vec![Certification {
            name: Some("CKA".into()),
            issuer: None,
        }];
        let doc = render_markdown(&p);
        assert!(doc.contains("## Certifications\n\n### CKA\n\n---"));
        assert!(!doc.contains("Issued by"));
    }

    #[test]
    fn name_headline_skills_scenario() {
        let mut p = base();
        p.name = Some("Jane Doe".into());
        p.headline = Some("Engineer".into());
        p.skills = vec!["Go".into(), "SQL".into()];
        let doc = render_markdown(&p);
        assert!(doc.lines().any(|l| l == "# Jane Doe"));
        assert!(doc.lines().any(|l| l == "**Engineer**"));
        assert!(doc.contains("## Skills\n\n- Go\n- SQL\n"));
        for h in ["## Experience", "## Education", "## Languages", "## Certifications"] {
            assert!(!doc.contains(h));
        }
    }
}
