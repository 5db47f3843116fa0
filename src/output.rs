use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::profile::Profile;
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    #[default]
    Markdown,
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Markdown => "md",
            Format::Json => "json",
        }
    }

    pub fn render(self, profile: &Profile) -> Result<String> {
        match self {
            Format::Markdown => Ok(render::render_markdown(profile)),
            Format::Json => {
                let mut json = serde_json::to_string_pretty(profile)
                    .context("Failed to serialize profile")?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

/// `<Name>_profile.<ext>`, with every non-identifier character replaced by `_`.
pub fn profile_filename(profile: &Profile, format: Format) -> String {
    let stem: String = profile
        .name
        .as_deref()
        .unwrap_or("")
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if stem.is_empty() {
        format!("profile.{}", format.extension())
    } else {
        format!("{}_profile.{}", stem, format.extension())
    }
}

pub fn write_document(dir: &Path, filename: &str, contents: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = dir.join(filename);
    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// First `max` characters of a document, for a console preview.
pub fn preview(doc: &str, max: usize) -> String {
    if doc.chars().count() <= max {
        doc.to_string()
    } else {
        let head: String = doc.chars().take(max).collect();
        format!("{}...", head)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: Option<&str>) -> Profile {
        let mut p = Profile::new("u", "2026-10-16T09:30:00Z".parse().unwrap());
        p.name = name.map(str::to_string);
        p
    }

    #[test]
    fn filename_replaces_non_identifier_chars() {
        assert_eq!(
            profile_filename(&named(Some("Jane Doe")), Format::Markdown),
            "Jane_Doe_profile.md"
        );
        assert_eq!(
            profile_filename(&named(Some("José O'Neil / PhD")), Format::Markdown),
            "José_O_Neil___PhD_profile.md"
        );
        assert_eq!(
            profile_filename(&named(Some("Jane Doe")), Format::Json),
            "Jane_Doe_profile.json"
        );
    }

    #[test]
    fn filename_without_name() {
        assert_eq!(profile_filename(&named(None), Format::Markdown), "profile.md");
        assert_eq!(profile_filename(&named(Some("  ")), Format::Markdown), "profile.md");
    }

    #[test]
    fn writes_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let path = write_document(&out, "Jane_Doe_profile.md", "# Jane Doe\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Jane Doe\n");
    }

    #[test]
    fn json_format_round_trips() {
        let p = named(Some("Jane"));
        let json = Format::Json.render(&p).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn preview_truncates() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
    }
}
