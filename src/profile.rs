use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scraped profile. Sequences are never absent, only empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub about: Option<String>,
    pub profile_url: String,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub title: Option<String>,
    pub company: Option<String>,
    pub date_range: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub date_range: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: Option<String>,
    pub issuer: Option<String>,
}

impl Profile {
    /// Bare record for `profile_url`; every other field empty.
    pub fn new(profile_url: impl Into<String>, scraped_at: DateTime<Utc>) -> Self {
        Profile {
            name: None,
            headline: None,
            location: None,
            about: None,
            profile_url: profile_url.into(),
            experience: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            languages: Vec::new(),
            certifications: Vec::new(),
            scraped_at,
        }
    }

    /// True when not a single targeted field was found.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.headline.is_none()
            && self.location.is_none()
            && self.about.is_none()
            && self.experience.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.languages.is_empty()
            && self.certifications.is_empty()
    }
}

impl Experience {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.company.is_none()
            && self.date_range.is_none()
            && self.description.is_none()
    }
}

impl Education {
    pub fn is_empty(&self) -> bool {
        self.school.is_none() && self.degree.is_none() && self.date_range.is_none()
    }
}

impl Certification {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.issuer.is_none()
    }
}

// ── Tests ──
