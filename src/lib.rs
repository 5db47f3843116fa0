//! Scrape a public profile page into a Markdown document.
//!
//! Pipeline: fetch → [`parser::extract_profile`] → [`profile::Profile`] → [`render::render_markdown`].

pub mod error;
pub mod fetch;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod profile;
pub mod render;
pub mod settings;

pub use error::{ExtractError, FetchError, ScrapeError};
pub use parser::{extract_profile, extract_profile_at};
pub use profile::{Certification, Education, Experience, Profile};
pub use render::render_markdown;
