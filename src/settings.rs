use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::Config;
use serde::{Deserialize, Serialize};

use crate::parser::selectors::{SelectorConfig, Selectors};

const ENV_PREFIX: &str = "PROFILE_SCRAPER";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_ms: u64,
    pub concurrency: usize,
    pub user_agent: String,
    pub url_prefix: String,
    pub output_dir: PathBuf,
    /// JSON file overriding some or all selector chains.
    pub selectors_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            timeout_secs: 30,
            max_retries: 3,
            backoff_ms: 2000,
            concurrency: 4,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
                .into(),
            url_prefix: "https://www.linkedin.com/in/".into(),
            output_dir: PathBuf::from("."),
            selectors_file: None,
        }
    }
}

impl Settings {
    /// Defaults, then the optional config file, then `PROFILE_SCRAPER_*` env vars.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path));
        }
        builder =
            builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let settings: Settings = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        if settings.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        Ok(settings)
    }

    pub fn selector_config(&self) -> Result<SelectorConfig> {
        match &self.selectors_file {
            Some(path) => SelectorConfig::from_json_file(path),
            None => Ok(SelectorConfig::default()),
        }
    }

    pub fn selectors(&self) -> Result<Selectors> {
        Ok(self.selector_config()?.compile()?)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // Env vars are process-wide; every test that loads settings holds this.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn load(path: &Path) -> Result<Settings> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        Settings::load(Some(path))
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.json");
        std::fs::write(&path, r#"{ "timeout_secs": 5, "concurrency": 2 }"#).unwrap();

        let s = load(&path).unwrap();
        assert_eq!(s.timeout_secs, 5);
        assert_eq!(s.concurrency, 2);
        assert_eq!(s.max_retries, 3);
        assert_eq!(s.url_prefix, "https://www.linkedin.com/in/");
    }

    #[test]
    fn toml_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.toml");
        std::fs::write(&path, "url_prefix = \"https://example.com/u/\"\n").unwrap();

        let s = load(&path).unwrap();
        assert_eq!(s.url_prefix, "https://example.com/u/");
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.json");
        std::fs::write(&path, r#"{ "concurrency": 0 }"#).unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scraper.json");
        std::fs::write(&path, r#"{ "timeout_secs": 5, "max_retries": 1 }"#).unwrap();

        let s = {
            let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            std::env::set_var("PROFILE_SCRAPER_TIMEOUT_SECS", "10");
            let s = Settings::load(Some(&path));
            std::env::remove_var("PROFILE_SCRAPER_TIMEOUT_SECS");
            s.unwrap()
        };
        assert_eq!(s.timeout_secs, 10);
        assert_eq!(s.max_retries, 1);
        assert_eq!(s.concurrency, 4);
    }

    #[test]
    fn selectors_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let sel = dir.path().join("selectors.json");
        std::fs::write(&sel, r#"{ "name": [ { "kind": "text", "selector": "h2.who" } ] }"#).unwrap();

        let settings = Settings {
            selectors_file: Some(sel),
            ..Default::default()
        };
        let selectors = settings.selectors().unwrap();
        assert_eq!(selectors.name.len(), 1);
        assert_eq!(selectors.name[0].to_string(), "h2.who");
    }

    #[test]
    fn missing_selectors_file_is_an_error() {
        let settings = Settings {
            selectors_file: Some(PathBuf::from("does/not/exist.json")),
            ..Default::default()
        };
        assert!(settings.selectors().is_err());
    }
}
