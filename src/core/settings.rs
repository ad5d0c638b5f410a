//! Application settings loaded from YAML and the environment

use crate::core::catalog::{TemplateCatalog, TEMPLATES_ENV};
use crate::tools::client::{CrawlerConfig, SearchClientConfig, SEARCH_API_KEY_ENV};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the output directory
pub const OUTPUT_DIR_ENV: &str = "AGENT_RECIPES_OUTPUT_DIR";

/// Settings shared by the CLI and the tools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Templates directory; `$AGENT_RECIPES_TEMPLATES` or `./templates` when unset
    pub templates_dir: Option<PathBuf>,

    /// Where file-writing tools put their output by default
    pub output_dir: Option<PathBuf>,

    /// Web search client
    pub search: SearchClientConfig,

    /// News crawler
    pub crawler: CrawlerConfig,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document means "all defaults"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup(SEARCH_API_KEY_ENV) {
            debug!("Using search API key from {}", SEARCH_API_KEY_ENV);
            self.search.api_key = Some(key);
        }
        if let Some(dir) = lookup(TEMPLATES_ENV) {
            self.templates_dir = Some(PathBuf::from(dir));
        }
        if let Some(dir) = lookup(OUTPUT_DIR_ENV) {
            self.output_dir = Some(PathBuf::from(dir));
        }
    }

    /// Effective templates directory
    pub fn templates_dir(&self) -> PathBuf {
        self.templates_dir
            .clone()
            .unwrap_or_else(TemplateCatalog::default_dir)
    }

    /// Effective output directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("agent-recipes")
        })
    }

    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = Some(dir.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
templates_dir: /srv/templates
search:
  endpoint: http://localhost:9000
  search_depth: basic
crawler:
  query: LLM
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.templates_dir(), PathBuf::from("/srv/templates"));
        assert_eq!(settings.search.endpoint, "http://localhost:9000");
        assert_eq!(settings.search.search_depth, "basic");
        assert_eq!(settings.search.timeout_secs, 30);
        assert_eq!(settings.crawler.query, "LLM");
        assert_eq!(settings.crawler.hackernews_endpoint, "https://hn.algolia.com");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let settings = Settings::from_yaml("  \n").unwrap();
        assert!(settings.templates_dir.is_none());
        assert!(settings.search.api_key.is_none());
    }

    #[test]
    fn test_apply_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TAVILY_API_KEY", "tvly-test"),
            ("AGENT_RECIPES_OUTPUT_DIR", "/tmp/out"),
            ("AGENT_RECIPES_TEMPLATES", "  "),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default().with_templates_dir("mine");
        settings.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.search.api_key.as_deref(), Some("tvly-test"));
        assert_eq!(settings.output_dir(), PathBuf::from("/tmp/out"));
        // Blank variables are ignored
        assert_eq!(settings.templates_dir(), PathBuf::from("mine"));
    }

    #[test]
    fn test_from_file_reports_path() {
        let err = Settings::from_file("/definitely/missing.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("/definitely/missing.yaml"));
    }

    #[test]
    fn test_output_dir_default() {
        let settings = Settings::default();
        assert!(settings.output_dir().ends_with("agent-recipes"));
    }
}
