//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,

    // Directory
    /// Directory holding the `*.md` posts, relative to the base directory
    pub posts_dir: String,

    // Navigation
    pub recent_limit: usize,

    // Writing
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Personal Blog".to_string(),
            posts_dir: "posts".to_string(),
            recent_limit: crate::store::DEFAULT_RECENT_LIMIT,
            highlight: HighlightConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Name of a bundled syntect theme
    pub theme: String,
    /// Class of the wrapper around highlighted blocks, also scopes the stylesheet
    pub css_class: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "InspiredGitHub".to_string(),
            css_class: "highlight".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.recent_limit, 3);
        assert_eq!(config.highlight.css_class, "highlight");
        assert!(!config.highlight.line_number);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: SiteConfig = serde_yaml::from_str(
            r#"
title: Notes
highlight:
  theme: base16-ocean.dark
analytics: plausible
"#,
        )
        .unwrap();
        assert_eq!(config.title, "Notes");
        assert_eq!(config.posts_dir, "posts");
        assert_eq!(config.highlight.theme, "base16-ocean.dark");
        assert_eq!(config.highlight.css_class, "highlight");
        assert!(config.extra.contains_key("analytics"));
    }

    #[test]
    fn test_load_reports_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");
        fs::write(&path, "recent_limit: [not, a, number]\n").unwrap();
        let err = SiteConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }
}
