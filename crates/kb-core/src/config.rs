//! Configuration for knowledge base processing.
//!
//! Load order: `.kb/config.toml` → environment variables → defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KbConfig {
    /// Prefix for all IRIs in emitted RDF. Must end with `/`.
    pub base_uri: String,
    /// Run NER-derived entity extraction. When false, only wiki-link and
    /// frontmatter entity references are produced.
    pub analyze_entities: bool,
    /// Extensions tried, in order, when resolving wiki links to documents.
    pub link_extensions: Vec<String>,
    /// Log a warning when the entity registry merges two observations with
    /// conflicting scalar properties.
    pub warn_on_alias_collision: bool,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            base_uri: "http://example.org/kb/".to_string(),
            analyze_entities: false,
            link_extensions: vec![".md".into(), ".markdown".into(), ".txt".into()],
            warn_on_alias_collision: true,
        }
    }
}

/// Read a boolean env var. Unset or unparseable values leave the config
/// untouched.
fn env_flag(var: &str) -> Option<bool> {
    std::env::var(var).ok()?.parse().ok()
}

impl KbConfig {
    /// Load config from `.kb/config.toml` in the vault root, with env var
    /// overrides. Falls back to defaults if no config file exists.
    pub fn load(vault_root: &Path) -> Result<Self> {
        let config_path = vault_root.join(".kb").join("config.toml");

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Ok(uri) = std::env::var("KB_BASE_URI") {
            config.base_uri = uri;
        }
        if let Some(flag) = env_flag("KB_ANALYZE_ENTITIES") {
            config.analyze_entities = flag;
        }
        if let Some(flag) = env_flag("KB_WARN_ON_ALIAS_COLLISION") {
            config.warn_on_alias_collision = flag;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        if !self.base_uri.ends_with('/') {
            anyhow::bail!("base_uri ({}) must end with '/'", self.base_uri);
        }
        for ext in &self.link_extensions {
            if !ext.starts_with('.') {
                anyhow::bail!("link extension ({ext}) must start with '.'");
            }
        }
        Ok(())
    }
}
