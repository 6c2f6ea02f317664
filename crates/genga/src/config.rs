//! Studio configuration
use crate::backends::{BackendConfig, BackendType};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_LANGUAGE: &str = "English";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Generative-AI backend
    pub backend: BackendConfig,

    /// Natural language the analysis model answers in
    pub suggestion_language: String,

    /// Address the studio server listens on
    pub bind_addr: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            suggestion_language: DEFAULT_LANGUAGE.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl StudioConfig {
    /// With backend configuration
    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }

    /// With suggestion language
    pub fn with_language(mut self, language: String) -> Self {
        self.suggestion_language = language;
        self
    }

    /// With listen address
    pub fn with_bind_addr(mut self, addr: String) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Switch to the offline backend
    pub fn offline(mut self) -> Self {
        self.backend.backend_type = BackendType::Mock;
        self
    }

    /// Overlay environment variables: `GEMINI_API_KEY` (or `API_KEY`), `GENGA_API_URL`,
    /// `GENGA_BIND_ADDR`, `GENGA_LANGUAGE`
    pub fn with_env(self) -> Self {
        self.overlay(|name| std::env::var(name).ok())
    }

    fn overlay(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| var(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")) {
            self.backend.api_key = Some(key);
        }
        if let Some(url) = non_empty("GENGA_API_URL") {
            self.backend = self.backend.with_api_url(url);
        }
        if let Some(addr) = non_empty("GENGA_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(language) = non_empty("GENGA_LANGUAGE") {
            self.suggestion_language = language;
        }
        self
    }

    /// Save configuration to JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Load configuration from JSON
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise, then apply the environment
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(config.with_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = StudioConfig::default();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.suggestion_language, DEFAULT_LANGUAGE);
        assert_eq!(config.backend.backend_type, BackendType::Gemini);
        assert!(config.backend.api_key.is_none());
    }

    #[test]
    fn test_env_overlay() {
        let vars: HashMap<&str, &str> = [
            ("API_KEY", "fallback-key"),
            ("GENGA_LANGUAGE", "Arabic"),
            ("GENGA_BIND_ADDR", " "),
        ]
        .into_iter()
        .collect();

        let config = StudioConfig::default().overlay(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.backend.api_key.as_deref(), Some("fallback-key"));
        assert_eq!(config.suggestion_language, "Arabic");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_gemini_key_wins_over_api_key() {
        let config = StudioConfig::default().overlay(|name| match name {
            "GEMINI_API_KEY" => Some("primary".to_string()),
            "API_KEY" => Some("secondary".to_string()),
            _ => None,
        });
        assert_eq!(config.backend.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join("genga_config_test.json");
        let config = StudioConfig::default()
            .with_language("French".to_string())
            .with_bind_addr("0.0.0.0:8080".to_string())
            .offline();
        config.save(&path).unwrap();

        let loaded = StudioConfig::load(&path).unwrap();
        assert_eq!(loaded.suggestion_language, "French");
        assert_eq!(loaded.bind_addr, "0.0.0.0:8080");
        assert_eq!(loaded.backend.backend_type, BackendType::Mock);

        let _ = std::fs::remove_file(&path);
    }
}
