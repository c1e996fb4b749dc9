use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::autosave::DEFAULT_IDLE;
use crate::crop::DEFAULT_QUALITY;

pub const DEFAULT_CONFIG_FILE: &str = "showcase.toml";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool { matches!(self, Environment::Development) }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ShowcaseConfig {
    pub database_url: Option<String>,
    pub autosave_idle_ms: u64,
    pub environment: Environment,
    pub crop_quality: u8,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            autosave_idle_ms: DEFAULT_IDLE.as_millis() as u64,
            environment: Environment::default(),
            crop_quality: DEFAULT_QUALITY,
        }
    }
}

impl ShowcaseConfig {
    /// Defaults, then the TOML file if it exists, then `SHOWCASE_*` env vars.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let mut cfg = if path.exists() {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading config: {}", path.display()))?;
            Self::from_toml(&text).with_context(|| format!("parsing config: {}", path.display()))?
        } else {
            Self::default()
        };
        cfg.apply_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Values that do not parse are ignored.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SHOWCASE_DATABASE_URL").filter(|s| !s.trim().is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(ms) = var("SHOWCASE_AUTOSAVE_IDLE_MS").and_then(|s| s.trim().parse().ok()) {
            self.autosave_idle_ms = ms;
        }
        if let Some(env) = var("SHOWCASE_ENV").as_deref().and_then(Environment::parse) {
            self.environment = env;
        }
        if let Some(q) = var("SHOWCASE_CROP_QUALITY").and_then(|s| s.trim().parse::<u8>().ok()).filter(|q| (1..=100).contains(q)) {
            self.crop_quality = q;
        }
    }

    pub fn autosave_idle(&self) -> Duration { Duration::from_millis(self.autosave_idle_ms) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let cfg = ShowcaseConfig::default();
        assert_eq!(cfg.autosave_idle(), Duration::from_secs(1));
        assert_eq!(cfg.environment, Environment::Production);
        assert_eq!(cfg.crop_quality, 92);
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn toml_overrides_some_fields() {
        let cfg = ShowcaseConfig::from_toml("autosave_idle_ms = 250\nenvironment = \"development\"\n").unwrap();
        assert_eq!(cfg.autosave_idle_ms, 250);
        assert!(cfg.environment.is_development());
        assert_eq!(cfg.crop_quality, DEFAULT_QUALITY);
    }

    #[test]
    fn env_overrides_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = [
            ("SHOWCASE_DATABASE_URL", "sqlite:///tmp/x.db"),
            ("SHOWCASE_AUTOSAVE_IDLE_MS", "not a number"),
            ("SHOWCASE_ENV", "dev"),
            ("SHOWCASE_CROP_QUALITY", "300"),
        ]
        .into_iter()
        .collect();
        let mut cfg = ShowcaseConfig::default();
        cfg.apply_env(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.database_url.as_deref(), Some("sqlite:///tmp/x.db"));
        assert_eq!(cfg.autosave_idle_ms, 1000);
        assert!(cfg.environment.is_development());
        assert_eq!(cfg.crop_quality, 92);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ShowcaseConfig::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(cfg.autosave_idle_ms, ShowcaseConfig::default().autosave_idle_ms);
    }
}
