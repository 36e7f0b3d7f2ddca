use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use core_types::{Language, SiteIdentity, Theme};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_CONTACT_ENDPOINT: &str =
    "https://europe-west1-portfolio-contact-form-428615.cloudfunctions.net/sendEmailFunction";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl AssistantConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub measurement_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,
    pub default_language: Language,
    pub site: SiteIdentity,
    pub content_base_url: String,
    #[serde(default = "default_contact_endpoint")]
    pub contact_endpoint: String,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

fn current_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

fn default_contact_endpoint() -> String {
    DEFAULT_CONTACT_ENDPOINT.to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            default_language: Language::En,
            site: SiteIdentity::new("Folio", "https://folio.example"),
            content_base_url: "http://localhost:8080".to_string(),
            contact_endpoint: default_contact_endpoint(),
            assistant: AssistantConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("config.json"),
        }
    }

    pub fn from_default_location() -> Result<Self> {
        Ok(Self::from_dir(default_dir()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_or_init(&self) -> Result<SiteConfig> {
        if !self.path.exists() {
            let config = SiteConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let config: SiteConfig =
            serde_json::from_str(&raw).context("failed to parse site config json")?;
        if config.schema_version > CURRENT_SCHEMA_VERSION {
            bail!(
                "{} has schema version {}, this build understands up to {}",
                self.path.display(),
                config.schema_version,
                CURRENT_SCHEMA_VERSION
            );
        }
        debug!(path = %self.path.display(), "site config loaded");
        Ok(config)
    }

    pub fn save(&self, config: &SiteConfig) -> Result<()> {
        write_json(&self.path, config)
    }
}

pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("preferences.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_theme(&self) -> Theme {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Theme::default();
        };
        let theme = serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(|value| value.get("theme")?.as_str()?.parse::<Theme>().ok());
        match theme {
            Some(theme) => theme,
            None => {
                debug!(path = %self.path.display(), "ignoring unreadable theme preference");
                Theme::default()
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        let mut preferences = fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str::<Map<String, Value>>(&raw).ok())
            .unwrap_or_default();
        preferences.insert("theme".to_string(), Value::from(theme.as_str()));
        write_json(&self.path, &preferences)
    }
}

pub fn default_dir() -> Result<PathBuf> {
    let mut dir = dirs::config_dir().context("failed to resolve config_dir")?;
    dir.push("folio");
    Ok(dir)
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let text = serde_json::to_string_pretty(value).context("failed to serialize json")?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let config = store.load_or_init().expect("load default");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.default_language, Language::En);
        assert!(store.path().exists());
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        fs::write(
            store.path(),
            r#"{
                "default_language": "fr",
                "site": {"name": "Folio", "url": "https://folio.example"},
                "content_base_url": "./public"
            }"#,
        )
        .expect("write minimal config");

        let config = store.load_or_init().expect("load");
        assert_eq!(config.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(config.default_language, Language::Fr);
        assert_eq!(config.contact_endpoint, DEFAULT_CONTACT_ENDPOINT);
        assert_eq!(config.assistant, AssistantConfig::default());
    }

    #[test]
    fn rejects_configs_from_newer_builds() {
        let dir = tempdir().expect("tempdir");
        let store = ConfigStore::from_dir(dir.path());
        let mut config = SiteConfig::default();
        config.schema_version = CURRENT_SCHEMA_VERSION + 1;
        store.save(&config).expect("save");

        let err = store.load_or_init().expect_err("newer schema");
        assert!(err.to_string().contains("schema version"));
    }

    #[test]
    fn theme_round_trips_and_keeps_other_keys() {
        let dir = tempdir().expect("tempdir");
        let store = PreferenceStore::from_dir(dir.path());
        assert_eq!(store.load_theme(), Theme::Light);

        fs::write(store.path(), r#"{"theme": "light", "motion": "reduced"}"#).expect("seed");
        store.save_theme(Theme::Dark).expect("save");
        assert_eq!(store.load_theme(), Theme::Dark);

        let raw = fs::read_to_string(store.path()).expect("read");
        let value: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["motion"], "reduced");
    }

    #[test]
    fn corrupt_preferences_fall_back_to_light() {
        let dir = tempdir().expect("tempdir");
        let store = PreferenceStore::from_dir(dir.path());
        fs::write(store.path(), "not json").expect("seed");
        assert_eq!(store.load_theme(), Theme::Light);
        store.save_theme(Theme::Dark).expect("overwrite");
        assert_eq!(store.load_theme(), Theme::Dark);
    }
}
