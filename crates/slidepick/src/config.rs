use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "slidepick";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8088";
const DEFAULT_LANGUAGES: &[&str] = &["en", "de"];
const SEARCH_MODES: &[&str] = &["fts", "similarity", "word_similarity"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_collapsed: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Languages offered by the language switcher, in cycling order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `slidepick config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, format!("# slidepick configuration\n{yaml}"))?;
        Ok(())
    }

    pub fn theme(&self) -> &str {
        self.defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("light")
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.defaults
            .as_ref()
            .and_then(|d| d.sidebar_collapsed)
            .unwrap_or(false)
    }

    pub fn search_mode(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.search_mode.as_deref())
    }

    pub fn server_url(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.base_url.as_deref())
            .unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn languages(&self) -> Vec<String> {
        match self.server.as_ref().and_then(|s| s.languages.as_ref()) {
            Some(langs) if !langs.is_empty() => langs.clone(),
            _ => DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Starting language: the configured one when offered, else the first.
    pub fn language(&self) -> String {
        let languages = self.languages();
        self.defaults
            .as_ref()
            .and_then(|d| d.language.clone())
            .filter(|l| languages.contains(l))
            .unwrap_or_else(|| languages[0].clone())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.sidebar_collapsed" => {
                let collapsed = match value {
                    "true" => true,
                    "false" => false,
                    _ => anyhow::bail!(
                        "Invalid sidebar_collapsed: {value}. Must be 'true' or 'false'."
                    ),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .sidebar_collapsed = Some(collapsed);
            }
            "defaults.search_mode" => {
                if !SEARCH_MODES.contains(&value) {
                    anyhow::bail!(
                        "Invalid search_mode: {value}. Must be 'fts', 'similarity', or 'word_similarity'."
                    );
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .search_mode = Some(value.to_string());
            }
            "defaults.language" => {
                let languages = self.languages();
                if !languages.iter().any(|l| l == value) {
                    anyhow::bail!(
                        "Invalid language: {value}. Must be one of: {}.",
                        languages.join(", ")
                    );
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .language = Some(value.to_string());
            }
            "server.base_url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    anyhow::bail!("Invalid base_url: {value}. Must start with http:// or https://.");
                }
                self.server
                    .get_or_insert_with(ServerConfig::default)
                    .base_url = Some(value.trim_end_matches('/').to_string());
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.sidebar_collapsed, defaults.search_mode, defaults.language, server.base_url"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.theme(), "light");
        assert!(!config.sidebar_collapsed());
        assert_eq!(config.search_mode(), None);
        assert_eq!(config.server_url(), DEFAULT_SERVER_URL);
        assert_eq!(config.languages(), vec!["en", "de"]);
        assert_eq!(config.language(), "en");
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();
        assert!(config.set("defaults.theme", "dark").is_ok());
        assert!(config.set("defaults.theme", "neon").is_err());
        assert!(config.set("defaults.sidebar_collapsed", "true").is_ok());
        assert!(config.set("defaults.sidebar_collapsed", "yes").is_err());
        assert!(config.set("defaults.search_mode", "similarity").is_ok());
        assert!(config.set("defaults.search_mode", "regex").is_err());
        assert!(config.set("defaults.language", "de").is_ok());
        assert!(config.set("defaults.language", "fr").is_err());
        assert!(config.set("server.base_url", "ftp://x").is_err());
        assert!(config.set("nope", "x").is_err());

        assert_eq!(config.theme(), "dark");
        assert!(config.sidebar_collapsed());
        assert_eq!(config.search_mode(), Some("similarity"));
        assert_eq!(config.language(), "de");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut config = Config::default();
        config.set("server.base_url", "http://slides.local:9000/").unwrap();
        assert_eq!(config.server_url(), "http://slides.local:9000");
    }

    #[test]
    fn test_unlisted_language_falls_back() {
        let config: Config = serde_yaml::from_str(
            "defaults:\n  language: fr\nserver:\n  languages: [sv, en]\n",
        )
        .unwrap();
        assert_eq!(config.language(), "sv");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("slidepick-config-{}", std::process::id()))
            .join(FILENAME);
        let mut config = Config::default();
        config.set("defaults.theme", "dark").unwrap();
        config.set("server.base_url", "https://example.org").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.theme(), "dark");
        assert_eq!(loaded.server_url(), "https://example.org");
        assert!(loaded.defaults.unwrap().search_mode.is_none());
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_missing_file_mentions_config_show() {
        let err = Config::load_from(Path::new("/nonexistent/slidepick.yaml")).unwrap_err();
        assert!(err.to_string().contains("slidepick config show"));
    }
}
