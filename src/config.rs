use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;

pub const API_KEY_ENV: &str = "JELLYFIN_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub jellyfin: JellyfinConfig,
    pub generate: GenerateConfig,
    pub renumber: RenumberConfig,
    pub epg: EpgConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JellyfinConfig {
    pub api_key: String,
    pub local_server: String,
    pub public_server: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub local_output: PathBuf,
    pub public_output: PathBuf,
    pub group_title: String,
    pub epg_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenumberConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub start: u32,
    pub keep_extra_attributes: bool,
    pub epg_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EpgConfig {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Default for JellyfinConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            local_server: "http://192.168.50.92:8096".to_string(),
            public_server: "https://fintv.a20labs.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            local_output: PathBuf::from("jellyfin_direct_local.m3u"),
            public_output: PathBuf::from("jellyfin_direct_public.m3u"),
            group_title: "Live TV".to_string(),
            epg_url: None,
        }
    }
}

impl Default for RenumberConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("/tmp/xumo_original.m3u"),
            output: PathBuf::from("xumo.m3u"),
            start: crate::renumber::DEFAULT_START,
            keep_extra_attributes: false,
            epg_url: Some(crate::renumber::DEFAULT_EPG_URL.to_string()),
        }
    }
}

impl Default for EpgConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("index.m3u"),
            output: PathBuf::from("epg.xml"),
        }
    }
}

impl Config {
    /// Reads `path` if it exists, otherwise starts from defaults. The
    /// `JELLYFIN_API_KEY` environment variable replaces the configured key.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            debug!("Loading config from {}", path.display());
            Self::from_toml(&std::fs::read_to_string(path)?)?
        } else {
            debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        config.override_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn override_api_key(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.jellyfin.api_key = key;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaylistError;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [jellyfin]
            api_key = "secret"

            [renumber]
            start = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.jellyfin.api_key, "secret");
        assert_eq!(config.jellyfin.local_server, "http://192.168.50.92:8096");
        assert_eq!(config.jellyfin.timeout_secs, 30);
        assert_eq!(config.renumber.start, 500);
        assert_eq!(config.renumber.output, PathBuf::from("xumo.m3u"));
        assert_eq!(config.generate.group_title, "Live TV");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.epg.output, PathBuf::from("epg.xml"));
        assert_eq!(config.renumber.start, 100);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let err = Config::from_toml("[jellyfin\napi_key = 1").unwrap_err();
        assert!(matches!(err, PlaylistError::Config(_)));
    }

    #[test]
    fn api_key_override_ignores_empty_values() {
        let mut config = Config::default();
        config.override_api_key(Some(String::new()));
        assert_eq!(config.jellyfin.api_key, "");

        config.override_api_key(Some("from-env".to_string()));
        assert_eq!(config.jellyfin.api_key, "from-env");

        config.override_api_key(None);
        assert_eq!(config.jellyfin.api_key, "from-env");
    }
}
