use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::provider::ProviderId;

/// Credentials and endpoint for a single provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Overrides the provider's public endpoint, e.g. for a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Baselines and noise for the simulated sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub base_temperature_c: f64,
    pub temperature_noise: f64,
    pub base_humidity_pct: f64,
    pub humidity_noise: f64,
    pub base_light_level: f64,
    pub light_noise: f64,
    pub base_soil_moisture_pct: f64,
    pub soil_moisture_noise: f64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            base_temperature_c: 22.0,
            temperature_noise: 2.0,
            base_humidity_pct: 45.0,
            humidity_noise: 5.0,
            base_light_level: 500.0,
            light_noise: 50.0,
            base_soil_moisture_pct: 40.0,
            soil_moisture_noise: 10.0,
        }
    }
}

impl SensorConfig {
    /// Every baseline and noise value must be a finite number.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("base_temperature_c", self.base_temperature_c),
            ("temperature_noise", self.temperature_noise),
            ("base_humidity_pct", self.base_humidity_pct),
            ("humidity_noise", self.humidity_noise),
            ("base_light_level", self.base_light_level),
            ("light_noise", self.light_noise),
            ("base_soil_moisture_pct", self.base_soil_moisture_pct),
            ("soil_moisture_noise", self.soil_moisture_noise),
        ];

        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, v)) => Err(anyhow!("sensor.{name} must be a finite number, got {v}")),
            None => Ok(()),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [providers.plantid]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub sensor: SensorConfig,
}

impl Config {
    /// Load config from the platform config dir and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_from(&Self::config_file_path()?)?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.sensor
            .validate()
            .with_context(|| format!("Invalid [sensor] section in {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config dir.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "greengenius", "greengenius")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Credentials from the environment win over the file. Non-empty values only.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for id in ProviderId::all() {
            let Some(key) = lookup(id.env_var()).filter(|k| !k.trim().is_empty()) else {
                continue;
            };
            tracing::debug!(provider = %id, "using credential from {}", id.env_var());
            self.providers
                .entry(id.as_str().to_string())
                .and_modify(|cfg| cfg.api_key = key.clone())
                .or_insert_with(|| ProviderConfig { api_key: key, base_url: None });
        }
    }

    /// Set/replace a provider API key, keeping any custom endpoint.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers
            .entry(provider_id.as_str().to_string())
            .and_modify(|cfg| cfg.api_key = api_key.clone())
            .or_insert_with(|| ProviderConfig { api_key, base_url: None });
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some_and(|k| !k.is_empty())
    }
}

/// Render a secret as `abcd...wxyz` for diagnostics.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
