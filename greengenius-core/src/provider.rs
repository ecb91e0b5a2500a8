use crate::{
    Config,
    model::{PlantSearchHit, PlantSuggestion},
    provider::{plant_id::PlantIdProvider, trefle::TrefleProvider},
};
use async_trait::async_trait;
use serde_json::Value;
use std::{convert::TryFrom, fmt::Debug};

pub mod plant_id;
pub mod trefle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    PlantId,
    Trefle,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::PlantId => "plantid",
            ProviderId::Trefle => "trefle",
        }
    }

    /// Environment variable that overrides the configured credential.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::PlantId => "PLANT_ID_API_KEY",
            ProviderId::Trefle => "TREFLE_API_TOKEN",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::PlantId, ProviderId::Trefle]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "plantid" | "plant.id" | "plant-id" => Ok(ProviderId::PlantId),
            "trefle" => Ok(ProviderId::Trefle),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: plantid, trefle."
            )),
        }
    }
}

/// Resolves a photo to candidate species.
#[async_trait]
pub trait IdentificationProvider: Send + Sync + Debug {
    /// `image_base64` is the encoded image without a data-URL prefix.
    /// Suggestions come back best first.
    async fn identify(&self, image_base64: &str) -> anyhow::Result<Vec<PlantSuggestion>>;
}

/// Botanical database keyed by species name.
#[async_trait]
pub trait ReferenceProvider: Send + Sync + Debug {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<PlantSearchHit>>;

    /// Full reference record for a plant, as returned by the database.
    async fn plant_details(&self, id: i64) -> anyhow::Result<Value>;
}

fn require_provider<'a>(id: ProviderId, config: &'a Config) -> anyhow::Result<&'a crate::ProviderConfig> {
    config
        .provider_config(id)
        .filter(|cfg| !cfg.api_key.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured for provider '{id}'.\n\
                 Hint: run `greengenius configure {id}` or set {}.",
                id.env_var()
            )
        })
}

/// Construct the identification provider from config.
pub fn identification_from_config(config: &Config) -> anyhow::Result<Box<dyn IdentificationProvider>> {
    let cfg = require_provider(ProviderId::PlantId, config)?;
    let provider = match &cfg.base_url {
        Some(url) => PlantIdProvider::with_base_url(cfg.api_key.clone(), url.clone()),
        None => PlantIdProvider::new(cfg.api_key.clone()),
    };
    Ok(Box::new(provider))
}

/// Construct the botanical reference provider from config.
pub fn reference_from_config(config: &Config) -> anyhow::Result<Box<dyn ReferenceProvider>> {
    let cfg = require_provider(ProviderId::Trefle, config)?;
    let provider = match &cfg.base_url {
        Some(url) => TrefleProvider::with_base_url(cfg.api_key.clone(), url.clone()),
        None => TrefleProvider::new(cfg.api_key.clone()),
    };
    Ok(Box::new(provider))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_accepts_aliases() {
        assert_eq!(ProviderId::try_from("Plant.id").unwrap(), ProviderId::PlantId);
        assert_eq!(ProviderId::try_from("TREFLE").unwrap(), ProviderId::Trefle);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn identification_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = identification_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No API key configured for provider 'plantid'"));
        assert!(msg.contains("PLANT_ID_API_KEY"));
    }

    #[test]
    fn reference_errors_when_key_is_empty() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::Trefle, String::new());

        assert!(reference_from_config(&cfg).is_err());
    }

    #[test]
    fn providers_build_when_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::PlantId, "KEY".to_string());
        cfg.upsert_provider_api_key(ProviderId::Trefle, "TOKEN".to_string());

        assert!(identification_from_config(&cfg).is_ok());
        assert!(reference_from_config(&cfg).is_ok());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let out = truncate_body(&long);

        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
