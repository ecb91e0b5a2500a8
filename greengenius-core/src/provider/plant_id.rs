use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::{PlantSuggestion, SimilarImage};

use super::{IdentificationProvider, truncate_body};

const DEFAULT_BASE_URL: &str = "https://plant.id/api/v3";

/// Plant.id v3 identification client.
#[derive(Debug, Clone)]
pub struct PlantIdProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl PlantIdProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PidRequest<'a> {
    images: [&'a str; 1],
    similar_images: bool,
}

#[derive(Debug, Default, Deserialize)]
struct PidResponse {
    #[serde(default)]
    result: PidResult,
}

#[derive(Debug, Default, Deserialize)]
struct PidResult {
    #[serde(default)]
    classification: PidClassification,
}

#[derive(Debug, Default, Deserialize)]
struct PidClassification {
    #[serde(default)]
    suggestions: Vec<PidSuggestion>,
}

#[derive(Debug, Deserialize)]
struct PidSuggestion {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    probability: f64,
    #[serde(default)]
    similar_images: Vec<PidSimilarImage>,
}

#[derive(Debug, Deserialize)]
struct PidSimilarImage {
    url: Option<String>,
    similarity: Option<f64>,
}

impl From<PidSuggestion> for PlantSuggestion {
    fn from(s: PidSuggestion) -> Self {
        PlantSuggestion {
            id: s.id,
            name: s.name.unwrap_or_else(|| "Unknown".to_string()),
            probability: s.probability,
            similar_images: s
                .similar_images
                .into_iter()
                .filter_map(|img| {
                    Some(SimilarImage { url: img.url?, similarity: img.similarity })
                })
                .collect(),
        }
    }
}

/// Extract suggestions from a v3 identification response body.
fn parse_suggestions(body: &str) -> Result<Vec<PlantSuggestion>> {
    let parsed: PidResponse =
        serde_json::from_str(body).context("Failed to parse Plant.id identification JSON")?;

    Ok(parsed
        .result
        .classification
        .suggestions
        .into_iter()
        .map(PlantSuggestion::from)
        .collect())
}

#[async_trait]
impl IdentificationProvider for PlantIdProvider {
    async fn identify(&self, image_base64: &str) -> Result<Vec<PlantSuggestion>> {
        let url = format!("{}/identification", self.base_url);

        let res = self
            .http
            .post(&url)
            .header("Api-Key", self.api_key.as_str())
            .json(&PidRequest { images: [image_base64], similar_images: true })
            .send()
            .await
            .context("Failed to send request to Plant.id (identification)")?;

        let status = res.status();
        tracing::info!(%status, "Plant.id identification response");

        let body = res
            .text()
            .await
            .context("Failed to read Plant.id identification response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Plant.id identification request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        parse_suggestions(&body)
    }
}
