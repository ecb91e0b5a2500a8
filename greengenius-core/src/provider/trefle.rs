use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::PlantSearchHit;

use super::{ReferenceProvider, truncate_body};

const DEFAULT_BASE_URL: &str = "https://trefle.io/api/v1";

/// Trefle botanical database client.
#[derive(Debug, Clone)]
pub struct TrefleProvider {
    token: String,
    base_url: String,
    http: Client,
}

impl TrefleProvider {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self { token, base_url: base_url.trim_end_matches('/').to_string(), http: Client::new() }
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)], what: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);

        let res = self
            .http
            .get(&url)
            .query(&[("token", self.token.as_str())])
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to Trefle ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read Trefle {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "Trefle {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct TrSearchResponse {
    #[serde(default)]
    data: Vec<PlantSearchHit>,
}

#[derive(Debug, Deserialize)]
struct TrDetailsResponse {
    #[serde(default)]
    data: Option<Value>,
}

fn parse_search(body: &str) -> Result<Vec<PlantSearchHit>> {
    let parsed: TrSearchResponse =
        serde_json::from_str(body).context("Failed to parse Trefle search JSON")?;
    Ok(parsed.data)
}

/// A details response without `data` yields an empty record.
fn parse_details(body: &str) -> Result<Value> {
    let parsed: TrDetailsResponse =
        serde_json::from_str(body).context("Failed to parse Trefle plant JSON")?;
    Ok(parsed.data.unwrap_or_else(|| Value::Object(Map::new())))
}

#[async_trait]
impl ReferenceProvider for TrefleProvider {
    async fn search(&self, query: &str) -> Result<Vec<PlantSearchHit>> {
        let body = self.get_json("/plants/search", &[("q", query)], "search").await?;
        let hits = parse_search(&body)?;
        tracing::debug!(query, hits = hits.len(), "Trefle search");
        Ok(hits)
    }

    async fn plant_details(&self, id: i64) -> Result<Value> {
        let body = self.get_json(&format!("/plants/{id}"), &[], "plant details").await?;
        parse_details(&body)
    }
}
