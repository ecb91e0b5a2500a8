//! Photo-to-plant workflow: identify the species, then enrich the best match
//! with its botanical reference record.

use anyhow::Result;
use serde_json::{Value, json};

use crate::{
    model::{Identification, IdentifyOutcome, PlantSuggestion},
    provider::{IdentificationProvider, ReferenceProvider},
};

const MAX_SUGGESTIONS: usize = 3;
const MAX_SIMILAR_IMAGES: usize = 3;

pub const NOT_IDENTIFIED_MESSAGE: &str =
    "Could not identify plant. Please try again with a clearer image.";

/// Identify the plant in `image_base64`.
///
/// Identification failures are returned as errors. The reference lookup is
/// best effort: when it fails or finds nothing, the outcome still carries the
/// identification with minimal details and `reference_available = false`.
pub async fn identify_plant(
    identifier: &dyn IdentificationProvider,
    reference: &dyn ReferenceProvider,
    image_base64: &str,
) -> Result<IdentifyOutcome> {
    let suggestions = identifier.identify(image_base64).await?;

    let Some(top) = suggestions.first() else {
        tracing::info!("identification returned no suggestions");
        return Ok(IdentifyOutcome::NotIdentified {
            confidence: 0.0,
            error: NOT_IDENTIFIED_MESSAGE.to_string(),
        });
    };

    let top = trimmed(top);
    let candidates: Vec<PlantSuggestion> =
        suggestions.iter().take(MAX_SUGGESTIONS).map(trimmed).collect();

    let (details, reference_available) = match lookup_reference(reference, &top.name).await {
        Ok(Some(record)) => (record, true),
        Ok(None) => {
            tracing::info!(plant = %top.name, "no reference record found");
            (minimal_details(&top), false)
        }
        Err(e) => {
            tracing::warn!(plant = %top.name, "reference lookup failed (non-critical): {e:#}");
            (minimal_details(&top), false)
        }
    };

    Ok(IdentifyOutcome::Identified(Identification {
        confidence: top.probability * 100.0,
        identification: top,
        suggestions: candidates,
        details,
        reference_available,
    }))
}

async fn lookup_reference(reference: &dyn ReferenceProvider, name: &str) -> Result<Option<Value>> {
    let hits = reference.search(name).await?;
    match hits.first() {
        Some(hit) => Ok(Some(reference.plant_details(hit.id).await?)),
        None => Ok(None),
    }
}

fn trimmed(s: &PlantSuggestion) -> PlantSuggestion {
    PlantSuggestion {
        similar_images: s.similar_images.iter().take(MAX_SIMILAR_IMAGES).cloned().collect(),
        ..s.clone()
    }
}

fn minimal_details(top: &PlantSuggestion) -> Value {
    json!({
        "id": top.id,
        "common_name": top.name,
        "scientific_name": top.name,
        "image_url": top.similar_images.first().map(|img| img.url.as_str()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlantSearchHit, SimilarImage};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct FakeIdentifier(Vec<PlantSuggestion>);

    #[async_trait]
    impl IdentificationProvider for FakeIdentifier {
        async fn identify(&self, _image_base64: &str) -> Result<Vec<PlantSuggestion>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct FailingIdentifier;

    #[async_trait]
    impl IdentificationProvider for FailingIdentifier {
        async fn identify(&self, _image_base64: &str) -> Result<Vec<PlantSuggestion>> {
            Err(anyhow!("Plant.id identification request failed with status 401"))
        }
    }

    #[derive(Debug, Default)]
    struct FakeReference {
        hits: Vec<PlantSearchHit>,
        fail_search: bool,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ReferenceProvider for FakeReference {
        async fn search(&self, query: &str) -> Result<Vec<PlantSearchHit>> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail_search {
                return Err(anyhow!("Trefle search request failed with status 500"));
            }
            Ok(self.hits.clone())
        }

        async fn plant_details(&self, id: i64) -> Result<Value> {
            Ok(json!({ "id": id, "growth": { "minimum_temperature": { "deg_c": 12 } } }))
        }
    }

    fn suggestion(name: &str, probability: f64, images: usize) -> PlantSuggestion {
        PlantSuggestion {
            id: Some(format!("id-{name}")),
            name: name.to_string(),
            probability,
            similar_images: (0..images)
                .map(|i| SimilarImage { url: format!("https://img/{name}/{i}.jpg"), similarity: None })
                .collect(),
        }
    }

    fn identified(outcome: IdentifyOutcome) -> Identification {
        match outcome {
            IdentifyOutcome::Identified(id) => id,
            other => panic!("expected identification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn no_suggestions_is_a_graceful_outcome() {
        let outcome = identify_plant(&FakeIdentifier(vec![]), &FakeReference::default(), "img")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            IdentifyOutcome::NotIdentified {
                confidence: 0.0,
                error: NOT_IDENTIFIED_MESSAGE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn identification_error_propagates() {
        let err = identify_plant(&FailingIdentifier, &FakeReference::default(), "img")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn keeps_top_three_suggestions_and_images() {
        let identifier = FakeIdentifier(vec![
            suggestion("Monstera deliciosa", 0.8, 5),
            suggestion("Philodendron", 0.1, 4),
            suggestion("Epipremnum", 0.05, 0),
            suggestion("Ficus", 0.01, 1),
        ]);
        let reference = FakeReference {
            hits: vec![PlantSearchHit { id: 42, common_name: None, scientific_name: None }],
            ..FakeReference::default()
        };

        let id = identified(identify_plant(&identifier, &reference, "img").await.unwrap());

        assert_eq!(id.suggestions.len(), 3);
        assert_eq!(id.identification.name, "Monstera deliciosa");
        assert_eq!(id.identification.similar_images.len(), 3);
        assert_eq!(id.suggestions[1].similar_images.len(), 3);
        assert!((id.confidence - 80.0).abs() < 1e-9);
        assert!(id.reference_available);
        assert_eq!(id.details["id"], json!(42));
        assert_eq!(*reference.queries.lock().unwrap(), vec!["Monstera deliciosa".to_string()]);
    }

    #[tokio::test]
    async fn missing_reference_falls_back_to_minimal_details() {
        let identifier = FakeIdentifier(vec![suggestion("Aloe vera", 0.6, 2)]);

        let id = identified(
            identify_plant(&identifier, &FakeReference::default(), "img").await.unwrap(),
        );

        assert!(!id.reference_available);
        assert_eq!(
            id.details,
            json!({
                "id": "id-Aloe vera",
                "common_name": "Aloe vera",
                "scientific_name": "Aloe vera",
                "image_url": "https://img/Aloe vera/0.jpg"
            })
        );
    }

    #[tokio::test]
    async fn failing_reference_is_not_fatal() {
        let identifier = FakeIdentifier(vec![suggestion("Basil", 0.9, 0)]);
        let reference = FakeReference { fail_search: true, ..FakeReference::default() };

        let id = identified(identify_plant(&identifier, &reference, "img").await.unwrap());

        assert!(!id.reference_available);
        assert_eq!(id.details["image_url"], Value::Null);
        assert_eq!(id.details["common_name"], json!("Basil"));
    }
}
