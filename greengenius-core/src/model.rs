use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::InputError;

/// One reading of a growing environment.
///
/// Serializes with the same keys the sensor wire format uses. A snapshot
/// parsed with [`SensorSnapshot::from_value`] serializes as the exact record
/// it was parsed from, so number representation and timestamp offsets survive.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSnapshot {
    pub temperature_c: f64,
    pub humidity_pct: Option<f64>,
    pub light_level: Option<f64>,
    pub soil_moisture_pct: f64,
    pub recorded_at: Option<DateTime<Utc>>,

    /// Keys the analysis does not understand, kept for the caller.
    pub extra: Map<String, Value>,

    /// Record as received, echoed in place of the typed fields.
    raw: Option<Map<String, Value>>,
}

#[derive(Serialize)]
struct WireSnapshot<'a> {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    light_level: Option<f64>,
    soil_moisture: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    recorded_at: Option<&'a DateTime<Utc>>,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

impl Serialize for SensorSnapshot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.raw {
            Some(raw) => raw.serialize(serializer),
            None => WireSnapshot {
                temperature: self.temperature_c,
                humidity: self.humidity_pct,
                light_level: self.light_level,
                soil_moisture: self.soil_moisture_pct,
                recorded_at: self.recorded_at.as_ref(),
                extra: &self.extra,
            }
            .serialize(serializer),
        }
    }
}

impl SensorSnapshot {
    pub fn new(temperature_c: f64, soil_moisture_pct: f64) -> Self {
        Self {
            temperature_c,
            humidity_pct: None,
            light_level: None,
            soil_moisture_pct,
            recorded_at: None,
            extra: Map::new(),
            raw: None,
        }
    }

    /// The record this snapshot was parsed from, if any.
    pub fn raw(&self) -> Option<&Map<String, Value>> {
        self.raw.as_ref()
    }

    /// Parse a raw sensor record.
    ///
    /// `temperature` and `soil_moisture` are required and must be numbers.
    /// `humidity` and `light_level` are informational: a non-numeric value is
    /// kept verbatim in `extra` rather than rejected.
    pub fn from_value(value: &Value) -> Result<Self, InputError> {
        let obj = value
            .as_object()
            .ok_or(InputError::NotAnObject { what: "sensor data" })?;

        let temperature_c = required_number(obj, "temperature")?;
        let soil_moisture_pct = required_number(obj, "soil_moisture")?;

        let mut extra = Map::new();
        let mut humidity_pct = None;
        let mut light_level = None;
        let mut recorded_at = None;

        for (key, v) in obj {
            match key.as_str() {
                "temperature" | "soil_moisture" => {}
                "humidity" if v.is_number() => humidity_pct = v.as_f64(),
                "light_level" if v.is_number() => light_level = v.as_f64(),
                "recorded_at" => match v.as_str().map(DateTime::parse_from_rfc3339) {
                    Some(Ok(ts)) => recorded_at = Some(ts.with_timezone(&Utc)),
                    _ => {
                        extra.insert(key.clone(), v.clone());
                    }
                },
                _ => {
                    extra.insert(key.clone(), v.clone());
                }
            }
        }

        Ok(Self {
            temperature_c,
            humidity_pct,
            light_level,
            soil_moisture_pct,
            recorded_at,
            extra,
            raw: Some(obj.clone()),
        })
    }
}

fn required_number(obj: &Map<String, Value>, field: &'static str) -> Result<f64, InputError> {
    let v = obj.get(field).ok_or(InputError::MissingField { field })?;
    v.as_f64().ok_or(InputError::NotANumber { field })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::NeedsAttention => "Needs Attention",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tagged deviation from the plant's ideal envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Issue {
    #[serde(rename = "Too Cold")]
    TooCold,
    #[serde(rename = "Too Hot")]
    TooHot,
    #[serde(rename = "Dry Soil")]
    DrySoil,
    Overwatered,
}

impl Issue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Issue::TooCold => "Too Cold",
            Issue::TooHot => "Too Hot",
            Issue::DrySoil => "Dry Soil",
            Issue::Overwatered => "Overwatered",
        }
    }

    pub const fn all() -> &'static [Issue] {
        &[Issue::TooCold, Issue::TooHot, Issue::DrySoil, Issue::Overwatered]
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdealRanges {
    pub temperature: String,
    pub moisture: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerdictDetails {
    pub sensor_readings: SensorSnapshot,
    pub ideal_ranges: IdealRanges,
}

/// Result of comparing one plant against one sensor snapshot.
///
/// `recommendations[i]` always answers `issues[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthVerdict {
    pub status: HealthStatus,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<String>,
    pub details: VerdictDetails,
}

impl HealthVerdict {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// One candidate species returned by the identification provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSuggestion {
    pub id: Option<String>,
    pub name: String,
    pub probability: f64,
    #[serde(default)]
    pub similar_images: Vec<SimilarImage>,
}

/// Hit from a botanical reference search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSearchHit {
    pub id: i64,
    pub common_name: Option<String>,
    pub scientific_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identification {
    /// Best match, with at most three similar images.
    pub identification: PlantSuggestion,
    /// Up to three candidates in provider order, best first.
    pub suggestions: Vec<PlantSuggestion>,
    /// Top probability as a percentage.
    pub confidence: f64,
    /// Reference record for the best match, or a minimal stand-in built from
    /// the suggestion when the reference lookup came up empty.
    pub details: Value,
    pub reference_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IdentifyOutcome {
    Identified(Identification),
    NotIdentified { confidence: f64, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_required_and_informational_fields() {
        let snap = SensorSnapshot::from_value(&json!({
            "temperature": 21.5,
            "humidity": 44.2,
            "light_level": 510,
            "soil_moisture": 38
        }))
        .expect("valid snapshot");

        assert_eq!(snap.temperature_c, 21.5);
        assert_eq!(snap.soil_moisture_pct, 38.0);
        assert_eq!(snap.humidity_pct, Some(44.2));
        assert_eq!(snap.light_level, Some(510.0));
        assert!(snap.extra.is_empty());
    }

    #[test]
    fn missing_temperature_is_an_input_error() {
        let err = SensorSnapshot::from_value(&json!({ "soil_moisture": 40 })).unwrap_err();
        assert_eq!(err, InputError::MissingField { field: "temperature" });
    }

    #[test]
    fn missing_soil_moisture_is_an_input_error() {
        let err = SensorSnapshot::from_value(&json!({ "temperature": 20 })).unwrap_err();
        assert_eq!(err, InputError::MissingField { field: "soil_moisture" });
    }

    #[test]
    fn non_numeric_required_field_is_rejected() {
        let err =
            SensorSnapshot::from_value(&json!({ "temperature": "warm", "soil_moisture": 40 }))
                .unwrap_err();
        assert_eq!(err, InputError::NotANumber { field: "temperature" });

        let err = SensorSnapshot::from_value(&json!({ "temperature": 20, "soil_moisture": null }))
            .unwrap_err();
        assert_eq!(err, InputError::NotANumber { field: "soil_moisture" });
    }

    #[test]
    fn non_object_snapshot_is_rejected() {
        let err = SensorSnapshot::from_value(&json!([20, 40])).unwrap_err();
        assert!(matches!(err, InputError::NotAnObject { .. }));
    }

    #[test]
    fn unknown_keys_survive_serialization() {
        let input = json!({
            "temperature": 20.5,
            "soil_moisture": 40.5,
            "pot": "kitchen"
        });
        let snap = SensorSnapshot::from_value(&input).expect("valid snapshot");
        let echoed = serde_json::to_value(&snap).expect("serializable");

        assert_eq!(echoed, input);
    }

    #[test]
    fn integer_readings_and_offsets_echo_unchanged() {
        let input = json!({
            "temperature": 22,
            "soil_moisture": 40,
            "light_level": 420,
            "recorded_at": "2026-05-01T08:30:00+02:00"
        });
        let snap = SensorSnapshot::from_value(&input).expect("valid snapshot");

        assert_eq!(snap.light_level, Some(420.0));
        assert_eq!(serde_json::to_string(&snap).unwrap(), serde_json::to_string(&input).unwrap());
        assert_eq!(serde_json::to_value(&snap).unwrap(), input);
    }

    #[test]
    fn built_snapshot_serializes_typed_fields() {
        let mut snap = SensorSnapshot::new(21.5, 35.0);
        snap.humidity_pct = Some(44.0);

        assert!(snap.raw().is_none());
        assert_eq!(
            serde_json::to_value(&snap).unwrap(),
            json!({ "temperature": 21.5, "humidity": 44.0, "soil_moisture": 35.0 })
        );
    }

    #[test]
    fn recorded_at_is_parsed_when_rfc3339() {
        let snap = SensorSnapshot::from_value(&json!({
            "temperature": 20,
            "soil_moisture": 40,
            "recorded_at": "2026-05-01T08:30:00Z"
        }))
        .expect("valid snapshot");

        assert!(snap.recorded_at.is_some());
        assert!(snap.extra.is_empty());
    }

    #[test]
    fn wire_names_for_status_and_issues() {
        assert_eq!(
            serde_json::to_value(HealthStatus::NeedsAttention).unwrap(),
            json!("Needs Attention")
        );
        for issue in Issue::all() {
            assert_eq!(serde_json::to_value(issue).unwrap(), json!(issue.as_str()));
        }
    }
}
