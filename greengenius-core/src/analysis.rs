//! Plant health evaluation.
//!
//! Compares a plant's ideal envelope with one sensor snapshot. Every check
//! runs; issues accumulate in check order (temperature, then moisture).

use serde_json::Value;

use crate::{
    error::InputError,
    model::{HealthStatus, HealthVerdict, IdealRanges, Issue, SensorSnapshot, VerdictDetails},
    requirements::PlantRequirements,
};

/// Soil moisture below this percentage is dry. Exclusive.
pub const DRY_SOIL_PCT: f64 = 20.0;
/// Soil moisture above this percentage is waterlogged. Exclusive.
pub const WET_SOIL_PCT: f64 = 80.0;

const MOISTURE_RANGE_LABEL: &str = "20% - 80% (Est.)";

/// Evaluate raw plant and sensor records.
///
/// The plant record is lenient (see [`PlantRequirements::from_value`]); the
/// sensor record must carry numeric `temperature` and `soil_moisture`.
pub fn analyze_health(plant_data: &Value, sensor_data: &Value) -> Result<HealthVerdict, InputError> {
    let requirements = PlantRequirements::from_value(plant_data);
    let snapshot = SensorSnapshot::from_value(sensor_data)?;
    Ok(evaluate(&requirements, &snapshot))
}

pub fn evaluate(requirements: &PlantRequirements, snapshot: &SensorSnapshot) -> HealthVerdict {
    let mut findings: Vec<(Issue, String)> = Vec::with_capacity(2);

    findings.extend(check_temperature(requirements, snapshot.temperature_c));
    findings.extend(check_moisture(snapshot.soil_moisture_pct));

    let status = if findings.is_empty() {
        HealthStatus::Healthy
    } else {
        HealthStatus::NeedsAttention
    };

    tracing::debug!(
        status = %status,
        issues = findings.len(),
        temperature = snapshot.temperature_c,
        soil_moisture = snapshot.soil_moisture_pct,
        "evaluated plant health"
    );

    let (issues, recommendations): (Vec<_>, Vec<_>) = findings.into_iter().unzip();

    HealthVerdict {
        status,
        issues,
        recommendations,
        details: VerdictDetails {
            sensor_readings: snapshot.clone(),
            ideal_ranges: IdealRanges {
                temperature: format!(
                    "{} - {}",
                    requirements.min_temperature_c, requirements.max_temperature_c
                ),
                // Fixed label: the precipitation proxy does not feed the moisture check.
                moisture: MOISTURE_RANGE_LABEL.to_string(),
            },
        },
    }
}

fn check_temperature(requirements: &PlantRequirements, temperature_c: f64) -> Option<(Issue, String)> {
    let min = requirements.min_temperature_c;
    let max = requirements.max_temperature_c;

    if temperature_c < min {
        Some((Issue::TooCold, format!("Raise temperature above {min}°C")))
    } else if temperature_c > max {
        Some((Issue::TooHot, format!("Lower temperature below {max}°C")))
    } else {
        None
    }
}

fn check_moisture(soil_moisture_pct: f64) -> Option<(Issue, String)> {
    if soil_moisture_pct < DRY_SOIL_PCT {
        Some((Issue::DrySoil, "Water the plant immediately.".to_string()))
    } else if soil_moisture_pct > WET_SOIL_PCT {
        Some((Issue::Overwatered, "Stop watering and ensure drainage.".to_string()))
    } else {
        None
    }
}
