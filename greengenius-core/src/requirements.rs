//! Growing requirements extracted from botanical reference records.
//!
//! Reference records are semi-structured and rarely complete, so every value
//! here has a documented default. This is the only place those defaults live.

use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_MIN_TEMPERATURE_C: f64 = 10.0;
pub const DEFAULT_MAX_TEMPERATURE_C: f64 = 30.0;
pub const DEFAULT_MIN_PRECIPITATION_MM: f64 = 20.0;

/// Ideal growing envelope for one species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlantRequirements {
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    /// Minimum yearly precipitation. Only a rough stand-in for soil moisture,
    /// carried for callers but not used by the moisture check.
    pub min_precipitation_mm: f64,
}

impl Default for PlantRequirements {
    fn default() -> Self {
        Self {
            min_temperature_c: DEFAULT_MIN_TEMPERATURE_C,
            max_temperature_c: DEFAULT_MAX_TEMPERATURE_C,
            min_precipitation_mm: DEFAULT_MIN_PRECIPITATION_MM,
        }
    }
}

impl PlantRequirements {
    /// Resolve requirements from a reference record. Never fails.
    ///
    /// Reads `growth.*` at the top level; detail records that nest it under
    /// `main_species.growth` are handled too. Anything absent, null or
    /// non-numeric takes the default.
    pub fn from_value(record: &Value) -> Self {
        let growth = growth_section(record);
        let lookup = |section: &str, unit: &str, default: f64| {
            growth
                .and_then(|g| g.get(section))
                .and_then(|s| s.get(unit))
                .and_then(Value::as_f64)
                .unwrap_or(default)
        };

        Self {
            min_temperature_c: lookup("minimum_temperature", "deg_c", DEFAULT_MIN_TEMPERATURE_C),
            max_temperature_c: lookup("maximum_temperature", "deg_c", DEFAULT_MAX_TEMPERATURE_C),
            min_precipitation_mm: lookup("minimum_precipitation", "mm", DEFAULT_MIN_PRECIPITATION_MM),
        }
    }
}

fn growth_section(record: &Value) -> Option<&Value> {
    record
        .get("growth")
        .filter(|g| g.is_object())
        .or_else(|| record.get("main_species")?.get("growth").filter(|g| g.is_object()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_record_uses_defaults() {
        let req = PlantRequirements::from_value(&json!({}));
        assert_eq!(req, PlantRequirements::default());
    }

    #[test]
    fn non_object_record_uses_defaults() {
        for record in [json!(null), json!("monstera"), json!([1, 2, 3])] {
            assert_eq!(PlantRequirements::from_value(&record), PlantRequirements::default());
        }
    }

    #[test]
    fn reads_top_level_growth() {
        let req = PlantRequirements::from_value(&json!({
            "growth": {
                "minimum_temperature": { "deg_c": 15, "deg_f": 59 },
                "maximum_temperature": { "deg_c": 25.5 },
                "minimum_precipitation": { "mm": 600 }
            }
        }));

        assert_eq!(req.min_temperature_c, 15.0);
        assert_eq!(req.max_temperature_c, 25.5);
        assert_eq!(req.min_precipitation_mm, 600.0);
    }

    #[test]
    fn reads_growth_nested_under_main_species() {
        let req = PlantRequirements::from_value(&json!({
            "id": 123,
            "main_species": {
                "growth": { "minimum_temperature": { "deg_c": 5 } }
            }
        }));

        assert_eq!(req.min_temperature_c, 5.0);
        assert_eq!(req.max_temperature_c, DEFAULT_MAX_TEMPERATURE_C);
    }

    #[test]
    fn null_and_non_numeric_values_fall_back() {
        let req = PlantRequirements::from_value(&json!({
            "growth": {
                "minimum_temperature": { "deg_c": null },
                "maximum_temperature": { "deg_c": "hot" },
                "minimum_precipitation": null
            }
        }));

        assert_eq!(req, PlantRequirements::default());
    }
}
