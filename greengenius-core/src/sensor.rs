use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::fmt::Debug;

use crate::{config::SensorConfig, model::SensorSnapshot};

/// Anything that can produce a reading of the growing environment.
#[async_trait]
pub trait SensorSource: Send + Sync + Debug {
    async fn read(&self) -> Result<SensorSnapshot>;
}

/// Synthetic sensor: configured baselines plus uniform noise.
///
/// Temperature and humidity are rounded to one decimal; light level and soil
/// moisture are whole numbers. Percentages are clamped to 0..=100.
#[derive(Debug, Clone)]
pub struct SimulatedSensor {
    config: SensorConfig,
}

impl SimulatedSensor {
    pub fn new(config: SensorConfig) -> Self {
        Self { config }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> SensorSnapshot {
        let c = &self.config;

        let temperature = round1(c.base_temperature_c + jitter(rng, c.temperature_noise));
        let humidity = round1(c.base_humidity_pct + jitter(rng, c.humidity_noise)).clamp(0.0, 100.0);
        let light = (c.base_light_level + whole_jitter(rng, c.light_noise)).round().max(0.0);
        let moisture =
            (c.base_soil_moisture_pct + whole_jitter(rng, c.soil_moisture_noise)).round().clamp(0.0, 100.0);

        let mut snapshot = SensorSnapshot::new(temperature, moisture);
        snapshot.humidity_pct = Some(humidity);
        snapshot.light_level = Some(light);
        snapshot.recorded_at = Some(Utc::now());
        snapshot
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new(SensorConfig::default())
    }
}

#[async_trait]
impl SensorSource for SimulatedSensor {
    async fn read(&self) -> Result<SensorSnapshot> {
        let snapshot = self.sample(&mut rand::thread_rng());
        tracing::debug!(
            temperature = snapshot.temperature_c,
            soil_moisture = snapshot.soil_moisture_pct,
            "simulated sensor reading"
        );
        Ok(snapshot)
    }
}

/// Non-finite or non-positive spread means no noise.
fn jitter<R: Rng>(rng: &mut R, spread: f64) -> f64 {
    if !spread.is_finite() || spread <= 0.0 { 0.0 } else { rng.gen_range(-spread..=spread) }
}

fn whole_jitter<R: Rng>(rng: &mut R, spread: f64) -> f64 {
    if !spread.is_finite() {
        return 0.0;
    }
    let spread = spread.trunc() as i64;
    if spread <= 0 { 0.0 } else { rng.gen_range(-spread..=spread) as f64 }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
