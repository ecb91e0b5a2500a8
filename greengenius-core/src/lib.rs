//! Core library for the `greengenius` plant care tool.
//!
//! This crate defines:
//! - Plant health analysis (requirements vs. sensor readings)
//! - Sensor sources, including a simulated one
//! - Abstractions over identification and botanical reference providers
//! - Configuration & credentials handling
//!
//! It is used by `greengenius-cli`, but can also be reused by other binaries or services.

pub mod analysis;
pub mod config;
pub mod error;
pub mod identify;
pub mod model;
pub mod provider;
pub mod requirements;
pub mod sensor;

pub use analysis::{analyze_health, evaluate};
pub use config::{Config, ProviderConfig, SensorConfig};
pub use error::InputError;
pub use identify::identify_plant;
pub use model::{HealthStatus, HealthVerdict, IdentifyOutcome, Issue, SensorSnapshot};
pub use provider::{IdentificationProvider, ProviderId, ReferenceProvider};
pub use requirements::PlantRequirements;
pub use sensor::{SensorSource, SimulatedSensor};
