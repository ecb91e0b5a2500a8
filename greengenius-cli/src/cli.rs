use std::{
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand};
use greengenius_core::{
    Config, IdentifyOutcome, PlantRequirements, ProviderId, SensorSource, SimulatedSensor,
    analyze_health, config::mask_secret, evaluate, identify_plant, provider,
};
use serde_json::Value;

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "greengenius", version, about = "Plant identification and health CLI")]
pub struct Cli {
    /// Enable debug logging (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name, e.g. "plantid" or "trefle".
        provider: String,
    },

    /// Show which credentials are available.
    Check,

    /// Take one reading from the simulated sensor.
    Status {
        /// Print raw JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Compare a plant's requirements with a sensor reading.
    Analyze {
        /// Plant reference record (JSON file, or "-" for stdin).
        #[arg(long)]
        plant: PathBuf,

        /// Sensor reading (JSON file); a simulated reading is used if absent.
        #[arg(long)]
        sensor: Option<PathBuf>,

        /// Print raw JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Identify a plant from a photo.
    Identify {
        /// Image file (JPEG or PNG).
        image: PathBuf,

        /// Also analyze the best match against a simulated reading.
        #[arg(long)]
        analyze: bool,

        /// Print raw JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Check => check(),
            Command::Status { json } => {
                let config = Config::load()?;
                let snapshot = SimulatedSensor::new(config.sensor).read().await?;
                if json {
                    output::print_json(&snapshot)
                } else {
                    output::print_snapshot(&snapshot);
                    Ok(())
                }
            }
            Command::Analyze { plant, sensor, json } => {
                let plant_data = read_json(&plant)?;
                let verdict = match sensor {
                    Some(path) => analyze_health(&plant_data, &read_json(&path)?)?,
                    None => {
                        let config = Config::load()?;
                        let snapshot = SimulatedSensor::new(config.sensor).read().await?;
                        evaluate(&PlantRequirements::from_value(&plant_data), &snapshot)
                    }
                };
                if json {
                    output::print_json(&verdict)
                } else {
                    output::print_verdict(&verdict);
                    Ok(())
                }
            }
            Command::Identify { image, analyze, json } => identify(&image, analyze, json).await,
        }
    }
}

fn configure(provider: &str) -> Result<()> {
    let id = ProviderId::try_from(provider)?;

    // File values only: environment overrides must not be persisted.
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_key = inquire::Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key for {id} must not be empty");
    }

    config.upsert_provider_api_key(id, api_key);
    config.save_to(&path)?;

    println!("Saved {id} credentials to {}", path.display());
    Ok(())
}

fn check() -> Result<()> {
    let path = Config::config_file_path()?;
    let config = Config::load()?;

    println!("Config file: {}", path.display());
    for id in ProviderId::all() {
        match config.provider_api_key(*id).filter(|k| !k.is_empty()) {
            Some(key) => println!("  {:<8} {}", id.as_str(), mask_secret(key)),
            None => println!(
                "  {:<8} MISSING (run `greengenius configure {id}` or set {})",
                id.as_str(),
                id.env_var()
            ),
        }
    }
    Ok(())
}

async fn identify(image: &Path, analyze: bool, json: bool) -> Result<()> {
    let config = Config::load()?;
    let identifier = provider::identification_from_config(&config)?;
    let reference = provider::reference_from_config(&config)?;

    let bytes =
        std::fs::read(image).with_context(|| format!("Failed to read image: {}", image.display()))?;
    tracing::debug!(image = %image.display(), bytes = bytes.len(), "encoding image");
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

    let outcome = identify_plant(identifier.as_ref(), reference.as_ref(), &encoded).await?;

    let verdict = match (&outcome, analyze) {
        (IdentifyOutcome::Identified(found), true) => {
            let snapshot = SimulatedSensor::new(config.sensor).read().await?;
            Some(evaluate(&PlantRequirements::from_value(&found.details), &snapshot))
        }
        _ => None,
    };

    if json {
        let mut value = serde_json::to_value(&outcome)?;
        if let (Some(verdict), Some(obj)) = (&verdict, value.as_object_mut()) {
            obj.insert("health".to_string(), serde_json::to_value(verdict)?);
        }
        return output::print_json(&value);
    }

    output::print_identification(&outcome);
    if let Some(verdict) = verdict {
        println!();
        output::print_verdict(&verdict);
    }
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("Failed to read JSON from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?
    };

    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}
