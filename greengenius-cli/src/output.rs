//! Human-friendly rendering of core results.

use anyhow::{Context, Result};
use chrono::Local;
use greengenius_core::{HealthVerdict, IdentifyOutcome, SensorSnapshot};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON output")?;
    println!("{rendered}");
    Ok(())
}

pub fn print_snapshot(snapshot: &SensorSnapshot) {
    if let Some(ts) = snapshot.recorded_at {
        println!("Reading at {}", ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"));
    }
    println!("  Temperature:   {}°C", snapshot.temperature_c);
    println!("  Soil moisture: {}%", snapshot.soil_moisture_pct);
    if let Some(h) = snapshot.humidity_pct {
        println!("  Humidity:      {h}%");
    }
    if let Some(l) = snapshot.light_level {
        println!("  Light:         {l} lx");
    }
}

pub fn print_verdict(verdict: &HealthVerdict) {
    println!("Status: {}", verdict.status);
    println!("Ideal temperature: {} °C", verdict.details.ideal_ranges.temperature);
    println!("Ideal moisture:    {}", verdict.details.ideal_ranges.moisture);
    print_snapshot(&verdict.details.sensor_readings);

    if verdict.issues.is_empty() {
        println!("No issues found.");
        return;
    }

    println!("Issues:");
    for (issue, advice) in verdict.issues.iter().zip(&verdict.recommendations) {
        println!("  - {issue}: {advice}");
    }
}

pub fn print_identification(outcome: &IdentifyOutcome) {
    match outcome {
        IdentifyOutcome::NotIdentified { error, .. } => println!("{error}"),
        IdentifyOutcome::Identified(found) => {
            println!(
                "Best match: {} ({:.1}% confidence)",
                found.identification.name, found.confidence
            );
            if found.suggestions.len() > 1 {
                println!("Other candidates:");
                for s in found.suggestions.iter().skip(1) {
                    println!("  - {} ({:.1}%)", s.name, s.probability * 100.0);
                }
            }
            if !found.reference_available {
                println!("No botanical reference record found; default care ranges apply.");
            }
        }
    }
}
