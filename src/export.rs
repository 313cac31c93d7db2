//! JSON export of traced waves and received fields for external analysis and
//! visualization.

use std::path::Path;

use color_eyre::eyre::{
    Error,
    WrapErr,
};
use nalgebra::{
    Point3,
    Vector3,
};
use rft_solver::{
    Interaction,
    WaveRef,
    math::{
        imag_part,
        real_part,
    },
};
use serde::Serialize;

#[derive(Clone, Debug, Default, Serialize)]
pub struct Report {
    pub waves: Vec<WaveRecord>,
    pub receivers: Vec<ReceiverRecord>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WaveRecord {
    /// Index of the seed wave this wave descends from.
    pub seed: usize,

    /// Pre-order index within the seed's path.
    pub index: usize,

    pub depth: usize,
    pub interaction: Option<Interaction>,
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: f64,
    pub polarization_re: Vector3<f64>,
    pub polarization_im: Vector3<f64>,
    pub path_length: f64,
    pub segment_length: Option<f64>,
}

impl WaveRecord {
    /// Evaluates the wave at its origin. This computes its field if that
    /// hasn't happened yet.
    pub fn new(seed: usize, wave: &WaveRef<'_>) -> Self {
        let polarization = wave.polarization(0.0);

        Self {
            seed,
            index: wave.handle().index(),
            depth: wave.depth(),
            interaction: wave.interaction(),
            origin: *wave.origin(),
            direction: *wave.direction(),
            frequency: wave.frequency(0.0),
            amplitude: wave.amplitude(0.0),
            phase: wave.phase(0.0),
            polarization_re: real_part(&polarization),
            polarization_im: imag_part(&polarization),
            path_length: wave.path_length(),
            segment_length: wave.segment_length(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ReceiverRecord {
    pub name: String,
    pub position: Point3<f64>,
    pub field: Vector3<f64>,
    pub magnitude: f64,
}

impl ReceiverRecord {
    pub fn new(name: impl Into<String>, position: Point3<f64>, field: Vector3<f64>) -> Self {
        Self {
            name: name.into(),
            position,
            field,
            magnitude: field.norm(),
        }
    }
}

impl Report {
    pub fn write(&self, output: Option<&Path>) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(output) = output {
            std::fs::write(output, &json)
                .with_context(|| format!("Could not write report: {}", output.display()))?;
            tracing::info!(path = %output.display(), waves = self.waves.len(), "Wrote report");
        }
        else {
            println!("{json}");
        }
        Ok(())
    }
}
