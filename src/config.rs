use std::collections::HashMap;

use nalgebra::{
    Point3,
    Vector3,
};
use rft_mesh::MaterialMapping;
use rft_solver::{
    Antenna,
    Material,
    MaterialProperties,
    MaterialTable,
    PhysicalConstants,
    TracerConfig,
    TransmitParameters,
};
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub antenna: AntennaConfig,

    #[serde(default)]
    pub transmit: TransmitParameters,

    #[serde(default)]
    pub tracer: TracerConfig,

    #[serde(default)]
    pub receivers: Vec<ReceiverConfig>,

    /// Overrides of the built-in material table.
    #[serde(default)]
    pub materials: HashMap<Material, MaterialProperties>,

    #[serde(default)]
    pub mesh: MeshConfig,

    #[serde(default)]
    pub constants: PhysicalConstants,
}

impl SimulationConfig {
    pub fn material_table(&self) -> MaterialTable {
        self.materials.iter().fold(
            MaterialTable::ITU.with_physical_constants(self.constants),
            |table, (material, properties)| table.with(*material, *properties),
        )
    }

    pub fn tracer_config(&self) -> TracerConfig {
        TracerConfig {
            physical_constants: self.constants,
            ..self.tracer
        }
    }

    pub fn transmitter(&self) -> Result<Antenna, rft_solver::Error> {
        Antenna::new(
            self.antenna.position,
            self.antenna.orientation,
            self.antenna.frequency,
            self.antenna.element_length,
        )
    }

    /// Receivers share orientation and frequency with the transmitter.
    pub fn receiver(&self, receiver: &ReceiverConfig) -> Result<Antenna, rft_solver::Error> {
        Antenna::new(
            receiver.position,
            self.antenna.orientation,
            self.antenna.frequency,
            receiver.size.unwrap_or(self.antenna.element_length),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AntennaConfig {
    #[serde(default = "default_position")]
    pub position: Point3<f64>,

    #[serde(default = "default_orientation")]
    pub orientation: Vector3<f64>,

    /// Hz
    #[serde(default = "default_frequency")]
    pub frequency: f64,

    /// in metres
    #[serde(default = "default_element_length")]
    pub element_length: f64,
}

impl Default for AntennaConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            orientation: default_orientation(),
            frequency: default_frequency(),
            element_length: default_element_length(),
        }
    }
}

fn default_position() -> Point3<f64> {
    Point3::new(0.0, 0.0, 1.5)
}

fn default_orientation() -> Vector3<f64> {
    Vector3::z()
}

fn default_frequency() -> f64 {
    2.4e9
}

fn default_element_length() -> f64 {
    0.0625
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    pub name: String,

    pub position: Point3<f64>,

    /// Pick-up radius. Defaults to the transmitter element length.
    #[serde(default)]
    pub size: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Material for models whose name is not a known material.
    #[serde(default)]
    pub default_material: Material,

    /// Reject unknown material names instead of using the default.
    #[serde(default)]
    pub strict: bool,
}

impl MeshConfig {
    pub fn material_mapping(&self) -> MaterialMapping {
        if self.strict {
            MaterialMapping::Strict
        }
        else {
            MaterialMapping::Fallback(self.default_material)
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;
    use rft_solver::{
        Attenuation,
        Material,
        MaterialProperties,
        MaterialTable,
    };

    use crate::config::SimulationConfig;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = SimulationConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: SimulationConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            [tracer]
            depth = 4
            attenuation = { model = "exponential", per_metre = 0.01 }

            [[receivers]]
            name = "desk"
            position = [3.0, 2.0, 0.8]

            [materials.glass]
            permittivity = [6.0, 0.0]
            conductivity = [0.001, 1.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.tracer.depth, 4);
        assert_eq!(
            config.tracer.attenuation,
            Attenuation::Exponential { per_metre: 0.01 }
        );
        assert_eq!(config.transmit, Default::default());
        assert_eq!(config.receivers[0].position, Point3::new(3.0, 2.0, 0.8));

        let table = config.material_table();
        assert_eq!(
            *table.get(Material::Glass),
            MaterialProperties::new(6.0, 0.0, 0.001, 1.0)
        );
        assert_eq!(
            table.get(Material::Brick),
            MaterialTable::ITU.get(Material::Brick)
        );

        let receiver = config.receiver(&config.receivers[0]).unwrap();
        assert_eq!(receiver.element_length, config.antenna.element_length);
    }
}
