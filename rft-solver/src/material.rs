use num::Complex;
use strum::{
    EnumCount,
    VariantArray,
};

use crate::constants::PhysicalConstants;

/// Surface type of a face.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumCount,
    strum::VariantArray,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Material {
    Vacuum,
    #[default]
    Concrete,
    Brick,
    Wood,
    Glass,
    Metal,
    Desert,
    Ground,
    Swamp,
}

impl Material {
    pub fn iter() -> impl Iterator<Item = Self> {
        Self::VARIANTS.iter().copied()
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Power-law fit of the electrical properties of a material over frequency.
///
/// With `f` in GHz:
///
/// - relative permittivity: `a * f^b`
/// - conductivity in S/m: `c * f^d`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialProperties {
    pub permittivity: [f64; 2],
    pub conductivity: [f64; 2],
}

impl MaterialProperties {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            permittivity: [a, b],
            conductivity: [c, d],
        }
    }

    /// epsilon_r at `frequency` (Hz)
    pub fn relative_permittivity(&self, frequency: f64) -> f64 {
        let [a, b] = self.permittivity;
        a * (frequency * 1e-9).powf(b)
    }

    /// sigma at `frequency` (Hz)
    pub fn conductivity(&self, frequency: f64) -> f64 {
        let [c, d] = self.conductivity;
        c * (frequency * 1e-9).powf(d)
    }

    /// Complex relative permittivity `epsilon_r + j sigma / (omega epsilon_0)`.
    ///
    /// The sign of the loss term matches the `exp(+j k r)` propagation phase
    /// used by waves, so that a positive imaginary part attenuates.
    pub fn complex_permittivity(
        &self,
        frequency: f64,
        physical_constants: &PhysicalConstants,
    ) -> Complex<f64> {
        let omega = std::f64::consts::TAU * frequency;
        let loss = self.conductivity(frequency) / (omega * physical_constants.vacuum_permittivity);
        Complex::new(self.relative_permittivity(frequency), loss)
    }

    /// Complex refractive index `n = sqrt(epsilon_r + j sigma / (omega
    /// epsilon_0))`.
    ///
    /// This is the square root of the whole complex permittivity. It is
    /// neither `sqrt(epsilon_r)` plus a separate loss term nor the bare
    /// complex permittivity, both of which are sometimes used as the index.
    /// Only this form reduces to `sqrt(epsilon_r)` for lossless media and
    /// gives the Fresnel equations their usual meaning.
    pub fn refractive_index(
        &self,
        frequency: f64,
        physical_constants: &PhysicalConstants,
    ) -> Complex<f64> {
        self.complex_permittivity(frequency, physical_constants)
            .sqrt()
    }
}

/// Immutable lookup of [`MaterialProperties`] per [`Material`].
///
/// Defaults follow the ITU-R P.2040 building material and ground fits. Desert,
/// ground and swamp use the very dry, medium dry and wet ground entries.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialTable {
    properties: [MaterialProperties; Material::COUNT],
    physical_constants: PhysicalConstants,
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::ITU
    }
}

impl MaterialTable {
    pub const ITU: Self = Self {
        properties: [
            // vacuum
            MaterialProperties::new(1.0, 0.0, 0.0, 0.0),
            // concrete
            MaterialProperties::new(5.24, 0.0, 0.0462, 0.7822),
            // brick
            MaterialProperties::new(3.91, 0.0, 0.0238, 0.16),
            // wood
            MaterialProperties::new(1.99, 0.0, 0.0047, 1.0718),
            // glass
            MaterialProperties::new(6.31, 0.0, 0.0036, 1.3394),
            // metal
            MaterialProperties::new(1.0, 0.0, 1e7, 0.0),
            // desert
            MaterialProperties::new(3.0, 0.0, 0.00015, 2.52),
            // ground
            MaterialProperties::new(15.0, -0.1, 0.035, 1.63),
            // swamp
            MaterialProperties::new(30.0, -0.4, 0.15, 1.30),
        ],
        physical_constants: PhysicalConstants::SI,
    };

    pub fn with_physical_constants(mut self, physical_constants: PhysicalConstants) -> Self {
        self.physical_constants = physical_constants;
        self
    }

    /// Replaces the properties of a single material.
    pub fn with(mut self, material: Material, properties: MaterialProperties) -> Self {
        self.properties[material.index()] = properties;
        self
    }

    pub fn get(&self, material: Material) -> &MaterialProperties {
        &self.properties[material.index()]
    }

    pub fn physical_constants(&self) -> &PhysicalConstants {
        &self.physical_constants
    }

    pub fn refractive_index(&self, material: Material, frequency: f64) -> Complex<f64> {
        self.get(material)
            .refractive_index(frequency, &self.physical_constants)
    }
}
