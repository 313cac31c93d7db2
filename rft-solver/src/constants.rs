use std::{
    f64::consts::TAU,
    fmt::Debug,
};

/// Tolerance used by intersection tests and guarded divisions.
pub const EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalConstants {
    pub vacuum_permittivity: f64,
    pub vacuum_permeability: f64,
}

impl Debug for PhysicalConstants {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalConstants")
            .field("vacuum_permittivity", &self.vacuum_permittivity)
            .field("vacuum_permeability", &self.vacuum_permeability)
            .field("speed_of_light", &self.speed_of_light())
            .field("vacuum_impedance", &self.vacuum_impedance())
            .finish()
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::SI
    }
}

impl PhysicalConstants {
    pub const SI: Self = Self {
        vacuum_permittivity: 8.8541878188e-12,
        vacuum_permeability: 1.25663706127e-6,
    };

    pub fn speed_of_light(&self) -> f64 {
        (self.vacuum_permittivity * self.vacuum_permeability).powf(-0.5)
    }

    /// eta_0, roughly 377 ohm in SI units.
    pub fn vacuum_impedance(&self) -> f64 {
        (self.vacuum_permeability / self.vacuum_permittivity).sqrt()
    }

    pub fn frequency_to_wavelength(&self, frequency: f64) -> f64 {
        self.speed_of_light() / frequency
    }

    pub fn wavelength_to_frequency(&self, wavelength: f64) -> f64 {
        self.speed_of_light() / wavelength
    }

    /// Free-space wavenumber `k = 2 pi f / c`
    pub fn wavenumber(&self, frequency: f64) -> f64 {
        TAU * frequency / self.speed_of_light()
    }
}
