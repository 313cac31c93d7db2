use std::cell::OnceCell;

use nalgebra::{
    Point3,
    Vector3,
};

use crate::{
    Error,
    arena::Handle,
    error::check_frequency,
    face::Face,
    math::{
        ComplexVector3,
        complex_unit,
        is_finite,
        shift,
    },
    ray::Ray,
};

/// How a derived wave came off its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Interaction {
    Reflection,
    Refraction,
}

/// Electromagnetic state of a wave at its origin.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmProperties {
    /// Hz
    pub frequency: f64,

    pub amplitude: f64,

    /// Phase at the wave origin in radians.
    pub phase: f64,

    /// Complex unit vector transverse to the direction of travel. Real and
    /// imaginary parts are two field components in phase quadrature, e.g.
    /// `(0, j, 0.9)` for an elliptically polarized wave travelling along `x`.
    pub polarization: ComplexVector3,
}

impl EmProperties {
    pub fn new(frequency: f64, amplitude: f64, phase: f64, polarization: ComplexVector3) -> Self {
        Self {
            frequency,
            amplitude,
            phase,
            polarization,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.frequency.is_finite()
            && self.amplitude.is_finite()
            && self.phase.is_finite()
            && is_finite(&self.polarization)
    }

    /// Replaces non-finite field values with an extinguished field, so that
    /// numerical blow-ups stop at the node where they happened.
    pub(crate) fn sanitized(self) -> Self {
        if self.is_finite() {
            self
        }
        else {
            tracing::warn!(properties = ?self, "non-finite em properties, extinguishing wave");
            Self {
                frequency: self.frequency,
                amplitude: 0.0,
                phase: 0.0,
                polarization: ComplexVector3::zeros(),
            }
        }
    }
}

/// Link from a derived wave to the wave and face that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Genesis {
    pub parent: Handle<Wave>,
    pub face: Face,
    pub face_index: usize,
    pub interaction: Interaction,

    /// Distance from the parent's origin to this wave's origin.
    pub distance: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EmState {
    /// Explicitly seeded properties.
    Root(EmProperties),

    /// Properties derived from the parent on first access. The cell is
    /// written at most once.
    Derived {
        genesis: Genesis,
        cache: OnceCell<EmProperties>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmStatus {
    Seeded,
    Pending,
    Computed,
}

/// A directed ray together with its electromagnetic state.
///
/// Waves are immutable once created. Derived waves are only created by the
/// tracer and live in a [`Path`][crate::path::Path].
#[derive(Clone, Debug, PartialEq)]
pub struct Wave {
    ray: Ray,
    state: EmState,
}

impl Wave {
    /// Creates a seeded wave.
    ///
    /// The polarization is re-expressed transverse to `direction` and
    /// normalized.
    pub fn root(
        origin: Point3<f64>,
        direction: Vector3<f64>,
        properties: EmProperties,
    ) -> Result<Self, Error> {
        let ray = Ray::new(origin, direction)?;
        check_frequency(properties.frequency)?;

        // normalizing would hide a non-finite polarization
        let properties = properties.sanitized();
        let polarization = complex_unit(&shift(&properties.polarization, ray.direction()));

        Ok(Self {
            ray,
            state: EmState::Root(EmProperties {
                polarization,
                ..properties
            }),
        })
    }

    pub(crate) fn derived(ray: Ray, genesis: Genesis) -> Self {
        Self {
            ray,
            state: EmState::Derived {
                genesis,
                cache: OnceCell::new(),
            },
        }
    }

    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    pub fn origin(&self) -> &Point3<f64> {
        self.ray.origin()
    }

    pub fn direction(&self) -> &Vector3<f64> {
        self.ray.direction()
    }

    pub fn state(&self) -> &EmState {
        &self.state
    }

    pub fn is_root(&self) -> bool {
        matches!(self.state, EmState::Root(_))
    }

    pub fn genesis(&self) -> Option<&Genesis> {
        match &self.state {
            EmState::Root(_) => None,
            EmState::Derived { genesis, .. } => Some(genesis),
        }
    }

    pub fn interaction(&self) -> Option<Interaction> {
        self.genesis().map(|genesis| genesis.interaction)
    }

    pub fn status(&self) -> EmStatus {
        match &self.state {
            EmState::Root(_) => EmStatus::Seeded,
            EmState::Derived { cache, .. } => {
                if cache.get().is_some() {
                    EmStatus::Computed
                }
                else {
                    EmStatus::Pending
                }
            }
        }
    }

    /// Properties if they are seeded or already computed. Never triggers the
    /// computation.
    pub fn properties(&self) -> Option<&EmProperties> {
        match &self.state {
            EmState::Root(properties) => Some(properties),
            EmState::Derived { cache, .. } => cache.get(),
        }
    }
}

/// Amplitude loss along a single wave segment, as function of the distance
/// travelled from the wave origin.
///
/// Factors of consecutive segments multiply.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "model", rename_all = "snake_case")
)]
pub enum Attenuation {
    #[default]
    None,
    Exponential {
        per_metre: f64,
    },
}

impl Attenuation {
    pub fn factor(&self, distance: f64) -> f64 {
        match self {
            Attenuation::None => 1.0,
            Attenuation::Exponential { per_metre } => (-per_metre * distance.max(0.0)).exp(),
        }
    }
}
