use nalgebra::{
    Point3,
    Vector3,
};

use crate::{
    Error,
    math::unit,
};

/// A half-line with unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    origin: Point3<f64>,
    direction: Vector3<f64>,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Result<Self, Error> {
        let direction = unit(&direction).ok_or(Error::ZeroDirection)?;
        Ok(Self { origin, direction })
    }

    /// The caller guarantees that `direction` is unit length.
    pub(crate) fn new_unchecked(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        debug_assert!((direction.norm() - 1.0).abs() < 1e-6);
        Self { origin, direction }
    }

    pub fn origin(&self) -> &Point3<f64> {
        &self.origin
    }

    pub fn direction(&self) -> &Vector3<f64> {
        &self.direction
    }

    pub fn point_at(&self, distance: f64) -> Point3<f64> {
        self.origin + self.direction * distance
    }

    pub fn reversed(&self) -> Self {
        Self {
            origin: self.origin,
            direction: -self.direction,
        }
    }
}
