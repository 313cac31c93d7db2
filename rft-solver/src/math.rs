//! Helpers over real and complex 3-vectors.
//!
//! Real vectors are plain [`nalgebra::Vector3<f64>`]. Complex vectors use
//! [`num::Complex<f64>`] as scalar, which nalgebra supports for the usual
//! arithmetic, [`dot`][nalgebra::Matrix::dot] (non-conjugating) and
//! [`cross`][nalgebra::Matrix::cross].

use nalgebra::Vector3;
use num::{
    Complex,
    Zero,
};

use crate::constants::EPSILON;

pub type ComplexVector3 = Vector3<Complex<f64>>;

/// Unit vector in direction of `vector`, or `None` if it is (close to) zero or
/// not finite.
pub fn unit(vector: &Vector3<f64>) -> Option<Vector3<f64>> {
    if !vector.iter().all(|x| x.is_finite()) {
        return None;
    }
    vector.try_normalize(EPSILON)
}

pub fn complexify(vector: &Vector3<f64>) -> ComplexVector3 {
    vector.map(|x| Complex::new(x, 0.0))
}

pub fn real_part(vector: &ComplexVector3) -> Vector3<f64> {
    vector.map(|c| c.re)
}

pub fn imag_part(vector: &ComplexVector3) -> Vector3<f64> {
    vector.map(|c| c.im)
}

/// Hermitian norm `sqrt(sum |c_i|^2)`
pub fn complex_norm(vector: &ComplexVector3) -> f64 {
    vector.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt()
}

/// Scales a complex vector to unit hermitian norm. Vectors with vanishing norm
/// map to zero.
pub fn complex_unit(vector: &ComplexVector3) -> ComplexVector3 {
    let norm = complex_norm(vector);
    if norm < EPSILON || !norm.is_finite() {
        ComplexVector3::zeros()
    }
    else {
        vector.map(|c| c / norm)
    }
}

/// Angle between two real vectors in `[0, pi]`. Zero vectors yield `0`.
pub fn angle(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    match (unit(a), unit(b)) {
        (Some(a), Some(b)) => a.dot(&b).clamp(-1.0, 1.0).acos(),
        _ => 0.0,
    }
}

/// Re-expresses `vector` transverse to `direction`.
///
/// Computes `-((v x w) x w)`, which for a unit `w` equals `v - (v . w) w`: the
/// component of `v` orthogonal to the direction of travel.
pub fn shift(vector: &ComplexVector3, direction: &Vector3<f64>) -> ComplexVector3 {
    let direction = complexify(direction);
    -vector.cross(&direction).cross(&direction)
}

/// Returns `true` if all components are finite.
pub fn is_finite(vector: &ComplexVector3) -> bool {
    vector.iter().all(|c| c.re.is_finite() && c.im.is_finite())
}

/// Divides `numerator` by `denominator`, returning zero if the denominator
/// vanishes.
pub fn guarded_div(numerator: Complex<f64>, denominator: Complex<f64>) -> Complex<f64> {
    if denominator.norm() < EPSILON {
        Complex::zero()
    }
    else {
        numerator / denominator
    }
}
