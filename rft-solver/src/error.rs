#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("direction vector has zero length or is not finite")]
    ZeroDirection,

    #[error("invalid frequency: {frequency}")]
    InvalidFrequency { frequency: f64 },

    #[error("scene contains no faces")]
    EmptyScene,

    #[error("invalid transmit power: {power}")]
    InvalidPower { power: f64 },

    #[error("invalid radiation pattern exponent: {exponent}")]
    InvalidExponent { exponent: f64 },

    #[error("antenna orientation has zero length or is not finite")]
    InvalidOrientation,

    #[error("invalid receiver size: {size}")]
    InvalidReceiverSize { size: f64 },

    #[error("trace must be seeded with a root wave")]
    NotARootWave,
}

pub(crate) fn check_frequency(frequency: f64) -> Result<f64, Error> {
    if frequency.is_finite() && frequency > 0.0 {
        Ok(frequency)
    }
    else {
        Err(Error::InvalidFrequency { frequency })
    }
}
