use nalgebra::{
    Point3,
    Vector3,
};

use crate::{
    Error,
    constants::EPSILON,
    error::check_frequency,
    icosphere::Icosphere,
    math::{
        complexify,
        real_part,
        unit,
    },
    path::Path,
    wave::{
        EmProperties,
        Wave,
    },
};

/// A dipole antenna.
///
/// As transmitter it emits root waves over a geodesic sphere of directions.
/// As receiver it sums the fields of all waves that pass close to it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Antenna {
    pub position: Point3<f64>,

    /// Dipole axis. Need not be normalized.
    pub orientation: Vector3<f64>,

    /// Hz
    pub frequency: f64,

    /// Length of the dipole element. Also the radius within which a receiver
    /// picks up passing waves.
    pub element_length: f64,
}

impl Antenna {
    pub fn new(
        position: Point3<f64>,
        orientation: Vector3<f64>,
        frequency: f64,
        element_length: f64,
    ) -> Result<Self, Error> {
        let antenna = Self {
            position,
            orientation,
            frequency,
            element_length,
        };
        antenna.validate()?;
        Ok(antenna)
    }

    fn validate(&self) -> Result<(), Error> {
        if unit(&self.orientation).is_none() {
            return Err(Error::InvalidOrientation);
        }
        check_frequency(self.frequency)?;
        if !self.element_length.is_finite() || self.element_length <= 0.0 {
            return Err(Error::InvalidReceiverSize {
                size: self.element_length,
            });
        }
        Ok(())
    }

    /// Unnormalized intensity towards `direction`: `sin(theta)^exponent`, with
    /// `theta` the angle to the dipole axis.
    pub fn radiation_pattern(&self, direction: &Vector3<f64>, exponent: f64) -> f64 {
        let norms = direction.norm() * self.orientation.norm();
        if norms < EPSILON {
            return 0.0;
        }
        let sin_theta = direction.cross(&self.orientation).norm() / norms;
        sin_theta.min(1.0).powf(exponent)
    }

    /// Emits one root wave per icosphere vertex. Amplitudes follow the
    /// radiation pattern and sum to the transmit power.
    pub fn transmit(&self, parameters: &TransmitParameters) -> Result<Vec<Wave>, Error> {
        self.validate()?;
        parameters.validate()?;

        let directions = Icosphere::new(parameters.subdivisions).into_vertices();
        let weights = directions
            .iter()
            .map(|direction| self.radiation_pattern(direction, parameters.exponent))
            .collect::<Vec<_>>();

        // weights are relative, so only an all-zero pattern is left unscaled
        let total = weights.iter().sum::<f64>();
        let scale = if total > 0.0 {
            parameters.power / total
        }
        else {
            0.0
        };

        let polarization = complexify(&self.orientation);
        let waves = directions
            .into_iter()
            .zip(weights)
            .map(|(direction, weight)| {
                Wave::root(
                    self.position,
                    direction,
                    EmProperties {
                        frequency: self.frequency,
                        amplitude: weight * scale,
                        phase: parameters.delay,
                        polarization,
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            waves = waves.len(),
            power = parameters.power,
            subdivisions = parameters.subdivisions,
            "transmit"
        );

        Ok(waves)
    }

    /// Sums the real electric field of every wave whose ray passes within
    /// `element_length` of the antenna.
    ///
    /// A wave only counts if its closest approach, clamped to its origin, lies
    /// before the face it hits. Other geometry does not occlude.
    pub fn receive<'a>(&self, paths: impl IntoIterator<Item = &'a Path>) -> Result<Vector3<f64>, Error> {
        self.validate()?;

        let mut field = Vector3::zeros();
        let mut contributions = 0;

        for path in paths {
            for wave in path.iter() {
                let to_receiver = self.position - wave.origin();
                // waves starting inside the receiver sphere are measured at their origin
                let distance = to_receiver.dot(wave.direction()).max(0.0);
                if wave
                    .segment_length()
                    .is_some_and(|segment_length| distance > segment_length)
                {
                    continue;
                }

                let miss = (to_receiver - wave.direction() * distance).norm();
                if miss > self.element_length {
                    continue;
                }

                field += real_part(&wave.electric_field(distance));
                contributions += 1;
            }
        }

        tracing::debug!(contributions, magnitude = field.norm(), position = ?self.position, "receive");

        Ok(field)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct TransmitParameters {
    /// Sum of the amplitudes of all emitted waves.
    pub power: f64,

    /// Phase of the emitted waves in radians.
    pub delay: f64,

    /// Exponent of the radiation pattern. `0` radiates isotropically, `2` is
    /// the intensity pattern of a short dipole.
    pub exponent: f64,

    /// Icosphere subdivision level. Emits `10 * 4^n + 2` waves.
    pub subdivisions: usize,
}

impl Default for TransmitParameters {
    fn default() -> Self {
        Self {
            power: 1.0,
            delay: 0.0,
            exponent: 2.0,
            subdivisions: 2,
        }
    }
}

impl TransmitParameters {
    fn validate(&self) -> Result<(), Error> {
        if !self.power.is_finite() || self.power < 0.0 {
            return Err(Error::InvalidPower { power: self.power });
        }
        if !self.exponent.is_finite() || self.exponent < 0.0 {
            return Err(Error::InvalidExponent {
                exponent: self.exponent,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::{
        assert_abs_diff_eq,
        assert_relative_eq,
    };
    use nalgebra::{
        Point3,
        Vector3,
    };

    use crate::{
        Error,
        antenna::{
            Antenna,
            TransmitParameters,
        },
        face::Face,
        icosphere::PHI,
        material::{
            Material,
            MaterialTable,
        },
        math::{
            complexify,
            real_part,
        },
        tracer::trace,
        wave::{
            EmProperties,
            Wave,
        },
    };

    fn dipole() -> Antenna {
        Antenna::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, 2.0), 2.4e9, 0.5).unwrap()
    }

    fn wall(x: f64) -> Face {
        Face::new(
            [
                Point3::new(x, -10.0, -10.0),
                Point3::new(x, 20.0, -10.0),
                Point3::new(x, -10.0, 20.0),
            ],
            Material::Concrete,
            &MaterialTable::default(),
        )
    }

    #[test]
    fn transmitted_amplitudes_sum_to_power() {
        let antenna = dipole();
        for exponent in [0.0, 0.5, 1.0, 2.0, 3.7] {
            for subdivisions in 0..4 {
                let waves = antenna
                    .transmit(&TransmitParameters {
                        power: 42.0,
                        delay: 0.3,
                        exponent,
                        subdivisions,
                    })
                    .unwrap();
                assert_eq!(waves.len(), 10 * 4usize.pow(subdivisions as u32) + 2);

                let total = waves
                    .iter()
                    .map(|wave| wave.properties().unwrap().amplitude)
                    .sum::<f64>();
                assert_relative_eq!(total, 42.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn steep_patterns_still_sum_to_power() {
        // the axis passes through two icosahedron vertices, so those get zero
        // weight and all others are tiny
        let antenna = Antenna::new(Point3::origin(), Vector3::new(-1.0, 0.0, -PHI), 2.4e9, 0.1).unwrap();
        for exponent in [100.0, 200.0, 250.0] {
            let waves = antenna
                .transmit(&TransmitParameters {
                    power: 1.0,
                    exponent,
                    subdivisions: 0,
                    ..Default::default()
                })
                .unwrap();
            let amplitudes = waves
                .iter()
                .map(|wave| wave.properties().unwrap().amplitude)
                .collect::<Vec<_>>();
            assert_relative_eq!(amplitudes.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
            assert_eq!(amplitudes.iter().filter(|amplitude| **amplitude == 0.0).count(), 2);
        }
    }

    #[test]
    fn emitted_waves_follow_the_dipole_pattern() {
        let antenna = dipole();
        let waves = antenna.transmit(&TransmitParameters::default()).unwrap();

        for wave in &waves {
            let properties = wave.properties().unwrap();
            assert_eq!(wave.origin(), &antenna.position);
            assert_eq!(properties.frequency, antenna.frequency);
            assert_eq!(properties.phase, 0.0);

            // polarization is transverse to the direction of travel
            let polarization = real_part(&properties.polarization);
            assert_abs_diff_eq!(polarization.dot(wave.direction()), 0.0, epsilon = 1e-9);
        }

        let amplitude_towards = |direction: Vector3<f64>| {
            waves
                .iter()
                .max_by(|a, b| a.direction().dot(&direction).total_cmp(&b.direction().dot(&direction)))
                .map(|wave| wave.properties().unwrap().amplitude)
                .unwrap()
        };
        assert!(amplitude_towards(Vector3::x()) > amplitude_towards(Vector3::z()));
    }

    #[test]
    fn isotropic_pattern_has_equal_weights() {
        let waves = dipole()
            .transmit(&TransmitParameters {
                power: 1.0,
                exponent: 0.0,
                subdivisions: 1,
                ..Default::default()
            })
            .unwrap();
        for wave in &waves {
            assert_relative_eq!(
                wave.properties().unwrap().amplitude,
                1.0 / 42.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn it_rejects_invalid_configuration() {
        assert_eq!(
            Antenna::new(Point3::origin(), Vector3::zeros(), 1e9, 0.1).unwrap_err(),
            Error::InvalidOrientation
        );
        assert_eq!(
            Antenna::new(Point3::origin(), Vector3::z(), 0.0, 0.1).unwrap_err(),
            Error::InvalidFrequency { frequency: 0.0 }
        );
        assert_eq!(
            Antenna::new(Point3::origin(), Vector3::z(), 1e9, 0.0).unwrap_err(),
            Error::InvalidReceiverSize { size: 0.0 }
        );
        assert_eq!(
            dipole()
                .transmit(&TransmitParameters {
                    power: -1.0,
                    ..Default::default()
                })
                .unwrap_err(),
            Error::InvalidPower { power: -1.0 }
        );
        assert_eq!(
            dipole()
                .transmit(&TransmitParameters {
                    exponent: -2.0,
                    ..Default::default()
                })
                .unwrap_err(),
            Error::InvalidExponent { exponent: -2.0 }
        );
    }

    fn seed() -> Wave {
        Wave::root(
            Point3::origin(),
            Vector3::x(),
            EmProperties::new(1e9, 1.0, 0.0, complexify(&Vector3::z())),
        )
        .unwrap()
    }

    #[test]
    fn it_receives_a_passing_wave() {
        let path = trace(seed(), &[wall(20.0)], 0).unwrap();

        let receiver = Antenna::new(Point3::new(10.0, 0.1, 0.0), Vector3::z(), 1e9, 0.5).unwrap();
        let field = receiver.receive([&path]).unwrap();
        assert_relative_eq!(field, real_part(&path.root().electric_field(10.0)), epsilon = 1e-12);

        let behind = Antenna::new(Point3::new(-10.0, 0.0, 0.0), Vector3::z(), 1e9, 0.5).unwrap();
        assert_eq!(behind.receive([&path]).unwrap(), Vector3::zeros());

        let aside = Antenna::new(Point3::new(10.0, 1.0, 0.0), Vector3::z(), 1e9, 0.5).unwrap();
        assert_eq!(aside.receive([&path]).unwrap(), Vector3::zeros());
    }

    #[test]
    fn it_receives_waves_starting_inside_the_receiver() {
        let path = trace(seed(), &[wall(20.0)], 0).unwrap();

        let receiver = Antenna::new(Point3::new(-0.2, 0.0, 0.0), Vector3::z(), 1e9, 0.5).unwrap();
        let field = receiver.receive([&path]).unwrap();
        assert_relative_eq!(field, real_part(&path.root().electric_field(0.0)), epsilon = 1e-12);
        assert!(field.norm() > 0.0);
    }

    #[test]
    fn waves_only_count_along_their_own_segment() {
        let path = trace(seed(), &[wall(5.0)], 1).unwrap();
        assert_eq!(path.len(), 3);

        let receiver = Antenna::new(Point3::new(10.0, 0.0, 0.0), Vector3::z(), 1e9, 0.5).unwrap();
        let field = receiver.receive([&path]).unwrap();

        // only the refracted wave, which leaves the wall at x = 5, reaches x = 10
        let refracted = path.wave(path.root().children().refracted.unwrap());
        assert_relative_eq!(field, real_part(&refracted.electric_field(5.0)), epsilon = 1e-9);
    }
}
