//! Traced wave trees.
//!
//! A [`Path`] stores the waves of one trace in pre-order (seed, reflection
//! subtree, refraction subtree). Derived waves compute their electromagnetic
//! properties on first access through a [`WaveRef`] and cache them.

use std::{
    cell::Cell,
    ops::Deref,
};

use nalgebra::Vector3;
use num::Complex;
use smallvec::SmallVec;

use crate::{
    Error,
    arena::{
        Arena,
        Handle,
    },
    constants::PhysicalConstants,
    math::{
        ComplexVector3,
        angle,
        complex_unit,
        complexify,
        guarded_div,
        imag_part,
        real_part,
        shift,
        unit,
    },
    wave::{
        Attenuation,
        EmProperties,
        EmState,
        Genesis,
        Interaction,
        Wave,
    },
};

/// Refractive index of the medium all waves travel in.
const AIR: f64 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Children {
    pub reflected: Option<Handle<Wave>>,
    pub refracted: Option<Handle<Wave>>,
}

impl Children {
    pub fn iter(&self) -> impl Iterator<Item = Handle<Wave>> {
        self.reflected.into_iter().chain(self.refracted)
    }

    pub fn is_leaf(&self) -> bool {
        self.reflected.is_none() && self.refracted.is_none()
    }
}

#[derive(Clone, Copy, Debug)]
struct Node {
    depth: usize,
    children: Children,
}

#[derive(Clone, Debug)]
pub struct Path {
    waves: Arena<Wave>,
    nodes: Vec<Node>,
    root: Handle<Wave>,
    attenuation: Attenuation,
    physical_constants: PhysicalConstants,
    fresnel_evaluations: Cell<usize>,
}

impl Path {
    pub(crate) fn new(
        seed: Wave,
        attenuation: Attenuation,
        physical_constants: PhysicalConstants,
    ) -> Result<Self, Error> {
        if !seed.is_root() {
            return Err(Error::NotARootWave);
        }

        let mut waves = Arena::default();
        let root = waves.insert(seed);

        Ok(Self {
            waves,
            nodes: vec![Node {
                depth: 0,
                children: Children::default(),
            }],
            root,
            attenuation,
            physical_constants,
            fresnel_evaluations: Cell::new(0),
        })
    }

    /// Appends a derived wave and links it to its parent.
    pub(crate) fn insert(&mut self, wave: Wave) -> Handle<Wave> {
        let handle = self.waves.next_handle();

        let depth = if let Some(genesis) = wave.genesis() {
            let parent = &mut self.nodes[genesis.parent.index()];
            let slot = match genesis.interaction {
                Interaction::Reflection => &mut parent.children.reflected,
                Interaction::Refraction => &mut parent.children.refracted,
            };
            debug_assert!(slot.is_none(), "wave already has a {} child", genesis.interaction);
            *slot = Some(handle);
            parent.depth + 1
        }
        else {
            0
        };

        self.nodes.push(Node {
            depth,
            children: Children::default(),
        });
        self.waves.insert(wave)
    }

    pub fn root(&self) -> WaveRef<'_> {
        self.wave(self.root)
    }

    pub fn wave(&self, handle: Handle<Wave>) -> WaveRef<'_> {
        WaveRef {
            path: self,
            handle,
            wave: &self.waves[handle],
        }
    }

    /// All waves in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = WaveRef<'_>> {
        self.waves.iter().map(|(handle, wave)| {
            WaveRef {
                path: self,
                handle,
                wave,
            }
        })
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn attenuation(&self) -> &Attenuation {
        &self.attenuation
    }

    pub fn physical_constants(&self) -> &PhysicalConstants {
        &self.physical_constants
    }

    /// Number of times electromagnetic properties of a derived wave were
    /// computed. Each derived wave contributes at most once.
    pub fn fresnel_evaluations(&self) -> usize {
        self.fresnel_evaluations.get()
    }

    fn em_properties(&self, handle: Handle<Wave>) -> &EmProperties {
        // collect the chain of ancestors that still need computing, so that
        // arbitrarily deep chains resolve without recursion.
        let mut pending: SmallVec<[Handle<Wave>; 16]> = SmallVec::new();
        let mut current = handle;
        while let EmState::Derived { genesis, cache } = self.waves[current].state() {
            if cache.get().is_some() {
                break;
            }
            pending.push(current);
            current = genesis.parent;
        }

        for &ancestor in pending.iter().rev() {
            self.resolve(ancestor);
        }
        self.resolve(handle)
    }

    fn resolve(&self, handle: Handle<Wave>) -> &EmProperties {
        let wave = &self.waves[handle];
        match wave.state() {
            EmState::Root(properties) => properties,
            EmState::Derived { genesis, cache } => {
                cache.get_or_init(|| self.evaluate(wave.direction(), genesis))
            }
        }
    }

    /// Derives the properties of a wave from the incident field of its parent
    /// at the face it hit.
    fn evaluate(&self, direction: &Vector3<f64>, genesis: &Genesis) -> EmProperties {
        self.fresnel_evaluations
            .set(self.fresnel_evaluations.get() + 1);

        let parent = self.wave(genesis.parent);
        let face = &genesis.face;

        let frequency = parent.frequency(genesis.distance);
        let incident = parent.electric_field(genesis.distance);
        let incident_direction = parent.direction();

        let cos_i = angle(face.normal(), incident_direction).cos().abs();
        let sin_i = (1.0 - cos_i * cos_i).max(0.0).sqrt();
        let n = face.refractive_index(frequency);
        let sin_t = guarded_div(Complex::new(sin_i * AIR, 0.0), n);
        let cos_t = (Complex::new(1.0, 0.0) - sin_t * sin_t).sqrt();

        // s is perpendicular to the plane of incidence. at normal incidence
        // that plane is undefined and any tangent will do.
        let normal = face.normal_against(incident_direction);
        let s_axis = complexify(&unit(&incident_direction.cross(&normal)).unwrap_or_else(|| face.tangent()));
        let incident_s = s_axis * incident.dot(&s_axis);
        let incident_p = incident - incident_s;

        let coefficients = FresnelCoefficients::new(genesis.interaction, cos_i, cos_t, n);
        let field = incident_s * coefficients.s + incident_p * coefficients.p;

        let re = real_part(&field);
        let im = imag_part(&field);
        let amplitude = re.norm();
        let phase = im.dot(&re).atan2(amplitude);
        let polarization = complex_unit(&shift(&complex_unit(&field), direction));

        let properties = EmProperties {
            frequency,
            amplitude,
            phase,
            polarization,
        };
        debug_assert!(
            properties.is_finite(),
            "non-finite em properties: {properties:?}"
        );

        tracing::trace!(
            interaction = %genesis.interaction,
            face = genesis.face_index,
            amplitude,
            phase,
            "computed em properties"
        );

        properties.sanitized()
    }
}

/// Fresnel coefficients for a boundary between air and a medium with complex
/// refractive index `n`.
#[derive(Clone, Copy, Debug)]
struct FresnelCoefficients {
    s: Complex<f64>,
    p: Complex<f64>,
}

impl FresnelCoefficients {
    fn new(interaction: Interaction, cos_i: f64, cos_t: Complex<f64>, n: Complex<f64>) -> Self {
        let cos_i = Complex::new(cos_i, 0.0) * AIR;
        let s_denominator = cos_i + n * cos_t;
        let p_denominator = n * cos_i + cos_t;

        match interaction {
            Interaction::Reflection => {
                Self {
                    s: guarded_div(cos_i - n * cos_t, s_denominator),
                    p: guarded_div(n * cos_i - cos_t, p_denominator),
                }
            }
            Interaction::Refraction => {
                Self {
                    s: guarded_div(2.0 * cos_i, s_denominator),
                    p: guarded_div(2.0 * cos_i, p_denominator),
                }
            }
        }
    }
}

/// A wave in a [`Path`] together with access to its electromagnetic state.
///
/// All field accessors take the distance `r` travelled along this wave from
/// its own origin.
#[derive(Clone, Copy, derive_more::Debug)]
pub struct WaveRef<'a> {
    #[debug(ignore)]
    path: &'a Path,
    handle: Handle<Wave>,
    wave: &'a Wave,
}

impl<'a> WaveRef<'a> {
    pub fn handle(&self) -> Handle<Wave> {
        self.handle
    }

    pub fn wave(&self) -> &'a Wave {
        self.wave
    }

    pub fn path(&self) -> &'a Path {
        self.path
    }

    /// Generation of this wave. The seed has depth 0.
    pub fn depth(&self) -> usize {
        self.path.nodes[self.handle.index()].depth
    }

    pub fn children(&self) -> Children {
        self.path.nodes[self.handle.index()].children
    }

    pub fn parent(&self) -> Option<WaveRef<'a>> {
        let genesis = self.wave.genesis()?;
        Some(self.path.wave(genesis.parent))
    }

    /// Distance this wave travels before it hits a face and spawns children.
    /// `None` for leaves.
    pub fn segment_length(&self) -> Option<f64> {
        let child = self.children().iter().next()?;
        self.path.waves[child]
            .genesis()
            .map(|genesis| genesis.distance)
    }

    /// Total distance travelled from the seed origin to this wave's origin.
    pub fn path_length(&self) -> f64 {
        let mut length = 0.0;
        let mut current = self.wave;
        while let Some(genesis) = current.genesis() {
            length += genesis.distance;
            current = &self.path.waves[genesis.parent];
        }
        length
    }

    /// Properties at the wave origin, computing them if necessary.
    pub fn em_properties(&self) -> &'a EmProperties {
        self.path.em_properties(self.handle)
    }

    pub fn frequency(&self, _r: f64) -> f64 {
        self.em_properties().frequency
    }

    pub fn wavenumber(&self) -> f64 {
        self.path
            .physical_constants
            .wavenumber(self.em_properties().frequency)
    }

    pub fn amplitude(&self, r: f64) -> f64 {
        self.em_properties().amplitude * self.path.attenuation.factor(r)
    }

    pub fn phase(&self, r: f64) -> f64 {
        self.em_properties().phase + self.wavenumber() * r
    }

    pub fn polarization(&self, _r: f64) -> ComplexVector3 {
        self.em_properties().polarization
    }

    /// `E(r) = polarization * exp(j phase(r)) * amplitude(r)`
    pub fn electric_field(&self, r: f64) -> ComplexVector3 {
        self.polarization(r) * Complex::from_polar(self.amplitude(r), self.phase(r))
    }

    /// Plane-wave magnetic field `H(r) = (k x E(r)) / eta_0`
    pub fn magnetic_field(&self, r: f64) -> ComplexVector3 {
        let impedance = self.path.physical_constants.vacuum_impedance();
        complexify(self.wave.direction()).cross(&self.electric_field(r))
            * Complex::new(1.0 / impedance, 0.0)
    }
}

impl Deref for WaveRef<'_> {
    type Target = Wave;

    fn deref(&self) -> &Self::Target {
        self.wave
    }
}
