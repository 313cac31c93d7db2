use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::{
    Error,
    arena::Handle,
    constants::PhysicalConstants,
    face::Face,
    path::Path,
    ray::Ray,
    scene::RayCast,
    wave::{
        Attenuation,
        EmState,
        Genesis,
        Interaction,
        Wave,
    },
};

type PendingStack = SmallVec<[(Wave, usize); 16]>;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TracerConfig {
    /// Maximum number of generations below the seed. A path holds at most
    /// `2^(depth + 1) - 1` waves.
    #[cfg_attr(feature = "serde", serde(default = "default_depth"))]
    pub depth: usize,

    #[cfg_attr(feature = "serde", serde(default))]
    pub attenuation: Attenuation,

    #[cfg_attr(feature = "serde", serde(skip))]
    pub physical_constants: PhysicalConstants,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            attenuation: Default::default(),
            physical_constants: Default::default(),
        }
    }
}

fn default_depth() -> usize {
    2
}

/// Traces seed waves through a scene.
///
/// Every wave that hits a face splits into a reflected and a refracted wave,
/// until the configured depth is reached or the wave leaves the scene.
#[derive(derive_more::Debug)]
pub struct Tracer<'a, S: ?Sized> {
    #[debug(ignore)]
    scene: &'a S,
    config: TracerConfig,
}

impl<'a, S: RayCast + ?Sized> Tracer<'a, S> {
    pub fn new(scene: &'a S, config: TracerConfig) -> Result<Self, Error> {
        if scene.num_faces() == 0 {
            return Err(Error::EmptyScene);
        }
        Ok(Self { scene, config })
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// Traces a single seed wave. The result is in pre-order: the seed, then
    /// the reflection subtree, then the refraction subtree.
    pub fn trace(&self, seed: Wave) -> Result<Path, Error> {
        // the seed frequency steers refraction. reading it from the seed keeps
        // the fresnel computation of derived waves lazy.
        let EmState::Root(properties) = seed.state()
        else {
            return Err(Error::NotARootWave);
        };
        let frequency = properties.frequency;

        let mut path = Path::new(
            seed,
            self.config.attenuation,
            self.config.physical_constants,
        )?;

        let mut pending = PendingStack::new();
        self.branch(&path, path.root().handle(), self.config.depth, frequency, &mut pending);

        while let Some((wave, remaining)) = pending.pop() {
            let handle = path.insert(wave);
            self.branch(&path, handle, remaining, frequency, &mut pending);
        }

        tracing::trace!(waves = path.len(), depth = self.config.depth, "traced seed");

        Ok(path)
    }

    pub fn trace_all(&self, seeds: impl IntoIterator<Item = Wave>) -> Result<Vec<Path>, Error> {
        let paths = seeds
            .into_iter()
            .map(|seed| self.trace(seed))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            seeds = paths.len(),
            waves = paths.iter().map(Path::len).sum::<usize>(),
            faces = self.scene.num_faces(),
            depth = self.config.depth,
            "traced"
        );

        Ok(paths)
    }

    /// Pushes the children of `handle` onto the work stack, refracted first so
    /// that the reflected child is visited first.
    fn branch(
        &self,
        path: &Path,
        handle: Handle<Wave>,
        remaining: usize,
        frequency: f64,
        pending: &mut PendingStack,
    ) {
        if remaining == 0 {
            return;
        }

        let ray = *path.wave(handle).ray();
        let Some(hit) = self.scene.cast_ray(&ray)
        else {
            return;
        };

        let face = self.scene.face(hit.face_index);
        let hit_point = ray.point_at(hit.distance);
        tracing::trace!(?hit_point, distance = hit.distance, face = hit.face_index, "hit");

        let genesis = |interaction| {
            Genesis {
                parent: handle,
                face: *face,
                face_index: hit.face_index,
                interaction,
                distance: hit.distance,
            }
        };

        let reflected = Wave::derived(
            Ray::new_unchecked(hit_point, face.reflection_direction(ray.direction())),
            genesis(Interaction::Reflection),
        );

        let refraction_direction = refraction_direction(face, &ray, frequency);
        let refracted = Wave::derived(
            Ray::new_unchecked(hit_point, refraction_direction),
            genesis(Interaction::Refraction),
        );

        pending.push((refracted, remaining - 1));
        pending.push((reflected, remaining - 1));
    }
}

fn refraction_direction(face: &Face, ray: &Ray, frequency: f64) -> Vector3<f64> {
    face.refraction_direction(ray.direction(), frequency)
        .unwrap_or_else(|| {
            tracing::trace!(direction = ?ray.direction(), "degenerate refraction, continuing straight");
            *ray.direction()
        })
}

/// Traces `seed` through `faces` up to `depth` generations.
pub fn trace(seed: Wave, faces: &[Face], depth: usize) -> Result<Path, Error> {
    Tracer::new(
        faces,
        TracerConfig {
            depth,
            ..Default::default()
        },
    )?
    .trace(seed)
}
