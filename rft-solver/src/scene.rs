use crate::{
    face::Face,
    ray::Ray,
};

/// Nearest forward intersection of a ray with a scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance along the ray, always `> EPSILON`
    pub distance: f64,

    /// Index of the face that was hit
    pub face_index: usize,
}

/// Something rays can be cast against.
///
/// Implemented for face slices by scanning every face. There is no spatial
/// acceleration structure, so a cast costs `O(#faces)`.
pub trait RayCast {
    fn cast_ray(&self, ray: &Ray) -> Option<RayHit>;

    fn face(&self, face_index: usize) -> &Face;

    fn num_faces(&self) -> usize;
}

impl RayCast for [Face] {
    fn cast_ray(&self, ray: &Ray) -> Option<RayHit> {
        let mut best_hit: Option<RayHit> = None;

        for (face_index, face) in self.iter().enumerate() {
            let Some(distance) = face.forward_distance(ray)
            else {
                continue;
            };

            // strict comparison: on ties the first face wins
            if best_hit.is_none_or(|best_hit| distance < best_hit.distance) {
                best_hit = Some(RayHit {
                    distance,
                    face_index,
                });
            }
        }

        best_hit
    }

    fn face(&self, face_index: usize) -> &Face {
        &self[face_index]
    }

    fn num_faces(&self) -> usize {
        self.len()
    }
}

impl RayCast for Vec<Face> {
    fn cast_ray(&self, ray: &Ray) -> Option<RayHit> {
        self.as_slice().cast_ray(ray)
    }

    fn face(&self, face_index: usize) -> &Face {
        &self[face_index]
    }

    fn num_faces(&self) -> usize {
        self.len()
    }
}
