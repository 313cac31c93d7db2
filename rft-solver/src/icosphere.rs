//! Geodesic sphere sampling of directions.

use std::collections::HashMap;

use nalgebra::Vector3;

/// Golden ratio
pub const PHI: f64 = 1.6180339887498948482045868343656;

const ICOSAHEDRON_VERTICES: &[[f64; 3]] = &[
    [-1., 0., -PHI],
    [0., PHI, -1.],
    [1., 0., -PHI],
    [0., PHI, 1.],
    [PHI, 1., 0.],
    [1., 0., PHI],
    [-PHI, 1., 0.],
    [-PHI, -1., 0.],
    [-1., 0., PHI],
    [0., -PHI, 1.],
    [PHI, -1., 0.],
    [0., -PHI, -1.],
];

const ICOSAHEDRON_FACES: &[[usize; 3]] = &[
    [1, 6, 3],
    [0, 6, 1],
    [3, 4, 1],
    [3, 6, 8],
    [6, 0, 7],
    [2, 0, 1],
    [4, 3, 5],
    [4, 2, 1],
    [7, 8, 6],
    [5, 3, 8],
    [0, 11, 7],
    [11, 0, 2],
    [4, 5, 10],
    [10, 2, 4],
    [8, 7, 9],
    [8, 9, 5],
    [7, 11, 9],
    [11, 2, 10],
    [10, 5, 9],
    [11, 10, 9],
];

/// Unit sphere approximated by a subdivided icosahedron.
///
/// Each subdivision splits every triangle into 4 by its edge midpoints, which
/// are pushed out onto the sphere. After `n` subdivisions the sphere has
/// `10 * 4^n + 2` vertices and `20 * 4^n` faces. Vertex order is
/// deterministic.
#[derive(Clone, Debug)]
pub struct Icosphere {
    vertices: Vec<Vector3<f64>>,
    faces: Vec<[usize; 3]>,
}

impl Icosphere {
    pub fn new(subdivisions: usize) -> Self {
        let mut icosphere = Self {
            vertices: ICOSAHEDRON_VERTICES
                .iter()
                .map(|vertex| Vector3::from(*vertex).normalize())
                .collect(),
            faces: ICOSAHEDRON_FACES.to_vec(),
        };

        for _ in 0..subdivisions {
            icosphere.subdivide();
        }

        icosphere
    }

    fn subdivide(&mut self) {
        let mut midpoints = HashMap::with_capacity(self.faces.len() * 3 / 2);
        let mut faces = Vec::with_capacity(self.faces.len() * 4);

        for [a, b, c] in std::mem::take(&mut self.faces) {
            let ab = self.midpoint(&mut midpoints, a, b);
            let bc = self.midpoint(&mut midpoints, b, c);
            let ca = self.midpoint(&mut midpoints, c, a);

            faces.extend([[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }

        self.faces = faces;
    }

    /// Index of the vertex between `a` and `b`, shared by both faces of the
    /// edge.
    fn midpoint(&mut self, midpoints: &mut HashMap<(usize, usize), usize>, a: usize, b: usize) -> usize {
        let key = (a.min(b), a.max(b));
        *midpoints.entry(key).or_insert_with(|| {
            let midpoint = (self.vertices[a] + self.vertices[b]).normalize();
            self.vertices.push(midpoint);
            self.vertices.len() - 1
        })
    }

    /// Unit vectors, one per vertex.
    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn into_vertices(self) -> Vec<Vector3<f64>> {
        self.vertices
    }
}
