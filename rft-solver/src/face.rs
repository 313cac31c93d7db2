use nalgebra::{
    Point3,
    Vector3,
};
use num::Complex;

use crate::{
    constants::{
        EPSILON,
        PhysicalConstants,
    },
    material::{
        Material,
        MaterialProperties,
        MaterialTable,
    },
    math::{
        complexify,
        real_part,
        unit,
    },
    ray::Ray,
};

/// An immutable triangle with a surface material.
///
/// The edges `e1 = p2 - p0` and `e2 = p1 - p0` and the normal are derived once
/// on construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Face {
    points: [Point3<f64>; 3],
    edges: [Vector3<f64>; 2],
    normal: Vector3<f64>,
    material: Material,
    properties: MaterialProperties,
    physical_constants: PhysicalConstants,
}

impl Face {
    pub fn new(points: [Point3<f64>; 3], material: Material, materials: &MaterialTable) -> Self {
        let edges = [points[2] - points[0], points[1] - points[0]];

        // degenerate faces get a zero normal. they are never hit, since the
        // intersection determinant vanishes as well.
        let normal = unit(&edges[0].cross(&edges[1])).unwrap_or_else(Vector3::zeros);

        Self {
            points,
            edges,
            normal,
            material,
            properties: *materials.get(material),
            physical_constants: *materials.physical_constants(),
        }
    }

    pub fn points(&self) -> &[Point3<f64>; 3] {
        &self.points
    }

    pub fn edges(&self) -> &[Vector3<f64>; 2] {
        &self.edges
    }

    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    /// Unit vector in the face plane, along the first edge.
    pub fn tangent(&self) -> Vector3<f64> {
        unit(&self.edges[0]).unwrap_or_else(Vector3::zeros)
    }

    pub fn material(&self) -> Material {
        self.material
    }

    pub fn centroid(&self) -> Point3<f64> {
        Point3::from((self.points[0].coords + self.points[1].coords + self.points[2].coords) / 3.0)
    }

    pub fn area(&self) -> f64 {
        0.5 * self.edges[0].cross(&self.edges[1]).norm()
    }

    pub fn refractive_index(&self, frequency: f64) -> Complex<f64> {
        self.properties
            .refractive_index(frequency, &self.physical_constants)
    }

    /// Möller-Trumbore ray-triangle test.
    ///
    /// Returns the signed distance along the ray to the hit point, or `None` if
    /// the ray is parallel to the face plane or misses the triangle. Callers
    /// treat distances `<= EPSILON` as "no forward hit" (see
    /// [`forward_distance`][Self::forward_distance]).
    pub fn intersection_distance(&self, ray: &Ray) -> Option<f64> {
        let [e1, e2] = &self.edges;

        let pvec = ray.direction().cross(e2);
        let det = e1.dot(&pvec);
        if det.is_nan() || det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.origin() - self.points[0];
        let u = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(e1);
        let v = ray.direction().dot(&qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(&qvec) * inv_det;
        t.is_finite().then_some(t)
    }

    /// Distance to the hit point, if it lies strictly in front of the ray
    /// origin.
    pub fn forward_distance(&self, ray: &Ray) -> Option<f64> {
        self.intersection_distance(ray)
            .filter(|distance| *distance > EPSILON)
    }

    pub fn intersection_point(&self, ray: &Ray) -> Option<Point3<f64>> {
        self.intersection_distance(ray)
            .map(|distance| ray.point_at(distance))
    }

    /// Mirror `direction` about the face plane: `d - 2 (d . n) n`
    pub fn reflection_direction(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        direction - 2.0 * direction.dot(&self.normal) * self.normal
    }

    /// Generalized Snell's law with the complex refractive index of the face,
    /// assuming the incident medium is air (`n = 1`).
    ///
    /// The refracted direction is the real part of the complex refracted
    /// vector, renormalized. Returns `None` if that real part vanishes.
    pub fn refraction_direction(
        &self,
        direction: &Vector3<f64>,
        frequency: f64,
    ) -> Option<Vector3<f64>> {
        let normal = self.normal_against(direction);
        let ratio = Complex::new(1.0, 0.0) / self.refractive_index(frequency);

        let cos_i = -normal.dot(direction);
        let sin_i = (1.0 - cos_i * cos_i).max(0.0).sqrt();
        let sin_t = ratio * sin_i;
        let cos_t = (Complex::new(1.0, 0.0) - sin_t * sin_t).sqrt();

        let refracted = complexify(direction) * ratio + complexify(&normal) * (ratio * cos_i - cos_t);
        unit(&real_part(&refracted))
    }

    /// The face normal, flipped if necessary to point against `direction`.
    pub fn normal_against(&self, direction: &Vector3<f64>) -> Vector3<f64> {
        if self.normal.dot(direction) > 0.0 {
            -self.normal
        }
        else {
            self.normal
        }
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
        face::Face,
        material::{
            Material,
            MaterialProperties,
            MaterialTable,
        },
        math::unit,
        ray::Ray,
    };

    /// Triangle in the plane `x = 5` that contains the x axis.
    fn wall_at_x5(material: Material) -> Face {
        Face::new(
            [
                Point3::new(5.0, -1.0, -1.0),
                Point3::new(5.0, 2.0, -1.0),
                Point3::new(5.0, -1.0, 2.0),
            ],
            material,
            &MaterialTable::default(),
        )
    }

    #[test]
    fn it_derives_edges_and_normal() {
        let face = wall_at_x5(Material::Concrete);
        let [p0, p1, p2] = face.points();
        assert_eq!(face.edges()[0], p2 - p0);
        assert_eq!(face.edges()[1], p1 - p0);
        assert_relative_eq!(face.normal().norm(), 1.0);
        assert_abs_diff_eq!(face.normal().dot(&face.edges()[0]), 0.0);
        assert_abs_diff_eq!(face.normal().dot(&face.edges()[1]), 0.0);
    }

    #[test]
    fn perpendicular_wall_hit_and_reflection() {
        let face = wall_at_x5(Material::Concrete);
        let ray = Ray::new(Point3::origin(), Vector3::x()).unwrap();

        let distance = face.intersection_distance(&ray).unwrap();
        assert_relative_eq!(distance, 5.0, epsilon = 1e-12);
        assert_relative_eq!(
            face.intersection_point(&ray).unwrap(),
            Point3::new(5.0, 0.0, 0.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            face.reflection_direction(ray.direction()),
            -Vector3::x(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn centroid_ray_hits_and_reversed_ray_misses() {
        let face = Face::new(
            [
                Point3::new(3.0, 2.0, 0.0),
                Point3::new(7.0, 0.0, 3.0),
                Point3::new(5.0, -2.0, 0.0),
            ],
            Material::Brick,
            &MaterialTable::default(),
        );
        let origin = Point3::new(1.0, 0.0, 6.0);
        let ray = Ray::new(origin, face.centroid() - origin).unwrap();

        let distance = face.forward_distance(&ray).unwrap();
        assert!(distance > 0.0);
        assert_relative_eq!(distance, (face.centroid() - origin).norm(), epsilon = 1e-9);

        assert!(face.forward_distance(&ray.reversed()).is_none());
    }

    #[test]
    fn parallel_ray_does_not_intersect() {
        let face = wall_at_x5(Material::Concrete);
        let ray = Ray::new(Point3::origin(), Vector3::y()).unwrap();
        assert!(face.intersection_distance(&ray).is_none());
    }

    #[test]
    fn ray_outside_triangle_misses() {
        let face = wall_at_x5(Material::Concrete);
        let ray = Ray::new(Point3::new(0.0, 10.0, 10.0), Vector3::x()).unwrap();
        assert!(face.intersection_distance(&ray).is_none());
    }

    #[test]
    fn degenerate_face_is_never_hit() {
        let face = Face::new(
            [
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(5.0, 1.0, 0.0),
                Point3::new(5.0, 2.0, 0.0),
            ],
            Material::Concrete,
            &MaterialTable::default(),
        );
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::x()).unwrap();
        assert!(face.intersection_distance(&ray).is_none());
        assert_eq!(face.area(), 0.0);
    }

    #[test]
    fn hit_at_origin_is_not_forward() {
        let face = wall_at_x5(Material::Concrete);
        let ray = Ray::new(Point3::new(5.0, 0.0, 0.0), Vector3::x()).unwrap();
        assert!(face.forward_distance(&ray).is_none());
    }

    #[test]
    fn reflection_is_an_involution() {
        let face = Face::new(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.3, -0.2),
                Point3::new(0.1, 2.0, 0.7),
            ],
            Material::Glass,
            &MaterialTable::default(),
        );
        for direction in [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.3, -0.5, 0.8),
            Vector3::new(-1.0, 2.0, 0.5),
        ] {
            let d = unit(&direction).unwrap();
            let twice = face.reflection_direction(&face.reflection_direction(&d));
            assert_relative_eq!(twice, d, epsilon = 1e-12);
            assert_relative_eq!(face.reflection_direction(&d).norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn normal_incidence_refraction_is_undeviated() {
        let face = wall_at_x5(Material::Glass);
        let refracted = face.refraction_direction(&Vector3::x(), 2.4e9).unwrap();
        assert_relative_eq!(refracted, Vector3::x(), epsilon = 1e-9);
    }

    #[test]
    fn oblique_refraction_bends_towards_normal() {
        let table = MaterialTable::default()
            .with(Material::Glass, MaterialProperties::new(2.25, 0.0, 0.0, 0.0));
        let face = Face::new(
            [
                Point3::new(5.0, -10.0, -10.0),
                Point3::new(5.0, 20.0, -10.0),
                Point3::new(5.0, -10.0, 20.0),
            ],
            Material::Glass,
            &table,
        );

        // 30 degrees incidence into n = 1.5
        let incident = Vector3::new(30f64.to_radians().cos(), 30f64.to_radians().sin(), 0.0);
        let refracted = face.refraction_direction(&incident, 1e9).unwrap();

        let sin_t = refracted.y / refracted.norm();
        assert_relative_eq!(sin_t, 0.5 / 1.5, epsilon = 1e-9);
        assert!(refracted.x > 0.0);
        assert_relative_eq!(refracted.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn vacuum_refraction_passes_straight_through() {
        let face = wall_at_x5(Material::Vacuum);
        let incident = unit(&Vector3::new(1.0, 0.4, -0.3)).unwrap();
        let refracted = face.refraction_direction(&incident, 1e9).unwrap();
        assert_relative_eq!(refracted, incident, epsilon = 1e-9);
    }
}
