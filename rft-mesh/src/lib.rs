#![warn(clippy::todo, unused_qualifications)]

//! [Wavefront OBJ][1] scenes
//!
//! Every model in the file becomes a set of triangles. The surface material of
//! a model is looked up by name, first from its `usemtl` material, then from
//! the model (`o`/`g`) name.
//!
//! [1]: https://en.wikipedia.org/wiki/Wavefront_.obj_file

use std::{
    collections::HashSet,
    path::Path,
    str::FromStr,
};

use nalgebra::Point3;
use rft_solver::{
    Face,
    Material,
    MaterialTable,
};
use tobj::LoadOptions;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] tobj::LoadError),

    #[error("unknown material: {name}")]
    UnknownMaterial { name: String },

    #[error("model {model} is not triangulated")]
    NonTriangular { model: String },

    #[error("model {model} refers to missing vertex {index}")]
    InvalidIndex { model: String, index: usize },
}

/// How models whose name does not resolve to a [`Material`] are handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MaterialMapping {
    Fallback(Material),
    Strict,
}

impl Default for MaterialMapping {
    fn default() -> Self {
        Self::Fallback(Material::default())
    }
}

#[derive(Clone, Debug)]
pub struct ObjFile {
    pub models: Vec<tobj::Model>,
    pub materials: Vec<tobj::Material>,
}

impl ObjFile {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let (models, material_load_result) = tobj::load_obj(path, &load_options())?;

        // the material library only carries names for us, so a missing one is
        // not fatal.
        let materials = material_load_result.unwrap_or_else(|error| {
            tracing::warn!(?path, %error, "could not load material library");
            vec![]
        });

        Ok(Self { models, materials })
    }

    /// Parses an OBJ file held in memory. `mtl` is used for any `mtllib`
    /// statement in `obj`.
    pub fn parse(obj: &str, mtl: Option<&str>) -> Result<Self, Error> {
        let (models, material_load_result) =
            tobj::load_obj_buf(&mut obj.as_bytes(), &load_options(), |_path| {
                match mtl {
                    Some(mtl) => tobj::load_mtl_buf(&mut mtl.as_bytes()),
                    None => Err(tobj::LoadError::OpenFileFailed),
                }
            })?;

        let materials = material_load_result.unwrap_or_else(|error| {
            tracing::warn!(%error, "could not load material library");
            vec![]
        });

        Ok(Self { models, materials })
    }

    /// Name that decides the surface material of `model`.
    fn material_name<'a>(&'a self, model: &'a tobj::Model) -> &'a str {
        model
            .mesh
            .material_id
            .and_then(|material_id| self.materials.get(material_id))
            .map_or(model.name.as_str(), |material| material.name.as_str())
            .trim()
    }

    fn resolve_material(&self, model: &tobj::Model, mapping: MaterialMapping) -> Result<Material, Error> {
        let name = self.material_name(model);
        match (Material::from_str(name), mapping) {
            (Ok(material), _) => Ok(material),
            (Err(_), MaterialMapping::Fallback(material)) => {
                tracing::debug!(model = %model.name, name, %material, "unknown material, using fallback");
                Ok(material)
            }
            (Err(_), MaterialMapping::Strict) => {
                Err(Error::UnknownMaterial {
                    name: name.to_owned(),
                })
            }
        }
    }

    /// Converts all models into faces.
    ///
    /// Triangles that repeat an earlier triangle with the same vertices and
    /// material are dropped. The order of the remaining faces follows the file.
    pub fn faces(&self, materials: &MaterialTable, mapping: MaterialMapping) -> Result<Vec<Face>, Error> {
        let mut faces = vec![];
        let mut seen = HashSet::new();
        let mut duplicates = 0;

        for model in &self.models {
            if !model.mesh.face_arities.is_empty() {
                return Err(Error::NonTriangular {
                    model: model.name.clone(),
                });
            }

            let material = self.resolve_material(model, mapping)?;

            let vertices = model
                .mesh
                .positions
                .chunks_exact(3)
                .map(|point| Point3::new(f64::from(point[0]), f64::from(point[1]), f64::from(point[2])))
                .collect::<Vec<_>>();

            for triangle in model.mesh.indices.chunks_exact(3) {
                let mut points = [Point3::origin(); 3];
                for (point, index) in points.iter_mut().zip(triangle) {
                    let index = *index as usize;
                    *point = *vertices.get(index).ok_or_else(|| {
                        Error::InvalidIndex {
                            model: model.name.clone(),
                            index,
                        }
                    })?;
                }

                let key = (
                    points.map(|point| [point.x.to_bits(), point.y.to_bits(), point.z.to_bits()]),
                    material,
                );
                if !seen.insert(key) {
                    duplicates += 1;
                    continue;
                }

                faces.push(Face::new(points, material, materials));
            }
        }

        tracing::debug!(
            models = self.models.len(),
            faces = faces.len(),
            duplicates,
            "loaded obj"
        );

        Ok(faces)
    }
}

fn load_options() -> LoadOptions {
    LoadOptions {
        // faces are built from vertex positions only
        single_index: false,
        // triangulate all faces that are not triangles already
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use rft_solver::{
        Material,
        MaterialTable,
    };

    use crate::{
        Error,
        MaterialMapping,
        ObjFile,
    };

    const ROOM: &str = r#"
mtllib room.mtl

v 0 0 0
v 4 0 0
v 4 3 0
v 0 3 0

o floor
usemtl Concrete
f 1 2 3
f 1 3 4

o window
usemtl glass
f 1 2 3
f 1 2 3

o ceiling
usemtl marble
f 1 3 4
"#;

    const ROOM_MTL: &str = r#"
newmtl Concrete
Kd 0.5 0.5 0.5

newmtl glass
Kd 0.9 0.9 1.0

newmtl marble
Kd 1.0 1.0 1.0
"#;

    #[test]
    fn it_loads_faces_with_materials() {
        let obj = ObjFile::parse(ROOM, Some(ROOM_MTL)).unwrap();
        let faces = obj
            .faces(&MaterialTable::default(), MaterialMapping::Fallback(Material::Wood))
            .unwrap();

        let materials = faces.iter().map(|face| face.material()).collect::<Vec<_>>();
        assert_eq!(
            materials,
            vec![
                Material::Concrete,
                Material::Concrete,
                Material::Glass,
                Material::Wood
            ]
        );

        assert_relative_eq!(faces[0].points()[1], Point3::new(4.0, 0.0, 0.0));
        assert_relative_eq!(faces[0].area(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn strict_mapping_rejects_unknown_materials() {
        let obj = ObjFile::parse(ROOM, Some(ROOM_MTL)).unwrap();
        let error = obj
            .faces(&MaterialTable::default(), MaterialMapping::Strict)
            .unwrap_err();
        assert!(matches!(error, Error::UnknownMaterial { name } if name == "marble"));
    }

    #[test]
    fn model_names_are_used_without_material_library() {
        let obj = ObjFile::parse(
            r#"
v 0 0 0
v 1 0 0
v 0 1 0
o brick
f 1 2 3
o unnamed
f 3 2 1
"#,
            None,
        )
        .unwrap();
        let faces = obj
            .faces(&MaterialTable::default(), MaterialMapping::default())
            .unwrap();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].material(), Material::Brick);
        assert_eq!(faces[1].material(), Material::Concrete);
    }

    #[test]
    fn quads_are_triangulated() {
        let obj = ObjFile::parse(
            r#"
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
o metal
f 1 2 3 4
"#,
            None,
        )
        .unwrap();
        let faces = obj
            .faces(&MaterialTable::default(), MaterialMapping::Strict)
            .unwrap();
        assert_eq!(faces.len(), 2);
        let area = faces.iter().map(|face| face.area()).sum::<f64>();
        assert_relative_eq!(area, 1.0, epsilon = 1e-9);
    }
}
