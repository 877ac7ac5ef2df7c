//! Parser-neutral scene graph
//!
//! Scene parsers produce a [`SceneGraph`]; the model importer consumes it.
//! Nodes and meshes refer to each other by index.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Preprocessing requested from a scene parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Split polygons, strips and fans into triangles
    pub triangulate: bool,
    /// Compute per-vertex normals for meshes that have none
    pub generate_normals: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            triangulate: true,
            generate_normals: true,
        }
    }
}

/// Raw geometry of one mesh, as read from the source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshRecord {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// One normal per position, when the source has them
    pub normals: Option<Vec<Vec3>>,
    /// Triangles as index triples into `positions`
    pub faces: Vec<[u32; 3]>,
}

impl MeshRecord {
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            name: name.into(),
            positions,
            normals: None,
            faces,
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Fill in smooth normals from face geometry if the record has none
    ///
    /// Each face adds its area-weighted normal to its three vertices; the
    /// sums are then normalized. Vertices on no face, or only on zero-area
    /// faces, get a zero normal. Faces with out-of-range indices are skipped.
    pub fn generate_normals(&mut self) {
        if self.normals.is_some() {
            return;
        }

        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for face in &self.faces {
            let [i0, i1, i2] = face.map(|i| i as usize);
            let (Some(&v0), Some(&v1), Some(&v2)) = (
                self.positions.get(i0),
                self.positions.get(i1),
                self.positions.get(i2),
            ) else {
                continue;
            };

            let face_normal = (v1 - v0).cross(v2 - v0);
            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        self.normals = Some(normals);
    }
}

/// A node of the scene tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneNode {
    pub name: String,
    /// Indices into [`SceneGraph::meshes`]
    pub meshes: Vec<usize>,
    /// Indices into [`SceneGraph::nodes`], in document order
    pub children: Vec<usize>,
}

/// Status flags reported by the parser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneFlags {
    /// The parser skipped data it could not read
    pub incomplete: bool,
}

/// A parsed scene: a node tree referencing a flat mesh table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneGraph {
    pub nodes: Vec<SceneNode>,
    pub meshes: Vec<MeshRecord>,
    /// Index of the root node, if the scene has one
    pub root: Option<usize>,
    pub flags: SceneFlags,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mesh record and return its index
    pub fn add_mesh(&mut self, mesh: MeshRecord) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Append a childless node referencing `meshes` and return its index
    pub fn add_node(&mut self, name: impl Into<String>, meshes: Vec<usize>) -> usize {
        self.nodes.push(SceneNode {
            name: name.into(),
            meshes,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Append `child` to the children of `parent`
    ///
    /// Out-of-range parents are ignored; the importer validates children.
    pub fn add_child(&mut self, parent: usize, child: usize) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
    }

    pub fn set_root(&mut self, root: usize) {
        self.root = Some(root);
    }

    pub fn root_node(&self) -> Option<&SceneNode> {
        self.root.and_then(|index| self.nodes.get(index))
    }

    pub fn mark_incomplete(&mut self) {
        self.flags.incomplete = true;
    }

    pub fn is_complete(&self) -> bool {
        !self.flags.incomplete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_links_nodes() {
        let mut scene = SceneGraph::new();
        let mesh = scene.add_mesh(MeshRecord::new("tri", vec![Vec3::ZERO; 3], vec![[0, 1, 2]]));
        let root = scene.add_node("root", vec![]);
        let child = scene.add_node("child", vec![mesh]);
        scene.add_child(root, child);
        scene.set_root(root);

        assert_eq!(scene.root_node().unwrap().children, vec![child]);
        assert_eq!(scene.nodes[child].meshes, vec![mesh]);
        assert!(scene.is_complete());
    }

    #[test]
    fn test_generate_normals_for_flat_quad() {
        let mut record = MeshRecord::new(
            "quad",
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        record.generate_normals();

        let normals = record.normals.unwrap();
        assert_eq!(normals.len(), 4);
        for normal in normals {
            assert!(normal.abs_diff_eq(Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn test_generate_normals_keeps_existing() {
        let mut record = MeshRecord::new("tri", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2]])
            .with_normals(vec![Vec3::NEG_Z; 3]);
        record.generate_normals();
        assert_eq!(record.normals.unwrap(), vec![Vec3::NEG_Z; 3]);
    }

    #[test]
    fn test_generate_normals_unused_vertex_is_zero() {
        let mut record = MeshRecord::new(
            "tri",
            vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::splat(5.0)],
            vec![[0, 1, 2], [0, 1, 9]],
        );
        record.generate_normals();
        let normals = record.normals.unwrap();
        assert_eq!(normals[3], Vec3::ZERO);
        assert!(normals[0].abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_root_node_out_of_range() {
        let mut scene = SceneGraph::new();
        scene.set_root(3);
        assert!(scene.root_node().is_none());
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert!(options.triangulate);
        assert!(options.generate_normals);
    }
}
