//! Wavefront OBJ scene parsing
//!
//! OBJ files have no hierarchy: the graph gets a root node with one child
//! per OBJ object, each child referencing that object's mesh.

use super::scene_graph::{MeshRecord, ParseOptions, SceneGraph};
use super::ParseError;
use glam::Vec3;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load an OBJ file into a scene graph
pub fn load_obj(path: &Path, options: &ParseOptions) -> Result<SceneGraph, ParseError> {
    info!("Loading OBJ file: {:?}", path);

    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: options.triangulate,
            single_index: true,
            ..Default::default()
        },
    )?;

    let mut scene = SceneGraph::new();
    let root = scene.add_node("root", Vec::new());
    scene.set_root(root);

    for model in &models {
        let mesh = &model.mesh;
        debug!(
            "Loaded OBJ model '{}' with {} vertices and {} indices",
            model.name,
            mesh.positions.len() / 3,
            mesh.indices.len()
        );

        let positions: Vec<Vec3> = mesh
            .positions
            .chunks_exact(3)
            .map(Vec3::from_slice)
            .collect();

        let (faces, complete) = collect_faces(&mesh.indices, &mesh.face_arities);
        if !complete {
            warn!(model = %model.name, "Skipped non-triangle faces");
            scene.mark_incomplete();
        }

        let normals: Vec<Vec3> = mesh
            .normals
            .chunks_exact(3)
            .map(Vec3::from_slice)
            .collect();
        let mut record = MeshRecord::new(model.name.clone(), positions, faces);
        if !normals.is_empty() && normals.len() == record.positions.len() {
            record = record.with_normals(normals);
        } else {
            if !normals.is_empty() {
                warn!(
                    model = %model.name,
                    normals = normals.len(),
                    positions = record.positions.len(),
                    "Ignoring partial OBJ normals"
                );
            }
            if options.generate_normals {
                record.generate_normals();
            }
        }

        let mesh_index = scene.add_mesh(record);
        let node = scene.add_node(model.name.clone(), vec![mesh_index]);
        scene.add_child(root, node);
    }

    Ok(scene)
}

/// Group a flat index list into triangles
///
/// `face_arities` is empty when every face is a triangle. Otherwise faces
/// of any other arity are dropped and the second value is `false`.
fn collect_faces(indices: &[u32], face_arities: &[u32]) -> (Vec<[u32; 3]>, bool) {
    if face_arities.is_empty() {
        let complete = indices.len() % 3 == 0;
        let faces = indices
            .chunks_exact(3)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
            .collect();
        return (faces, complete);
    }

    let mut faces = Vec::with_capacity(face_arities.len());
    let mut complete = true;
    let mut offset = 0;
    for &arity in face_arities {
        let arity = arity as usize;
        match indices.get(offset..offset + arity) {
            Some(&[a, b, c]) => faces.push([a, b, c]),
            _ => complete = false,
        }
        offset += arity;
    }
    (faces, complete)
}
