//! glTF / GLB scene parsing
//!
//! Node `i` of the document becomes node `i` of the graph. A synthetic root
//! node is appended whose children are the top-level nodes of the default
//! scene. Every triangle primitive of a glTF mesh becomes one mesh record.

use super::scene_graph::{MeshRecord, ParseOptions, SceneGraph};
use super::ParseError;
use glam::Vec3;
use gltf::mesh::Mode;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load a `.gltf` or `.glb` file into a scene graph
///
/// Only geometry buffers are loaded; images are never decoded.
pub fn load_gltf(path: &Path, options: &ParseOptions) -> Result<SceneGraph, ParseError> {
    info!("Loading glTF file: {:?}", path);

    let gltf::Gltf { document, blob } = gltf::Gltf::open(path)?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)?;

    let mut scene = SceneGraph::new();

    // Mesh records produced by each glTF mesh, in primitive order
    let mut records_by_mesh = Vec::with_capacity(document.meshes().len());
    for mesh in document.meshes() {
        let mesh_name = mesh.name().unwrap_or("unnamed");
        let mut records = Vec::new();
        for primitive in mesh.primitives() {
            let name = format!("{mesh_name}.{}", primitive.index());
            match read_primitive(&primitive, &buffers, options, &name) {
                PrimitiveData::Record(record) => records.push(scene.add_mesh(record)),
                PrimitiveData::Skipped => {}
                PrimitiveData::Unreadable => scene.mark_incomplete(),
            }
        }
        records_by_mesh.push(records);
    }

    for node in document.nodes() {
        let meshes = node
            .mesh()
            .and_then(|mesh| records_by_mesh.get(mesh.index()).cloned())
            .unwrap_or_default();
        let index = scene.add_node(node.name().unwrap_or("node"), meshes);
        for child in node.children() {
            scene.add_child(index, child.index());
        }
    }

    if let Some(source_scene) = document.default_scene().or_else(|| document.scenes().next()) {
        let root = scene.add_node(source_scene.name().unwrap_or("root"), Vec::new());
        for node in source_scene.nodes() {
            scene.add_child(root, node.index());
        }
        scene.set_root(root);
    } else {
        warn!("glTF document has no scene");
    }

    info!(
        nodes = scene.nodes.len(),
        meshes = scene.meshes.len(),
        complete = scene.is_complete(),
        "Parsed glTF scene"
    );
    Ok(scene)
}

enum PrimitiveData {
    Record(MeshRecord),
    /// Not triangle geometry; left out on purpose
    Skipped,
    /// Data the parser could not read
    Unreadable,
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    options: &ParseOptions,
    name: &str,
) -> PrimitiveData {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let Some(positions) = reader.read_positions() else {
        warn!(primitive = name, "Primitive has no positions");
        return PrimitiveData::Unreadable;
    };
    let positions: Vec<Vec3> = positions.map(Vec3::from).collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let faces = match (primitive.mode(), options.triangulate) {
        (Mode::Triangles, _) => triangle_list(&indices),
        (Mode::TriangleStrip, true) => triangle_strip(&indices),
        (Mode::TriangleFan, true) => triangle_fan(&indices),
        (mode, _) => {
            warn!(primitive = name, ?mode, "Skipping non-triangle primitive");
            return PrimitiveData::Skipped;
        }
    };

    if faces
        .iter()
        .flatten()
        .any(|&index| index as usize >= positions.len())
    {
        warn!(primitive = name, "Primitive index out of range");
        return PrimitiveData::Unreadable;
    }

    let mut record = MeshRecord::new(name, positions, faces);
    if let Some(normals) = reader.read_normals() {
        let normals: Vec<Vec3> = normals.map(Vec3::from).collect();
        if normals.len() == record.positions.len() {
            record = record.with_normals(normals);
        } else {
            warn!(primitive = name, "Ignoring normals with mismatched count");
        }
    }
    if options.generate_normals {
        record.generate_normals();
    }

    debug!(
        primitive = name,
        vertices = record.positions.len(),
        faces = record.faces.len(),
        "Read glTF primitive"
    );
    PrimitiveData::Record(record)
}

fn triangle_list(indices: &[u32]) -> Vec<[u32; 3]> {
    indices
        .chunks_exact(3)
        .map(|chunk| [chunk[0], chunk[1], chunk[2]])
        .collect()
}

/// Alternate winding so every triangle keeps the strip's orientation
fn triangle_strip(indices: &[u32]) -> Vec<[u32; 3]> {
    indices
        .windows(3)
        .enumerate()
        .map(|(i, w)| {
            if i % 2 == 0 {
                [w[0], w[1], w[2]]
            } else {
                [w[1], w[0], w[2]]
            }
        })
        .collect()
}

fn triangle_fan(indices: &[u32]) -> Vec<[u32; 3]> {
    match indices.split_first() {
        Some((&hub, rest)) => rest.windows(2).map(|w| [hub, w[0], w[1]]).collect(),
        None => Vec::new(),
    }
}
