//! Scene import
//!
//! A [`Model`] flattens a scene graph into an ordered list of GPU-resident
//! meshes. Meshes are listed in depth-first pre-order: a node's own meshes
//! come before those of its children, and children keep document order.
//! Node transforms are not applied; every mesh is re-centred on its own
//! bounding box and drawn with the caller's model transform.

use crate::core::bounds::{bounding_box_center, Aabb};
use crate::graphics::device::{DrawTarget, GpuDevice};
use crate::graphics::mesh::{Mesh, MeshData, Vertex};
use crate::io::{FileSceneParser, MeshRecord, ParseError, ParseOptions, SceneGraph, SceneParser};
use glam::Vec3;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Errors that abort an import
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Scene has no root node")]
    MissingRoot,

    #[error("Scene is incomplete")]
    IncompleteScene,

    #[error("Node {0} does not exist")]
    InvalidNode(usize),

    #[error("Node {node} references missing mesh {mesh}")]
    InvalidMeshReference { node: usize, mesh: usize },

    #[error("Node {0} is reachable more than once")]
    CyclicNode(usize),

    #[error("Mesh '{mesh}' index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("Mesh '{mesh}' has {count} indices, more than a draw call can address")]
    TooManyIndices { mesh: String, count: usize },

    #[error("Mesh '{mesh}' has {normals} normals for {positions} positions")]
    NormalCountMismatch {
        mesh: String,
        normals: usize,
        positions: usize,
    },
}

/// Ordered collection of meshes imported from one scene
pub struct Model<D: GpuDevice> {
    meshes: Vec<Mesh<D>>,
}

impl<D: GpuDevice> Model<D> {
    /// Import a model file with the default parser and options
    ///
    /// Failures are logged and produce an empty model.
    pub fn import(device: &Arc<D>, path: impl AsRef<Path>) -> Self {
        Self::import_with(device, &FileSceneParser, path, &ParseOptions::default())
    }

    /// Import with an explicit parser and options
    ///
    /// Failures are logged and produce an empty model.
    pub fn import_with<P>(
        device: &Arc<D>,
        parser: &P,
        path: impl AsRef<Path>,
        options: &ParseOptions,
    ) -> Self
    where
        P: SceneParser + ?Sized,
    {
        let path = path.as_ref();
        match Self::try_import(device, parser, path, options) {
            Ok(model) => model,
            Err(e) => {
                error!(path = ?path, error = %e, "Model import failed");
                Self { meshes: Vec::new() }
            }
        }
    }

    /// Import, returning the error instead of logging it
    pub fn try_import<P>(
        device: &Arc<D>,
        parser: &P,
        path: impl AsRef<Path>,
        options: &ParseOptions,
    ) -> Result<Self, ImportError>
    where
        P: SceneParser + ?Sized,
    {
        let path = path.as_ref();
        let scene = parser.parse(path, options)?;
        let model = Self::from_scene(device, &scene)?;
        if model.is_empty() {
            warn!(path = ?path, "Imported scene contains no meshes; nothing will be drawn");
        } else {
            info!(
                path = ?path,
                meshes = model.len(),
                vertices = model.vertex_count(),
                indices = model.index_count(),
                "Imported model"
            );
        }
        Ok(model)
    }

    /// Build a model from an already parsed scene
    ///
    /// The whole scene is validated and converted before anything is
    /// uploaded, so an error leaves no GPU buffers behind.
    pub fn from_scene(device: &Arc<D>, scene: &SceneGraph) -> Result<Self, ImportError> {
        if !scene.is_complete() {
            return Err(ImportError::IncompleteScene);
        }

        let prepared = traversal_order(scene)?
            .into_iter()
            .map(|mesh_index| prepare_mesh(&scene.meshes[mesh_index]))
            .collect::<Result<Vec<_>, _>>()?;

        let meshes = prepared
            .into_iter()
            .map(|data| Mesh::upload(device, data))
            .collect();

        Ok(Self { meshes })
    }

    /// Draw every mesh once, in import order
    pub fn draw<T>(&self, target: &mut T)
    where
        T: DrawTarget<D> + ?Sized,
    {
        for mesh in &self.meshes {
            mesh.draw(target);
        }
    }

    pub fn meshes(&self) -> &[Mesh<D>] {
        &self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// An empty model is what a failed import leaves behind
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.vertices().len()).sum()
    }

    pub fn index_count(&self) -> usize {
        self.meshes.iter().map(|mesh| mesh.indices().len()).sum()
    }

    /// Union of the re-centred bounds of every mesh
    pub fn bounds(&self) -> Option<Aabb> {
        self.meshes
            .iter()
            .filter_map(Mesh::bounds)
            .reduce(|a, b| a.union(&b))
    }
}

impl<D: GpuDevice> fmt::Debug for Model<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model").field("meshes", &self.meshes).finish()
    }
}

/// Mesh indices in depth-first pre-order, one entry per node reference
///
/// Walks an explicit stack. Children are pushed in reverse so they pop in
/// document order.
pub fn traversal_order(scene: &SceneGraph) -> Result<Vec<usize>, ImportError> {
    let root = scene.root.ok_or(ImportError::MissingRoot)?;

    let mut visited = vec![false; scene.nodes.len()];
    let mut stack = vec![root];
    let mut order = Vec::new();

    while let Some(node_index) = stack.pop() {
        let node = scene
            .nodes
            .get(node_index)
            .ok_or(ImportError::InvalidNode(node_index))?;
        if std::mem::replace(&mut visited[node_index], true) {
            return Err(ImportError::CyclicNode(node_index));
        }

        for &mesh in &node.meshes {
            if mesh >= scene.meshes.len() {
                return Err(ImportError::InvalidMeshReference {
                    node: node_index,
                    mesh,
                });
            }
            order.push(mesh);
        }

        stack.extend(node.children.iter().rev());
    }

    Ok(order)
}

/// Re-centre a mesh record on its bounding box and flatten its faces
///
/// A record with no positions becomes an empty mesh with a zero centre.
pub fn prepare_mesh(record: &MeshRecord) -> Result<MeshData, ImportError> {
    let vertex_count = record.positions.len();

    if let Some(normals) = &record.normals {
        if normals.len() != vertex_count {
            return Err(ImportError::NormalCountMismatch {
                mesh: record.name.clone(),
                normals: normals.len(),
                positions: vertex_count,
            });
        }
    }

    let index_count = record.faces.len().saturating_mul(3);
    if u32::try_from(index_count).is_err() {
        return Err(ImportError::TooManyIndices {
            mesh: record.name.clone(),
            count: index_count,
        });
    }

    let indices: Vec<u32> = record.faces.iter().flatten().copied().collect();
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(ImportError::IndexOutOfRange {
            mesh: record.name.clone(),
            index,
            vertex_count,
        });
    }

    let center = bounding_box_center(&record.positions).unwrap_or(Vec3::ZERO);
    let vertices = match &record.normals {
        Some(normals) => record
            .positions
            .iter()
            .zip(normals)
            .map(|(&position, &normal)| Vertex::new(position - center, normal))
            .collect(),
        None => record
            .positions
            .iter()
            .map(|&position| Vertex::from_position(position - center))
            .collect(),
    };

    debug!(
        mesh = %record.name,
        vertices = vertex_count,
        faces = record.faces.len(),
        center = ?center,
        "Prepared mesh"
    );

    Ok(MeshData {
        label: record.name.clone(),
        vertices,
        indices,
        center,
    })
}
