//! Geometry primitives and their GPU buffers
//!
//! A [`Mesh`] owns a vertex list, a triangle-list index list and the pair
//! of GPU buffers mirroring them. The buffers are uploaded when the mesh is
//! constructed and released when it is dropped.

use super::device::{BufferUsage, DrawTarget, GpuDevice};
use crate::core::bounds::Aabb;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::fmt;
use std::mem;
use std::sync::Arc;
use tracing::debug;

/// A vertex position with an optional surface normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    position: Vec3,
    normal: Option<Vec3>,
}

impl Vertex {
    /// Create a vertex with a normal
    pub const fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal: Some(normal),
        }
    }

    /// Create a position-only vertex
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            normal: None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn normal(&self) -> Option<Vec3> {
        self.normal
    }
}

/// GPU-side vertex when normals are present
///
/// This struct is tightly packed for efficient GPU transfer using bytemuck.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct PositionNormal {
    position: [f32; 3],
    normal: [f32; 3],
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    offset: 0,
    shader_location: 0,
    format: wgpu::VertexFormat::Float32x3,
}];

const POSITION_NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
    // Position
    wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x3,
    },
    // Normal
    wgpu::VertexAttribute {
        offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        shader_location: 1,
        format: wgpu::VertexFormat::Float32x3,
    },
];

/// Interleaved memory layout of a vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    /// `position: vec3<f32>` at location 0
    Position,
    /// `position` at location 0 followed by `normal: vec3<f32>` at location 1
    PositionNormal,
}

impl VertexLayout {
    /// Pick the layout for a vertex list: normals only when every vertex has one
    pub fn for_vertices(vertices: &[Vertex]) -> Self {
        if !vertices.is_empty() && vertices.iter().all(|v| v.normal.is_some()) {
            Self::PositionNormal
        } else {
            Self::Position
        }
    }

    /// Bytes per vertex
    pub fn stride(self) -> usize {
        match self {
            Self::Position => mem::size_of::<[f32; 3]>(),
            Self::PositionNormal => mem::size_of::<PositionNormal>(),
        }
    }

    pub fn has_normals(self) -> bool {
        self == Self::PositionNormal
    }

    /// Attribute list in field order
    pub fn attributes(self) -> &'static [wgpu::VertexAttribute] {
        match self {
            Self::Position => &POSITION_ATTRIBUTES,
            Self::PositionNormal => &POSITION_NORMAL_ATTRIBUTES,
        }
    }

    /// Get the vertex buffer layout for pipeline creation
    pub fn buffer_layout(self) -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: self.attributes(),
        }
    }

    /// Pack vertices into bytes following this layout
    ///
    /// Vertices without a normal get a zero normal under `PositionNormal`.
    pub fn pack(self, vertices: &[Vertex]) -> Vec<u8> {
        match self {
            Self::Position => {
                let packed: Vec<[f32; 3]> =
                    vertices.iter().map(|v| v.position.to_array()).collect();
                bytemuck::cast_slice(&packed).to_vec()
            }
            Self::PositionNormal => {
                let packed: Vec<PositionNormal> = vertices
                    .iter()
                    .map(|v| PositionNormal {
                        position: v.position.to_array(),
                        normal: v.normal.unwrap_or(Vec3::ZERO).to_array(),
                    })
                    .collect();
                bytemuck::cast_slice(&packed).to_vec()
            }
        }
    }
}

/// A GPU buffer that is released exactly once, when dropped
pub struct GpuBuffer<D: GpuDevice> {
    device: Arc<D>,
    raw: D::Buffer,
    size: usize,
}

impl<D: GpuDevice> GpuBuffer<D> {
    /// Allocate a buffer and copy `contents` into it
    pub fn new(device: &Arc<D>, label: &str, usage: BufferUsage, contents: &[u8]) -> Self {
        let raw = device.create_buffer(label, usage, contents);
        Self {
            device: Arc::clone(device),
            raw,
            size: contents.len(),
        }
    }

    /// Backend handle
    pub fn raw(&self) -> &D::Buffer {
        &self.raw
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<D: GpuDevice> Drop for GpuBuffer<D> {
    fn drop(&mut self) {
        self.device.release_buffer(&self.raw);
    }
}

/// CPU-side geometry ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Debug label, used for GPU buffer names
    pub label: String,
    /// Vertex list
    pub vertices: Vec<Vertex>,
    /// Triangle-list indices into `vertices`
    pub indices: Vec<u32>,
    /// Offset subtracted from the source positions
    pub center: Vec3,
}

/// Geometry primitive with GPU-resident vertex and index buffers
pub struct Mesh<D: GpuDevice> {
    label: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    center: Vec3,
    layout: VertexLayout,
    index_count: u32,
    // Declared vertex first: fields drop in order
    vertex_buffer: GpuBuffer<D>,
    index_buffer: GpuBuffer<D>,
}

impl<D: GpuDevice> Mesh<D> {
    /// Upload prepared geometry
    ///
    /// Blocks until both buffers are resident. If creating the index buffer
    /// unwinds, the vertex buffer guard releases the vertex buffer. Only
    /// data validated by [`crate::model::prepare_mesh`] reaches this point.
    pub(crate) fn upload(device: &Arc<D>, data: MeshData) -> Self {
        let MeshData {
            label,
            vertices,
            indices,
            center,
        } = data;

        debug_assert!(indices.len() % 3 == 0, "index count must be a multiple of 3");
        debug_assert!(
            indices.iter().all(|&i| (i as usize) < vertices.len()),
            "index out of range"
        );
        let index_count = u32::try_from(indices.len()).unwrap_or(u32::MAX);

        let layout = VertexLayout::for_vertices(&vertices);
        let vertex_buffer = GpuBuffer::new(
            device,
            &format!("{label} Vertex Buffer"),
            BufferUsage::Vertex,
            &layout.pack(&vertices),
        );
        let index_buffer = GpuBuffer::new(
            device,
            &format!("{label} Index Buffer"),
            BufferUsage::Index,
            bytemuck::cast_slice(&indices),
        );

        debug!(
            label = %label,
            vertices = vertices.len(),
            indices = indices.len(),
            layout = ?layout,
            "Uploaded mesh to GPU"
        );

        Self {
            label,
            vertices,
            indices,
            center,
            layout,
            index_count,
            vertex_buffer,
            index_buffer,
        }
    }

    /// Bind the buffers and draw every index as a triangle list
    ///
    /// A mesh without indices records nothing.
    pub fn draw<T>(&self, target: &mut T)
    where
        T: DrawTarget<D> + ?Sized,
    {
        if self.indices.is_empty() {
            return;
        }
        target.bind_vertex_buffer(self.vertex_buffer.raw(), self.layout);
        target.bind_index_buffer(self.index_buffer.raw());
        target.draw_indexed(self.index_count());
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Translation removed from the source positions during import
    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Bounds of the stored (re-centred) positions
    pub fn bounds(&self) -> Option<Aabb> {
        let positions: Vec<Vec3> = self.vertices.iter().map(Vertex::position).collect();
        Aabb::from_points(&positions)
    }

    pub fn vertex_buffer(&self) -> &GpuBuffer<D> {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &GpuBuffer<D> {
        &self.index_buffer
    }
}

impl<D: GpuDevice> fmt::Debug for Mesh<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("label", &self.label)
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .field("center", &self.center)
            .field("layout", &self.layout)
            .finish()
    }
}
