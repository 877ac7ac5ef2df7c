//! Seams between geometry and the graphics API
//!
//! Meshes allocate and release buffers through [`GpuDevice`] and record
//! draws through [`DrawTarget`]. The wgpu context implements both; the
//! recording device implements them without a GPU.

use super::mesh::VertexLayout;

/// What a buffer will be bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Interleaved vertex data
    Vertex,
    /// `u32` triangle-list indices
    Index,
}

/// Allocates and releases GPU buffers
///
/// Implementations assume the calling thread owns the rendering context.
/// Allocation is synchronous: the data is resident when `create_buffer`
/// returns.
pub trait GpuDevice {
    /// Handle to one allocated buffer
    type Buffer;

    /// Allocate a buffer sized to `contents` and copy `contents` into it
    fn create_buffer(&self, label: &str, usage: BufferUsage, contents: &[u8]) -> Self::Buffer;

    /// Free a buffer; called exactly once per allocation
    fn release_buffer(&self, buffer: &Self::Buffer);
}

/// Receives the bind and draw commands for indexed geometry
pub trait DrawTarget<D: GpuDevice + ?Sized> {
    /// Bind interleaved vertex data described by `layout`
    fn bind_vertex_buffer(&mut self, buffer: &D::Buffer, layout: VertexLayout);

    /// Bind `u32` indices
    fn bind_index_buffer(&mut self, buffer: &D::Buffer);

    /// Draw `index_count` indices as a triangle list
    fn draw_indexed(&mut self, index_count: u32);
}
