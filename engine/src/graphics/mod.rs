//! Graphics module
//!
//! Provides geometry primitives, the GPU seams they are uploaded and drawn
//! through, and the wgpu and headless implementations of those seams.

pub mod context;
pub mod device;
pub mod mesh;
pub mod recording;

// Re-export commonly used types
pub use context::{ContextError, RenderContext};
pub use device::{BufferUsage, DrawTarget, GpuDevice};
pub use mesh::{GpuBuffer, Mesh, MeshData, Vertex, VertexLayout};
pub use recording::{DrawCommand, RecordedBuffer, RecordingDevice, RecordingPass};
