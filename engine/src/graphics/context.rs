//! WebGPU render context management
//!
//! Provides the rendering context that owns the WebGPU device and queue,
//! and wires wgpu into the [`GpuDevice`] and [`DrawTarget`] seams used by
//! meshes. Surfaces are owned by the windowing side.

use super::device::{BufferUsage, DrawTarget, GpuDevice};
use super::mesh::VertexLayout;
use std::sync::Arc;
use tracing::{info, trace};
use wgpu::util::DeviceExt;

/// Errors that can occur while creating a render context
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// Main rendering context
///
/// Owns the WebGPU device and queue that mesh buffers are created on.
pub struct RenderContext {
    /// WebGPU instance
    pub instance: wgpu::Instance,
    /// WebGPU device for creating GPU resources
    pub device: Arc<wgpu::Device>,
    /// Command queue for submitting GPU work
    pub queue: Arc<wgpu::Queue>,
    /// Adapter information for debugging
    pub adapter_info: wgpu::AdapterInfo,
}

impl RenderContext {
    /// Create a new render context
    ///
    /// Requests an adapter compatible with `compatible_surface` (if any)
    /// and a device from it.
    pub async fn new(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, ContextError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await?;

        let adapter_info = adapter.get_info();
        info!(
            gpu_name = %adapter_info.name,
            backend = ?adapter_info.backend,
            "GPU adapter selected"
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: Some("Render Device"),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self {
            instance,
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter_info,
        })
    }

    /// Create a context without a surface, blocking the calling thread
    pub fn new_headless() -> Result<Self, ContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        pollster::block_on(Self::new(instance, None))
    }
}

fn buffer_usages(usage: BufferUsage) -> wgpu::BufferUsages {
    match usage {
        BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
        BufferUsage::Index => wgpu::BufferUsages::INDEX,
    }
}

impl GpuDevice for RenderContext {
    type Buffer = wgpu::Buffer;

    fn create_buffer(&self, label: &str, usage: BufferUsage, contents: &[u8]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: buffer_usages(usage),
            })
    }

    fn release_buffer(&self, buffer: &wgpu::Buffer) {
        buffer.destroy();
    }
}

impl DrawTarget<RenderContext> for wgpu::RenderPass<'_> {
    fn bind_vertex_buffer(&mut self, buffer: &wgpu::Buffer, layout: VertexLayout) {
        // The layout is fixed by the pipeline; nothing to declare per bind
        trace!(?layout, "Binding vertex buffer");
        self.set_vertex_buffer(0, buffer.slice(..));
    }

    fn bind_index_buffer(&mut self, buffer: &wgpu::Buffer) {
        self.set_index_buffer(buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    fn draw_indexed(&mut self, index_count: u32) {
        wgpu::RenderPass::draw_indexed(self, 0..index_count, 0, 0..1);
    }
}
