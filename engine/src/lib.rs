//! Model viewer core
//!
//! This crate turns scene files into flat lists of GPU-resident meshes and
//! provides a first-person camera driven by per-frame input deltas.

pub mod config;
pub mod core;
pub mod graphics;
pub mod input;
pub mod io;
pub mod model;
pub mod session;

// Re-export commonly used types
pub mod prelude {
    // Camera types
    pub use crate::core::camera::{Camera, MovementDirection, Projection};

    // Math types
    pub use crate::core::bounds::Aabb;
    pub use glam::{Mat4, Vec3};

    // Graphics types
    pub use crate::graphics::{
        DrawTarget, GpuDevice, Mesh, RecordingDevice, RecordingPass, RenderContext, Vertex,
        VertexLayout,
    };

    // IO types
    pub use crate::io::{FileSceneParser, ParseOptions, SceneGraph, SceneParser};

    // Import types
    pub use crate::model::{ImportError, Model};

    // Config types
    pub use crate::config::{AssetConfig, CameraSettings, ViewerConfig};

    pub use crate::input::InputState;
    pub use crate::session::Session;

    pub use wgpu;
}

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,wgpu_core=warn,wgpu_hal=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
