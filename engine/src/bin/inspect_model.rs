//! Import a model headlessly and print what would be drawn

use std::{env, path::Path, process::ExitCode, sync::Arc};
use viewer_engine::graphics::{RecordingDevice, RecordingPass};
use viewer_engine::model::Model;

fn main() -> ExitCode {
    viewer_engine::init_logging();

    let Some(model_path) = env::args().nth(1) else {
        eprintln!("usage: inspect_model <model.obj|model.gltf|model.glb>");
        return ExitCode::FAILURE;
    };

    let path = Path::new(&model_path);
    println!("Inspecting model: {}", path.display());

    let device = Arc::new(RecordingDevice::new());
    let model = Model::import(&device, path);
    if model.is_empty() {
        eprintln!("✗ No meshes imported");
        return ExitCode::FAILURE;
    }

    println!("✓ Imported {} meshes", model.len());
    for (i, mesh) in model.meshes().iter().enumerate() {
        let center = mesh.center();
        println!(
            "  [{i}] {}: {} vertices, {} indices, layout {:?}, center ({:.3}, {:.3}, {:.3})",
            mesh.label(),
            mesh.vertices().len(),
            mesh.indices().len(),
            mesh.layout(),
            center.x,
            center.y,
            center.z,
        );
    }

    let mut pass = RecordingPass::new();
    model.draw(&mut pass);
    println!("  Draw calls: {}", pass.draws().len());
    println!("  Buffers allocated: {}", device.allocated_buffers());

    ExitCode::SUCCESS
}
