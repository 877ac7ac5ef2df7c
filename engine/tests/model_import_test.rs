//! Integration tests for importing model files into drawable meshes

use glam::Vec3;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use viewer_engine::graphics::{DrawCommand, RecordingDevice, RecordingPass, VertexLayout};
use viewer_engine::io::{
    FileSceneParser, MeshRecord, ParseError, ParseOptions, SceneGraph, SceneParser,
};
use viewer_engine::model::{ImportError, Model};

const SQUARE_OBJ: &str = "\
o square
v 0 0 0
v 2 0 0
v 2 2 0
v 0 2 0
f 1 2 3
f 1 3 4
";

const TWO_OBJECTS_OBJ: &str = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
o second
v 10 10 10
v 12 10 10
v 10 14 10
f 4 5 6
";

const PARTIAL_NORMALS_OBJ: &str = "\
o patch
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vn 0 0 1
f 1//1 2//1 3//1
f 2 4 3
";

fn write_fixture(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    path
}

#[test]
fn test_square_is_recentered() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "square.obj", SQUARE_OBJ);

    let device = Arc::new(RecordingDevice::new());
    let model = Model::import(&device, &path);

    assert_eq!(model.len(), 1);
    let mesh = &model.meshes()[0];
    assert_eq!(mesh.center(), Vec3::new(1.0, 1.0, 0.0));
    assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);

    let positions: Vec<Vec3> = mesh.vertices().iter().map(|v| v.position()).collect();
    assert_eq!(
        positions,
        vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ]
    );

    // Normals were generated by the parser
    assert_eq!(mesh.layout(), VertexLayout::PositionNormal);
}

#[test]
fn test_obj_with_partial_normals_imports() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "patch.obj", PARTIAL_NORMALS_OBJ);

    let device = Arc::new(RecordingDevice::new());
    let model = Model::import(&device, &path);

    assert_eq!(model.len(), 1);
    let mesh = &model.meshes()[0];
    assert_eq!(mesh.index_count(), 6);
    assert_eq!(mesh.layout(), VertexLayout::PositionNormal);
}

#[test]
fn test_meshes_satisfy_index_invariants() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "two.obj", TWO_OBJECTS_OBJ);

    let device = Arc::new(RecordingDevice::new());
    let model = Model::import(&device, &path);

    assert_eq!(model.len(), 2);
    for mesh in model.meshes() {
        assert_eq!(mesh.indices().len() % 3, 0);
        let max = mesh.indices().iter().copied().max().unwrap();
        assert!((max as usize) < mesh.vertices().len());
    }

    // Each object keeps its own centre
    assert_eq!(model.meshes()[0].label(), "first");
    assert_eq!(model.meshes()[1].center(), Vec3::new(11.0, 12.0, 10.0));
}

#[test]
fn test_nested_scene_draw_order() {
    // A(1 mesh) -> [B(1 mesh), C(0 meshes) -> [D(1 mesh)]]
    let mut scene = SceneGraph::new();
    let tri = |name: &str, n: u32| {
        let positions = (0..n).map(|i| Vec3::new(i as f32, (i % 2) as f32, 0.0)).collect();
        let faces = (0..n / 3).map(|f| [3 * f, 3 * f + 1, 3 * f + 2]).collect();
        MeshRecord::new(name, positions, faces)
    };
    let a_mesh = scene.add_mesh(tri("A.mesh", 3));
    let b_mesh = scene.add_mesh(tri("B.mesh", 6));
    let d_mesh = scene.add_mesh(tri("D.mesh", 9));
    let a = scene.add_node("A", vec![a_mesh]);
    let b = scene.add_node("B", vec![b_mesh]);
    let c = scene.add_node("C", vec![]);
    let d = scene.add_node("D", vec![d_mesh]);
    scene.add_child(a, b);
    scene.add_child(a, c);
    scene.add_child(c, d);
    scene.set_root(a);

    let device = Arc::new(RecordingDevice::new());
    let model = Model::from_scene(&device, &scene).unwrap();

    let labels: Vec<&str> = model.meshes().iter().map(|m| m.label()).collect();
    assert_eq!(labels, vec!["A.mesh", "B.mesh", "D.mesh"]);

    let mut pass = RecordingPass::new();
    model.draw(&mut pass);
    assert_eq!(pass.draws(), vec![3, 6, 9]);

    // Drawing twice records the same sequence again
    model.draw(&mut pass);
    assert_eq!(pass.draws(), vec![3, 6, 9, 3, 6, 9]);
}

#[test]
fn test_draw_binds_own_buffers() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "two.obj", TWO_OBJECTS_OBJ);

    let device = Arc::new(RecordingDevice::new());
    let model = Model::import(&device, &path);

    let mut pass = RecordingPass::new();
    model.draw(&mut pass);

    let bound: Vec<usize> = pass
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::BindVertexBuffer { buffer, .. } => Some(*buffer),
            DrawCommand::BindIndexBuffer { buffer } => Some(*buffer),
            DrawCommand::DrawIndexed { .. } => None,
        })
        .collect();
    // Vertex then index buffer for each mesh, in allocation order
    assert_eq!(bound, vec![0, 1, 2, 3]);
}

#[test]
fn test_dropping_model_releases_every_buffer_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "two.obj", TWO_OBJECTS_OBJ);

    let device = Arc::new(RecordingDevice::new());
    let model = Model::import(&device, &path);
    assert_eq!(device.live_buffers(), 4);

    drop(model);

    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.released_buffers(), 4);
    assert!(device.double_releases().is_empty());
}

#[test]
fn test_failed_import_is_empty() {
    let device = Arc::new(RecordingDevice::new());

    let missing = Model::import(&device, "no/such/file.obj");
    assert!(missing.is_empty());

    let unsupported = Model::import(&device, "model.fbx");
    assert!(unsupported.is_empty());

    assert_eq!(device.allocated_buffers(), 0);
}

#[test]
fn test_try_import_reports_parse_error() {
    let device = Arc::new(RecordingDevice::new());
    let result = Model::try_import(
        &device,
        &FileSceneParser,
        "model.fbx",
        &ParseOptions::default(),
    );
    assert!(matches!(
        result,
        Err(ImportError::Parse(ParseError::UnsupportedFormat(_)))
    ));
}

/// Parser stand-in that returns a prepared scene
struct FixedParser(SceneGraph);

impl SceneParser for FixedParser {
    fn parse(&self, _path: &Path, _options: &ParseOptions) -> Result<SceneGraph, ParseError> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_scene_without_root_is_empty() {
    let mut scene = SceneGraph::new();
    let mesh = scene.add_mesh(MeshRecord::new("tri", vec![Vec3::ZERO; 3], vec![[0, 1, 2]]));
    scene.add_node("orphan", vec![mesh]);

    let device = Arc::new(RecordingDevice::new());
    let parser = FixedParser(scene);

    let model = Model::import_with(&device, &parser, "scene", &ParseOptions::default());
    assert!(model.is_empty());

    let result = Model::try_import(&device, &parser, "scene", &ParseOptions::default());
    assert!(matches!(result, Err(ImportError::MissingRoot)));
}

#[test]
fn test_incomplete_scene_is_empty() {
    let mut scene = SceneGraph::new();
    let mesh = scene.add_mesh(MeshRecord::new("tri", vec![Vec3::ZERO; 3], vec![[0, 1, 2]]));
    let root = scene.add_node("root", vec![mesh]);
    scene.set_root(root);
    scene.mark_incomplete();

    let device = Arc::new(RecordingDevice::new());
    let model = Model::import_with(
        &device,
        &FixedParser(scene),
        "scene",
        &ParseOptions::default(),
    );
    assert!(model.is_empty());
    assert_eq!(device.allocated_buffers(), 0);
}

#[test]
fn test_degenerate_mesh_is_kept_and_draws_nothing() {
    let mut scene = SceneGraph::new();
    let empty = scene.add_mesh(MeshRecord::new("empty", Vec::new(), Vec::new()));
    let root = scene.add_node("root", vec![empty]);
    scene.set_root(root);

    let device = Arc::new(RecordingDevice::new());
    let model = Model::from_scene(&device, &scene).unwrap();
    assert_eq!(model.len(), 1);

    let mut pass = RecordingPass::new();
    model.draw(&mut pass);
    assert!(pass.commands().is_empty());
}

#[test]
fn test_model_bounds_are_centred() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "two.obj", TWO_OBJECTS_OBJ);

    let device = Arc::new(RecordingDevice::new());
    let model = Model::import(&device, &path);

    let bounds = model.bounds().unwrap();
    assert!(bounds.center().abs_diff_eq(Vec3::ZERO, 1e-6));
    assert_eq!(bounds.extent(), Vec3::new(2.0, 4.0, 0.0));
}

#[test]
fn test_obj_parser_preserves_object_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "two.obj", TWO_OBJECTS_OBJ);

    let scene = FileSceneParser
        .parse(&path, &ParseOptions::default())
        .unwrap();
    let root = scene.root_node().unwrap();
    let names: Vec<&str> = root
        .children
        .iter()
        .map(|&child| scene.nodes[child].name.as_str())
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}
