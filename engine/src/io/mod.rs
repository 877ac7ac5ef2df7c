//! Scene file loading
//!
//! Parsers turn a model file into a [`SceneGraph`]. [`FileSceneParser`]
//! picks one from the file extension.

mod gltf_loader;
mod obj;
mod scene_graph;

pub use gltf_loader::load_gltf;
pub use obj::load_obj;
pub use scene_graph::{MeshRecord, ParseOptions, SceneFlags, SceneGraph, SceneNode};

use std::path::Path;

/// Errors that can occur while parsing a scene file
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ loading error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("glTF loading error: {0}")]
    Gltf(#[from] ::gltf::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Reads a scene file into a [`SceneGraph`]
pub trait SceneParser {
    fn parse(&self, path: &Path, options: &ParseOptions) -> Result<SceneGraph, ParseError>;
}

/// Parser that dispatches on the file extension
///
/// `.obj` files go through tobj, `.gltf` and `.glb` through gltf.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSceneParser;

impl SceneParser for FileSceneParser {
    fn parse(&self, path: &Path, options: &ParseOptions) -> Result<SceneGraph, ParseError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "obj" => load_obj(path, options),
            "gltf" | "glb" => load_gltf(path, options),
            ext => Err(ParseError::UnsupportedFormat(ext.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format() {
        let result = FileSceneParser.parse(Path::new("test.fbx"), &ParseOptions::default());
        assert!(matches!(result, Err(ParseError::UnsupportedFormat(ext)) if ext == "fbx"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let result = FileSceneParser.parse(Path::new("missing.OBJ"), &ParseOptions::default());
        // Reaches tobj, which fails to open the file
        assert!(matches!(result, Err(ParseError::Obj(_))));
    }
}
