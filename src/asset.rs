//! Model asset cache: glTF documents loaded once, skeleton instances
//! stamped out per character.
//!
//! The cache owns parsed documents only; instancing walks the node
//! hierarchy of the default scene and materializes a [`Skeleton`], so every
//! character gets its own mutable pose state.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::skeleton::{BoneId, Skeleton, Transform};

#[derive(Default)]
pub struct ModelCache {
    documents: HashMap<String, gltf::Document>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a glTF/GLB file and register it under `name`. Re-loading an
    /// existing name replaces the cached document.
    pub fn load(&mut self, name: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let gltf = gltf::Gltf::open(path)
            .with_context(|| format!("failed to open model '{}'", path.display()))?;
        debug!("loaded model '{name}' from '{}'", path.display());
        self.documents.insert(name.to_string(), gltf.document);
        Ok(())
    }

    /// Parse glTF/GLB bytes already in memory and register them under `name`.
    pub fn load_from_slice(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let gltf = gltf::Gltf::from_slice(bytes)
            .with_context(|| format!("failed to parse model bytes for '{name}'"))?;
        self.documents.insert(name.to_string(), gltf.document);
        Ok(())
    }

    /// Stamp out a fresh skeleton from a cached model's default scene.
    ///
    /// Node names carry over verbatim; unnamed nodes get a stable
    /// index-derived name so lookups and reports stay usable.
    pub fn create_instance(&self, name: &str) -> Option<Skeleton> {
        let document = self.documents.get(name)?;
        let scene = document.default_scene().or_else(|| document.scenes().next())?;

        let mut skeleton = Skeleton::new();
        for node in scene.nodes() {
            add_node_recursive(&mut skeleton, &node, None);
        }
        Some(skeleton)
    }

    /// Drop a cached model. Returns whether it was present. Skeletons already
    /// instanced from it stay valid.
    pub fn dispose(&mut self, name: &str) -> bool {
        self.documents.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn add_node_recursive(skeleton: &mut Skeleton, node: &gltf::Node, parent: Option<BoneId>) {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));

    let (translation, rotation, scale) = node.transform().decomposed();
    // glTF quaternions are [x, y, z, w].
    let rest = Transform::new(
        Vector3::new(translation[0], translation[1], translation[2]),
        UnitQuaternion::from_quaternion(Quaternion::new(
            rotation[3],
            rotation[0],
            rotation[1],
            rotation[2],
        )),
        Vector3::new(scale[0], scale[1], scale[2]),
    );

    let id = skeleton.add_bone(name, parent, rest);
    for child in node.children() {
        add_node_recursive(skeleton, &child, Some(id));
    }
}
