//! Bridge between the bone hierarchy (FK/IK math) and the separately-driven
//! visual mesh layer.
//!
//! The mesh layer stores plain Euler rotations, so the bridge strips each
//! bone's rest rotation out of its current rotation before copying:
//! `anim = rest⁻¹ * full`. Writing runs the inverse composition,
//! `full = rest * anim`, and the two must round-trip exactly — a bone
//! sitting at rest produces a zero rotation on the driven node.

use log::debug;
use nalgebra::{UnitQuaternion, Vector3};

use crate::skeleton::{BoneId, MeshNode, Skeleton};

/// One driven tuple: a bone, the visual node it drives, and the rest
/// rotation captured when the binding was registered.
#[derive(Debug, Clone)]
struct MeshBinding {
    joint: String,
    bone: BoneId,
    node: usize,
    rest: UnitQuaternion<f32>,
}

/// Registered bone-to-mesh bindings for one character's visual layer.
#[derive(Debug, Clone, Default)]
pub struct SkeletonMeshSync {
    bindings: Vec<MeshBinding>,
}

impl SkeletonMeshSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        joint: impl Into<String>,
        bone: BoneId,
        node: usize,
        rest: UnitQuaternion<f32>,
    ) {
        self.bindings.push(MeshBinding {
            joint: joint.into(),
            bone,
            node,
            rest,
        });
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Copy every bound bone's animation delta onto its driven node.
    /// Called once per frame after all FK/IK writes.
    pub fn sync_skeleton_to_mesh(&self, skeleton: &Skeleton, nodes: &mut [MeshNode]) {
        for binding in &self.bindings {
            let Some(node) = nodes.get_mut(binding.node) else {
                continue;
            };
            let full = skeleton.bone(binding.bone).local_rotation;
            let anim = binding.rest.inverse() * full;
            let (x, y, z) = anim.euler_angles();
            node.rotation = Vector3::new(x, y, z);
        }
    }

    /// Restricted FK write owned by the mesh bridge: compose the authored
    /// animation rotation back onto the rest rotation of the bone bound to
    /// `joint`. Unknown joints are a no-op.
    pub fn set_bone_animation_rotation(
        &self,
        skeleton: &mut Skeleton,
        joint: &str,
        anim_euler: &Vector3<f32>,
    ) {
        let Some(binding) = self.bindings.iter().find(|b| b.joint == joint) else {
            debug!("no mesh binding for joint '{joint}'");
            return;
        };
        let anim = UnitQuaternion::from_euler_angles(anim_euler.x, anim_euler.y, anim_euler.z);
        skeleton.bone_mut(binding.bone).local_rotation = binding.rest * anim;
    }
}
