//! Rest-pose capture: the single source of truth for "what is neutral".
//!
//! Unlike the builder's analytically computed rest rotations, capture reads
//! back whatever rest rotation a skeleton already carries by decomposing its
//! engine-level bind matrices, so it works identically for procedural and
//! imported skeletons.

use std::collections::HashMap;

use nalgebra::UnitQuaternion;

use crate::rig::types::FoundBones;
use crate::skeleton::{BoneId, Skeleton, Transform};

/// Authoritative zero-pose rotation per resolved bone.
pub type RestPoseCache = HashMap<BoneId, UnitQuaternion<f32>>;

/// Capture rest rotations for every introspection-resolved bone.
///
/// Bones that did not resolve are simply absent; callers fall back to
/// [`capture_all_rest_poses`] for those.
pub fn capture_rest_poses(skeleton: &Skeleton, found: &FoundBones) -> RestPoseCache {
    found
        .iter()
        .map(|(_, id)| (id, decompose_rest_rotation(skeleton, id)))
        .collect()
}

/// Whole-skeleton fallback capture, keyed by raw bone id rather than logical
/// name. Covers bones the introspector could not classify (helper bones,
/// twist bones, props parented into the rig).
pub fn capture_all_rest_poses(skeleton: &Skeleton) -> RestPoseCache {
    skeleton
        .ids()
        .map(|id| (id, decompose_rest_rotation(skeleton, id)))
        .collect()
}

fn decompose_rest_rotation(skeleton: &Skeleton, id: BoneId) -> UnitQuaternion<f32> {
    // Deliberately goes through the bind matrix instead of reading the stored
    // quaternion: imported skeletons may bake shear/scale into the matrix and
    // the decomposition is what isolates the rotation component.
    Transform::from_matrix(&skeleton.bone(id).rest_matrix()).rotation
}

#[cfg(test)]
mod tests {
    use nalgebra::{UnitQuaternion, Vector3};

    use super::*;
    use crate::rig::builder::build_procedural_skeleton;
    use crate::rig::introspect::{detect_rig_type, find_all_bones};

    #[test]
    fn given_procedural_skeleton_when_capturing_then_rotations_match_the_builder() {
        let skeleton = build_procedural_skeleton().unwrap();
        let rig_type = detect_rig_type(&skeleton);
        let found = find_all_bones(&skeleton, rig_type).unwrap();

        let cache = capture_rest_poses(&skeleton, &found);

        for (logical, id) in found.iter() {
            let captured = cache.get(&id).expect("every resolved bone is captured");
            let stored = skeleton.bone(id).rest.rotation;
            assert!(
                captured.angle_to(&stored) < 1e-4,
                "captured rest for {logical} should match the authored rest"
            );
            assert!((captured.as_ref().norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn given_unresolved_bones_when_capturing_then_fallback_covers_the_whole_skeleton() {
        let mut skeleton = build_procedural_skeleton().unwrap();
        let hips = skeleton.find_by_name("hips").unwrap();
        skeleton.add_bone(
            "twist_helper",
            Some(hips),
            crate::skeleton::Transform::new(
                Vector3::new(0.0, 0.1, 0.0),
                UnitQuaternion::from_euler_angles(0.0, 0.7, 0.0),
                Vector3::new(1.0, 1.0, 1.0),
            ),
        );

        let rig_type = detect_rig_type(&skeleton);
        let found = find_all_bones(&skeleton, rig_type).unwrap();
        let named = capture_rest_poses(&skeleton, &found);
        let all = capture_all_rest_poses(&skeleton);

        let helper = skeleton.find_by_name("twist_helper").unwrap();
        assert!(named.get(&helper).is_none());
        assert!(all.get(&helper).is_some());
        assert_eq!(all.len(), skeleton.len());
    }

    #[test]
    fn given_identical_rest_poses_when_capturing_from_matrix_then_source_is_irrelevant() {
        // Same rest rotation authored two ways: as a quaternion on a
        // procedural-style bone, and reconstructed via matrix round-trip.
        let rotation = UnitQuaternion::from_euler_angles(0.3, -0.2, 0.5);
        let mut skeleton = Skeleton::new();
        let id = skeleton.add_bone(
            "bone",
            None,
            Transform::new(
                Vector3::new(0.0, 1.0, 0.0),
                rotation,
                Vector3::new(1.0, 1.0, 1.0),
            ),
        );

        let mut imported = Skeleton::new();
        let imported_id = imported.add_bone(
            "bone",
            None,
            Transform::from_matrix(&skeleton.bone(id).rest_matrix()),
        );

        let a = decompose_rest_rotation(&skeleton, id);
        let b = decompose_rest_rotation(&imported, imported_id);
        assert!(a.angle_to(&b) < 1e-4);
    }
}
