//! Procedural humanoid skeleton construction.
//!
//! Walks the fixed hierarchy in [`LogicalBoneName::ALL`] order and creates
//! each bone with a rest transform of (unit scale, computed rest rotation,
//! parent-local translation). By construction every non-end bone's rest
//! local +Y axis points at its primary child, which is what lets the flat
//! `rest * offset` FK formula work on this rig with no per-bone special
//! cases.

use std::collections::HashMap;

use log::debug;
use nalgebra::{UnitQuaternion, Vector3};

use crate::error::RigError;
use crate::math::{bone_rest_rotation, world_to_parent_local};
use crate::rig::types::{LogicalBoneName, bone_offset, bone_parent};
use crate::skeleton::{BoneId, Skeleton, Transform};

/// Name of the synthetic identity root preceding `hips`.
pub const ROOT_BONE_NAME: &str = "root";

/// Build the canonical humanoid skeleton.
///
/// Fails fast on a broken static table (missing offset or parent entry);
/// these are data-authoring bugs, never runtime conditions.
pub fn build_procedural_skeleton() -> Result<Skeleton, RigError> {
    let mut skeleton = Skeleton::new();
    let root = skeleton.add_bone(ROOT_BONE_NAME, None, Transform::default());

    // Cumulative rotation of each built bone's chain, consumed by children.
    let mut abs_rotations: HashMap<LogicalBoneName, UnitQuaternion<f32>> = HashMap::new();
    let mut built: HashMap<LogicalBoneName, BoneId> = HashMap::new();

    for logical in LogicalBoneName::ALL {
        let parent = bone_parent(logical).ok_or(RigError::MissingParentBone(logical))?;

        let (parent_id, parent_abs) = match parent {
            None => (root, UnitQuaternion::identity()),
            Some(parent_logical) => {
                let id = built
                    .get(&parent_logical)
                    .copied()
                    .ok_or(RigError::ParentNotBuilt {
                        bone: logical,
                        parent: parent_logical,
                    })?;
                let abs = abs_rotations
                    .get(&parent_logical)
                    .copied()
                    .unwrap_or_else(UnitQuaternion::identity);
                (id, abs)
            }
        };

        let id = make_bone(&mut skeleton, logical, parent_id, &parent_abs, |l, abs| {
            let (rest, cumulative) = bone_rest_rotation(l, abs);
            abs_rotations.insert(l, cumulative);
            rest
        })?;
        built.insert(logical, id);
    }

    debug!(
        "procedural skeleton built: {} bones including root",
        skeleton.len()
    );
    Ok(skeleton)
}

/// Create one bone: look up the character-frame offset, rotate it into the
/// parent's accumulated frame, compute the rest rotation, then attach the
/// engine bone with that rest transform.
fn make_bone(
    skeleton: &mut Skeleton,
    logical: LogicalBoneName,
    parent: BoneId,
    parent_abs: &UnitQuaternion<f32>,
    mut rest_rotation: impl FnMut(LogicalBoneName, &UnitQuaternion<f32>) -> UnitQuaternion<f32>,
) -> Result<BoneId, RigError> {
    let world_offset = bone_offset(logical).ok_or(RigError::MissingBoneOffset(logical))?;
    let local_offset = world_to_parent_local(world_offset, parent_abs);
    let rest = rest_rotation(logical, parent_abs);

    Ok(skeleton.add_bone(
        logical.canonical(),
        Some(parent),
        Transform::new(local_offset, rest, Vector3::new(1.0, 1.0, 1.0)),
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use nalgebra::Vector3;

    use super::*;
    use crate::rig::types::primary_child;

    #[test]
    fn given_fixed_hierarchy_when_building_then_22_bones_hang_off_the_root() {
        let skeleton = build_procedural_skeleton().expect("tables are complete");

        // Synthetic root plus every logical bone.
        assert_eq!(skeleton.len(), 23);

        let names: HashSet<&str> = skeleton.bones().iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names.len(), 23, "bone names must be distinct");

        let root = skeleton.find_by_name(ROOT_BONE_NAME).unwrap();
        assert!(skeleton.bone(root).parent.is_none());

        let hips = skeleton.find_by_name("hips").unwrap();
        assert_eq!(skeleton.bone(hips).parent, Some(root));
    }

    #[test]
    fn given_built_skeleton_when_checking_parents_then_each_matches_the_table() {
        let skeleton = build_procedural_skeleton().unwrap();

        for logical in LogicalBoneName::ALL {
            let id = skeleton.find_by_name(logical.canonical()).unwrap();
            let parent_id = skeleton.bone(id).parent.expect("non-root bone");
            let parent_name = &skeleton.bone(parent_id).name;

            match bone_parent(logical).unwrap() {
                None => assert_eq!(parent_name, ROOT_BONE_NAME),
                Some(expected) => assert_eq!(parent_name, expected.canonical()),
            }
        }
    }

    #[test]
    fn given_built_skeleton_when_rotating_local_up_then_it_points_at_the_primary_child() {
        let skeleton = build_procedural_skeleton().unwrap();

        // Accumulate each bone's parent-chain rotation so the check runs in
        // the same frame the rest rotation was computed in.
        for logical in LogicalBoneName::ALL {
            let Some(child) = primary_child(logical) else {
                continue;
            };

            let id = skeleton.find_by_name(logical.canonical()).unwrap();
            let bone = skeleton.bone(id);

            let mut parent_abs = nalgebra::UnitQuaternion::identity();
            let mut cursor = bone.parent;
            let mut chain = Vec::new();
            while let Some(parent_id) = cursor {
                chain.push(parent_id);
                cursor = skeleton.bone(parent_id).parent;
            }
            for parent_id in chain.into_iter().rev() {
                parent_abs *= skeleton.bone(parent_id).rest.rotation;
            }

            let aimed = bone.rest.rotation.transform_vector(&Vector3::y());
            let target = parent_abs
                .inverse_transform_vector(&crate::rig::types::bone_offset(child).unwrap())
                .normalize();
            let dot = aimed.dot(&target);
            assert!(
                dot > 1.0 - 1e-4,
                "{logical}: +Y should aim at {child}, dot was {dot}"
            );
        }
    }

    #[test]
    fn given_built_skeleton_when_reading_child_translations_then_primary_children_sit_on_local_up() {
        let skeleton = build_procedural_skeleton().unwrap();

        // Equivalent phrasing of the aim invariant in engine terms: a primary
        // child's parent-local translation lies on its parent's +Y axis.
        for logical in LogicalBoneName::ALL {
            let Some(child) = primary_child(logical) else {
                continue;
            };
            let child_id = skeleton.find_by_name(child.canonical()).unwrap();
            let direction = skeleton.bone(child_id).rest.translation.normalize();
            assert!(
                direction.dot(&Vector3::y()) > 1.0 - 1e-4,
                "{child} should sit on {logical}'s +Y axis, got {direction:?}"
            );
        }
    }

    #[test]
    fn given_built_skeleton_when_checking_scales_then_all_are_unit() {
        let skeleton = build_procedural_skeleton().unwrap();
        for bone in skeleton.bones() {
            assert_eq!(bone.rest.scale, Vector3::new(1.0, 1.0, 1.0));
        }
    }
}
