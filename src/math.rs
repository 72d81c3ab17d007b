//! Rest-pose orientation math for the procedural skeleton builder.
//!
//! Quaternion composition convention, used crate-wide: `a * b` applies `b`
//! first, then `a` (nalgebra column-vector convention). A bone chain's
//! cumulative rotation is therefore `parent_abs * local`, and an animation
//! offset applied in a bone's rest frame is `rest * offset`.

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::rig::types::{LogicalBoneName, bone_offset, primary_child};

/// Below this squared length a child offset is treated as degenerate.
const DEGENERATE_EPS: f32 = 1e-6;

/// Dot-product margin for the parallel / anti-parallel special cases.
const ALIGNED_EPS: f32 = 1e-6;

/// Minimal rotation mapping local +Y onto the given direction.
///
/// Special cases return well-defined results instead of NaN:
/// a near-zero vector or a direction already aligned with +Y yields the
/// identity; a direction exactly opposite +Y yields a 180° turn about +Z
/// (any axis perpendicular to +Y works; +Z is the fixed choice so results
/// stay reproducible).
pub fn rest_quaternion_for_direction(child_local_offset: Vector3<f32>) -> UnitQuaternion<f32> {
    if child_local_offset.norm_squared() < DEGENERATE_EPS {
        return UnitQuaternion::identity();
    }

    let direction = child_local_offset.normalize();
    let up = Vector3::y();
    let dot = up.dot(&direction).clamp(-1.0, 1.0);

    if dot >= 1.0 - ALIGNED_EPS {
        return UnitQuaternion::identity();
    }
    if dot <= -1.0 + ALIGNED_EPS {
        return UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f32::consts::PI);
    }

    let axis = Unit::new_normalize(up.cross(&direction));
    UnitQuaternion::from_axis_angle(&axis, dot.acos())
}

/// Rotate a character-frame offset into the frame accumulated by the parent
/// chain.
pub fn world_to_parent_local(
    world_offset: Vector3<f32>,
    parent_abs: &UnitQuaternion<f32>,
) -> Vector3<f32> {
    parent_abs.inverse_transform_vector(&world_offset)
}

/// Rest rotation for one bone plus the cumulative rotation its children see.
///
/// End effectors (no primary child, or a child without an offset entry) get
/// the identity rest rotation and pass the parent's cumulative rotation
/// through unchanged. This is a pure per-node step; callers must walk the
/// hierarchy root-to-leaf so `parent_abs` is already final.
pub fn bone_rest_rotation(
    bone: LogicalBoneName,
    parent_abs: &UnitQuaternion<f32>,
) -> (UnitQuaternion<f32>, UnitQuaternion<f32>) {
    let Some(child) = primary_child(bone) else {
        return (UnitQuaternion::identity(), *parent_abs);
    };
    let Some(child_offset) = bone_offset(child) else {
        return (UnitQuaternion::identity(), *parent_abs);
    };

    let local_direction = world_to_parent_local(child_offset, parent_abs);
    let rest = rest_quaternion_for_direction(local_direction);
    (rest, parent_abs * rest)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn given_zero_vector_when_computing_rest_then_identity_is_returned() {
        let q = rest_quaternion_for_direction(Vector3::zeros());
        assert!(q.angle() < 1e-6);
    }

    #[test]
    fn given_up_vector_when_computing_rest_then_identity_is_returned() {
        let q = rest_quaternion_for_direction(Vector3::new(0.0, 3.2, 0.0));
        assert!(q.angle() < 1e-6);
    }

    #[test]
    fn given_down_vector_when_computing_rest_then_up_maps_exactly_to_down() {
        let q = rest_quaternion_for_direction(Vector3::new(0.0, -1.0, 0.0));
        let rotated = q.transform_vector(&Vector3::y());
        assert_relative_eq!(rotated, Vector3::new(0.0, -1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn given_arbitrary_direction_when_computing_rest_then_up_points_along_it() {
        for direction in [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.3, -0.2, 0.9),
            Vector3::new(-0.5, 0.5, 0.01),
            Vector3::new(0.0, 0.0, -2.0),
        ] {
            let q = rest_quaternion_for_direction(direction);
            let rotated = q.transform_vector(&Vector3::y());
            let aligned = rotated.dot(&direction.normalize());
            assert!(
                aligned > 1.0 - 1e-5,
                "expected +Y to align with {direction:?}, got dot {aligned}"
            );
            assert_relative_eq!(q.as_ref().norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn given_rotated_parent_when_converting_to_local_then_offset_is_unrotated() {
        let parent = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let local = world_to_parent_local(Vector3::new(0.0, 1.0, 0.0), &parent);
        assert_relative_eq!(local, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn given_end_effector_when_computing_bone_rest_then_parent_rotation_is_inherited() {
        let parent = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let (rest, abs) = bone_rest_rotation(LogicalBoneName::Head, &parent);
        assert!(rest.angle() < 1e-6);
        assert!(abs.angle_to(&parent) < 1e-6);
    }

    #[test]
    fn given_mid_chain_bone_when_computing_bone_rest_then_abs_composes_parent_then_rest() {
        let parent = UnitQuaternion::from_euler_angles(0.0, 0.4, 0.0);
        let (rest, abs) = bone_rest_rotation(LogicalBoneName::LeftArm, &parent);
        assert!(abs.angle_to(&(parent * rest)) < 1e-6);
    }
}
