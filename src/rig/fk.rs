//! Forward-kinematics application: rest ∘ correction ∘ offset ∘ correction⁻¹.
//!
//! Angles are XYZ Euler radians (X applied first); `a * b` applies `b` first.
//! The composition writes the bone's local rotation directly and is the only
//! steady-state mutation in the crate. Everything here runs per joint per
//! frame; nothing allocates beyond quaternion temporaries.

use nalgebra::{UnitQuaternion, Vector3};

use crate::skeleton::{BoneId, Skeleton};

/// Convert an authored joint offset to a rotation. XYZ order: the X (bend)
/// component applies first, then Y (twist), then Z (sway).
#[inline]
pub fn offset_to_quaternion(offset_euler: &Vector3<f32>) -> UnitQuaternion<f32> {
    UnitQuaternion::from_euler_angles(offset_euler.x, offset_euler.y, offset_euler.z)
}

/// Write a bone's final local rotation from its rest rotation, optional
/// symmetry correction and the authored offset.
///
/// With a correction `c` the offset is conjugated (`c * offset * c⁻¹`)
/// before composing onto the rest rotation, which transports the offset's
/// axes from the ideal mirrored frame into the bone's actual frame. A zero
/// offset always leaves the bone exactly at rest: conjugating the identity
/// is the identity.
pub fn apply_fk_rotation(
    skeleton: &mut Skeleton,
    bone: BoneId,
    rest: &UnitQuaternion<f32>,
    correction: Option<&UnitQuaternion<f32>>,
    offset_euler: &Vector3<f32>,
) {
    let offset = offset_to_quaternion(offset_euler);
    let final_rotation = match correction {
        Some(c) => rest * c * offset * c.inverse(),
        None => rest * offset,
    };
    skeleton.bone_mut(bone).local_rotation = final_rotation;
}

/// Joints whose authored X axis runs against the bone's local axis.
/// Motion data says "positive X raises the arm"; the arm bones' local frames
/// have it reversed.
pub(crate) fn is_shoulder_joint(joint: &str) -> bool {
    matches!(joint, "leftShoulder" | "rightShoulder")
}

/// Shoulder and elbow joints keep their Z sign under the global-mirror
/// compensation; every other joint flips it.
pub(crate) fn is_arm_joint(joint: &str) -> bool {
    matches!(
        joint,
        "leftShoulder" | "rightShoulder" | "leftElbow" | "rightElbow"
    )
}

/// Reconcile an authored joint offset with the target bone's axis
/// conventions before the FK composition sees it.
///
/// Two independent fixups:
/// - shoulder joints always flip X (authoring convention vs. bone axis);
/// - on globally mirrored skeletons (handedness flip baked into the import's
///   root scale) the Y sign follows the joint's side and Z flips for
///   non-arm joints. This sign table was derived empirically against one
///   import pipeline; re-derive it before trusting a new asset source.
pub(crate) fn adjust_joint_offset(
    joint: &str,
    offset_euler: &Vector3<f32>,
    mirrored: bool,
) -> Vector3<f32> {
    let mut adjusted = *offset_euler;

    if is_shoulder_joint(joint) {
        adjusted.x = -adjusted.x;
    }

    if mirrored {
        let side = if joint.starts_with("right") { 1.0 } else { -1.0 };
        adjusted.y *= side;
        if !is_arm_joint(joint) {
            adjusted.z = -adjusted.z;
        }
    }

    adjusted
}
