//! Left/right symmetry correction for asymmetric imported rigs.
//!
//! Motion data authors one set of joint offsets and expects it to drive both
//! sides of the body. That only works when the right bone's rest frame is the
//! sagittal mirror of the left one; imported rigs routinely violate this
//! (usually a roll/twist deviation about the bone axis). The corrector
//! detects the deviation once per skeleton and stores a quaternion that the
//! FK layer conjugates offsets with, transporting each authored offset from
//! the ideal mirrored frame into the bone's actual frame.

use std::collections::HashMap;

use log::debug;
use nalgebra::{Quaternion, UnitQuaternion};

use crate::rig::rest::RestPoseCache;
use crate::rig::types::{FoundBones, SYMMETRY_PAIRS};
use crate::skeleton::BoneId;

/// Rest poses farther than this (radians) from the ideal mirror get a
/// correction entry; anything closer counts as authored-symmetric.
const SYMMETRY_TOLERANCE: f32 = 1e-3;

/// Per-bone correction rotations; absent entry means identity.
pub type CorrectionMap = HashMap<BoneId, UnitQuaternion<f32>>;

/// Reflect a rotation across the sagittal (x = 0) plane.
///
/// For a rotation with axis (x, y, z) and angle θ the mirror image rotates
/// about (x, −y, −z) by θ; on the quaternion that is (w, x, −y, −z). Unit
/// norm is preserved, so the unchecked constructor is sound.
pub fn mirror_quaternion(q: &UnitQuaternion<f32>) -> UnitQuaternion<f32> {
    UnitQuaternion::new_unchecked(Quaternion::new(q.w, q.i, -q.j, -q.k))
}

/// Compare each left/right rest-pose pair and record a correction for the
/// right side where it deviates from the mirror of the left.
///
/// The left bone is the authoring reference: motion data was tuned against
/// it, so the correction always lands on the right bone. Pairs where either
/// side is unresolved are skipped (partial rig support, not an error).
pub fn compute_corrections(found: &FoundBones, rest_cache: &RestPoseCache) -> CorrectionMap {
    let mut corrections = CorrectionMap::new();

    for (left, right) in SYMMETRY_PAIRS {
        let (Some(left_id), Some(right_id)) = (found.get(left), found.get(right)) else {
            continue;
        };
        let (Some(left_rest), Some(right_rest)) =
            (rest_cache.get(&left_id), rest_cache.get(&right_id))
        else {
            continue;
        };

        let ideal = mirror_quaternion(left_rest);
        let deviation = right_rest.angle_to(&ideal);
        if deviation <= SYMMETRY_TOLERANCE {
            continue;
        }

        debug!("rest pose of '{right}' deviates {deviation:.4} rad from mirrored '{left}'");
        corrections.insert(right_id, right_rest.inverse() * ideal);
    }

    corrections
}
