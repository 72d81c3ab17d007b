//! Skeleton adapter: one object per character that owns the derived rig
//! data and exposes the steady-state FK surface.
//!
//! Construction runs the whole precompute pipeline once — convention
//! detection, logical bone resolution, rest-pose capture, symmetry
//! correction, global-mirror detection — and the caches are read-only
//! afterwards. The only per-frame mutation is writing bone local rotations.

pub mod builder;
pub mod fk;
pub mod introspect;
pub mod rest;
pub mod symmetry;
pub mod sync;
pub mod types;

use log::debug;
use nalgebra::{UnitQuaternion, Vector3};

use crate::error::RigError;
use crate::skeleton::{BoneId, Skeleton};

use builder::build_procedural_skeleton;
use fk::{adjust_joint_offset, apply_fk_rotation};
use introspect::{detect_rig_type, find_all_bones};
use rest::{RestPoseCache, capture_all_rest_poses, capture_rest_poses};
use symmetry::{CorrectionMap, compute_corrections};
use types::{
    FoundBones, LogicalBoneName, RigIssue, RigReport, RigType, Severity, joint_to_logical,
};

/// Adapter binding one skeleton (procedural or imported) to the logical
/// joint vocabulary motion data is authored against.
pub struct CharacterRig {
    skeleton: Skeleton,
    rig_type: RigType,
    found: FoundBones,
    rest_cache: RestPoseCache,
    fallback_rest: RestPoseCache,
    corrections: CorrectionMap,
    mirrored: bool,
    issues: Vec<RigIssue>,
}

impl CharacterRig {
    /// Adapt an arbitrary loaded skeleton.
    ///
    /// Fails with [`RigError::NoHumanoidRig`] when not a single logical bone
    /// resolves; partially resolved rigs construct fine, with the gaps
    /// recorded as warnings in the report.
    pub fn from_skeleton(skeleton: Skeleton) -> Result<Self, RigError> {
        let rig_type = detect_rig_type(&skeleton);
        let found = find_all_bones(&skeleton, rig_type).ok_or(RigError::NoHumanoidRig)?;

        let rest_cache = capture_rest_poses(&skeleton, &found);
        let fallback_rest = capture_all_rest_poses(&skeleton);
        let corrections = compute_corrections(&found, &rest_cache);
        let mirrored = skeleton.root_scale_sign() < 0.0;

        let mut issues = Vec::new();
        for logical in LogicalBoneName::ALL {
            if found.get(logical).is_none() {
                issues.push(RigIssue {
                    severity: Severity::Warning,
                    code: "UNRESOLVED_BONE".to_string(),
                    message: format!("logical bone '{logical}' did not resolve on this skeleton"),
                });
            }
        }
        if mirrored {
            issues.push(RigIssue {
                severity: Severity::Info,
                code: "MIRRORED_ROOT".to_string(),
                message: "root scale carries a handedness flip; offset signs will be compensated"
                    .to_string(),
            });
        }
        for (left, right) in types::SYMMETRY_PAIRS {
            if let Some(right_id) = found.get(right) {
                if corrections.contains_key(&right_id) {
                    issues.push(RigIssue {
                        severity: Severity::Info,
                        code: "SYMMETRY_CORRECTED".to_string(),
                        message: format!("'{right}' rest pose corrected against mirrored '{left}'"),
                    });
                }
            }
        }

        debug!(
            "rig adapted: type={rig_type}, resolved={}/{}, corrections={}, mirrored={mirrored}",
            found.len(),
            LogicalBoneName::ALL.len(),
            corrections.len()
        );

        Ok(Self {
            skeleton,
            rig_type,
            found,
            rest_cache,
            fallback_rest,
            corrections,
            mirrored,
            issues,
        })
    }

    /// Build the canonical procedural skeleton and adapt it.
    pub fn procedural() -> Result<Self, RigError> {
        Self::from_skeleton(build_procedural_skeleton()?)
    }

    pub fn rig_type(&self) -> RigType {
        self.rig_type
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    /// Resolve a logical bone on this skeleton.
    pub fn find_bone(&self, logical: LogicalBoneName) -> Option<BoneId> {
        self.found.get(logical)
    }

    /// Resolve a game-facing joint name to the underlying bone, for
    /// consumers (an IK solver, gaze control) that need the bone itself.
    pub fn find_bone_by_joint_name(&self, joint: &str) -> Option<BoneId> {
        joint_to_logical(joint).and_then(|logical| self.found.get(logical))
    }

    /// Neutral orientation for a bone, from the logical-bone cache with the
    /// whole-skeleton capture as fallback.
    pub fn rest_quaternion(&self, bone: BoneId) -> Option<UnitQuaternion<f32>> {
        self.rest_cache
            .get(&bone)
            .or_else(|| self.fallback_rest.get(&bone))
            .copied()
    }

    /// Apply an authored Euler offset (radians) to a bone.
    pub fn apply_fk_rotation(&mut self, bone: BoneId, offset_euler: &Vector3<f32>) {
        let Some(rest) = self.rest_quaternion(bone) else {
            return;
        };
        let correction = self.corrections.get(&bone).copied();
        apply_fk_rotation(
            &mut self.skeleton,
            bone,
            &rest,
            correction.as_ref(),
            offset_euler,
        );
    }

    /// The steady-state entry point: one call per animated joint per frame.
    ///
    /// Unresolved joint names and unresolved bones degrade to a no-op with a
    /// debug-level breadcrumb; motion playback across heterogeneous rigs
    /// must never throw over a joint a particular skeleton lacks.
    pub fn apply_fk_rotation_by_joint(&mut self, joint: &str, offset_euler: &Vector3<f32>) {
        let Some(logical) = joint_to_logical(joint) else {
            debug!("unknown joint name '{joint}', skipping");
            return;
        };
        let Some(bone) = self.found.get(logical) else {
            debug!("joint '{joint}' maps to unresolved bone '{logical}', skipping");
            return;
        };

        let adjusted = adjust_joint_offset(joint, offset_euler, self.mirrored);
        self.apply_fk_rotation(bone, &adjusted);
    }

    /// Construction summary: what was detected, resolved and corrected.
    pub fn report(&self) -> RigReport {
        let mapped_bones = self
            .found
            .iter()
            .map(|(logical, id)| {
                (
                    logical.canonical().to_string(),
                    self.skeleton.bone(id).name.clone(),
                )
            })
            .collect();
        let missing_bones = LogicalBoneName::ALL
            .iter()
            .filter(|logical| self.found.get(**logical).is_none())
            .map(|logical| logical.canonical().to_string())
            .collect();

        RigReport {
            rig_type: self.rig_type,
            bone_count: self.skeleton.len(),
            mapped_bones,
            missing_bones,
            correction_count: self.corrections.len(),
            mirrored: self.mirrored,
            issues: self.issues.clone(),
        }
    }
}
