//! Rig-convention detection and logical-to-concrete bone resolution.
//!
//! Two independently authored skeleton sources feed the FK layer: the
//! procedural rig (canonical names) and imported rigged models, which arrive
//! with either Mixamo or Rigify bone naming. Resolution is deterministic for
//! a fixed skeleton: first match in bones-array order, every tier.

use log::debug;

use crate::rig::types::{FoundBones, LogicalBoneName, RigType};
use crate::skeleton::{BoneId, Skeleton};

/// Substring marking the Mixamo namespace convention.
const MIXAMO_MARKER: &str = "mixamorig";

/// Prefix marking Rigify deformation bones.
const RIGIFY_DEF_PREFIX: &str = "DEF-";

/// Classify a skeleton's naming convention by scanning bone names.
///
/// A cheap heuristic, not a guarantee: a skeleton mixing both conventions
/// classifies as Mixamo because that scan runs first.
pub fn detect_rig_type(skeleton: &Skeleton) -> RigType {
    if skeleton
        .bones()
        .iter()
        .any(|bone| bone.name.contains(MIXAMO_MARKER))
    {
        return RigType::Mixamo;
    }
    if skeleton
        .bones()
        .iter()
        .any(|bone| bone.name.starts_with(RIGIFY_DEF_PREFIX))
    {
        return RigType::Rigify;
    }
    RigType::Unknown
}

/// Resolve a logical bone on a concrete skeleton under the given convention.
///
/// Mixamo/Unknown tiers, first hit wins:
/// 1. exact match on the namespaced canonical name,
/// 2. exact match with the namespace prefix stripped,
/// 3. case-insensitive substring match of the stripped name.
///
/// The substring tier is a best-effort fallback for nonstandard rigs;
/// callers must not assume it found the anatomically right bone.
pub fn find_skeleton_bone(
    skeleton: &Skeleton,
    logical: LogicalBoneName,
    rig_type: RigType,
) -> Option<BoneId> {
    match rig_type {
        RigType::Rigify => find_rigify_bone(skeleton, logical),
        RigType::Mixamo | RigType::Unknown => find_mixamo_or_generic_bone(skeleton, logical),
    }
}

fn find_rigify_bone(skeleton: &Skeleton, logical: LogicalBoneName) -> Option<BoneId> {
    let pattern = logical.rigify_pattern()?;
    // Only deformation bones participate; a non-DEF pattern would resolve a
    // control bone and double-drive the rig.
    if !pattern.starts_with(RIGIFY_DEF_PREFIX) {
        return None;
    }

    skeleton.ids().find(|id| {
        let name = skeleton.bone(*id).name.as_str();
        // Accept "DEF-forearm.L" and exporter variants like
        // "DEF-forearm.L_1", but never "DEF-forearm.L.001": the dot suffix is
        // how the authoring tool names the *next segment* of a split limb,
        // which is a different bone.
        name == pattern
            || (name.starts_with(pattern) && name.as_bytes().get(pattern.len()) == Some(&b'_'))
    })
}

fn find_mixamo_or_generic_bone(skeleton: &Skeleton, logical: LogicalBoneName) -> Option<BoneId> {
    let namespaced = logical.mixamo_name();
    let stripped = namespaced
        .rsplit_once(':')
        .map(|(_, tail)| tail)
        .unwrap_or(namespaced);

    if let Some(id) = skeleton.find_by_name(namespaced) {
        return Some(id);
    }
    if let Some(id) = skeleton.find_by_name(stripped) {
        return Some(id);
    }

    let needle = stripped.to_ascii_lowercase();
    skeleton
        .ids()
        .find(|id| skeleton.bone(*id).name.to_ascii_lowercase().contains(&needle))
}

/// Rigify keeps `spine2`/`head` analogues in its control layer; when the
/// deformation bone is absent, fall back to the control-bone name.
fn find_rigify_control_fallback(skeleton: &Skeleton, logical: LogicalBoneName) -> Option<BoneId> {
    let control_name = match logical {
        LogicalBoneName::Spine2 => "chest",
        LogicalBoneName::Head => "head",
        _ => return None,
    };
    skeleton.ids().find(|id| {
        let name = skeleton.bone(*id).name.as_str();
        !name.starts_with(RIGIFY_DEF_PREFIX) && name.eq_ignore_ascii_case(control_name)
    })
}

/// Resolve every logical bone needed for symmetry correction and common
/// queries. Returns `None` when nothing at all resolved, signalling a
/// skeleton with no usable humanoid rig.
pub fn find_all_bones(skeleton: &Skeleton, rig_type: RigType) -> Option<FoundBones> {
    let mut found = FoundBones::new();

    for logical in LogicalBoneName::ALL {
        // Rigify's deformation layer does not expose these directly.
        if rig_type == RigType::Rigify
            && matches!(logical, LogicalBoneName::Hips | LogicalBoneName::Spine)
        {
            continue;
        }

        let resolved = find_skeleton_bone(skeleton, logical, rig_type).or_else(|| {
            if rig_type == RigType::Rigify {
                find_rigify_control_fallback(skeleton, logical)
            } else {
                None
            }
        });

        match resolved {
            Some(id) => found.insert(logical, id),
            None => debug!("bone '{logical}' did not resolve on {rig_type} rig"),
        }
    }

    if found.is_empty() {
        return None;
    }
    Some(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::builder::build_procedural_skeleton;
    use crate::skeleton::Transform;

    fn skeleton_with_names(names: &[&str]) -> Skeleton {
        let mut skeleton = Skeleton::new();
        let mut parent = None;
        for name in names {
            parent = Some(skeleton.add_bone(*name, parent, Transform::default()));
        }
        skeleton
    }

    #[test]
    fn given_mixamo_names_when_detecting_then_mixamo_wins() {
        let skeleton = skeleton_with_names(&["Armature", "mixamorig:Hips", "mixamorig:Spine"]);
        assert_eq!(detect_rig_type(&skeleton), RigType::Mixamo);
    }

    #[test]
    fn given_def_prefixed_names_when_detecting_then_rigify_wins() {
        let skeleton = skeleton_with_names(&["torso", "DEF-spine.002", "DEF-thigh.L"]);
        assert_eq!(detect_rig_type(&skeleton), RigType::Rigify);
    }

    #[test]
    fn given_mixed_convention_names_when_detecting_then_first_scan_wins() {
        let skeleton = skeleton_with_names(&["DEF-thigh.L", "mixamorig:Hips"]);
        assert_eq!(detect_rig_type(&skeleton), RigType::Mixamo);
    }

    #[test]
    fn given_plain_names_when_detecting_then_unknown_is_returned() {
        let skeleton = skeleton_with_names(&["hips", "spine", "head"]);
        assert_eq!(detect_rig_type(&skeleton), RigType::Unknown);
    }

    #[test]
    fn given_detection_and_resolution_when_repeated_then_results_are_identical() {
        let skeleton = skeleton_with_names(&["mixamorig:Hips", "mixamorig:LeftForeArm"]);
        let first_type = detect_rig_type(&skeleton);
        let first_bone = find_skeleton_bone(&skeleton, LogicalBoneName::LeftForeArm, first_type);
        for _ in 0..3 {
            assert_eq!(detect_rig_type(&skeleton), first_type);
            assert_eq!(
                find_skeleton_bone(&skeleton, LogicalBoneName::LeftForeArm, first_type),
                first_bone
            );
        }
    }

    #[test]
    fn given_namespaced_bone_when_resolving_then_exact_match_is_preferred() {
        let skeleton =
            skeleton_with_names(&["LeftForeArm", "mixamorig:LeftForeArm", "x_leftforearm_x"]);
        let id = find_skeleton_bone(&skeleton, LogicalBoneName::LeftForeArm, RigType::Mixamo);
        assert_eq!(id, skeleton.find_by_name("mixamorig:LeftForeArm"));
    }

    #[test]
    fn given_only_stripped_name_when_resolving_then_generic_tier_matches() {
        let skeleton = skeleton_with_names(&["Hips", "LeftForeArm"]);
        let id = find_skeleton_bone(&skeleton, LogicalBoneName::LeftForeArm, RigType::Unknown);
        assert_eq!(id, skeleton.find_by_name("LeftForeArm"));
    }

    #[test]
    fn given_nonstandard_casing_when_resolving_then_substring_tier_matches() {
        let skeleton = skeleton_with_names(&["body_LEFTFOREARM_jnt"]);
        let id = find_skeleton_bone(&skeleton, LogicalBoneName::LeftForeArm, RigType::Unknown);
        assert!(id.is_some());
    }

    #[test]
    fn given_rigify_variants_when_resolving_then_underscore_suffix_matches_but_dot_does_not() {
        let skeleton = skeleton_with_names(&["DEF-forearm.L.001", "DEF-forearm.L_1"]);
        let id = find_skeleton_bone(&skeleton, LogicalBoneName::LeftForeArm, RigType::Rigify);
        assert_eq!(id, skeleton.find_by_name("DEF-forearm.L_1"));

        let only_segment = skeleton_with_names(&["DEF-forearm.L.001"]);
        assert_eq!(
            find_skeleton_bone(&only_segment, LogicalBoneName::LeftForeArm, RigType::Rigify),
            None
        );
    }

    #[test]
    fn given_rigify_rig_when_finding_all_then_hips_and_spine_stay_unresolved() {
        let skeleton = skeleton_with_names(&[
            "chest",
            "head",
            "DEF-spine.002",
            "DEF-spine.003",
            "DEF-upper_arm.L",
            "DEF-upper_arm.R",
        ]);
        let found = find_all_bones(&skeleton, RigType::Rigify).expect("some bones resolve");

        assert_eq!(found.get(LogicalBoneName::Hips), None);
        assert_eq!(found.get(LogicalBoneName::Spine), None);
        assert!(found.get(LogicalBoneName::LeftArm).is_some());
        // Deform spine.003 exists, so the control fallback is not needed for
        // spine2; head resolves through the "head" control bone.
        assert_eq!(
            found.get(LogicalBoneName::Spine2),
            skeleton.find_by_name("DEF-spine.003")
        );
        assert_eq!(
            found.get(LogicalBoneName::Head),
            skeleton.find_by_name("head")
        );
    }

    #[test]
    fn given_unrelated_skeleton_when_finding_all_then_none_signals_no_humanoid_rig() {
        let skeleton = skeleton_with_names(&["prop_01", "prop_02"]);
        assert!(find_all_bones(&skeleton, RigType::Unknown).is_none());
    }

    #[test]
    fn given_procedural_skeleton_when_finding_all_then_every_logical_bone_resolves() {
        let skeleton = build_procedural_skeleton().unwrap();
        assert_eq!(detect_rig_type(&skeleton), RigType::Unknown);

        let found = find_all_bones(&skeleton, RigType::Unknown).unwrap();
        assert_eq!(found.len(), LogicalBoneName::ALL.len());
        for logical in LogicalBoneName::ALL {
            assert_eq!(
                found.get(logical),
                skeleton.find_by_name(logical.canonical()),
                "{logical} should resolve to its canonical bone"
            );
        }
    }
}
