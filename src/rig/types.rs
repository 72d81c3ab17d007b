//! Logical bone vocabulary and the static tables driving the rig core.
//!
//! Motion data is authored against [`LogicalBoneName`], never against a
//! concrete skeleton's bone names; the tables below pin down the canonical
//! humanoid proportions, the fixed hierarchy, the rest-orientation aim
//! targets and the per-convention name mappings.

use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::skeleton::BoneId;

// ─── Logical bone vocabulary ──────────────────────────────────────────────────

/// Rig-agnostic bone identifier. The distilled humanoid: one hip root, a
/// four-segment spine/neck chain plus head, and four-bone arm and leg chains
/// per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalBoneName {
    Hips,
    Spine,
    Spine1,
    Spine2,
    Neck,
    Head,
    LeftShoulder,
    LeftArm,
    LeftForeArm,
    LeftHand,
    RightShoulder,
    RightArm,
    RightForeArm,
    RightHand,
    LeftUpLeg,
    LeftLeg,
    LeftFoot,
    LeftToeBase,
    RightUpLeg,
    RightLeg,
    RightFoot,
    RightToeBase,
}

use LogicalBoneName::*;

impl LogicalBoneName {
    /// Every logical bone, in deterministic root-to-leaf build order: spine
    /// chain first, then left arm, right arm, left leg, right leg. Parents
    /// always precede their children.
    pub const ALL: [Self; 22] = [
        Hips,
        Spine,
        Spine1,
        Spine2,
        Neck,
        Head,
        LeftShoulder,
        LeftArm,
        LeftForeArm,
        LeftHand,
        RightShoulder,
        RightArm,
        RightForeArm,
        RightHand,
        LeftUpLeg,
        LeftLeg,
        LeftFoot,
        LeftToeBase,
        RightUpLeg,
        RightLeg,
        RightFoot,
        RightToeBase,
    ];

    /// Canonical camelCase spelling used by motion data and the procedural
    /// skeleton's bone names.
    pub fn canonical(&self) -> &'static str {
        match self {
            Hips => "hips",
            Spine => "spine",
            Spine1 => "spine1",
            Spine2 => "spine2",
            Neck => "neck",
            Head => "head",
            LeftShoulder => "leftShoulder",
            LeftArm => "leftArm",
            LeftForeArm => "leftForeArm",
            LeftHand => "leftHand",
            RightShoulder => "rightShoulder",
            RightArm => "rightArm",
            RightForeArm => "rightForeArm",
            RightHand => "rightHand",
            LeftUpLeg => "leftUpLeg",
            LeftLeg => "leftLeg",
            LeftFoot => "leftFoot",
            LeftToeBase => "leftToeBase",
            RightUpLeg => "rightUpLeg",
            RightLeg => "rightLeg",
            RightFoot => "rightFoot",
            RightToeBase => "rightToeBase",
        }
    }

    /// Full Mixamo-convention bone name, namespace prefix included.
    pub fn mixamo_name(&self) -> &'static str {
        match self {
            Hips => "mixamorig:Hips",
            Spine => "mixamorig:Spine",
            Spine1 => "mixamorig:Spine1",
            Spine2 => "mixamorig:Spine2",
            Neck => "mixamorig:Neck",
            Head => "mixamorig:Head",
            LeftShoulder => "mixamorig:LeftShoulder",
            LeftArm => "mixamorig:LeftArm",
            LeftForeArm => "mixamorig:LeftForeArm",
            LeftHand => "mixamorig:LeftHand",
            RightShoulder => "mixamorig:RightShoulder",
            RightArm => "mixamorig:RightArm",
            RightForeArm => "mixamorig:RightForeArm",
            RightHand => "mixamorig:RightHand",
            LeftUpLeg => "mixamorig:LeftUpLeg",
            LeftLeg => "mixamorig:LeftLeg",
            LeftFoot => "mixamorig:LeftFoot",
            LeftToeBase => "mixamorig:LeftToeBase",
            RightUpLeg => "mixamorig:RightUpLeg",
            RightLeg => "mixamorig:RightLeg",
            RightFoot => "mixamorig:RightFoot",
            RightToeBase => "mixamorig:RightToeBase",
        }
    }

    /// Deformation-bone name under the Rigify convention, or `None` where the
    /// Rigify deform layer has no directly matching bone (`hips`/`spine` live
    /// only in the control layer there).
    pub fn rigify_pattern(&self) -> Option<&'static str> {
        match self {
            Hips | Spine => None,
            Spine1 => Some("DEF-spine.002"),
            Spine2 => Some("DEF-spine.003"),
            Neck => Some("DEF-spine.004"),
            Head => Some("DEF-spine.006"),
            LeftShoulder => Some("DEF-shoulder.L"),
            LeftArm => Some("DEF-upper_arm.L"),
            LeftForeArm => Some("DEF-forearm.L"),
            LeftHand => Some("DEF-hand.L"),
            RightShoulder => Some("DEF-shoulder.R"),
            RightArm => Some("DEF-upper_arm.R"),
            RightForeArm => Some("DEF-forearm.R"),
            RightHand => Some("DEF-hand.R"),
            LeftUpLeg => Some("DEF-thigh.L"),
            LeftLeg => Some("DEF-shin.L"),
            LeftFoot => Some("DEF-foot.L"),
            LeftToeBase => Some("DEF-toe.L"),
            RightUpLeg => Some("DEF-thigh.R"),
            RightLeg => Some("DEF-shin.R"),
            RightFoot => Some("DEF-foot.R"),
            RightToeBase => Some("DEF-toe.R"),
        }
    }

    pub fn is_left(&self) -> bool {
        self.canonical().starts_with("left")
    }

    pub fn is_right(&self) -> bool {
        self.canonical().starts_with("right")
    }

    /// Opposite-side counterpart for limb bones, `None` for the axial chain.
    pub fn mirrored(&self) -> Option<Self> {
        match self {
            LeftShoulder => Some(RightShoulder),
            LeftArm => Some(RightArm),
            LeftForeArm => Some(RightForeArm),
            LeftHand => Some(RightHand),
            RightShoulder => Some(LeftShoulder),
            RightArm => Some(LeftArm),
            RightForeArm => Some(LeftForeArm),
            RightHand => Some(LeftHand),
            LeftUpLeg => Some(RightUpLeg),
            LeftLeg => Some(RightLeg),
            LeftFoot => Some(RightFoot),
            LeftToeBase => Some(RightToeBase),
            RightUpLeg => Some(LeftUpLeg),
            RightLeg => Some(LeftLeg),
            RightFoot => Some(LeftFoot),
            RightToeBase => Some(LeftToeBase),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalBoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

// ─── Static tables ────────────────────────────────────────────────────────────

/// Canonical humanoid proportions: offset from the parent joint to this
/// joint, expressed in the character frame (X right-to-character-left,
/// Y up, Z forward), meters.
pub const BONE_OFFSETS: [(LogicalBoneName, [f32; 3]); 22] = [
    (Hips, [0.0, 0.95, 0.0]),
    (Spine, [0.0, 0.10, 0.0]),
    (Spine1, [0.0, 0.12, 0.0]),
    (Spine2, [0.0, 0.13, 0.0]),
    (Neck, [0.0, 0.15, 0.0]),
    (Head, [0.0, 0.11, 0.0]),
    (LeftShoulder, [0.055, 0.11, 0.0]),
    (LeftArm, [0.125, 0.0, 0.0]),
    (LeftForeArm, [0.27, 0.0, 0.0]),
    (LeftHand, [0.25, 0.0, 0.0]),
    (RightShoulder, [-0.055, 0.11, 0.0]),
    (RightArm, [-0.125, 0.0, 0.0]),
    (RightForeArm, [-0.27, 0.0, 0.0]),
    (RightHand, [-0.25, 0.0, 0.0]),
    (LeftUpLeg, [0.09, -0.06, 0.0]),
    (LeftLeg, [0.0, -0.43, 0.0]),
    (LeftFoot, [0.0, -0.42, 0.0]),
    (LeftToeBase, [0.0, -0.08, 0.13]),
    (RightUpLeg, [-0.09, -0.06, 0.0]),
    (RightLeg, [0.0, -0.43, 0.0]),
    (RightFoot, [0.0, -0.42, 0.0]),
    (RightToeBase, [0.0, -0.08, 0.13]),
];

/// Fixed hierarchy. `None` marks `hips`, the single child of the synthetic
/// root bone.
pub const BONE_PARENTS: [(LogicalBoneName, Option<LogicalBoneName>); 22] = [
    (Hips, None),
    (Spine, Some(Hips)),
    (Spine1, Some(Spine)),
    (Spine2, Some(Spine1)),
    (Neck, Some(Spine2)),
    (Head, Some(Neck)),
    (LeftShoulder, Some(Spine2)),
    (LeftArm, Some(LeftShoulder)),
    (LeftForeArm, Some(LeftArm)),
    (LeftHand, Some(LeftForeArm)),
    (RightShoulder, Some(Spine2)),
    (RightArm, Some(RightShoulder)),
    (RightForeArm, Some(RightArm)),
    (RightHand, Some(RightForeArm)),
    (LeftUpLeg, Some(Hips)),
    (LeftLeg, Some(LeftUpLeg)),
    (LeftFoot, Some(LeftLeg)),
    (LeftToeBase, Some(LeftFoot)),
    (RightUpLeg, Some(Hips)),
    (RightLeg, Some(RightUpLeg)),
    (RightFoot, Some(RightLeg)),
    (RightToeBase, Some(RightFoot)),
];

/// Which child's direction a bone's rest local +Y axis should face.
/// `None` means end effector: the bone inherits its parent's orientation.
pub const PRIMARY_CHILD: [(LogicalBoneName, Option<LogicalBoneName>); 22] = [
    (Hips, Some(Spine)),
    (Spine, Some(Spine1)),
    (Spine1, Some(Spine2)),
    (Spine2, Some(Neck)),
    (Neck, Some(Head)),
    (Head, None),
    (LeftShoulder, Some(LeftArm)),
    (LeftArm, Some(LeftForeArm)),
    (LeftForeArm, Some(LeftHand)),
    (LeftHand, None),
    (RightShoulder, Some(RightArm)),
    (RightArm, Some(RightForeArm)),
    (RightForeArm, Some(RightHand)),
    (RightHand, None),
    (LeftUpLeg, Some(LeftLeg)),
    (LeftLeg, Some(LeftFoot)),
    (LeftFoot, Some(LeftToeBase)),
    (LeftToeBase, None),
    (RightUpLeg, Some(RightLeg)),
    (RightLeg, Some(RightFoot)),
    (RightFoot, Some(RightToeBase)),
    (RightToeBase, None),
];

/// Game-facing joint vocabulary to logical bone. Motion playback calls the
/// FK layer with these joint names, one call per joint per frame.
pub const JOINT_BONE_MAP: [(&str, LogicalBoneName); 20] = [
    ("lowerBody", Hips),
    ("upperBody", Spine2),
    ("neck", Neck),
    ("head", Head),
    ("leftCollar", LeftShoulder),
    ("rightCollar", RightShoulder),
    ("leftShoulder", LeftArm),
    ("rightShoulder", RightArm),
    ("leftElbow", LeftForeArm),
    ("rightElbow", RightForeArm),
    ("leftWrist", LeftHand),
    ("rightWrist", RightHand),
    ("leftHip", LeftUpLeg),
    ("rightHip", RightUpLeg),
    ("leftKnee", LeftLeg),
    ("rightKnee", RightLeg),
    ("leftAnkle", LeftFoot),
    ("rightAnkle", RightFoot),
    ("leftToe", LeftToeBase),
    ("rightToe", RightToeBase),
];

/// Left/right pairs eligible for symmetry correction.
pub const SYMMETRY_PAIRS: [(LogicalBoneName, LogicalBoneName); 4] = [
    (LeftArm, RightArm),
    (LeftForeArm, RightForeArm),
    (LeftUpLeg, RightUpLeg),
    (LeftLeg, RightLeg),
];

pub fn bone_offset(bone: LogicalBoneName) -> Option<Vector3<f32>> {
    BONE_OFFSETS
        .iter()
        .find(|(name, _)| *name == bone)
        .map(|(_, offset)| Vector3::new(offset[0], offset[1], offset[2]))
}

pub fn bone_parent(bone: LogicalBoneName) -> Option<Option<LogicalBoneName>> {
    BONE_PARENTS
        .iter()
        .find(|(name, _)| *name == bone)
        .map(|(_, parent)| *parent)
}

pub fn primary_child(bone: LogicalBoneName) -> Option<LogicalBoneName> {
    PRIMARY_CHILD
        .iter()
        .find(|(name, _)| *name == bone)
        .and_then(|(_, child)| *child)
}

pub fn joint_to_logical(joint: &str) -> Option<LogicalBoneName> {
    JOINT_BONE_MAP
        .iter()
        .find(|(name, _)| *name == joint)
        .map(|(_, bone)| *bone)
}

// ─── Rig classification ───────────────────────────────────────────────────────

/// Bone-naming convention a skeleton was authored under, detected once per
/// skeleton at introspection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RigType {
    /// `mixamorig:`-namespaced names (Mixamo exports and derivatives).
    Mixamo,
    /// `DEF-`-prefixed deformation-bone names (Blender Rigify).
    Rigify,
    /// Anything else; resolution falls back to fuzzy matching.
    Unknown,
}

impl fmt::Display for RigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RigType::Mixamo => "mixamo",
            RigType::Rigify => "rigify",
            RigType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

// ─── Resolved bones ───────────────────────────────────────────────────────────

/// The subset of logical bones introspection resolved on a given skeleton.
/// Absent entries are legitimate for some rig types (Rigify exposes no
/// deformation `hips`/`spine`), so callers treat them uniformly as
/// "no resolution".
#[derive(Debug, Clone, Default)]
pub struct FoundBones {
    entries: Vec<(LogicalBoneName, BoneId)>,
}

impl FoundBones {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, logical: LogicalBoneName, bone: BoneId) {
        if self.get(logical).is_none() {
            self.entries.push((logical, bone));
        }
    }

    pub fn get(&self, logical: LogicalBoneName) -> Option<BoneId> {
        self.entries
            .iter()
            .find(|(name, _)| *name == logical)
            .map(|(_, bone)| *bone)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalBoneName, BoneId)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Construction report ──────────────────────────────────────────────────────

/// Severity level used by rig construction issues.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single issue noticed while adapting a skeleton.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

/// Summary of one skeleton adaptation: what was detected, what resolved,
/// what needed correcting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigReport {
    pub rig_type: RigType,
    pub bone_count: usize,
    pub mapped_bones: Vec<(String, String)>,
    pub missing_bones: Vec<String>,
    pub correction_count: usize,
    pub mirrored: bool,
    pub issues: Vec<RigIssue>,
}
