use thiserror::Error;

use crate::rig::types::LogicalBoneName;

/// Construction-time errors.
///
/// Nothing here is raised during steady-state per-frame operation; every
/// variant indicates either a broken static table (a data-authoring bug that
/// should fail fast at startup) or a skeleton with no usable humanoid rig.
#[derive(Error, Debug)]
pub enum RigError {
    #[error("no offset table entry for bone '{0}' referenced by the hierarchy")]
    MissingBoneOffset(LogicalBoneName),

    #[error("no parent table entry for bone '{0}'")]
    MissingParentBone(LogicalBoneName),

    #[error("parent '{parent}' of bone '{bone}' was not built before its child")]
    ParentNotBuilt {
        bone: LogicalBoneName,
        parent: LogicalBoneName,
    },

    #[error("skeleton exposes no resolvable humanoid bones")]
    NoHumanoidRig,
}
