//! Humanoid FK rig core
//!
//! Builds or imports humanoid skeletons, resolves them against a fixed
//! logical bone vocabulary across naming conventions (Mixamo, Rigify,
//! generic), and drives them with authored FK rotation offsets.

pub mod asset;
pub mod error;
pub mod math;
pub mod rig;
pub mod skeleton;

pub use asset::ModelCache;
pub use error::RigError;
pub use rig::CharacterRig;
pub use rig::builder::build_procedural_skeleton;
pub use rig::sync::SkeletonMeshSync;
pub use rig::types::{LogicalBoneName, RigReport, RigType};
pub use skeleton::{Bone, BoneId, MeshNode, Skeleton, Transform};
