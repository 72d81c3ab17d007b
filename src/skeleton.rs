//! Minimal bone-hierarchy abstraction the rig core writes into.
//!
//! In the full game this role is played by the rendering engine's scene graph;
//! here the crate carries its own concrete realization so the rig math is
//! testable in isolation. The skeleton owns its bones; a bone only keeps a
//! parent back-reference (`Option<BoneId>`), never an owning link.

use nalgebra::{Matrix3, Matrix4, UnitQuaternion, Vector3};

/// Copyable handle into a [`Skeleton`]'s bone array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoneId(pub(crate) usize);

impl BoneId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Translation / rotation / scale triple.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn new(
        translation: Vector3<f32>,
        rotation: UnitQuaternion<f32>,
        scale: Vector3<f32>,
    ) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Compose into a 4x4 column-major matrix (scale, then rotation, then
    /// translation).
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let mut m = self.rotation.to_homogeneous();
        for (column, s) in self.scale.iter().enumerate() {
            let mut col = m.column_mut(column);
            col *= *s;
        }
        m[(0, 3)] = self.translation.x;
        m[(1, 3)] = self.translation.y;
        m[(2, 3)] = self.translation.z;
        m
    }

    /// Decompose a TRS matrix back into translation, rotation and scale.
    ///
    /// Scale is recovered from the basis column norms. A negative-determinant
    /// basis (handedness-flipped import) is repaired by negating the X column
    /// and recording the sign on `scale.x`, so the rotation component stays a
    /// proper rotation.
    pub fn from_matrix(m: &Matrix4<f32>) -> Self {
        let translation = Vector3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);

        let mut basis = Matrix3::new(
            m[(0, 0)],
            m[(0, 1)],
            m[(0, 2)],
            m[(1, 0)],
            m[(1, 1)],
            m[(1, 2)],
            m[(2, 0)],
            m[(2, 1)],
            m[(2, 2)],
        );

        let mut scale = Vector3::new(
            basis.column(0).norm(),
            basis.column(1).norm(),
            basis.column(2).norm(),
        );
        if basis.determinant() < 0.0 {
            scale.x = -scale.x;
        }

        for (column, s) in scale.iter().enumerate() {
            if s.abs() > f32::EPSILON {
                let mut col = basis.column_mut(column);
                col /= *s;
            }
        }

        let rotation = UnitQuaternion::from_matrix(&basis);
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

/// A single bone. The rig core mutates `local_rotation` every frame; rest
/// state and hierarchy are fixed after construction.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    pub parent: Option<BoneId>,
    pub rest: Transform,
    pub local_rotation: UnitQuaternion<f32>,
}

impl Bone {
    /// Engine-level bind matrix for this bone, relative to its parent.
    pub fn rest_matrix(&self) -> Matrix4<f32> {
        self.rest.to_matrix()
    }
}

/// Bone hierarchy with stable array order. `BoneId`s index into this array
/// and stay valid for the skeleton's lifetime (bones are never removed).
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bone(
        &mut self,
        name: impl Into<String>,
        parent: Option<BoneId>,
        rest: Transform,
    ) -> BoneId {
        let id = BoneId(self.bones.len());
        self.bones.push(Bone {
            name: name.into(),
            parent,
            rest,
            local_rotation: rest.rotation,
        });
        id
    }

    pub fn bone(&self, id: BoneId) -> &Bone {
        &self.bones[id.0]
    }

    pub fn bone_mut(&mut self, id: BoneId) -> &mut Bone {
        &mut self.bones[id.0]
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn ids(&self) -> impl Iterator<Item = BoneId> + '_ {
        (0..self.bones.len()).map(BoneId)
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// First bone whose name matches exactly, in array order.
    pub fn find_by_name(&self, name: &str) -> Option<BoneId> {
        self.bones
            .iter()
            .position(|bone| bone.name == name)
            .map(BoneId)
    }

    /// Sign of the root bone's rest-scale determinant contribution.
    ///
    /// A negative product means the importer baked a handedness flip into the
    /// asset's root transform; the FK layer compensates offset signs for such
    /// skeletons.
    pub fn root_scale_sign(&self) -> f32 {
        self.bones
            .iter()
            .find(|bone| bone.parent.is_none())
            .map(|bone| {
                let s = bone.rest.scale;
                (s.x * s.y * s.z).signum()
            })
            .unwrap_or(1.0)
    }

    /// Reset every bone's local rotation back to its rest rotation.
    pub fn reset_pose(&mut self) {
        for bone in &mut self.bones {
            bone.local_rotation = bone.rest.rotation;
        }
    }
}

/// A driven visual node on the separately-rendered mesh layer. Holds Euler
/// rotation only; translation/scale of the visual layer is out of this
/// core's hands.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshNode {
    pub rotation: Vector3<f32>,
}
