//! Graph-core pose (spec §3/§4.2): a fixed-length array of local-space bone
//! transforms plus a lazily-computed model-space array, following the same
//! single forward-pass pipeline as `crate::skeleton::Skeleton::compute_bone_matrices`,
//! generalized to quaternion `graph::transform::Transform` and to skip the
//! pass entirely until model space is actually asked for.

use crate::graph::skeleton::GraphSkeleton;
use crate::graph::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoseType {
    ReferencePose,
    ZeroPose,
    AdditivePose,
    RegularPose,
}

#[derive(Debug, Clone)]
pub struct Pose {
    pose_type: PoseType,
    local_transforms: Vec<Transform>,
    model_transforms: Vec<Transform>,
    model_space_dirty: bool,
}

impl Pose {
    pub fn reference(skeleton: &GraphSkeleton, bind_pose: &[Transform]) -> Self {
        debug_assert_eq!(bind_pose.len(), skeleton.num_bones());
        Self {
            pose_type: PoseType::ReferencePose,
            local_transforms: bind_pose.to_vec(),
            model_transforms: vec![Transform::IDENTITY; skeleton.num_bones()],
            model_space_dirty: true,
        }
    }

    pub fn zero(skeleton: &GraphSkeleton) -> Self {
        Self {
            pose_type: PoseType::ZeroPose,
            local_transforms: vec![Transform::IDENTITY; skeleton.num_bones()],
            model_transforms: vec![Transform::IDENTITY; skeleton.num_bones()],
            model_space_dirty: false,
        }
    }

    pub fn regular(skeleton: &GraphSkeleton) -> Self {
        Self {
            pose_type: PoseType::RegularPose,
            local_transforms: vec![Transform::IDENTITY; skeleton.num_bones()],
            model_transforms: vec![Transform::IDENTITY; skeleton.num_bones()],
            model_space_dirty: true,
        }
    }

    pub fn pose_type(&self) -> PoseType {
        self.pose_type
    }

    pub fn set_pose_type(&mut self, pose_type: PoseType) {
        self.pose_type = pose_type;
    }

    pub fn num_bones(&self) -> usize {
        self.local_transforms.len()
    }

    pub fn local_transform(&self, bone_idx: usize) -> Transform {
        self.local_transforms[bone_idx]
    }

    pub fn local_transforms(&self) -> &[Transform] {
        &self.local_transforms
    }

    pub fn set_local_transform(&mut self, bone_idx: usize, transform: Transform) {
        self.local_transforms[bone_idx] = transform;
        self.model_space_dirty = true;
    }

    pub fn copy_from(&mut self, source: &Pose) {
        self.local_transforms.copy_from_slice(&source.local_transforms);
        self.pose_type = source.pose_type;
        self.model_space_dirty = true;
    }

    /// Recomputes model space if any local write happened since the last
    /// call. No partial recompute — any dirty bit invalidates the whole pose.
    pub fn model_transform(&mut self, skeleton: &GraphSkeleton, bone_idx: usize) -> Transform {
        self.ensure_model_space(skeleton);
        self.model_transforms[bone_idx]
    }

    pub fn model_transforms(&mut self, skeleton: &GraphSkeleton) -> &[Transform] {
        self.ensure_model_space(skeleton);
        &self.model_transforms
    }

    fn ensure_model_space(&mut self, skeleton: &GraphSkeleton) {
        if !self.model_space_dirty {
            return;
        }

        for bone_idx in 0..self.local_transforms.len() {
            self.model_transforms[bone_idx] = match skeleton.parent_index(bone_idx) {
                Some(parent_idx) => self.local_transforms[bone_idx].compose(self.model_transforms[parent_idx]),
                None => self.local_transforms[bone_idx],
            };
        }

        self.model_space_dirty = false;
    }
}

/// A pose plus an optional secondary pose for two-channel operations (spec
/// §3), with a "pose set" flag marking whether the contents reflect a
/// meaningful prior write.
#[derive(Debug, Clone)]
pub struct PoseBuffer {
    pub primary: Pose,
    pub secondary: Option<Pose>,
    pose_set: bool,
}

impl PoseBuffer {
    pub fn new(primary: Pose) -> Self {
        Self {
            primary,
            secondary: None,
            pose_set: false,
        }
    }

    pub fn is_set(&self) -> bool {
        self.pose_set
    }

    pub fn mark_set(&mut self) {
        self.pose_set = true;
    }

    pub fn mark_unset(&mut self) {
        self.pose_set = false;
    }

    pub fn copy_from(&mut self, source: &PoseBuffer) {
        self.primary.copy_from(&source.primary);
        self.secondary = source.secondary.clone();
        self.pose_set = source.pose_set;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_skeleton(n: usize) -> GraphSkeleton {
        let ids: Vec<String> = (0..n).map(|i| format!("bone_{i}")).collect();
        let parents: Vec<i32> = (0..n as i32).map(|i| i - 1).collect();
        GraphSkeleton::new(ids, parents)
    }

    #[test]
    fn model_space_recomputes_only_after_local_write() {
        let skel = chain_skeleton(3);
        let mut pose = Pose::regular(&skel);
        let t = Transform::from_translation(flint_core::Vec3::new(1.0, 0.0, 0.0));
        pose.set_local_transform(1, t);

        let model = pose.model_transform(&skel, 1);
        assert!((model.translation.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn model_space_composes_through_chain() {
        let skel = chain_skeleton(3);
        let mut pose = Pose::regular(&skel);
        let t = Transform::from_translation(flint_core::Vec3::new(1.0, 0.0, 0.0));
        pose.set_local_transform(0, t);
        pose.set_local_transform(1, t);
        pose.set_local_transform(2, t);

        let model = pose.model_transform(&skel, 2);
        assert!((model.translation.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn pose_buffer_starts_unset() {
        let skel = chain_skeleton(2);
        let buffer = PoseBuffer::new(Pose::regular(&skel));
        assert!(!buffer.is_set());
    }

    #[test]
    fn copy_from_marks_model_space_dirty() {
        let skel = chain_skeleton(2);
        let mut a = Pose::regular(&skel);
        let mut b = Pose::regular(&skel);
        b.set_local_transform(1, Transform::from_translation(flint_core::Vec3::new(2.0, 0.0, 0.0)));
        a.copy_from(&b);
        let model = a.model_transform(&skel, 1);
        assert!((model.translation.x - 2.0).abs() < 1e-6);
    }
}
