//! Single-bone aim solver (a supplemented task kind — the source splits this
//! functionality across several `Animation_Task_*.cpp` aim variants; this is
//! a single generalized solve grounded in the same rotate-towards-target
//! shape as `two_bone`'s bend step, minus the chain).
//!
//! Rotates `bone_idx` in place so that `aim_axis` (in the bone's model-space
//! orientation) points at `target_model_space`'s translation, optionally
//! clamped to `max_angle_radians` of deviation from the bone's original aim
//! direction.

use crate::graph::math::Quat;
use crate::graph::pose::Pose;
use crate::graph::skeleton::GraphSkeleton;
use crate::graph::transform::Transform;
use flint_core::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct AimIkParams {
    pub bone_idx: usize,
    pub aim_axis: Vec3,
    pub max_angle_radians: Option<f32>,
}

pub fn solve(pose: &mut Pose, skeleton: &GraphSkeleton, params: AimIkParams, target_model_space: Transform) {
    let bone_model = pose.model_transform(skeleton, params.bone_idx);

    let current_aim = bone_model.rotation.rotate_vector(params.aim_axis).normalized();
    let to_target = target_model_space.translation - bone_model.translation;
    if to_target.length() < 1e-6 {
        return;
    }
    let desired_aim = to_target.normalized();

    let mut delta = Quat::from_rotation_between_vectors(current_aim, desired_aim);
    if let Some(max_angle) = params.max_angle_radians {
        let angle = 2.0 * delta.w.clamp(-1.0, 1.0).acos();
        if angle > max_angle && angle > 1e-6 {
            let t = max_angle / angle;
            delta = Quat::IDENTITY.slerp(delta, t);
        }
    }

    let new_rotation = delta.mul(bone_model.rotation);
    let new_model = Transform::new(new_rotation, bone_model.translation, bone_model.scale);

    match skeleton.parent_index(params.bone_idx) {
        Some(parent) => {
            let parent_model = pose.model_transform(skeleton, parent);
            pose.set_local_transform(params.bone_idx, parent_model.delta_from(new_model));
        }
        None => pose.set_local_transform(params.bone_idx, new_model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_bone_skeleton() -> GraphSkeleton {
        GraphSkeleton::new(vec!["root".into(), "head".into()], vec![-1, 0])
    }

    #[test]
    fn aims_bone_towards_target() {
        let skeleton = single_bone_skeleton();
        let mut pose = Pose::regular(&skeleton);
        pose.set_local_transform(1, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        let target = Transform::from_translation(Vec3::new(1.0, 1.0, 1.0));
        solve(
            &mut pose,
            &skeleton,
            AimIkParams {
                bone_idx: 1,
                aim_axis: Vec3::FORWARD,
                max_angle_radians: None,
            },
            target,
        );

        let model = pose.model_transform(&skeleton, 1);
        let aim = model.rotation.rotate_vector(Vec3::FORWARD).normalized();
        let to_target = (target.translation - model.translation).normalized();
        assert!(aim.dot(&to_target) > 0.99);
    }

    #[test]
    fn clamps_to_max_angle() {
        let skeleton = single_bone_skeleton();
        let mut pose = Pose::regular(&skeleton);
        pose.set_local_transform(1, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        let target = Transform::from_translation(Vec3::new(1.0, 0.0, 5.0));
        solve(
            &mut pose,
            &skeleton,
            AimIkParams {
                bone_idx: 1,
                aim_axis: Vec3::FORWARD,
                max_angle_radians: Some(0.1),
            },
            target,
        );

        let model = pose.model_transform(&skeleton, 1);
        let aim = model.rotation.rotate_vector(Vec3::FORWARD).normalized();
        assert!(aim.dot(&Vec3::FORWARD) > 0.9, "clamped aim should stay close to original axis");
    }
}
