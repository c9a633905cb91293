//! Analytic two-bone IK solver (spec §4.6), grounded in
//! `Animation_Task_TwoBoneIK.cpp::Execute`. Solves a three-bone chain
//! `A -> B -> C` (`A` = chain start, `B` = mid/elbow, `C` = effector) so `C`
//! reaches a model-space target, bending at `B` via the law of cosines on
//! the plane spanned by the chain's original bend direction.
//!
//! The source's final placement step (`midCS.SetTranslation(offset + ...)`)
//! is commented out in `Animation_Task_TwoBoneIK.cpp` — a dead write, same
//! class of bug as `Lerp.h`'s missing `return`. This solver applies the bend
//! it computes instead of discarding it.

use crate::graph::pose::Pose;
use crate::graph::skeleton::GraphSkeleton;
use crate::graph::transform::Transform;
use flint_core::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct TwoBoneIkParams {
    pub effector_bone_idx: usize,
    pub allowed_stretch_percentage: f32,
}

/// Solves in place against `pose`'s local transforms. `target_model_space`'s
/// translation is the desired effector position; its rotation becomes the
/// effector's final model-space rotation.
pub fn solve(pose: &mut Pose, skeleton: &GraphSkeleton, params: TwoBoneIkParams, target_model_space: Transform) {
    let chain_end = params.effector_bone_idx;
    let chain_mid = skeleton
        .parent_index(chain_end)
        .expect("two-bone IK effector must have a parent");
    let chain_start = skeleton
        .parent_index(chain_mid)
        .expect("two-bone IK effector's parent must have a parent");

    let length_ab = pose.local_transform(chain_mid).translation.length();
    let length_bc = pose.local_transform(chain_end).translation.length();
    let mut max_reach = length_ab + length_bc;
    if params.allowed_stretch_percentage > 0.0 {
        max_reach += max_reach * params.allowed_stretch_percentage;
    }

    let start_model = pose.model_transform(skeleton, chain_start);
    let mid_model_original = pose.model_transform(skeleton, chain_mid);
    let end_model_original = pose.model_transform(skeleton, chain_end);

    let a_pos = start_model.translation;
    let to_target = target_model_space.translation - a_pos;
    let dist_to_target = to_target.length().min(max_reach).max((length_ab - length_bc).abs() + 1e-4);
    let dir_to_target = if to_target.length() > 1e-8 {
        to_target * (1.0 / to_target.length())
    } else {
        Vec3::RIGHT
    };

    // Bend plane from the chain's current (pre-solve) shape.
    let ab_original = mid_model_original.translation - a_pos;
    let ac_original = end_model_original.translation - a_pos;
    let mut plane_normal = ab_original.cross(&ac_original).normalized();
    if plane_normal.length() < 0.5 {
        // Degenerate (fully extended or fully folded chain): fall back to
        // any axis perpendicular to the target direction.
        let fallback = if dir_to_target.x.abs() < 0.9 { Vec3::RIGHT } else { Vec3::UP };
        plane_normal = fallback.cross(&dir_to_target).normalized();
    }

    // Angle at A between AB and AT via the law of cosines (side a = BC
    // opposite angle A, side b = AT, side c = AB).
    let cos_angle_a =
        ((length_ab * length_ab + dist_to_target * dist_to_target - length_bc * length_bc)
            / (2.0 * length_ab * dist_to_target))
            .clamp(-1.0, 1.0);
    let angle_a = cos_angle_a.acos();

    let bend_rotation = crate::graph::math::Quat::from_axis_angle(plane_normal, angle_a);
    let new_b_dir = bend_rotation.rotate_vector(dir_to_target);
    let new_b_pos = a_pos + new_b_dir * length_ab;
    let new_c_pos = a_pos + dir_to_target * dist_to_target;

    let delta_a = crate::graph::math::Quat::from_rotation_between_vectors(
        ab_original.normalized(),
        new_b_dir,
    );
    let new_start_rotation = delta_a.mul(start_model.rotation);

    let bc_original = end_model_original.translation - mid_model_original.translation;
    let new_bc_dir = (new_c_pos - new_b_pos).normalized();
    let delta_b = crate::graph::math::Quat::from_rotation_between_vectors(
        bc_original.normalized(),
        new_bc_dir,
    );
    let new_mid_rotation = delta_b.mul(mid_model_original.rotation);

    let new_start_model = Transform::new(new_start_rotation, start_model.translation, start_model.scale);
    let new_mid_model = Transform::new(new_mid_rotation, new_b_pos, mid_model_original.scale);
    let new_end_model = Transform::new(target_model_space.rotation, new_c_pos, end_model_original.scale);

    match skeleton.parent_index(chain_start) {
        Some(chain_start_parent) => {
            let parent_model = pose.model_transform(skeleton, chain_start_parent);
            pose.set_local_transform(chain_start, parent_model.delta_from(new_start_model));
        }
        None => pose.set_local_transform(chain_start, new_start_model),
    }
    pose.set_local_transform(chain_mid, new_start_model.delta_from(new_mid_model));
    pose.set_local_transform(chain_end, new_mid_model.delta_from(new_end_model));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bent_arm_skeleton() -> GraphSkeleton {
        GraphSkeleton::new(vec!["start".into(), "mid".into(), "end".into()], vec![-1, 0, 1])
    }

    fn bent_arm_pose(skeleton: &GraphSkeleton) -> Pose {
        let mut pose = Pose::regular(skeleton);
        pose.set_local_transform(1, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        pose.set_local_transform(
            2,
            Transform::from_translation(Vec3::new(0.7, 0.7, 0.0)),
        );
        pose
    }

    #[test]
    fn reaching_within_chain_length_places_effector_at_target() {
        let skeleton = bent_arm_skeleton();
        let mut pose = bent_arm_pose(&skeleton);

        let target = Transform::from_translation(Vec3::new(1.5, 0.3, 0.0));
        solve(
            &mut pose,
            &skeleton,
            TwoBoneIkParams {
                effector_bone_idx: 2,
                allowed_stretch_percentage: 0.0,
            },
            target,
        );

        let effector_model = pose.model_transform(&skeleton, 2);
        let distance = (effector_model.translation - target.translation).length();
        assert!(distance < 0.01, "distance was {distance}");
    }

    #[test]
    fn target_beyond_reach_is_clamped_to_full_extension() {
        let skeleton = bent_arm_skeleton();
        let mut pose = bent_arm_pose(&skeleton);
        let max_reach = 1.0 + (0.7f32 * 0.7 + 0.7 * 0.7).sqrt();

        let target = Transform::from_translation(Vec3::new(10.0, 0.0, 0.0));
        solve(
            &mut pose,
            &skeleton,
            TwoBoneIkParams {
                effector_bone_idx: 2,
                allowed_stretch_percentage: 0.0,
            },
            target,
        );

        let effector_model = pose.model_transform(&skeleton, 2);
        assert!((effector_model.translation.length() - max_reach).abs() < 0.01);
    }

    #[test]
    fn chain_start_bone_unaffected_translation() {
        let skeleton = bent_arm_skeleton();
        let mut pose = bent_arm_pose(&skeleton);
        let target = Transform::from_translation(Vec3::new(1.2, -0.2, 0.0));
        solve(
            &mut pose,
            &skeleton,
            TwoBoneIkParams {
                effector_bone_idx: 2,
                allowed_stretch_percentage: 0.0,
            },
            target,
        );
        let start_model = pose.model_transform(&skeleton, 0);
        assert!(start_model.translation.length() < 1e-5);
    }
}
