//! N-bone iterative (PBD-style) chain solver (spec §4.6), grounded in
//! `IKChainSolver.cpp::SolveChain`. Walks a chain from a root ancestor down
//! to an effector bone, pre-rotates it toward the target about an optional
//! pivot, then relaxes link lengths back toward their rest lengths over a
//! fixed number of iterations before cinching to an allowed-stretch range.

use crate::graph::math::{lerp_vec3, Quat};
use crate::graph::pose::Pose;
use crate::graph::skeleton::GraphSkeleton;
use crate::graph::transform::Transform;
use flint_core::Vec3;

pub const DEFAULT_MAX_ITERATIONS: u32 = 6;

struct ChainLink {
    rest_length: f32,
    weight1: f32,
    weight2: f32,
}

/// Solves `node_transforms` (model-space, root-to-effector order) in place.
/// `joint_weights[i]` is the relative pull weight of interior joint `i`
/// (unused for the root and effector, which are pinned at weight 0/1).
/// Returns `false` if any link is degenerate (near-zero length).
pub fn solve_chain(
    node_transforms: &mut [Transform],
    joint_weights: &[f32],
    target: Transform,
    pivot_index: Option<usize>,
    allowed_stretch: f32,
    stiffness: f32,
    max_iterations: u32,
) -> bool {
    let node_count = node_transforms.len();
    debug_assert!(node_count >= 2);
    debug_assert_eq!(joint_weights.len(), node_count);

    let mut points: Vec<Vec3> = node_transforms.iter().map(|t| t.translation).collect();
    let link_count = node_count - 1;

    let mut links = Vec::with_capacity(link_count);
    for link_idx in 0..link_count {
        let radial = points[link_idx + 1] - points[link_idx];
        let length = radial.length();
        if length < 0.001 {
            return false;
        }

        let (weight1, weight2) = if link_idx == 0 {
            (0.0, 1.0)
        } else if link_idx == link_count - 1 {
            (1.0, 0.0)
        } else {
            let w1 = joint_weights[link_idx];
            let w2 = joint_weights[link_idx + 1];
            let total = w1 + w2;
            if total > 0.0 {
                (w1 / total, w2 / total)
            } else {
                (0.0, 0.0)
            }
        };

        links.push(ChainLink {
            rest_length: length,
            weight1,
            weight2,
        });
    }

    let original_radial: Vec<Vec3> = (0..link_count).map(|i| points[i + 1] - points[i]).collect();

    if let Some(pivot) = pivot_index {
        if pivot < node_count - 1 {
            let pivot_pos = points[pivot];
            let radial1 = points[node_count - 1] - pivot_pos;
            let radial2 = target.translation - pivot_pos;
            let length1 = radial1.length();
            let length2 = radial2.length();

            if length1 >= 0.001 && length2 >= 0.001 {
                let quat = Quat::from_rotation_between_vectors(radial1, radial2);
                let scale = length1 / length2;

                for point in points.iter_mut().take(node_count).skip(pivot + 1) {
                    let radial = *point - pivot_pos;
                    let point_target = quat.rotate_vector(radial * scale) + pivot_pos;
                    *point = lerp_vec3(*point, point_target, stiffness);
                }
            }
        }
    }

    points[node_count - 1] = target.translation;

    for _ in 0..max_iterations {
        for (link_idx, link) in links.iter().enumerate() {
            let point1 = points[link_idx];
            let point2 = points[link_idx + 1];
            let delta = point2 - point1;
            let current_length = delta.length() + 0.0001;

            let stretch = (current_length - link.rest_length) / current_length;
            let impulse = delta * (-stiffness * stretch);

            points[link_idx] = point1 - impulse * link.weight1;
            points[link_idx + 1] = point2 + impulse * link.weight2;
        }
    }

    debug_assert!((0.0..=1.0).contains(&allowed_stretch));
    for (link_idx, link) in links.iter().enumerate() {
        let delta = points[link_idx + 1] - points[link_idx];
        let current_length = delta.length();
        if current_length < 0.0001 {
            continue;
        }

        let min_length = link.rest_length - allowed_stretch * link.rest_length;
        let max_length = link.rest_length + allowed_stretch * link.rest_length;
        let length = current_length.clamp(min_length, max_length);
        points[link_idx + 1] = points[link_idx] + delta * (length / current_length);
    }

    for link_idx in 0..link_count {
        let radial = points[link_idx + 1] - points[link_idx];
        let delta_quat = Quat::from_rotation_between_vectors(original_radial[link_idx], radial);
        node_transforms[link_idx].rotation = delta_quat.mul(node_transforms[link_idx].rotation);
        node_transforms[link_idx + 1].translation = points[link_idx + 1];
    }

    node_transforms[node_count - 1].rotation = target.rotation;

    true
}

/// Walks the parent chain from `effector_bone_idx` up `chain_length - 1`
/// steps, solves it against `target`, and writes the result back into
/// `pose`'s local transforms.
pub fn solve(
    pose: &mut Pose,
    skeleton: &GraphSkeleton,
    effector_bone_idx: usize,
    chain_length: usize,
    target: Transform,
    pivot_index: Option<usize>,
    allowed_stretch: f32,
    stiffness: f32,
) -> bool {
    debug_assert!(chain_length >= 2);

    let mut chain_bones = Vec::with_capacity(chain_length);
    chain_bones.push(effector_bone_idx);
    while chain_bones.len() < chain_length {
        let last = *chain_bones.last().unwrap();
        match skeleton.parent_index(last) {
            Some(parent) => chain_bones.push(parent),
            None => break,
        }
    }
    chain_bones.reverse();

    if chain_bones.len() < 2 {
        return false;
    }

    let mut node_transforms: Vec<Transform> = chain_bones
        .iter()
        .map(|&bone_idx| pose.model_transform(skeleton, bone_idx))
        .collect();

    let joint_weights = vec![0.5f32; chain_bones.len()];

    let solved = solve_chain(
        &mut node_transforms,
        &joint_weights,
        target,
        pivot_index,
        allowed_stretch,
        stiffness,
        DEFAULT_MAX_ITERATIONS,
    );

    if !solved {
        return false;
    }

    for i in 0..chain_bones.len() {
        let bone_idx = chain_bones[i];
        let local = if i == 0 {
            match skeleton.parent_index(bone_idx) {
                Some(parent) => {
                    let parent_model = pose.model_transform(skeleton, parent);
                    parent_model.delta_from(node_transforms[i])
                }
                None => node_transforms[i],
            }
        } else {
            node_transforms[i - 1].delta_from(node_transforms[i])
        };
        pose.set_local_transform(bone_idx, local);
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_chain_skeleton() -> GraphSkeleton {
        GraphSkeleton::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![-1, 0, 1, 2],
        )
    }

    fn straight_chain_pose(skeleton: &GraphSkeleton) -> Pose {
        let mut pose = Pose::regular(skeleton);
        pose.set_local_transform(1, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        pose.set_local_transform(2, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        pose.set_local_transform(3, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        pose
    }

    #[test]
    fn solve_places_effector_at_reachable_target() {
        let skeleton = straight_chain_skeleton();
        let mut pose = straight_chain_pose(&skeleton);
        let target = Transform::from_translation(Vec3::new(1.5, 1.5, 0.0));

        let solved = solve(&mut pose, &skeleton, 3, 4, target, None, 0.05, 0.5);
        assert!(solved);

        let effector_model = pose.model_transform(&skeleton, 3);
        let distance = (effector_model.translation - target.translation).length();
        assert!(distance < 0.15, "distance was {distance}");
    }

    #[test]
    fn rejects_degenerate_chain_with_zero_length_link() {
        let skeleton = straight_chain_skeleton();
        let mut pose = Pose::regular(&skeleton);
        let target = Transform::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let solved = solve(&mut pose, &skeleton, 3, 4, target, None, 0.05, 0.5);
        assert!(!solved);
    }

    #[test]
    fn cinch_step_bounds_link_length_to_allowed_stretch() {
        let skeleton = straight_chain_skeleton();
        let mut pose = straight_chain_pose(&skeleton);
        let target = Transform::from_translation(Vec3::new(2.9, 0.0, 0.0));

        solve(&mut pose, &skeleton, 3, 4, target, None, 0.0, 0.8);

        let p0 = pose.model_transform(&skeleton, 0).translation;
        let p1 = pose.model_transform(&skeleton, 1).translation;
        let link_length = (p1 - p0).length();
        assert!((link_length - 1.0).abs() < 1e-3);
    }
}
