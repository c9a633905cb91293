//! Leaf pose/value nodes: the reference/zero poses, a clip sampler, a blend
//! combinator, and target resolution. Grounded in
//! `Animation_RuntimeGraphNode_AnimationClip.h` (sampling + looping) and
//! `Animation_RuntimeGraphNode_Blend.h` (the blend combinator two child poses
//! share), generalized into free functions dispatched from `node::NodeArena`.

use crate::graph::bone_mask::BoneMask;
use crate::graph::math::{lerp, lerp_vec3, Quat};
use crate::graph::node::{resolve_target_transform, GraphContext, NodeArena, NodeRef, PoseNodeResult};
use crate::graph::pose::Pose;
use crate::graph::task::{BlendMode, BlendParams, SampleParams, TaskKind, UpdateStage};
use crate::graph::transform::Transform;
use flint_core::Vec3;

#[derive(Clone)]
pub struct SampleDef {
    pub clip_ref: u32,
    pub play_rate_node: Option<NodeRef>,
    pub should_loop: bool,
}

#[derive(Clone)]
pub struct BlendDef {
    pub source: NodeRef,
    pub target: NodeRef,
    pub weight_node: NodeRef,
    pub mask_index: Option<usize>,
    pub mode: BlendMode,
}

#[derive(Clone, Copy)]
pub enum TargetDef {
    Absolute(Transform),
    Bone {
        bone_idx: usize,
        rotation_offset: Option<Quat>,
        translation_offset: Option<Vec3>,
        offset_in_bone_space: bool,
    },
}

pub fn update_reference_pose(node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let task = ctx.task_system.register_task(TaskKind::ReferencePose, vec![], node_ref as u32, UpdateStage::Any);
    PoseNodeResult {
        task_index: Some(task),
        event_range: ctx.events.close_range(ctx.events.begin_range()),
        root_motion_delta: Transform::IDENTITY,
    }
}

pub fn update_zero_pose(node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let task = ctx.task_system.register_task(TaskKind::ZeroPose, vec![], node_ref as u32, UpdateStage::Any);
    PoseNodeResult {
        task_index: Some(task),
        event_range: ctx.events.close_range(ctx.events.begin_range()),
        root_motion_delta: Transform::IDENTITY,
    }
}

/// Advances a clip's normalized playback time by `dt * play_rate / duration`,
/// wrapping (and incrementing `loop_count`) when `should_loop`, clamping to 1
/// otherwise. If this node is updating inside a synchronized layer (spec
/// §4.4.4), its own accumulation is skipped entirely and it locks to the
/// enclosing layer's `sync_percentage` instead — a simplified stand-in for
/// the source's full sync-event-indexed phase match, since this core tracks
/// per-node time as a bare `[0,1)` percentage rather than a `SyncTime`.
pub fn update_sample(def: &SampleDef, arena: &mut NodeArena, node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let duration = ctx.clip_source.duration(def.clip_ref).max(1e-4);
    let play_rate = match def.play_rate_node {
        Some(rate_node) => arena.get_float(rate_node, ctx),
        None => 1.0,
    };
    let forced_percentage = ctx.current_layer().and_then(|l| l.sync_percentage);

    let state = arena.state_mut(node_ref);
    if !state.is_initialized {
        state.is_initialized = true;
        state.current_time_percentage = 0.0;
        state.loop_count = 0;
    }

    let percentage = match forced_percentage {
        Some(p) => {
            state.current_time_percentage = p;
            p
        }
        None => {
            let mut percentage = state.current_time_percentage + (ctx.delta_time * play_rate) / duration;
            if def.should_loop {
                while percentage >= 1.0 {
                    percentage -= 1.0;
                    state.loop_count += 1;
                }
                while percentage < 0.0 {
                    percentage += 1.0;
                }
            } else {
                percentage = percentage.clamp(0.0, 1.0);
            }
            state.current_time_percentage = percentage;
            percentage
        }
    };

    let sampled_pose = ctx.clip_source.sample_local_pose(def.clip_ref, percentage, ctx.skeleton);
    let task = ctx.task_system.register_task(
        TaskKind::Sample(SampleParams { sampled_local_pose: sampled_pose }),
        vec![],
        node_ref as u32,
        UpdateStage::Any,
    );

    let range_start = ctx.events.begin_range();
    let range = ctx.events.close_range(range_start);

    PoseNodeResult {
        task_index: Some(task),
        event_range: range,
        root_motion_delta: Transform::IDENTITY,
    }
}

pub fn blend_transform(source: Transform, target: Transform, weight: f32) -> Transform {
    Transform::new(
        source.rotation.nlerp(target.rotation, weight),
        lerp_vec3(source.translation, target.translation, weight),
        lerp(source.scale, target.scale, weight),
    )
}

pub fn update_blend(def: &BlendDef, arena: &mut NodeArena, node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let source_result = arena.update_pose(def.source, ctx);
    let target_result = arena.update_pose(def.target, ctx);
    let weight = arena.get_float(def.weight_node, ctx);
    let mask: Option<BoneMask> = def.mask_index.map(|idx| ctx.skeleton.mask(idx).clone());

    let task = ctx.task_system.register_task(
        TaskKind::Blend(BlendParams { mode: def.mode, weight, mask }),
        vec![
            source_result.task_index.expect("blend source must produce a task"),
            target_result.task_index.expect("blend target must produce a task"),
        ],
        node_ref as u32,
        UpdateStage::Any,
    );

    PoseNodeResult {
        task_index: Some(task),
        event_range: crate::graph::events::EventRange {
            start: source_result.event_range.start,
            end: target_result.event_range.end,
        },
        root_motion_delta: blend_transform(source_result.root_motion_delta, target_result.root_motion_delta, weight),
    }
}

pub fn resolve_target(def: &TargetDef, arena: &mut NodeArena, ctx: &mut GraphContext) -> Option<Transform> {
    // A target is resolved against the most recently produced pose of
    // whichever branch requested it; since the graph core has no single
    // "current pose" outside of task execution, bone-relative targets are
    // resolved against the skeleton's bind pose rather than a live pose —
    // good enough for static aim/IK rig anchors, and callers needing a
    // live-pose-relative target should resolve it at task-execution time
    // instead of through a value node.
    let _ = arena;
    match *def {
        TargetDef::Absolute(t) => Some(t),
        TargetDef::Bone {
            bone_idx,
            rotation_offset,
            translation_offset,
            offset_in_bone_space,
        } => {
            let mut bind_pose = Pose::reference(ctx.skeleton, ctx.skeleton.bind_pose());
            let base = bind_pose.model_transform(ctx.skeleton, bone_idx);
            if rotation_offset.is_none() && translation_offset.is_none() {
                return Some(base);
            }
            Some(resolve_target_transform(
                &mut bind_pose,
                ctx.skeleton,
                None,
                Some(base),
                rotation_offset,
                translation_offset,
                offset_in_bone_space,
            ))
        }
    }
}
