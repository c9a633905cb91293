//! Transition node (spec §4.4.2): blends from a source state's pose to a
//! target state's pose over a fixed duration, grounded in
//! `Animation_RuntimeGraphNode_Transition.h`. A forced transition (one that
//! interrupts an already-in-progress transition) snapshots the interrupted
//! source pose into the pose buffer pool's cached-pose slot instead of
//! re-evaluating a node subtree that may be getting torn down underneath it,
//! and releases that slot one frame after the blend completes.

use crate::graph::node::{GraphContext, NodeArena, NodeDefinition, NodeRef, PoseNodeResult};
use crate::graph::pose_buffer_pool::CachedPoseKey;
use crate::graph::task::{BlendMode, BlendParams, TaskKind, UpdateStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMotionBlendMode {
    Blend,
    IgnoreSource,
    IgnoreTarget,
}

#[derive(Clone)]
pub struct TransitionDef {
    pub source_state_node: NodeRef,
    pub target_state_node: NodeRef,
    pub duration: f32,
    pub root_motion_blend: RootMotionBlendMode,
    pub mask_index: Option<usize>,
    pub forced: bool,
    pub cached_pose_key: Option<CachedPoseKey>,
    /// If set, progress advances in sync-event space against the target's
    /// sync track instead of linear wall-clock time (spec §4.4.3).
    pub synchronized: bool,
    /// Ignored when `synchronized`. If set, wall-clock progress is capped so
    /// the transition can't outlast the target state's own remaining time.
    pub clamp_duration: bool,
    /// Bone whose translation delta is added into the blended root motion,
    /// anchoring the blend to a pivot (e.g. the planted foot) instead of the
    /// raw source/target root motion.
    pub pivot_bone_idx: Option<usize>,
}

/// Walks State -> child down to the first `Sample` node, returning its clip
/// ref. `None` if the subtree isn't a plain sampled clip (e.g. a nested
/// state machine or blend), in which case sync-space progress falls back to
/// wall-clock.
fn clip_ref_of(arena: &NodeArena, node_ref: NodeRef) -> Option<u32> {
    match arena.definition(node_ref) {
        NodeDefinition::State(def) => clip_ref_of(arena, def.child),
        NodeDefinition::Sample(def) => Some(def.clip_ref),
        _ => None,
    }
}

/// Seconds left in the target state's known duration, if it has one.
fn remaining_time_of(arena: &NodeArena, node_ref: NodeRef) -> Option<f32> {
    match arena.definition(node_ref) {
        NodeDefinition::State(def) => {
            let expected = def.expected_duration?;
            let elapsed = arena.state(node_ref).elapsed_time_in_state;
            Some((expected - elapsed).max(0.0))
        }
        _ => None,
    }
}

/// Cancels the blended root rotation's effect on `pivot_bone_idx`'s bind-pose
/// position, so that bone stays planted through the blend instead of
/// sweeping with the root. Translation (the actual motion delta) passes
/// through unchanged; only the correction term needed to hold the pivot
/// still under `delta.rotation` is added.
fn pivot_correct(delta: crate::graph::transform::Transform, pivot_bone_idx: usize, ctx: &GraphContext) -> crate::graph::transform::Transform {
    let mut bind_pose = crate::graph::pose::Pose::reference(ctx.skeleton, ctx.skeleton.bind_pose());
    let pivot = bind_pose.model_transform(ctx.skeleton, pivot_bone_idx).translation;
    let corrected_translation = delta.translation + pivot - delta.rotation.rotate_vector(pivot);
    crate::graph::transform::Transform::new(delta.rotation, corrected_translation, delta.scale)
}

pub fn update(def: &TransitionDef, arena: &mut NodeArena, node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let is_first_update = !arena.state(node_ref).is_initialized;
    if is_first_update {
        let state = arena.state_mut(node_ref);
        state.is_initialized = true;
        state.transition_progress = 0.0;
    }

    super::state::set_transition_lifecycle(arena, def.source_state_node, 2);
    super::state::set_transition_lifecycle(arena, def.target_state_node, 1);

    let (source_task, source_range, source_root_motion) = if def.forced {
        let key = def.cached_pose_key.expect("forced transitions require a cached pose key");
        if is_first_update {
            let source_result = arena.update_pose(def.source_state_node, ctx);
            let snapshot = source_result.task_index.expect("transition source must produce a task");
            // `CachedPoseWrite` transfers ownership of the snapshot buffer to
            // its own output slot (it re-parents rather than consuming), so
            // the blend below depends on its task index, not `snapshot`
            // directly — `snapshot`'s slot has already changed hands.
            let write_task = ctx
                .task_system
                .register_task(TaskKind::CachedPoseWrite(key), vec![snapshot], node_ref as u32, UpdateStage::Any);
            (write_task, source_result.event_range, source_result.root_motion_delta)
        } else {
            let read_task = ctx
                .task_system
                .register_task(TaskKind::CachedPoseRead(key), vec![], node_ref as u32, UpdateStage::Any);
            (read_task, crate::graph::events::EventRange::EMPTY, crate::graph::transform::Transform::IDENTITY)
        }
    } else {
        let source_result = arena.update_pose(def.source_state_node, ctx);
        (
            source_result.task_index.expect("transition source must produce a task"),
            source_result.event_range,
            source_result.root_motion_delta,
        )
    };

    let target_result = arena.update_pose(def.target_state_node, ctx);
    let target_task = target_result.task_index.expect("transition target must produce a task");

    let progress_delta = if def.synchronized {
        match clip_ref_of(arena, def.target_state_node) {
            Some(clip_ref) => {
                let track = ctx.clip_source.sync_track(clip_ref);
                let target_percentage = arena.state(def.target_state_node).current_time_percentage;
                let sync_time = track.time_to_sync_time(target_percentage);
                let num_events = track.num_events().max(1) as f32;
                let synced_progress = ((sync_time.event_index as f32 + sync_time.percentage_through) / num_events).clamp(0.0, 1.0);
                let state = arena.state(node_ref);
                (synced_progress - state.transition_progress).max(0.0)
            }
            // Target isn't a plain sampled clip (nested state machine, blend,
            // ...): no sync track to drive off of, fall back to wall-clock.
            None => ctx.delta_time / def.duration.max(1e-4),
        }
    } else if def.clamp_duration {
        let effective_duration = match remaining_time_of(arena, def.target_state_node) {
            Some(remaining) => def.duration.min(remaining.max(1e-4)),
            None => def.duration,
        };
        ctx.delta_time / effective_duration.max(1e-4)
    } else {
        ctx.delta_time / def.duration.max(1e-4)
    };

    let state = arena.state_mut(node_ref);
    state.transition_progress = (state.transition_progress + progress_delta).min(1.0);
    let weight = state.transition_progress;
    let completed = weight >= 1.0;

    let mask = def.mask_index.map(|idx| ctx.skeleton.mask(idx).clone());
    let blend_task = ctx.task_system.register_task(
        TaskKind::Blend(BlendParams {
            mode: BlendMode::Interpolative,
            weight,
            mask,
        }),
        vec![source_task, target_task],
        node_ref as u32,
        UpdateStage::Any,
    );

    let root_motion_delta = match def.root_motion_blend {
        RootMotionBlendMode::Blend => super::primitives::blend_transform(source_root_motion, target_result.root_motion_delta, weight),
        RootMotionBlendMode::IgnoreSource => target_result.root_motion_delta,
        RootMotionBlendMode::IgnoreTarget => source_root_motion,
    };
    let root_motion_delta = match def.pivot_bone_idx {
        Some(bone_idx) => pivot_correct(root_motion_delta, bone_idx, ctx),
        None => root_motion_delta,
    };

    if completed {
        super::state::set_transition_lifecycle(arena, def.source_state_node, 0);
        super::state::set_transition_lifecycle(arena, def.target_state_node, 0);
        if def.forced {
            let key = def.cached_pose_key.unwrap();
            ctx.pose_pool.release_cached_after_grace_frame(key);
        }
        arena.shutdown(def.source_state_node, ctx);
        let state = arena.state_mut(node_ref);
        state.is_initialized = false;
        state.transition_progress = 0.0;
    }

    PoseNodeResult {
        task_index: Some(blend_task),
        event_range: crate::graph::events::EventRange {
            start: source_range.start.min(target_result.event_range.start),
            end: target_result.event_range.end,
        },
        root_motion_delta,
    }
}

pub fn is_complete(arena: &NodeArena, node_ref: NodeRef) -> bool {
    arena.state(node_ref).transition_progress >= 1.0 && !arena.state(node_ref).is_initialized
}
