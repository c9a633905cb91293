//! Task kinds (spec §4.3's task table), grounded in
//! `Code/Engine/Animation/TaskSystem/Tasks/*.cpp` — one struct per source
//! file there, generalized into a single tagged `TaskKind` since Rust has no
//! equivalent to the source's per-kind `Task` subclass + vtable dispatch.
//!
//! A task's kind-specific payload is resolved against the local pose at
//! *registration* time (bone lookups, world-to-model-space target
//! conversion) so that a deserialized task — arriving with that payload
//! already baked in — executes identically to a locally registered one
//! without needing its own copy of the pose it depends on.

use crate::graph::bone_mask::BoneMask;
use crate::graph::ik::{aim, rig::IkRig, two_bone};
use crate::graph::pose::Pose;
use crate::graph::pose_buffer_pool::CachedPoseKey;
use crate::graph::transform::Transform;
use std::cell::RefCell;
use std::rc::Rc;

pub type TaskIndex = usize;

/// Matches the source's `UpdateStage` split between nodes evaluated before
/// and after the physics step; `Any` runs in either pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStage {
    PrePhysics,
    PostPhysics,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Interpolative,
    Additive,
    InterpolativeGlobalSpace,
}

#[derive(Debug, Clone)]
pub struct SampleParams {
    /// Sampling an animation clip at a time percentage has no dependency on
    /// other tasks, so the (already-interpolated) local pose is computed
    /// once at registration by the Tier 1/2 clip sampler and carried here
    /// rather than re-derived at execute time.
    pub sampled_local_pose: Pose,
}

#[derive(Debug, Clone)]
pub struct BlendParams {
    pub mode: BlendMode,
    pub weight: f32,
    /// Cloned at registration rather than referenced via the mask pool —
    /// masks are small (one padded float per bone) and this keeps a blend
    /// task's execution independent of the mask pool's lifetime.
    pub mask: Option<BoneMask>,
}

#[derive(Debug, Clone, Copy)]
pub struct TwoBoneIkTaskParams {
    pub params: two_bone::TwoBoneIkParams,
    pub target_model_space: Transform,
    /// Set when this task was reconstructed from a wire stream (§6) rather
    /// than registered locally off a live `Target` value node. Both paths
    /// already carry a fully-resolved `target_model_space`, so the execute
    /// side never re-derives it either way; this flag exists so a future
    /// node-side resolution step has something to gate on instead of
    /// silently re-resolving a replicated task's target.
    pub from_deserialized: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ChainSolverTaskParams {
    pub effector_bone_idx: usize,
    pub chain_length: usize,
    pub target_model_space: Transform,
    pub pivot_index: Option<usize>,
    pub allowed_stretch: f32,
    pub stiffness: f32,
}

#[derive(Clone)]
pub struct IkRigTaskParams {
    pub rig: Rc<RefCell<dyn IkRig>>,
    /// `(effector_slot, target_model_space)` pairs, at most `MAX_RIG_EFFECTORS`.
    pub effector_targets: Vec<(usize, Transform)>,
}

#[derive(Debug, Clone, Copy)]
pub struct AimIkTaskParams {
    pub params: aim::AimIkParams,
    pub target_model_space: Transform,
}

#[derive(Clone)]
pub enum TaskKind {
    ReferencePose,
    /// Identity-transform pose tagged `AdditivePose` (spec §4.3) — a neutral
    /// element for additive blends.
    ZeroPose,
    Sample(SampleParams),
    Blend(BlendParams),
    CachedPoseWrite(CachedPoseKey),
    CachedPoseRead(CachedPoseKey),
    TwoBoneIk(TwoBoneIkTaskParams),
    ChainSolver(ChainSolverTaskParams),
    IkRig(IkRigTaskParams),
    AimIk(AimIkTaskParams),
}

#[derive(Clone)]
pub struct Task {
    pub kind: TaskKind,
    /// Dependency task indices, strictly less than this task's own index
    /// (spec §3 invariant: "no task depends on a task with a greater index").
    pub dependencies: Vec<TaskIndex>,
    pub source_node_id: u32,
    pub update_stage: UpdateStage,
}

impl Task {
    pub fn new(kind: TaskKind, dependencies: Vec<TaskIndex>, source_node_id: u32, update_stage: UpdateStage) -> Self {
        Self {
            kind,
            dependencies,
            source_node_id,
            update_stage,
        }
    }
}
