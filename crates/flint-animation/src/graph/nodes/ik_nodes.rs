//! IK graph nodes: thin wiring between a pose-producing child and the
//! solvers in `graph::ik`, registering the matching `TaskKind` against the
//! child's task once a target value node resolves. Grounded in
//! `Animation_RuntimeGraphNode_TwoBoneIK.h` / `Animation_RuntimeGraphNode_IK.h`.

use crate::graph::ik::{aim, two_bone};
use crate::graph::node::{GraphContext, NodeArena, NodeRef, PoseNodeResult, SharedIkRig, ValueResult};
use crate::graph::task::{AimIkTaskParams, ChainSolverTaskParams, IkRigTaskParams, TaskKind, TwoBoneIkTaskParams, UpdateStage};
use flint_core::Vec3;

fn resolve_target(arena: &mut NodeArena, target_node: NodeRef, ctx: &mut GraphContext) -> Option<crate::graph::transform::Transform> {
    match arena.get_value(target_node, ctx) {
        ValueResult::Target(t) => t,
        _ => panic!("IK node's target input must be a target-value node"),
    }
}

#[derive(Clone, Copy)]
pub struct TwoBoneIkDef {
    pub child: NodeRef,
    pub target: NodeRef,
    pub effector_bone_idx: usize,
    pub allowed_stretch_percentage: f32,
    pub is_enabled_node: Option<NodeRef>,
}

pub fn update_two_bone(def: &TwoBoneIkDef, arena: &mut NodeArena, node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let child_result = arena.update_pose(def.child, ctx);

    if let Some(gate) = def.is_enabled_node {
        if !arena.get_bool(gate, ctx) {
            return child_result;
        }
    }

    let Some(target) = resolve_target(arena, def.target, ctx) else {
        return child_result;
    };

    let task = ctx.task_system.register_task(
        TaskKind::TwoBoneIk(TwoBoneIkTaskParams {
            params: two_bone::TwoBoneIkParams {
                effector_bone_idx: def.effector_bone_idx,
                allowed_stretch_percentage: def.allowed_stretch_percentage,
            },
            target_model_space: target,
            from_deserialized: false,
        }),
        vec![child_result.task_index.expect("two-bone IK child must produce a task")],
        node_ref as u32,
        UpdateStage::PostPhysics,
    );

    PoseNodeResult {
        task_index: Some(task),
        ..child_result
    }
}

#[derive(Clone, Copy)]
pub struct ChainSolverDef {
    pub child: NodeRef,
    pub target: NodeRef,
    pub effector_bone_idx: usize,
    pub chain_length: usize,
    pub pivot_index: Option<usize>,
    pub allowed_stretch: f32,
    pub stiffness: f32,
}

pub fn update_chain_solver(def: &ChainSolverDef, arena: &mut NodeArena, node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let child_result = arena.update_pose(def.child, ctx);
    let Some(target) = resolve_target(arena, def.target, ctx) else {
        return child_result;
    };

    let task = ctx.task_system.register_task(
        TaskKind::ChainSolver(ChainSolverTaskParams {
            effector_bone_idx: def.effector_bone_idx,
            chain_length: def.chain_length,
            target_model_space: target,
            pivot_index: def.pivot_index,
            allowed_stretch: def.allowed_stretch,
            stiffness: def.stiffness,
        }),
        vec![child_result.task_index.expect("chain solver child must produce a task")],
        node_ref as u32,
        UpdateStage::PostPhysics,
    );

    PoseNodeResult {
        task_index: Some(task),
        ..child_result
    }
}

#[derive(Clone, Copy)]
pub struct AimIkDef {
    pub child: NodeRef,
    pub target: NodeRef,
    pub bone_idx: usize,
    pub aim_axis: Vec3,
    pub max_angle_radians: Option<f32>,
}

pub fn update_aim(def: &AimIkDef, arena: &mut NodeArena, node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let child_result = arena.update_pose(def.child, ctx);
    let Some(target) = resolve_target(arena, def.target, ctx) else {
        return child_result;
    };

    let task = ctx.task_system.register_task(
        TaskKind::AimIk(AimIkTaskParams {
            params: aim::AimIkParams {
                bone_idx: def.bone_idx,
                aim_axis: def.aim_axis,
                max_angle_radians: def.max_angle_radians,
            },
            target_model_space: target,
        }),
        vec![child_result.task_index.expect("aim IK child must produce a task")],
        node_ref as u32,
        UpdateStage::PostPhysics,
    );

    PoseNodeResult {
        task_index: Some(task),
        ..child_result
    }
}

#[derive(Clone)]
pub struct IkRigDef {
    pub child: NodeRef,
    /// `(effector_slot, target-value node)` pairs.
    pub targets: Vec<(usize, NodeRef)>,
    pub rig: SharedIkRig,
}

pub fn update_ik_rig(def: &IkRigDef, arena: &mut NodeArena, node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let child_result = arena.update_pose(def.child, ctx);

    let mut effector_targets = Vec::with_capacity(def.targets.len());
    for &(slot, target_node) in &def.targets {
        if let Some(target) = resolve_target(arena, target_node, ctx) {
            effector_targets.push((slot, target));
        }
    }

    if effector_targets.is_empty() {
        return child_result;
    }

    let task = ctx.task_system.register_task(
        TaskKind::IkRig(IkRigTaskParams {
            rig: def.rig.clone(),
            effector_targets,
        }),
        vec![child_result.task_index.expect("IK rig child must produce a task")],
        node_ref as u32,
        UpdateStage::PostPhysics,
    );

    PoseNodeResult {
        task_index: Some(task),
        ..child_result
    }
}
