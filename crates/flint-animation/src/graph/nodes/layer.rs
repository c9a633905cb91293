//! Layer node (spec §4.4.4), grounded in `Animation_RuntimeGraphNode_Layers.h`.
//! A base pose is blended against N layers in order, each either a plain
//! child subtree or a state machine, under a pushed `LayerContext` so nested
//! `State` nodes can modulate their own layer's effective weight/mask as they
//! update (e.g. to fade a layer out as its state approaches completion).

use crate::graph::node::{GraphContext, LayerContext, NodeArena, NodeRef, PoseNodeResult};
use crate::graph::task::{BlendMode, BlendParams, TaskKind, UpdateStage};

#[derive(Clone, Copy)]
pub enum LayerInput {
    Local(NodeRef),
    StateMachine(NodeRef),
}

#[derive(Clone)]
pub struct LayerSlot {
    pub input: LayerInput,
    pub weight_node: NodeRef,
    pub mask_index: Option<usize>,
    pub blend_mode: BlendMode,
    /// Marks this layer's events as belonging to an inactive branch so
    /// downstream consumers ignore them even though the layer is mechanically
    /// active (spec §4.4.4's `ignore_events`).
    pub ignore_events: bool,
    /// Locks this layer's `Sample` nodes to the base pose's current
    /// playback position instead of letting them advance independently
    /// (spec §4.4.4).
    pub is_synchronized: bool,
    /// If set, this layer's own root motion is discarded entirely — the
    /// layer stack's output root motion comes from the base pose alone
    /// (spec §4.4.4).
    pub only_sample_base_root_motion: bool,
}

#[derive(Clone)]
pub struct LayerDef {
    pub base: NodeRef,
    pub layers: Vec<LayerSlot>,
}

pub fn update(def: &LayerDef, arena: &mut NodeArena, ctx: &mut GraphContext) -> PoseNodeResult {
    let base_result = arena.update_pose(def.base, ctx);
    let mut current_task = base_result.task_index.expect("layer base must produce a task");
    let mut event_range = base_result.event_range;
    let mut root_motion = base_result.root_motion_delta;
    let base_sync_percentage = arena.state(def.base).current_time_percentage;

    for layer in &def.layers {
        let mask = layer.mask_index.map(|idx| ctx.skeleton.mask(idx).clone());
        let sync_percentage = layer.is_synchronized.then_some(base_sync_percentage);
        ctx.layer_stack.push(LayerContext { weight: 1.0, mask, sync_percentage });

        let child_result = match layer.input {
            LayerInput::Local(node) => arena.update_pose(node, ctx),
            LayerInput::StateMachine(node) => arena.update_pose(node, ctx),
        };

        let pushed = ctx.layer_stack.pop().expect("layer context pushed above");
        let weight = arena.get_float(layer.weight_node, ctx) * pushed.weight;
        let mask = pushed.mask;

        if layer.ignore_events {
            ctx.events.mark_events_as_from_inactive_branch(child_result.event_range);
        }

        let Some(child_task) = child_result.task_index else {
            continue;
        };

        let source_node_id = match layer.input {
            LayerInput::Local(n) => n as u32,
            LayerInput::StateMachine(n) => n as u32,
        };
        current_task = ctx.task_system.register_task(
            TaskKind::Blend(BlendParams {
                mode: layer.blend_mode,
                weight,
                mask,
            }),
            vec![current_task, child_task],
            source_node_id,
            UpdateStage::Any,
        );

        event_range.end = child_result.event_range.end;
        if !layer.only_sample_base_root_motion {
            root_motion = super::primitives::blend_transform(root_motion, child_result.root_motion_delta, weight);
        }
    }

    PoseNodeResult {
        task_index: Some(current_task),
        event_range,
        root_motion_delta: root_motion,
    }
}
