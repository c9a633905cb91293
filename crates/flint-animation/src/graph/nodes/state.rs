//! State node lifecycle (spec §4.4.1), grounded in
//! `Animation_RuntimeGraphNode_State.h`. Wraps a child pose node with
//! entry/execute/exit events and timed events fired as time in the state
//! elapses, plus optional layer weight/mask modulation for states nested
//! inside a `Layer` node. Exit events always fire on `shutdown`, even if the
//! state never saw an `update` (e.g. it was the losing side of an
//! interrupted transition) — so entry and exit stay paired for consumers.

use crate::graph::events::{EventOrigin, SampledEvent};
use crate::graph::node::{GraphContext, NodeArena, NodeRef, PoseNodeResult};

#[derive(Clone)]
pub struct TimedEvent {
    pub id: String,
    /// Seconds, measured from state entry (elapsed) or from the state's
    /// known end (remaining) — see `expected_duration`.
    pub time_value: f32,
}

#[derive(Clone)]
pub struct StateDef {
    pub child: NodeRef,
    pub entry_events: Vec<String>,
    pub execute_events: Vec<String>,
    pub exit_events: Vec<String>,
    pub timed_elapsed_events: Vec<TimedEvent>,
    pub timed_remaining_events: Vec<TimedEvent>,
    /// Known duration used to evaluate `timed_remaining_events`; `None` for
    /// states without a fixed-length child (looping or condition-driven).
    pub expected_duration: Option<f32>,
    pub layer_weight_node: Option<NodeRef>,
    pub layer_mask_index: Option<usize>,
    pub is_off_state: bool,
}

/// `StateNode::TransitionState`: 0 = None, 1 = TransitioningIn, 2 = TransitioningOut.
pub fn set_transition_lifecycle(arena: &mut NodeArena, node_ref: NodeRef, lifecycle: u8) {
    arena.state_mut(node_ref).transition_lifecycle = lifecycle;
}

pub fn update(def: &StateDef, arena: &mut NodeArena, node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let range_start = ctx.events.begin_range();

    let state = arena.state_mut(node_ref);
    let is_first_update = !state.is_initialized;
    if is_first_update {
        state.is_initialized = true;
        state.elapsed_time_in_state = 0.0;
    } else {
        state.elapsed_time_in_state += ctx.delta_time;
    }
    let elapsed = state.elapsed_time_in_state;

    if def.is_off_state {
        if is_first_update {
            emit(ctx, node_ref, EventOrigin::StateEntry, &def.entry_events);
        }
        let range = ctx.events.close_range(range_start);
        return PoseNodeResult {
            task_index: None,
            event_range: range,
            root_motion_delta: crate::graph::transform::Transform::IDENTITY,
        };
    }

    if is_first_update {
        emit(ctx, node_ref, EventOrigin::StateEntry, &def.entry_events);
    }
    emit(ctx, node_ref, EventOrigin::StateExecute, &def.execute_events);

    let prev_elapsed = elapsed - ctx.delta_time;
    for timed in &def.timed_elapsed_events {
        if prev_elapsed < timed.time_value && elapsed >= timed.time_value {
            append_event(ctx, node_ref, EventOrigin::Timed, &timed.id);
        }
    }
    if let Some(duration) = def.expected_duration {
        let prev_remaining = duration - prev_elapsed;
        let remaining = duration - elapsed;
        for timed in &def.timed_remaining_events {
            if prev_remaining > timed.time_value && remaining <= timed.time_value {
                append_event(ctx, node_ref, EventOrigin::Timed, &timed.id);
            }
        }
    }

    if let Some(weight_node) = def.layer_weight_node {
        let weight = arena.get_float(weight_node, ctx);
        if let Some(layer) = ctx.layer_stack.last_mut() {
            layer.weight *= weight;
        }
    }
    if let Some(mask_idx) = def.layer_mask_index {
        let mask = ctx.skeleton.mask(mask_idx).clone();
        if let Some(layer) = ctx.layer_stack.last_mut() {
            match &mut layer.mask {
                Some(existing) => existing.combine_with(&mask),
                None => layer.mask = Some(mask),
            }
        }
    }

    let child_result = arena.update_pose(def.child, ctx);

    arena.state_mut(node_ref).current_time_percentage = arena.state(def.child).current_time_percentage;
    arena.state_mut(node_ref).loop_count = arena.state(def.child).loop_count;

    PoseNodeResult {
        task_index: child_result.task_index,
        event_range: crate::graph::events::EventRange {
            start: range_start,
            end: child_result.event_range.end,
        },
        root_motion_delta: child_result.root_motion_delta,
    }
}

pub fn shutdown(def: &StateDef, arena: &mut NodeArena, node_ref: NodeRef, ctx: &mut GraphContext) {
    if arena.state(node_ref).is_initialized && !def.is_off_state {
        emit(ctx, node_ref, EventOrigin::StateExit, &def.exit_events);
    }
    arena.shutdown(def.child, ctx);
}

fn emit(ctx: &mut GraphContext, node_ref: NodeRef, origin: EventOrigin, ids: &[String]) {
    for id in ids {
        append_event(ctx, node_ref, origin, id);
    }
}

fn append_event(ctx: &mut GraphContext, node_ref: NodeRef, origin: EventOrigin, id: &str) {
    ctx.events.append(SampledEvent::new(origin, node_ref, id));
}
