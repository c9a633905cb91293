//! State machine node (spec §4.4.3), grounded in
//! `Animation_RuntimeGraphNode_StateMachine.h`. Holds an ordered list of
//! states, each with its own outgoing transitions evaluated in declaration
//! order; the first whose condition is true and isn't already the active
//! transition starts a blend via the associated `Transition` node. Only one
//! transition is in flight at a time — a transition firing while another is
//! active is treated as a forced interruption by construction (the new
//! `Transition` node's `forced` flag), not by queuing.

use crate::graph::node::{GraphContext, NodeArena, NodeDefinition, NodeRef, PoseNodeResult};

#[derive(Clone)]
pub struct TransitionSlot {
    pub target_state_index: usize,
    pub condition_node: NodeRef,
    pub transition_node: NodeRef,
}

#[derive(Clone)]
pub struct StateSlot {
    pub state_node: NodeRef,
    pub transitions: Vec<TransitionSlot>,
    /// Evaluated once at the state machine's first update to pick an initial
    /// state other than `default_state_index`; `None` always defers to it.
    pub entry_condition_node: Option<NodeRef>,
}

#[derive(Clone)]
pub struct StateMachineDef {
    pub states: Vec<StateSlot>,
    pub default_state_index: usize,
}

pub fn update(def: &StateMachineDef, arena: &mut NodeArena, node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
    let is_first_update = !arena.state(node_ref).is_initialized;
    if is_first_update {
        let mut chosen = def.default_state_index;
        for (index, slot) in def.states.iter().enumerate() {
            if let Some(condition) = slot.entry_condition_node {
                if arena.get_bool(condition, ctx) {
                    chosen = index;
                    break;
                }
            }
        }
        let state = arena.state_mut(node_ref);
        state.is_initialized = true;
        state.active_state_index = chosen;
        state.active_transition_slot = None;
    }

    let active_index = arena.state(node_ref).active_state_index;
    let mut active_transition_slot = arena.state(node_ref).active_transition_slot;

    if let Some(current_slot_idx) = active_transition_slot {
        // A transition is already in flight. Still walk the active state's
        // other outgoing transitions looking for one that's both condition-met
        // and marked `forced` (spec §4.4.2); if one fires, the in-flight
        // transition is torn down and handed over so the new transition's
        // first update snapshots its source pose instead of continuing the
        // interrupted blend.
        for (slot_idx, slot) in def.states[active_index].transitions.clone().into_iter().enumerate() {
            if slot_idx == current_slot_idx {
                continue;
            }
            let is_forceable = matches!(arena.definition(slot.transition_node), NodeDefinition::Transition(t) if t.forced);
            if !is_forceable || !arena.get_bool(slot.condition_node, ctx) {
                continue;
            }

            let old_transition_node = def.states[active_index].transitions[current_slot_idx].transition_node;
            arena.shutdown(old_transition_node, ctx);
            let old_state = arena.state_mut(old_transition_node);
            old_state.is_initialized = false;
            old_state.transition_progress = 0.0;

            arena.state_mut(node_ref).active_transition_slot = Some(slot_idx);
            active_transition_slot = Some(slot_idx);
            break;
        }
    }

    if let Some(slot_idx) = active_transition_slot {
        let transition_node = def.states[active_index].transitions[slot_idx].transition_node;
        let target_state_index = def.states[active_index].transitions[slot_idx].target_state_index;
        let result = arena.update_pose(transition_node, ctx);

        if super::transition::is_complete(arena, transition_node) {
            let state = arena.state_mut(node_ref);
            state.active_state_index = target_state_index;
            state.active_transition_slot = None;
        }

        return result;
    }

    for (slot_idx, slot) in def.states[active_index].transitions.clone().into_iter().enumerate() {
        if arena.get_bool(slot.condition_node, ctx) {
            arena.state_mut(node_ref).active_transition_slot = Some(slot_idx);
            let result = arena.update_pose(slot.transition_node, ctx);
            if super::transition::is_complete(arena, slot.transition_node) {
                let state = arena.state_mut(node_ref);
                state.active_state_index = slot.target_state_index;
                state.active_transition_slot = None;
            }
            return result;
        }
    }

    arena.update_pose(def.states[active_index].state_node, ctx)
}

pub fn active_state_node(def: &StateMachineDef, arena: &NodeArena, node_ref: NodeRef) -> NodeRef {
    def.states[arena.state(node_ref).active_state_index].state_node
}
