//! Boolean condition value nodes driving state machine transitions, grounded
//! in `Animation_RuntimeGraphNode_StateConditions.h`'s `StateCompletedNode`
//! and `TimeConditionNode`.

use crate::graph::node::{GraphContext, NodeArena, NodeRef};

#[derive(Clone, Copy)]
pub struct StateCompletedDef {
    /// The state whose (bubbled-up) sample completion to check.
    pub state_node: NodeRef,
    pub require_fully_in_state: bool,
}

pub fn state_completed(def: &StateCompletedDef, arena: &NodeArena) -> bool {
    let state = arena.state(def.state_node);
    if def.require_fully_in_state && state.transition_lifecycle != 0 {
        return false;
    }
    state.loop_count >= 1 || state.current_time_percentage >= 0.999
}

#[derive(Clone, Copy)]
pub enum TimeConditionSource {
    ElapsedInState,
    PercentageThroughSample,
}

#[derive(Clone, Copy)]
pub enum CompareOp {
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

#[derive(Clone, Copy)]
pub struct TimeConditionDef {
    pub state_node: NodeRef,
    pub source: TimeConditionSource,
    pub op: CompareOp,
    pub comparand_node: Option<NodeRef>,
    pub fixed_comparand: f32,
}

pub fn time_condition(def: &TimeConditionDef, arena: &mut NodeArena, ctx: &mut GraphContext) -> bool {
    let value = {
        let state = arena.state(def.state_node);
        match def.source {
            TimeConditionSource::ElapsedInState => state.elapsed_time_in_state,
            TimeConditionSource::PercentageThroughSample => state.current_time_percentage,
        }
    };

    let comparand = match def.comparand_node {
        Some(node) => arena.get_float(node, ctx),
        None => def.fixed_comparand,
    };

    match def.op {
        CompareOp::GreaterThan => value > comparand,
        CompareOp::LessThan => value < comparand,
        CompareOp::GreaterOrEqual => value >= comparand,
        CompareOp::LessOrEqual => value <= comparand,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::NodeDefinition;

    #[test]
    fn state_completed_true_after_one_loop() {
        let mut arena = NodeArena::new();
        let state_ref = arena.add(NodeDefinition::ConstBool(true));
        arena.state_mut(state_ref).loop_count = 1;
        let def = StateCompletedDef {
            state_node: state_ref,
            require_fully_in_state: false,
        };
        assert!(state_completed(&def, &arena));
    }

    #[test]
    fn state_completed_false_mid_transition_when_required() {
        let mut arena = NodeArena::new();
        let state_ref = arena.add(NodeDefinition::ConstBool(true));
        arena.state_mut(state_ref).loop_count = 1;
        arena.state_mut(state_ref).transition_lifecycle = 1;
        let def = StateCompletedDef {
            state_node: state_ref,
            require_fully_in_state: true,
        };
        assert!(!state_completed(&def, &arena));
    }
}
