//! Node runtime core (spec §4.4): a flat, index-addressed graph instead of
//! the source's `GraphNode` class hierarchy + vtable dispatch. Each node is
//! a `NodeRef` (`u16`) into two parallel arrays owned by a `NodeArena`: a
//! `NodeDefinition` (compiled, shared config — child refs, constants) and a
//! `NodeState` (per-instance runtime state — elapsed time, transition
//! progress, per-frame result cache). Dispatch is a `match` on the
//! definition tag in `nodes::dispatch`, not a trait object, mirroring how
//! `bone_mask_task_list` and `task_system` already dispatch on small cloned
//! definition data rather than through `dyn` traits.

use crate::graph::bone_mask::BoneMask;
use crate::graph::bone_mask_pool::BoneMaskPool;
use crate::graph::events::{EventRange, SampledEventBuffer};
use crate::graph::ik::rig::IkRig;
use crate::graph::math::Quat;
use crate::graph::nodes::{
    conditions::{StateCompletedDef, TimeConditionDef},
    ik_nodes::{AimIkDef, ChainSolverDef, IkRigDef, TwoBoneIkDef},
    layer::LayerDef,
    primitives::{BlendDef, SampleDef, TargetDef},
    state::StateDef,
    state_machine::StateMachineDef,
    transition::TransitionDef,
};
use crate::graph::pose_buffer_pool::PoseBufferPool;
use crate::graph::skeleton::GraphSkeleton;
use crate::graph::sync_track::SyncTrack;
use crate::graph::task::TaskIndex;
use crate::graph::task_system::TaskSystem;
use crate::graph::transform::Transform;
use flint_core::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

pub type NodeRef = u16;
pub const INVALID_NODE: NodeRef = u16::MAX;

/// Result of updating a pose-producing node (spec §4.4: `update` returns
/// `{task_index, sampled_event_range, root_motion_delta}`).
#[derive(Debug, Clone, Copy)]
pub struct PoseNodeResult {
    pub task_index: Option<TaskIndex>,
    pub event_range: EventRange,
    pub root_motion_delta: Transform,
}

impl PoseNodeResult {
    pub const EMPTY: Self = Self {
        task_index: None,
        event_range: EventRange::EMPTY,
        root_motion_delta: Transform::IDENTITY,
    };
}

#[derive(Debug, Clone, Copy)]
pub enum ValueResult {
    Float(f32),
    Bool(bool),
    Target(Option<Transform>),
}

/// An external clip source a host registers so `Sample` nodes/tasks don't
/// need to know about this crate's Tier 1/2 clip representation directly —
/// the integration seam between the graph core and `crate::sampler`.
pub trait ClipSource {
    fn sample_local_pose(&self, clip_ref: u32, time_percentage: f32, skeleton: &GraphSkeleton) -> crate::graph::pose::Pose;
    fn duration(&self, clip_ref: u32) -> f32;
    fn sync_track(&self, clip_ref: u32) -> SyncTrack;
}

/// Pushed/popped around layer updates (spec §4.4.4); read by `State` nodes
/// to modify the layer's effective weight/mask as they update.
#[derive(Debug, Clone)]
pub struct LayerContext {
    pub weight: f32,
    pub mask: Option<BoneMask>,
    /// Set when the enclosing layer is synchronized: a `Sample` node inside
    /// it locks to this normalized playback position instead of advancing
    /// off its own accumulated time.
    pub sync_percentage: Option<f32>,
}

pub struct GraphContext<'a> {
    pub skeleton: &'a GraphSkeleton,
    pub task_system: &'a mut TaskSystem,
    pub pose_pool: &'a mut PoseBufferPool,
    pub mask_pool: &'a mut BoneMaskPool,
    pub events: &'a mut SampledEventBuffer,
    pub clip_source: &'a dyn ClipSource,
    pub delta_time: f32,
    pub layer_stack: Vec<LayerContext>,
    /// Monotonic per-update-pass counter; compared against each node's
    /// `last_updated_frame` to enforce "at most once per frame".
    pub frame_id: u64,
}

impl<'a> GraphContext<'a> {
    pub fn current_layer(&self) -> Option<&LayerContext> {
        self.layer_stack.last()
    }
}

#[derive(Clone)]
pub enum NodeDefinition {
    ReferencePose,
    ZeroPose,
    Sample(SampleDef),
    Blend(BlendDef),
    State(StateDef),
    StateMachine(StateMachineDef),
    Transition(TransitionDef),
    Layer(LayerDef),
    TwoBoneIk(TwoBoneIkDef),
    ChainSolver(ChainSolverDef),
    AimIk(AimIkDef),
    IkRig(IkRigDef),
    ConstFloat(f32),
    ConstBool(bool),
    Target(TargetDef),
    StateCompleted(StateCompletedDef),
    TimeCondition(TimeConditionDef),
}

#[derive(Debug, Clone, Default)]
pub struct NodeState {
    pub last_updated_frame: Option<u64>,
    pub cached_pose_result: Option<PoseNodeResult>,
    pub cached_value_result: Option<ValueResultStorage>,
    pub elapsed_time_in_state: f32,
    pub current_time_percentage: f32,
    pub transition_progress: f32,
    pub loop_count: u32,
    pub active_state_index: usize,
    pub is_initialized: bool,
    pub cached_pose_key: Option<u8>,
    /// `StateNode::TransitionState` (spec §4.4.1): 0 = None, 1 = In, 2 = Out.
    pub transition_lifecycle: u8,
    /// Index into the active state's transition list, while one is in flight.
    pub active_transition_slot: Option<usize>,
}

/// `ValueResult` without the `Transform`'s non-`Default` payload awkwardness,
/// so `NodeState` can derive `Default`.
#[derive(Debug, Clone, Copy)]
pub enum ValueResultStorage {
    Float(f32),
    Bool(bool),
    Target(Option<Transform>),
}

impl From<ValueResultStorage> for ValueResult {
    fn from(v: ValueResultStorage) -> Self {
        match v {
            ValueResultStorage::Float(f) => ValueResult::Float(f),
            ValueResultStorage::Bool(b) => ValueResult::Bool(b),
            ValueResultStorage::Target(t) => ValueResult::Target(t),
        }
    }
}

#[derive(Clone)]
pub struct NodeArena {
    definitions: Vec<NodeDefinition>,
    states: Vec<NodeState>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
            states: Vec::new(),
        }
    }

    pub fn add(&mut self, definition: NodeDefinition) -> NodeRef {
        debug_assert!(self.definitions.len() < INVALID_NODE as usize);
        self.definitions.push(definition);
        self.states.push(NodeState::default());
        (self.definitions.len() - 1) as NodeRef
    }

    pub fn definition(&self, node_ref: NodeRef) -> &NodeDefinition {
        &self.definitions[node_ref as usize]
    }

    pub fn state(&self, node_ref: NodeRef) -> &NodeState {
        &self.states[node_ref as usize]
    }

    pub fn state_mut(&mut self, node_ref: NodeRef) -> &mut NodeState {
        &mut self.states[node_ref as usize]
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Updates a pose-producing node, honoring the once-per-frame cache.
    pub fn update_pose(&mut self, node_ref: NodeRef, ctx: &mut GraphContext) -> PoseNodeResult {
        if self.states[node_ref as usize].last_updated_frame == Some(ctx.frame_id) {
            return self.states[node_ref as usize].cached_pose_result.unwrap_or(PoseNodeResult::EMPTY);
        }

        let definition = self.definitions[node_ref as usize].clone();
        let result = match &definition {
            NodeDefinition::ReferencePose => crate::graph::nodes::primitives::update_reference_pose(node_ref, ctx),
            NodeDefinition::ZeroPose => crate::graph::nodes::primitives::update_zero_pose(node_ref, ctx),
            NodeDefinition::Sample(def) => crate::graph::nodes::primitives::update_sample(def, self, node_ref, ctx),
            NodeDefinition::Blend(def) => crate::graph::nodes::primitives::update_blend(def, self, node_ref, ctx),
            NodeDefinition::State(def) => crate::graph::nodes::state::update(def, self, node_ref, ctx),
            NodeDefinition::StateMachine(def) => crate::graph::nodes::state_machine::update(def, self, node_ref, ctx),
            NodeDefinition::Transition(def) => crate::graph::nodes::transition::update(def, self, node_ref, ctx),
            NodeDefinition::Layer(def) => crate::graph::nodes::layer::update(def, self, ctx),
            NodeDefinition::TwoBoneIk(def) => crate::graph::nodes::ik_nodes::update_two_bone(def, self, node_ref, ctx),
            NodeDefinition::ChainSolver(def) => crate::graph::nodes::ik_nodes::update_chain_solver(def, self, node_ref, ctx),
            NodeDefinition::AimIk(def) => crate::graph::nodes::ik_nodes::update_aim(def, self, node_ref, ctx),
            NodeDefinition::IkRig(def) => crate::graph::nodes::ik_nodes::update_ik_rig(def, self, node_ref, ctx),
            _ => panic!("update_pose called on a value-node kind"),
        };

        let state = &mut self.states[node_ref as usize];
        state.last_updated_frame = Some(ctx.frame_id);
        state.cached_pose_result = Some(result);
        result
    }

    /// Evaluates a value node (float/bool/target), honoring the once-per-frame cache.
    pub fn get_value(&mut self, node_ref: NodeRef, ctx: &mut GraphContext) -> ValueResult {
        if self.states[node_ref as usize].last_updated_frame == Some(ctx.frame_id) {
            if let Some(cached) = self.states[node_ref as usize].cached_value_result {
                return cached.into();
            }
        }

        let definition = self.definitions[node_ref as usize].clone();
        let result = match &definition {
            NodeDefinition::ConstFloat(v) => ValueResult::Float(*v),
            NodeDefinition::ConstBool(v) => ValueResult::Bool(*v),
            NodeDefinition::Target(def) => ValueResult::Target(crate::graph::nodes::primitives::resolve_target(def, self, ctx)),
            NodeDefinition::StateCompleted(def) => ValueResult::Bool(crate::graph::nodes::conditions::state_completed(def, self)),
            NodeDefinition::TimeCondition(def) => ValueResult::Bool(crate::graph::nodes::conditions::time_condition(def, self, ctx)),
            _ => panic!("get_value called on a pose-node kind"),
        };

        let storage = match result {
            ValueResult::Float(f) => ValueResultStorage::Float(f),
            ValueResult::Bool(b) => ValueResultStorage::Bool(b),
            ValueResult::Target(t) => ValueResultStorage::Target(t),
        };
        let state = &mut self.states[node_ref as usize];
        state.last_updated_frame = Some(ctx.frame_id);
        state.cached_value_result = Some(storage);
        result
    }

    pub fn get_float(&mut self, node_ref: NodeRef, ctx: &mut GraphContext) -> f32 {
        match self.get_value(node_ref, ctx) {
            ValueResult::Float(f) => f,
            _ => panic!("expected a float-value node"),
        }
    }

    pub fn get_bool(&mut self, node_ref: NodeRef, ctx: &mut GraphContext) -> bool {
        match self.get_value(node_ref, ctx) {
            ValueResult::Bool(b) => b,
            _ => panic!("expected a bool-value node"),
        }
    }

    /// Shuts a node down, releasing any per-instance resources (e.g. a
    /// state's cached-pose pool slot) and cascading to children so an entire
    /// interrupted subtree gets its exit events and resets consistently.
    pub fn shutdown(&mut self, node_ref: NodeRef, ctx: &mut GraphContext) {
        if !self.states[node_ref as usize].is_initialized {
            return;
        }

        let definition = self.definitions[node_ref as usize].clone();
        match &definition {
            NodeDefinition::State(def) => {
                crate::graph::nodes::state::shutdown(def, self, node_ref, ctx);
            }
            NodeDefinition::Blend(def) => {
                self.shutdown(def.source, ctx);
                self.shutdown(def.target, ctx);
            }
            NodeDefinition::Transition(def) => {
                self.shutdown(def.source_state_node, ctx);
                self.shutdown(def.target_state_node, ctx);
            }
            NodeDefinition::StateMachine(def) => {
                let active = def.states[self.states[node_ref as usize].active_state_index].state_node;
                self.shutdown(active, ctx);
            }
            NodeDefinition::Layer(def) => {
                self.shutdown(def.base, ctx);
                for layer in &def.layers {
                    match layer.input {
                        crate::graph::nodes::layer::LayerInput::Local(child) => self.shutdown(child, ctx),
                        crate::graph::nodes::layer::LayerInput::StateMachine(child) => self.shutdown(child, ctx),
                    }
                }
            }
            NodeDefinition::TwoBoneIk(def) => self.shutdown(def.child, ctx),
            NodeDefinition::ChainSolver(def) => self.shutdown(def.child, ctx),
            NodeDefinition::AimIk(def) => self.shutdown(def.child, ctx),
            NodeDefinition::IkRig(def) => self.shutdown(def.child, ctx),
            _ => {}
        }

        self.states[node_ref as usize] = NodeState::default();
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a `Target` (spec §4.4.5) against the current pose into a
/// model-space transform: a direct absolute transform, or a bone lookup plus
/// an optional rotation/translation offset applied in bone- or world-space.
pub fn resolve_target_transform(
    pose: &mut crate::graph::pose::Pose,
    skeleton: &GraphSkeleton,
    bone_idx: Option<usize>,
    absolute: Option<Transform>,
    rotation_offset: Option<Quat>,
    translation_offset: Option<Vec3>,
    offset_in_bone_space: bool,
) -> Transform {
    let base = match bone_idx {
        Some(idx) => pose.model_transform(skeleton, idx),
        None => absolute.unwrap_or(Transform::IDENTITY),
    };

    if rotation_offset.is_none() && translation_offset.is_none() {
        return base;
    }

    let offset = Transform::new(
        rotation_offset.unwrap_or(Quat::IDENTITY),
        translation_offset.unwrap_or(Vec3::ZERO),
        1.0,
    );

    if offset_in_bone_space {
        offset.compose(base)
    } else {
        Transform::new(
            offset.rotation.mul(base.rotation),
            base.translation + offset.translation,
            base.scale,
        )
    }
}

// Re-exported so rig-bearing node definitions can hold a trait object
// without every `nodes/*.rs` file importing the full `ik::rig` path.
pub type SharedIkRig = Rc<RefCell<dyn IkRig>>;
