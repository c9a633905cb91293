//! `GraphDefinition` + `GraphInstance` (spec §3/§4.4): a definition is the
//! compiled, shareable node array a game builds once (or parses from a
//! `.graph.toml`); an instance is the per-character playback state built
//! from it, paired with a skeleton. Mirrors how `flint-animation::loader`
//! separates a parsed clip from the `AnimationPlayer` state that consumes it.

use crate::graph::bone_mask_pool::BoneMaskPool;
use crate::graph::error::{GraphError, Result};
use crate::graph::events::SampledEventBuffer;
use crate::graph::node::{ClipSource, GraphContext, NodeArena, NodeDefinition, NodeRef};
use crate::graph::pose::Pose;
use crate::graph::pose_buffer_pool::PoseBufferPool;
use crate::graph::skeleton::GraphSkeleton;
use crate::graph::task_system::TaskSystem;
use std::rc::Rc;

/// A compiled, shareable node graph: a flat node-definition array plus the
/// root node it evaluates from. Holds no per-instance state — many
/// `GraphInstance`s can be built from the same `GraphDefinition`.
#[derive(Clone)]
pub struct GraphDefinition {
    arena: NodeArena,
    root: NodeRef,
}

impl GraphDefinition {
    pub fn builder() -> GraphDefinitionBuilder {
        GraphDefinitionBuilder::new()
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

/// Builds a `GraphDefinition` node by node. Node definitions reference
/// children by the `NodeRef` returned from an earlier `add_node` call, so
/// children must be added before the parent that references them (the same
/// bottom-up order the offline compiler this replaces would emit).
pub struct GraphDefinitionBuilder {
    arena: NodeArena,
}

impl GraphDefinitionBuilder {
    pub fn new() -> Self {
        Self { arena: NodeArena::new() }
    }

    pub fn add_node(&mut self, definition: NodeDefinition) -> NodeRef {
        self.arena.add(definition)
    }

    pub fn build(self, root: NodeRef) -> Result<GraphDefinition> {
        if root as usize >= self.arena.len() {
            return Err(GraphError::Definition(format!("root node {root} is out of range for a {}-node graph", self.arena.len())));
        }
        Ok(GraphDefinition { arena: self.arena, root })
    }
}

impl Default for GraphDefinitionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-character playback state (spec §3's "GraphInstance state"): owns the
/// pose-buffer pool, bone-mask pool, sampled-event buffer, task system, and
/// the instantiated node tree (definitions cloned from a `GraphDefinition`,
/// states starting fresh). The layer context stack is transient per update
/// rather than stored here, since it is always empty both before and after a
/// top-level `update` call.
pub struct GraphInstance {
    arena: NodeArena,
    root: NodeRef,
    skeleton: Rc<GraphSkeleton>,
    pose_pool: PoseBufferPool,
    mask_pool: BoneMaskPool,
    task_system: TaskSystem,
    events: SampledEventBuffer,
    frame_id: u64,
}

impl GraphInstance {
    pub fn new(definition: &GraphDefinition, skeleton: Rc<GraphSkeleton>) -> Self {
        Self {
            arena: definition.arena.clone(),
            root: definition.root,
            pose_pool: PoseBufferPool::new(skeleton.clone()),
            mask_pool: BoneMaskPool::new(skeleton.clone()),
            skeleton,
            task_system: TaskSystem::new(),
            events: SampledEventBuffer::new(),
            frame_id: 0,
        }
    }

    pub fn skeleton(&self) -> &GraphSkeleton {
        &self.skeleton
    }

    pub fn events(&self) -> &SampledEventBuffer {
        &self.events
    }

    /// Advances the graph by `delta_time` seconds, producing this frame's
    /// pose: updates the node tree (registering tasks), executes the
    /// resulting task DAG, and releases the pose buffer pool's one-frame
    /// cached-pose grace period (spec §9's forced-transition design note).
    /// Returns the output pose, borrowed from the pool's buffer for this
    /// frame — valid until the next call to `update`.
    pub fn update(&mut self, delta_time: f32, clip_source: &dyn ClipSource) -> Result<&Pose> {
        self.frame_id += 1;
        self.task_system.reset();
        self.events.reset();

        let mut ctx = GraphContext {
            skeleton: &self.skeleton,
            task_system: &mut self.task_system,
            pose_pool: &mut self.pose_pool,
            mask_pool: &mut self.mask_pool,
            events: &mut self.events,
            clip_source,
            delta_time,
            layer_stack: Vec::new(),
            frame_id: self.frame_id,
        };

        let _ = self.arena.update_pose(self.root, &mut ctx);
        self.mask_pool.validate_all_released();

        let root_slot = self.task_system.execute(&self.skeleton, &mut self.pose_pool)?;
        self.pose_pool.advance_frame();

        match root_slot {
            Some(slot) => Ok(&self.pose_pool.get(slot).primary),
            None => Err(GraphError::Definition("graph produced no output task".to_string())),
        }
    }

    /// Tears the currently active node subtree down, emitting paired exit
    /// events and releasing any cached-pose slots still held. Call once
    /// before dropping a `GraphInstance` that reached at least one `update`.
    pub fn shutdown(&mut self, clip_source: &dyn ClipSource) {
        let mut ctx = GraphContext {
            skeleton: &self.skeleton,
            task_system: &mut self.task_system,
            pose_pool: &mut self.pose_pool,
            mask_pool: &mut self.mask_pool,
            events: &mut self.events,
            clip_source,
            delta_time: 0.0,
            layer_stack: Vec::new(),
            frame_id: self.frame_id,
        };
        self.arena.shutdown(self.root, &mut ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::NodeDefinition;
    use crate::graph::sync_track::SyncTrack;

    struct NullClipSource;

    impl ClipSource for NullClipSource {
        fn sample_local_pose(&self, _clip_ref: u32, _time_percentage: f32, skeleton: &GraphSkeleton) -> Pose {
            Pose::reference(skeleton, skeleton.bind_pose())
        }

        fn duration(&self, _clip_ref: u32) -> f32 {
            1.0
        }

        fn sync_track(&self, _clip_ref: u32) -> SyncTrack {
            SyncTrack::unsynchronized()
        }
    }

    fn two_bone_skeleton() -> GraphSkeleton {
        GraphSkeleton::new(vec!["root".into(), "child".into()], vec![-1, 0])
    }

    #[test]
    fn reference_pose_graph_produces_output() {
        let skeleton = Rc::new(two_bone_skeleton());
        let mut builder = GraphDefinition::builder();
        let root = builder.add_node(NodeDefinition::ReferencePose);
        let definition = builder.build(root).unwrap();

        let mut instance = GraphInstance::new(&definition, skeleton);
        let clip_source = NullClipSource;
        let pose = instance.update(1.0 / 60.0, &clip_source).unwrap();
        assert_eq!(pose.num_bones(), 2);
    }

    #[test]
    fn builder_rejects_out_of_range_root() {
        let builder = GraphDefinition::builder();
        assert!(builder.build(3).is_err());
    }
}
