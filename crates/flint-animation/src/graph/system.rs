//! Integration seam (spec §6 / SPEC_FULL §6): `GraphAnimationSystem` drives a
//! `HashMap<EntityId, GraphInstance>`, one `GraphInstance::update` per
//! character per frame, as a sibling to the existing Tier 1/2
//! `AnimationSystem`. The graph core itself is explicitly not ECS-bound
//! (spec §9's design notes), so unlike `SkeletalSync` this system does not
//! scan `FlintWorld` for components — a game registers graphs, skeletons and
//! clips directly through this type's API and calls `RuntimeSystem::update`
//! once per frame, matching `AnimationSystem::update`'s two-tier shape.

use crate::graph::instance::{GraphDefinition, GraphInstance};
use crate::graph::math::Quat;
use crate::graph::node::ClipSource;
use crate::graph::pose::Pose;
use crate::graph::skeleton::GraphSkeleton;
use crate::graph::sync_track::SyncTrack;
use crate::skeletal_clip::{JointProperty, SkeletalClip};
use crate::skeletal_sampler::sample_joint_track;
use flint_core::{EntityId, FlintError, Result, Vec3};
use flint_ecs::FlintWorld;
use flint_runtime::RuntimeSystem;
use std::collections::HashMap;
use std::rc::Rc;

/// Adapts the crate's Tier 1/2 clip representation to the graph core's
/// `ClipSource` seam (spec §6), grounded in `SkeletalSync::sample_clip_into_poses`'s
/// per-joint-track sampling, generalized to the graph's quaternion `Transform`.
/// Clips are referenced by a dense `u32` index assigned at registration time,
/// matching the wire format's non-self-describing bone/task/clip index scheme.
#[derive(Default)]
pub struct ClipSourceAdapter {
    clips: Vec<SkeletalClip>,
    index_by_name: HashMap<String, u32>,
}

impl ClipSourceAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a clip, returning the `clip_ref` graph nodes use to address it.
    pub fn register(&mut self, clip: SkeletalClip) -> u32 {
        let idx = self.clips.len() as u32;
        self.index_by_name.insert(clip.name.clone(), idx);
        self.clips.push(clip);
        idx
    }

    pub fn clip_ref(&self, name: &str) -> Option<u32> {
        self.index_by_name.get(name).copied()
    }
}

impl ClipSource for ClipSourceAdapter {
    fn sample_local_pose(&self, clip_ref: u32, time_percentage: f32, skeleton: &GraphSkeleton) -> Pose {
        let clip = &self.clips[clip_ref as usize];
        let mut pose = Pose::regular(skeleton);
        let time = time_percentage as f64 * clip.duration;

        for track in &clip.joint_tracks {
            if track.joint_index >= skeleton.num_bones() {
                continue;
            }
            let value = sample_joint_track(track, time);
            let mut local = pose.local_transform(track.joint_index);
            match track.property {
                JointProperty::Translation if value.len() >= 3 => {
                    local.translation = Vec3::new(value[0], value[1], value[2]);
                }
                JointProperty::Rotation if value.len() >= 4 => {
                    local.rotation = Quat::from_array([value[0], value[1], value[2], value[3]]);
                }
                // The graph's `Transform` carries a single uniform scale, unlike
                // the Tier 1/2 `JointPose`'s per-axis scale; average the three
                // components rather than dropping scale tracks entirely.
                JointProperty::Scale if value.len() >= 3 => {
                    local.scale = (value[0] + value[1] + value[2]) / 3.0;
                }
                _ => {}
            }
            pose.set_local_transform(track.joint_index, local);
        }

        pose
    }

    fn duration(&self, clip_ref: u32) -> f32 {
        self.clips[clip_ref as usize].duration as f32
    }

    fn sync_track(&self, _clip_ref: u32) -> SyncTrack {
        SyncTrack::unsynchronized()
    }
}

/// Tier 3 of the crate's animation system: one `GraphInstance` per character,
/// driven independently of the ECS-synced Tier 1/2 path.
pub struct GraphAnimationSystem {
    definitions: HashMap<String, GraphDefinition>,
    clip_source: ClipSourceAdapter,
    instances: HashMap<EntityId, GraphInstance>,
}

impl GraphAnimationSystem {
    pub fn new() -> Self {
        Self {
            definitions: HashMap::new(),
            clip_source: ClipSourceAdapter::new(),
            instances: HashMap::new(),
        }
    }

    pub fn register_definition(&mut self, name: impl Into<String>, definition: GraphDefinition) {
        self.definitions.insert(name.into(), definition);
    }

    pub fn register_clip(&mut self, clip: SkeletalClip) -> u32 {
        self.clip_source.register(clip)
    }

    pub fn clip_ref(&self, name: &str) -> Option<u32> {
        self.clip_source.clip_ref(name)
    }

    /// Instantiates `definition_name` for `entity_id` against `skeleton`,
    /// replacing any existing instance for that entity.
    pub fn spawn(&mut self, entity_id: EntityId, definition_name: &str, skeleton: Rc<GraphSkeleton>) -> Result<()> {
        let definition = self
            .definitions
            .get(definition_name)
            .ok_or_else(|| FlintError::AnimationError(format!("no graph definition registered under '{definition_name}'")))?;
        let instance = GraphInstance::new(definition, skeleton);
        self.instances.insert(entity_id, instance);
        Ok(())
    }

    pub fn despawn(&mut self, entity_id: EntityId, clip_source: Option<&dyn ClipSource>) {
        if let Some(mut instance) = self.instances.remove(&entity_id) {
            instance.shutdown(clip_source.unwrap_or(&self.clip_source));
        }
    }

    pub fn instance(&self, entity_id: EntityId) -> Option<&GraphInstance> {
        self.instances.get(&entity_id)
    }

    pub fn instance_mut(&mut self, entity_id: EntityId) -> Option<&mut GraphInstance> {
        self.instances.get_mut(&entity_id)
    }

    pub fn active_count(&self) -> usize {
        self.instances.len()
    }

    /// Advances every active instance by `dt` seconds, logging (not
    /// propagating) per-instance failures so one broken graph can't stall the
    /// rest of the cast — matches `GraphError`'s "degraded but usable"
    /// design (spec §7).
    fn advance_all(&mut self, dt: f32) {
        for (entity_id, instance) in self.instances.iter_mut() {
            if let Err(err) = instance.update(dt, &self.clip_source) {
                crate::graph_warn!("graph update failed for entity {:?}: {err}", entity_id);
            }
        }
    }
}

impl Default for GraphAnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeSystem for GraphAnimationSystem {
    fn initialize(&mut self, _world: &mut FlintWorld) -> Result<()> {
        println!(
            "Graph animation system initialized ({} graph definitions, {} clips)",
            self.definitions.len(),
            self.clip_source.clips.len()
        );
        Ok(())
    }

    fn fixed_update(&mut self, _world: &mut FlintWorld, _dt: f64) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, _world: &mut FlintWorld, dt: f64) -> Result<()> {
        self.advance_all(dt as f32);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        let entity_ids: Vec<EntityId> = self.instances.keys().copied().collect();
        for entity_id in entity_ids {
            self.despawn(entity_id, None);
        }
        println!("Graph animation system shut down");
        Ok(())
    }

    fn name(&self) -> &str {
        "graph_animation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::instance::GraphDefinition;
    use crate::graph::node::NodeDefinition;

    fn two_bone_skeleton() -> GraphSkeleton {
        GraphSkeleton::new(vec!["root".into(), "child".into()], vec![-1, 0])
    }

    #[test]
    fn spawn_and_advance_reference_pose_graph() {
        let mut system = GraphAnimationSystem::new();
        let mut builder = GraphDefinition::builder();
        let root = builder.add_node(NodeDefinition::ReferencePose);
        let definition = builder.build(root).unwrap();
        system.register_definition("idle", definition);

        let entity_id = EntityId(1);
        let skeleton = Rc::new(two_bone_skeleton());
        system.spawn(entity_id, "idle", skeleton).unwrap();
        assert_eq!(system.active_count(), 1);

        system.advance_all(1.0 / 60.0);
        assert!(system.instance(entity_id).is_some());
    }

    #[test]
    fn spawn_with_unknown_definition_errors() {
        let mut system = GraphAnimationSystem::new();
        let entity_id = EntityId(2);
        let skeleton = Rc::new(two_bone_skeleton());
        assert!(system.spawn(entity_id, "missing", skeleton).is_err());
    }
}
