//! Task system (spec §4.3): builder + executor over a post-order DAG of pose
//! tasks, grounded in `Code/Engine/Animation/TaskSystem/Animation_TaskSystem.cpp`.
//! Nodes call `register_task` during graph update; `execute` runs the
//! registered tasks in index order once the graph update finishes, handing
//! each task its dependencies' buffers through the pose buffer pool.

use crate::graph::bone_mask::BoneMask;
use crate::graph::error::{GraphError, Result};
use crate::graph::ik::rig::IkRig;
use crate::graph::ik::{aim, chain_solver, two_bone};
use crate::graph::math::{lerp, lerp_vec3, Quat};
use crate::graph::pose::{Pose, PoseType};
use crate::graph::pose_buffer_pool::PoseBufferPool;
use crate::graph::serialization::{BitReader, BitWriter};
use crate::graph::skeleton::{bits_for_count, GraphSkeleton};
use crate::graph::task::{
    AimIkTaskParams, BlendMode, BlendParams, ChainSolverTaskParams, SampleParams, Task, TaskIndex, TaskKind, TwoBoneIkTaskParams, UpdateStage,
};
use crate::graph::transform::Transform;
use flint_core::Vec3;

#[derive(Default)]
pub struct TaskSystem {
    tasks: Vec<Task>,
    /// Pool slot produced by each task, once executed. `None` before
    /// execution, and also `None` after a slot's ownership has been
    /// transferred or released to a later task.
    results: Vec<Option<usize>>,
}

impl TaskSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears registered tasks for a new frame. Must be called after the
    /// prior frame's `execute` and its consumer have finished reading.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.results.clear();
    }

    pub fn register_task(
        &mut self,
        kind: TaskKind,
        dependencies: Vec<TaskIndex>,
        source_node_id: u32,
        update_stage: UpdateStage,
    ) -> TaskIndex {
        for &dep in &dependencies {
            debug_assert!(dep < self.tasks.len(), "task dependency must reference an earlier task");
        }
        self.tasks.push(Task::new(kind, dependencies, source_node_id, update_stage));
        self.tasks.len() - 1
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Executes all registered tasks in index order. Returns the final
    /// task's output pool slot (the DAG's root), if any tasks were
    /// registered. The caller owns the returned slot and must release it.
    pub fn execute(&mut self, skeleton: &GraphSkeleton, pool: &mut PoseBufferPool) -> Result<Option<usize>> {
        self.results.clear();
        self.results.resize(self.tasks.len(), None);

        for i in 0..self.tasks.len() {
            let slot = {
                let task = &self.tasks[i];
                execute_one(&task.kind, &task.dependencies, skeleton, pool, &mut self.results)?
            };
            self.results[i] = Some(slot);
        }

        Ok(self.results.last().copied().flatten())
    }

    /// Serializes the registered task list to a bit stream for network
    /// replication (spec §4.3/§6): a 16-bit count prefix, then per task a
    /// 4-bit kind code, a 16-bit source node id, a 2-bit update stage, and
    /// the kind's dependency/payload fields. Dependency indices are packed
    /// at `ceil(log2(task_count))` bits and bone indices at
    /// `skeleton.bone_index_bits()`, matching the reader's derivation in
    /// `deserialize`. Fails if any task holds an `IkRig`, whose trait-object
    /// rig state cannot be generically serialized.
    pub fn serialize(&self, skeleton: &GraphSkeleton) -> Result<Vec<u8>> {
        let mut w = BitWriter::new();
        w.write_uint(self.tasks.len() as u32, 16);
        let dep_bits = bits_for_count(self.tasks.len());
        let bone_bits = skeleton.bone_index_bits();
        let mask_bits = skeleton.mask_index_bits();

        for task in &self.tasks {
            write_task(&mut w, task, dep_bits, bone_bits, mask_bits, skeleton)?;
        }

        Ok(w.into_bytes())
    }

    /// Reconstructs a task list from a stream written by `serialize` against
    /// a skeleton with the same bone/mask layout. IK tasks come back with
    /// `from_deserialized: true` so a caller never mistakes a replicated
    /// task for one still backed by a live target value node.
    pub fn deserialize(bytes: &[u8], skeleton: &GraphSkeleton) -> Result<Self> {
        let mut r = BitReader::new(bytes);
        let count = r.read_uint(16)? as usize;
        let dep_bits = bits_for_count(count);
        let bone_bits = skeleton.bone_index_bits();
        let mask_bits = skeleton.mask_index_bits();

        let mut tasks = Vec::with_capacity(count);
        for _ in 0..count {
            tasks.push(read_task(&mut r, dep_bits, bone_bits, mask_bits, skeleton)?);
        }

        Ok(Self { tasks, results: Vec::new() })
    }
}

const KIND_REFERENCE_POSE: u32 = 0;
const KIND_ZERO_POSE: u32 = 1;
const KIND_SAMPLE: u32 = 2;
const KIND_BLEND: u32 = 3;
const KIND_CACHED_POSE_WRITE: u32 = 4;
const KIND_CACHED_POSE_READ: u32 = 5;
const KIND_TWO_BONE_IK: u32 = 6;
const KIND_CHAIN_SOLVER: u32 = 7;
const KIND_AIM_IK: u32 = 8;

fn update_stage_code(stage: UpdateStage) -> u32 {
    match stage {
        UpdateStage::PrePhysics => 0,
        UpdateStage::PostPhysics => 1,
        UpdateStage::Any => 2,
    }
}

fn update_stage_from_code(code: u32) -> Result<UpdateStage> {
    match code {
        0 => Ok(UpdateStage::PrePhysics),
        1 => Ok(UpdateStage::PostPhysics),
        2 => Ok(UpdateStage::Any),
        other => Err(GraphError::Deserialization(format!("unknown update stage code {other}"))),
    }
}

fn blend_mode_code(mode: BlendMode) -> u32 {
    match mode {
        BlendMode::Interpolative => 0,
        BlendMode::Additive => 1,
        BlendMode::InterpolativeGlobalSpace => 2,
    }
}

fn blend_mode_from_code(code: u32) -> Result<BlendMode> {
    match code {
        0 => Ok(BlendMode::Interpolative),
        1 => Ok(BlendMode::Additive),
        2 => Ok(BlendMode::InterpolativeGlobalSpace),
        other => Err(GraphError::Deserialization(format!("unknown blend mode code {other}"))),
    }
}

fn write_transform(w: &mut BitWriter, t: Transform) {
    w.write_f32(t.rotation.x);
    w.write_f32(t.rotation.y);
    w.write_f32(t.rotation.z);
    w.write_f32(t.rotation.w);
    w.write_f32(t.translation.x);
    w.write_f32(t.translation.y);
    w.write_f32(t.translation.z);
    w.write_f32(t.scale);
}

fn read_transform(r: &mut BitReader) -> Result<Transform> {
    let rotation = Quat::new(r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?);
    let translation = Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?);
    let scale = r.read_f32()?;
    Ok(Transform::new(rotation, translation, scale))
}

fn write_vec3(w: &mut BitWriter, v: Vec3) {
    w.write_f32(v.x);
    w.write_f32(v.y);
    w.write_f32(v.z);
}

fn read_vec3(r: &mut BitReader) -> Result<Vec3> {
    Ok(Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?))
}

fn write_pose(w: &mut BitWriter, pose: &Pose, skeleton: &GraphSkeleton) {
    for bone_idx in 0..skeleton.num_bones() {
        write_transform(w, pose.local_transform(bone_idx));
    }
}

fn read_pose(r: &mut BitReader, skeleton: &GraphSkeleton) -> Result<Pose> {
    let mut pose = Pose::regular(skeleton);
    for bone_idx in 0..skeleton.num_bones() {
        pose.set_local_transform(bone_idx, read_transform(r)?);
    }
    Ok(pose)
}

/// Writes a blend mask as a lookup into the skeleton's registered mask
/// table (by id) rather than the full per-bone weight array. A cloned mask
/// whose id was never registered on this skeleton is dropped with a warning
/// instead of failing the whole stream (§7: never aborts the frame).
fn write_mask(w: &mut BitWriter, mask: &Option<BoneMask>, skeleton: &GraphSkeleton, mask_bits: u32) {
    let resolved = mask.as_ref().and_then(|m| m.id()).and_then(|id| skeleton.mask_index(id));
    match resolved {
        Some(idx) => {
            w.write_bool(true);
            w.write_uint(idx as u32, mask_bits);
        }
        None => {
            if mask.is_some() {
                crate::graph_warn!("blend task mask has no registered skeleton entry; dropping from serialized stream");
            }
            w.write_bool(false);
        }
    }
}

fn read_mask(r: &mut BitReader, skeleton: &GraphSkeleton, mask_bits: u32) -> Result<Option<BoneMask>> {
    if r.read_bool()? {
        let idx = r.read_uint(mask_bits)? as usize;
        Ok(Some(skeleton.mask(idx).clone()))
    } else {
        Ok(None)
    }
}

fn write_task(w: &mut BitWriter, task: &Task, dep_bits: u32, bone_bits: u32, mask_bits: u32, skeleton: &GraphSkeleton) -> Result<()> {
    w.write_uint(task.source_node_id, 16);
    w.write_uint(update_stage_code(task.update_stage), 2);

    match &task.kind {
        TaskKind::ReferencePose => w.write_uint(KIND_REFERENCE_POSE, 4),
        TaskKind::ZeroPose => w.write_uint(KIND_ZERO_POSE, 4),

        TaskKind::Sample(params) => {
            w.write_uint(KIND_SAMPLE, 4);
            write_pose(w, &params.sampled_local_pose, skeleton);
        }

        TaskKind::Blend(params) => {
            w.write_uint(KIND_BLEND, 4);
            w.write_uint(task.dependencies[0] as u32, dep_bits);
            w.write_uint(task.dependencies[1] as u32, dep_bits);
            w.write_uint(blend_mode_code(params.mode), 2);
            w.write_normalized_float8(params.weight);
            write_mask(w, &params.mask, skeleton, mask_bits);
        }

        TaskKind::CachedPoseWrite(key) => {
            w.write_uint(KIND_CACHED_POSE_WRITE, 4);
            w.write_uint(task.dependencies[0] as u32, dep_bits);
            w.write_uint(*key as u32, 8);
        }

        TaskKind::CachedPoseRead(key) => {
            w.write_uint(KIND_CACHED_POSE_READ, 4);
            w.write_uint(*key as u32, 8);
        }

        TaskKind::TwoBoneIk(params) => {
            w.write_uint(KIND_TWO_BONE_IK, 4);
            w.write_uint(task.dependencies[0] as u32, dep_bits);
            w.write_uint(params.params.effector_bone_idx as u32, bone_bits);
            w.write_f32(params.params.allowed_stretch_percentage);
            write_transform(w, params.target_model_space);
        }

        TaskKind::ChainSolver(params) => {
            w.write_uint(KIND_CHAIN_SOLVER, 4);
            w.write_uint(task.dependencies[0] as u32, dep_bits);
            w.write_uint(params.effector_bone_idx as u32, bone_bits);
            w.write_uint(params.chain_length as u32, bone_bits);
            w.write_bool(params.pivot_index.is_some());
            if let Some(pivot) = params.pivot_index {
                w.write_uint(pivot as u32, bone_bits);
            }
            w.write_f32(params.allowed_stretch);
            w.write_f32(params.stiffness);
            write_transform(w, params.target_model_space);
        }

        TaskKind::AimIk(params) => {
            w.write_uint(KIND_AIM_IK, 4);
            w.write_uint(task.dependencies[0] as u32, dep_bits);
            w.write_uint(params.params.bone_idx as u32, bone_bits);
            write_vec3(w, params.params.aim_axis);
            w.write_bool(params.params.max_angle_radians.is_some());
            if let Some(angle) = params.params.max_angle_radians {
                w.write_f32(angle);
            }
            write_transform(w, params.target_model_space);
        }

        TaskKind::IkRig(_) => {
            return Err(GraphError::Definition(
                "IK rig tasks hold a shared trait-object rig and cannot be wire-serialized".into(),
            ));
        }
    }

    Ok(())
}

fn read_task(r: &mut BitReader, dep_bits: u32, bone_bits: u32, mask_bits: u32, skeleton: &GraphSkeleton) -> Result<Task> {
    let source_node_id = r.read_uint(16)?;
    let update_stage = update_stage_from_code(r.read_uint(2)?)?;
    let kind_code = r.read_uint(4)?;

    let (kind, dependencies) = match kind_code {
        KIND_REFERENCE_POSE => (TaskKind::ReferencePose, vec![]),
        KIND_ZERO_POSE => (TaskKind::ZeroPose, vec![]),

        KIND_SAMPLE => {
            let sampled_local_pose = read_pose(r, skeleton)?;
            (TaskKind::Sample(SampleParams { sampled_local_pose }), vec![])
        }

        KIND_BLEND => {
            let source_dep = r.read_uint(dep_bits)? as usize;
            let target_dep = r.read_uint(dep_bits)? as usize;
            let mode = blend_mode_from_code(r.read_uint(2)?)?;
            let weight = r.read_normalized_float8()?;
            let mask = read_mask(r, skeleton, mask_bits)?;
            (TaskKind::Blend(BlendParams { mode, weight, mask }), vec![source_dep, target_dep])
        }

        KIND_CACHED_POSE_WRITE => {
            let dep = r.read_uint(dep_bits)? as usize;
            let key = r.read_uint(8)? as u8;
            (TaskKind::CachedPoseWrite(key), vec![dep])
        }

        KIND_CACHED_POSE_READ => {
            let key = r.read_uint(8)? as u8;
            (TaskKind::CachedPoseRead(key), vec![])
        }

        KIND_TWO_BONE_IK => {
            let dep = r.read_uint(dep_bits)? as usize;
            let effector_bone_idx = r.read_uint(bone_bits)? as usize;
            let allowed_stretch_percentage = r.read_f32()?;
            let target_model_space = read_transform(r)?;
            (
                TaskKind::TwoBoneIk(TwoBoneIkTaskParams {
                    params: two_bone::TwoBoneIkParams { effector_bone_idx, allowed_stretch_percentage },
                    target_model_space,
                    from_deserialized: true,
                }),
                vec![dep],
            )
        }

        KIND_CHAIN_SOLVER => {
            let dep = r.read_uint(dep_bits)? as usize;
            let effector_bone_idx = r.read_uint(bone_bits)? as usize;
            let chain_length = r.read_uint(bone_bits)? as usize;
            let pivot_index = if r.read_bool()? { Some(r.read_uint(bone_bits)? as usize) } else { None };
            let allowed_stretch = r.read_f32()?;
            let stiffness = r.read_f32()?;
            let target_model_space = read_transform(r)?;
            (
                TaskKind::ChainSolver(ChainSolverTaskParams {
                    effector_bone_idx,
                    chain_length,
                    target_model_space,
                    pivot_index,
                    allowed_stretch,
                    stiffness,
                }),
                vec![dep],
            )
        }

        KIND_AIM_IK => {
            let dep = r.read_uint(dep_bits)? as usize;
            let bone_idx = r.read_uint(bone_bits)? as usize;
            let aim_axis = read_vec3(r)?;
            let max_angle_radians = if r.read_bool()? { Some(r.read_f32()?) } else { None };
            let target_model_space = read_transform(r)?;
            (
                TaskKind::AimIk(AimIkTaskParams {
                    params: aim::AimIkParams { bone_idx, aim_axis, max_angle_radians },
                    target_model_space,
                }),
                vec![dep],
            )
        }

        other => return Err(GraphError::Deserialization(format!("unknown task kind code {other}"))),
    };

    Ok(Task { kind, dependencies, source_node_id, update_stage })
}

fn execute_one(
    kind: &TaskKind,
    dependencies: &[TaskIndex],
    skeleton: &GraphSkeleton,
    pool: &mut PoseBufferPool,
    results: &mut [Option<usize>],
) -> Result<usize> {
    let slot = match kind {
        TaskKind::ReferencePose => {
            let slot = pool.acquire_new_buffer();
            let buffer = pool.get_mut(slot);
            buffer.primary = Pose::reference(skeleton, skeleton.bind_pose());
            buffer.mark_set();
            slot
        }

        TaskKind::ZeroPose => {
            let slot = pool.acquire_new_buffer();
            let buffer = pool.get_mut(slot);
            let mut pose = Pose::zero(skeleton);
            pose.set_pose_type(PoseType::AdditivePose);
            buffer.primary = pose;
            buffer.mark_set();
            slot
        }

        TaskKind::Sample(params) => {
            let slot = pool.acquire_new_buffer();
            let buffer = pool.get_mut(slot);
            buffer.primary.copy_from(&params.sampled_local_pose);
            buffer.mark_set();
            slot
        }

        TaskKind::Blend(params) => {
            let source_dep = dependencies[0];
            let target_dep = dependencies[1];
            let source_slot = transfer(results, source_dep);
            let target_slot = access(results, target_dep);

            let (source_buffer, target_buffer) = pool.get_pair_mut(source_slot, target_slot);
            let blended = blend_poses(
                skeleton,
                &mut source_buffer.primary,
                &mut target_buffer.primary,
                params.mode,
                params.weight,
                params.mask.as_ref(),
            );
            source_buffer.primary = blended;
            source_buffer.mark_set();

            release(pool, results, target_dep);
            source_slot
        }

        TaskKind::CachedPoseWrite(key) => {
            let source_dep = dependencies[0];
            let source_slot = transfer(results, source_dep);
            let cached_slot = pool.get_or_create_cached(*key)?;
            pool.copy_buffer(cached_slot, source_slot);
            source_slot
        }

        TaskKind::CachedPoseRead(key) => {
            let slot = pool.acquire_new_buffer();
            match pool.get_cached(*key) {
                Some(cached_slot) => pool.copy_buffer(slot, cached_slot),
                None => pool.get_mut(slot).mark_unset(),
            }
            slot
        }

        TaskKind::TwoBoneIk(params) => {
            let dep = dependencies[0];
            let slot = transfer(results, dep);
            let buffer = pool.get_mut(slot);
            // target_model_space is already fully resolved whether this task
            // came from a live Target node or off the wire (from_deserialized).
            two_bone::solve(&mut buffer.primary, skeleton, params.params, params.target_model_space);
            slot
        }

        TaskKind::ChainSolver(params) => {
            let dep = dependencies[0];
            let slot = transfer(results, dep);
            let buffer = pool.get_mut(slot);
            chain_solver::solve(
                &mut buffer.primary,
                skeleton,
                params.effector_bone_idx,
                params.chain_length,
                params.target_model_space,
                params.pivot_index,
                params.allowed_stretch,
                params.stiffness,
            );
            slot
        }

        TaskKind::AimIk(params) => {
            let dep = dependencies[0];
            let slot = transfer(results, dep);
            let buffer = pool.get_mut(slot);
            aim::solve(&mut buffer.primary, skeleton, params.params, params.target_model_space);
            slot
        }

        TaskKind::IkRig(params) => {
            let dep = dependencies[0];
            let slot = transfer(results, dep);
            let buffer = pool.get_mut(slot);
            let mut rig = params.rig.borrow_mut();
            for &(effector_slot, target) in &params.effector_targets {
                rig.set_target(effector_slot, target);
            }
            rig.solve(&mut buffer.primary, skeleton);
            slot
        }
    };

    Ok(slot)
}

fn transfer(results: &mut [Option<usize>], dep: TaskIndex) -> usize {
    results[dep]
        .take()
        .expect("task dependency buffer was already consumed or has not executed yet")
}

fn access(results: &[Option<usize>], dep: TaskIndex) -> usize {
    results[dep].expect("task dependency buffer is not available")
}

fn release(pool: &mut PoseBufferPool, results: &mut [Option<usize>], dep: TaskIndex) {
    if let Some(slot) = results[dep].take() {
        pool.release(slot);
    }
}

fn scalar_weight(mask: Option<&BoneMask>, weight: f32, bone_idx: usize) -> f32 {
    match mask {
        Some(m) => weight * m.weight(bone_idx),
        None => weight,
    }
}

/// Blend semantics (spec §4.3). `Zero`-tagged masks never reach here — the
/// mask produced by a task list is resolved to a weight per bone regardless
/// of tag, since the `Zero`/`One` short-circuit is the *mask's* optimization,
/// not the blend task's; a `Zero` mask simply yields `weight == 0` for every
/// bone here, which already reduces to a no-op per-bone.
fn blend_poses(
    skeleton: &GraphSkeleton,
    source: &mut Pose,
    target: &mut Pose,
    mode: BlendMode,
    weight: f32,
    mask: Option<&BoneMask>,
) -> Pose {
    let num_bones = skeleton.num_bones();
    let mut result = Pose::regular(skeleton);

    match mode {
        BlendMode::Interpolative => {
            for bone_idx in 0..num_bones {
                let w = scalar_weight(mask, weight, bone_idx);
                let s = source.local_transform(bone_idx);
                let t = target.local_transform(bone_idx);
                result.set_local_transform(
                    bone_idx,
                    Transform::new(s.rotation.nlerp(t.rotation, w), lerp_vec3(s.translation, t.translation, w), lerp(s.scale, t.scale, w)),
                );
            }
        }

        BlendMode::Additive => {
            for bone_idx in 0..num_bones {
                let w = scalar_weight(mask, weight, bone_idx);
                let s = source.local_transform(bone_idx);
                let t = target.local_transform(bone_idx);
                let scaled_delta = Transform::new(Quat::IDENTITY.nlerp(t.rotation, w), t.translation * w, lerp(1.0, t.scale, w));
                result.set_local_transform(bone_idx, scaled_delta.compose(s));
            }
        }

        BlendMode::InterpolativeGlobalSpace => {
            let mut new_model = vec![Transform::IDENTITY; num_bones];
            for bone_idx in 0..num_bones {
                let w = scalar_weight(mask, weight, bone_idx);
                let s = source.model_transform(skeleton, bone_idx);
                let t = target.model_transform(skeleton, bone_idx);
                new_model[bone_idx] = Transform::new(s.rotation.nlerp(t.rotation, w), lerp_vec3(s.translation, t.translation, w), lerp(s.scale, t.scale, w));
            }
            for bone_idx in 0..num_bones {
                let local = match skeleton.parent_index(bone_idx) {
                    Some(parent) => new_model[parent].delta_from(new_model[bone_idx]),
                    None => new_model[bone_idx],
                };
                result.set_local_transform(bone_idx, local);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::task::{BlendParams, SampleParams};
    use flint_core::Vec3;
    use std::rc::Rc;

    fn chain_skeleton(n: usize) -> GraphSkeleton {
        let ids: Vec<String> = (0..n).map(|i| format!("bone_{i}")).collect();
        let parents: Vec<i32> = (0..n as i32).map(|i| i - 1).collect();
        GraphSkeleton::new(ids, parents)
    }

    #[test]
    fn reference_pose_task_emits_bind_pose() {
        let mut skeleton = chain_skeleton(2);
        skeleton.set_bind_pose(vec![Transform::IDENTITY, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0))]);
        let skeleton = Rc::new(skeleton);
        let mut pool = PoseBufferPool::new(skeleton.clone());
        let mut system = TaskSystem::new();
        system.register_task(TaskKind::ReferencePose, vec![], 0, UpdateStage::Any);

        let root = system.execute(&skeleton, &mut pool).unwrap().unwrap();
        let buffer = pool.get(root);
        assert!((buffer.primary.local_transform(1).translation.x - 1.0).abs() < 1e-6);
        pool.release(root);
    }

    #[test]
    fn blend_task_interpolates_between_sample_outputs() {
        let skeleton = Rc::new(chain_skeleton(2));
        let mut pool = PoseBufferPool::new(skeleton.clone());
        let mut system = TaskSystem::new();

        let mut pose_a = Pose::regular(&skeleton);
        pose_a.set_local_transform(1, Transform::from_translation(Vec3::new(0.0, 0.0, 0.0)));
        let mut pose_b = Pose::regular(&skeleton);
        pose_b.set_local_transform(1, Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)));

        let a = system.register_task(TaskKind::Sample(SampleParams { sampled_local_pose: pose_a }), vec![], 0, UpdateStage::Any);
        let b = system.register_task(TaskKind::Sample(SampleParams { sampled_local_pose: pose_b }), vec![], 0, UpdateStage::Any);
        system.register_task(
            TaskKind::Blend(BlendParams {
                mode: BlendMode::Interpolative,
                weight: 0.5,
                mask: None,
            }),
            vec![a, b],
            0,
            UpdateStage::Any,
        );

        let root = system.execute(&skeleton, &mut pool).unwrap().unwrap();
        let buffer = pool.get(root);
        assert!((buffer.primary.local_transform(1).translation.x - 5.0).abs() < 1e-4);
        pool.release(root);
    }

    #[test]
    fn cached_pose_write_then_read_round_trips() {
        let skeleton = Rc::new(chain_skeleton(2));
        let mut pool = PoseBufferPool::new(skeleton.clone());

        let mut write_system = TaskSystem::new();
        let mut source_pose = Pose::regular(&skeleton);
        source_pose.set_local_transform(1, Transform::from_translation(Vec3::new(3.0, 0.0, 0.0)));
        let sample = write_system.register_task(TaskKind::Sample(SampleParams { sampled_local_pose: source_pose }), vec![], 0, UpdateStage::Any);
        write_system.register_task(TaskKind::CachedPoseWrite(7), vec![sample], 0, UpdateStage::Any);
        let written_root = write_system.execute(&skeleton, &mut pool).unwrap().unwrap();
        pool.release(written_root);

        let mut read_system = TaskSystem::new();
        read_system.register_task(TaskKind::CachedPoseRead(7), vec![], 0, UpdateStage::Any);
        let read_root = read_system.execute(&skeleton, &mut pool).unwrap().unwrap();
        let buffer = pool.get(read_root);
        assert!((buffer.primary.local_transform(1).translation.x - 3.0).abs() < 1e-6);
        pool.release(read_root);
    }

    #[test]
    fn cached_pose_read_with_missing_key_marks_unset() {
        let skeleton = Rc::new(chain_skeleton(2));
        let mut pool = PoseBufferPool::new(skeleton.clone());
        let mut system = TaskSystem::new();
        system.register_task(TaskKind::CachedPoseRead(42), vec![], 0, UpdateStage::Any);
        let root = system.execute(&skeleton, &mut pool).unwrap().unwrap();
        assert!(!pool.get(root).is_set());
        pool.release(root);
    }

    #[test]
    fn blend_task_system_round_trips_through_the_wire() {
        let skeleton = chain_skeleton(3);

        let mut pose_a = Pose::regular(&skeleton);
        pose_a.set_local_transform(1, Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        let mut pose_b = Pose::regular(&skeleton);
        pose_b.set_local_transform(1, Transform::from_translation(Vec3::new(3.0, 0.0, 0.0)));

        let mut system = TaskSystem::new();
        let a = system.register_task(TaskKind::Sample(SampleParams { sampled_local_pose: pose_a }), vec![], 10, UpdateStage::Any);
        let b = system.register_task(TaskKind::Sample(SampleParams { sampled_local_pose: pose_b }), vec![], 11, UpdateStage::Any);
        system.register_task(
            TaskKind::Blend(BlendParams { mode: BlendMode::Interpolative, weight: 0.25, mask: None }),
            vec![a, b],
            12,
            UpdateStage::PostPhysics,
        );

        let bytes = system.serialize(&skeleton).unwrap();
        let mut restored = TaskSystem::deserialize(&bytes, &skeleton).unwrap();
        assert_eq!(restored.len(), 3);

        let mut pool = PoseBufferPool::new(Rc::new(skeleton.clone()));
        let root = restored.execute(&skeleton, &mut pool).unwrap().unwrap();
        assert!((pool.get(root).primary.local_transform(1).translation.x - 1.5).abs() < 1e-4);
        pool.release(root);
    }

    #[test]
    fn two_bone_ik_task_round_trips_with_from_deserialized_set() {
        let mut skeleton = chain_skeleton(3);
        skeleton.set_bind_pose(vec![
            Transform::IDENTITY,
            Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)),
        ]);

        let mut system = TaskSystem::new();
        let sample = system.register_task(TaskKind::ReferencePose, vec![], 0, UpdateStage::Any);
        system.register_task(
            TaskKind::TwoBoneIk(TwoBoneIkTaskParams {
                params: two_bone::TwoBoneIkParams { effector_bone_idx: 2, allowed_stretch_percentage: 0.0 },
                target_model_space: Transform::from_translation(Vec3::new(1.5, 0.5, 0.0)),
                from_deserialized: false,
            }),
            vec![sample],
            3,
            UpdateStage::PostPhysics,
        );

        let bytes = system.serialize(&skeleton).unwrap();
        let restored = TaskSystem::deserialize(&bytes, &skeleton).unwrap();
        match &restored.tasks[1].kind {
            TaskKind::TwoBoneIk(params) => assert!(params.from_deserialized),
            _ => panic!("expected a two-bone IK task"),
        }
    }

    #[test]
    fn ik_rig_task_refuses_to_serialize() {
        use crate::graph::ik::rig::IkRig;
        use crate::graph::task::IkRigTaskParams;
        use std::cell::RefCell;

        struct NullRig;
        impl IkRig for NullRig {
            fn set_target(&mut self, _slot: usize, _target: Transform) {}
            fn solve(&mut self, _pose: &mut Pose, _skeleton: &GraphSkeleton) {}
        }

        let skeleton = chain_skeleton(2);
        let mut system = TaskSystem::new();
        let sample = system.register_task(TaskKind::ReferencePose, vec![], 0, UpdateStage::Any);
        system.register_task(
            TaskKind::IkRig(IkRigTaskParams { rig: Rc::new(RefCell::new(NullRig)), effector_targets: vec![(0, Transform::IDENTITY)] }),
            vec![sample],
            1,
            UpdateStage::PostPhysics,
        );

        assert!(system.serialize(&skeleton).is_err());
    }
}
