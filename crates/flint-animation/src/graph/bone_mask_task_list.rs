//! Deferred bone mask construction (spec §4.1), grounded in
//! `AnimationBoneMask.cpp`'s `BoneMaskTaskList`/`BoneMaskTask`. A task list is
//! a small post-order DAG (at most 127 entries) of mask references and
//! combine/blend/scale operations, evaluated once per frame into a single
//! `BoneMask`, optionally backed by a pool slot the caller must release.

use crate::graph::bone_mask::BoneMask;
use crate::graph::bone_mask_pool::BoneMaskPool;
use crate::graph::serialization::{BitReader, BitWriter};
use crate::graph::skeleton::{bits_for_count, GraphSkeleton};
use crate::graph::error::Result;

pub const MAX_TASKS: usize = 127;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskKind {
    Mask = 0,
    GenerateMask = 1,
    Blend = 2,
    Scale = 3,
    Combine = 4,
}

impl TaskKind {
    fn from_code(code: u8) -> Self {
        match code {
            0 => TaskKind::Mask,
            1 => TaskKind::GenerateMask,
            2 => TaskKind::Blend,
            3 => TaskKind::Scale,
            4 => TaskKind::Combine,
            _ => panic!("invalid bone mask task kind code {code}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BoneMaskTask {
    pub kind: TaskKind,
    /// Valid for `Mask`: index into the skeleton's registered mask list.
    pub mask_idx: usize,
    /// Valid for `Blend`/`Scale`/`Combine`.
    pub source_task_idx: usize,
    /// Valid for `Blend`/`Combine`.
    pub target_task_idx: usize,
    /// Valid for `GenerateMask` (fixed weight) / `Blend`/`Scale` (blend or
    /// scale factor).
    pub weight: f32,
}

impl BoneMaskTask {
    pub fn reference_mask(mask_idx: usize) -> Self {
        Self {
            kind: TaskKind::Mask,
            mask_idx,
            source_task_idx: 0,
            target_task_idx: 0,
            weight: 0.0,
        }
    }

    pub fn generate(weight: f32) -> Self {
        Self {
            kind: TaskKind::GenerateMask,
            mask_idx: 0,
            source_task_idx: 0,
            target_task_idx: 0,
            weight,
        }
    }

    pub fn blend(source_task_idx: usize, target_task_idx: usize, weight: f32) -> Self {
        Self {
            kind: TaskKind::Blend,
            mask_idx: 0,
            source_task_idx,
            target_task_idx,
            weight,
        }
    }

    pub fn scale(source_task_idx: usize, weight: f32) -> Self {
        Self {
            kind: TaskKind::Scale,
            mask_idx: 0,
            source_task_idx,
            target_task_idx: 0,
            weight,
        }
    }

    pub fn combine(source_task_idx: usize, target_task_idx: usize) -> Self {
        Self {
            kind: TaskKind::Combine,
            mask_idx: 0,
            source_task_idx,
            target_task_idx: 0,
            weight: -1.0,
        }
        .with_target(target_task_idx)
    }

    fn with_target(mut self, target_task_idx: usize) -> Self {
        self.target_task_idx = target_task_idx;
        self
    }

    fn is_reference(&self) -> bool {
        matches!(self.kind, TaskKind::Mask)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoneMaskTaskList {
    tasks: Vec<BoneMaskTask>,
}

/// Either a directly-referenced skeleton mask (no pool slot to release) or a
/// generated mask owned by a pool slot the caller must release.
pub struct GeneratedMask {
    pub pool_slot: Option<usize>,
}

impl BoneMaskTaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single_reference(mask_idx: usize) -> Self {
        Self {
            tasks: vec![BoneMaskTask::reference_mask(mask_idx)],
        }
    }

    pub fn single_fixed_weight(weight: f32) -> Self {
        Self {
            tasks: vec![BoneMaskTask::generate(weight)],
        }
    }

    pub fn last_task_idx(&self) -> usize {
        self.tasks.len() - 1
    }

    pub fn push(&mut self, task: BoneMaskTask) -> usize {
        debug_assert!(self.tasks.len() < MAX_TASKS);
        self.tasks.push(task);
        self.last_task_idx()
    }

    /// Builds a list that blends `source` towards `target`, matching the
    /// source's three-way constructor: at the extremes the result is just
    /// the corresponding input list's tasks, otherwise source's tasks are
    /// kept and a final blend task is appended.
    pub fn from_blend(source: &BoneMaskTaskList, target: &BoneMaskTaskList, blend_weight: f32) -> Self {
        if blend_weight == 0.0 {
            source.clone()
        } else if blend_weight == 1.0 {
            target.clone()
        } else {
            let mut result = source.clone();
            result.blend_to(target, blend_weight);
            result
        }
    }

    /// Appends `target`'s tasks (with dependency indices offset) and a final
    /// blend task against them; returns the new last task index.
    pub fn blend_to(&mut self, target: &BoneMaskTaskList, blend_weight: f32) -> usize {
        let source_last = self.last_task_idx();
        let target_last = self.append_and_fix_dependencies(target);
        self.push(BoneMaskTask::blend(source_last, target_last, blend_weight))
    }

    fn append_and_fix_dependencies(&mut self, other: &BoneMaskTaskList) -> usize {
        let offset = self.last_task_idx() + 1;
        for task in &other.tasks {
            let mut copy = *task;
            if matches!(copy.kind, TaskKind::Blend | TaskKind::Combine) {
                copy.source_task_idx += offset;
                copy.target_task_idx += offset;
            } else if matches!(copy.kind, TaskKind::Scale) {
                copy.source_task_idx += offset;
            }
            self.tasks.push(copy);
        }
        debug_assert!(self.tasks.len() < MAX_TASKS + 1);
        self.last_task_idx()
    }

    /// Appends a generated fixed-weight mask and a blend task towards it,
    /// or replaces the whole list with the generated mask at full weight.
    pub fn blend_to_generated_mask(&mut self, mask_weight: f32, blend_weight: f32) -> usize {
        if blend_weight == 0.0 {
            // no-op
        } else if blend_weight == 1.0 {
            self.tasks.clear();
            self.tasks.push(BoneMaskTask::generate(mask_weight));
        } else {
            let source_idx = self.last_task_idx();
            self.push(BoneMaskTask::generate(mask_weight));
            let target_idx = self.last_task_idx();
            self.push(BoneMaskTask::blend(source_idx, target_idx, blend_weight));
        }
        self.last_task_idx()
    }

    /// Evaluates the task list bottom-up. Returns the resulting mask's pool
    /// slot if one was generated (the caller must release it), or `None` if
    /// the result is a direct reference to a skeleton-owned mask.
    pub fn generate(&self, skeleton: &GraphSkeleton, pool: &mut BoneMaskPool) -> (usize, Option<usize>) {
        let num_tasks = self.tasks.len();
        debug_assert!(num_tasks <= MAX_TASKS);

        if num_tasks == 1 {
            return match self.tasks[0].kind {
                TaskKind::GenerateMask => {
                    let slot = pool.acquire(false);
                    pool.get_mut(slot).reset(self.tasks[0].weight);
                    (slot, Some(slot))
                }
                TaskKind::Mask => (self.tasks[0].mask_idx, None),
                _ => unreachable!("single-task bone mask lists may only reference or generate"),
            };
        }

        // mask_indices[i]: pool slot produced by task i, or `None` if task i
        // is a direct skeleton-mask reference.
        let mut mask_indices: Vec<Option<usize>> = Vec::with_capacity(num_tasks);

        for i in 0..num_tasks {
            let task = self.tasks[i];

            if task.is_reference() {
                mask_indices.push(None);
                continue;
            }

            match task.kind {
                TaskKind::GenerateMask => {
                    let slot = pool.acquire(false);
                    pool.get_mut(slot).reset(task.weight);
                    mask_indices.push(Some(slot));
                }
                TaskKind::Scale => {
                    let source_task = self.tasks[task.source_task_idx];
                    let produced_slot = if source_task.is_reference() {
                        let slot = pool.acquire(false);
                        *pool.get_mut(slot) = skeleton.mask(source_task.mask_idx).clone();
                        slot
                    } else {
                        mask_indices[task.source_task_idx].expect("scale source must produce a mask")
                    };
                    pool.get_mut(produced_slot).scale_weights(task.weight);
                    mask_indices.push(Some(produced_slot));
                }
                TaskKind::Blend | TaskKind::Combine => {
                    let source_task = self.tasks[task.source_task_idx];
                    let target_task = self.tasks[task.target_task_idx];
                    let source_is_ref = source_task.is_reference();
                    let target_is_ref = target_task.is_reference();

                    if source_is_ref && target_is_ref {
                        let slot = pool.acquire(false);
                        *pool.get_mut(slot) = skeleton.mask(source_task.mask_idx).clone();
                        let target_mask = skeleton.mask(target_task.mask_idx).clone();
                        if matches!(task.kind, TaskKind::Combine) {
                            pool.get_mut(slot).combine_with(&target_mask);
                        } else {
                            pool.get_mut(slot).blend_to(&target_mask, task.weight);
                        }
                        mask_indices.push(Some(slot));
                    } else if source_is_ref {
                        let target_slot = mask_indices[task.target_task_idx]
                            .expect("blend target must produce a mask");
                        let source_mask = skeleton.mask(source_task.mask_idx).clone();
                        if matches!(task.kind, TaskKind::Combine) {
                            pool.get_mut(target_slot).combine_with(&source_mask);
                        } else {
                            pool.get_mut(target_slot).blend_from(&source_mask, task.weight);
                        }
                        mask_indices.push(Some(target_slot));
                    } else if target_is_ref {
                        let source_slot = mask_indices[task.source_task_idx]
                            .expect("blend source must produce a mask");
                        let target_mask = skeleton.mask(target_task.mask_idx).clone();
                        if matches!(task.kind, TaskKind::Combine) {
                            pool.get_mut(source_slot).combine_with(&target_mask);
                        } else {
                            pool.get_mut(source_slot).blend_to(&target_mask, task.weight);
                        }
                        mask_indices.push(Some(source_slot));
                    } else {
                        let source_slot = mask_indices[task.source_task_idx]
                            .expect("blend source must produce a mask");
                        let target_slot = mask_indices[task.target_task_idx]
                            .expect("blend target must produce a mask");
                        let source_clone = pool.get(source_slot).clone();
                        if matches!(task.kind, TaskKind::Combine) {
                            pool.get_mut(target_slot).combine_with(&source_clone);
                        } else {
                            pool.get_mut(target_slot).blend_from(&source_clone, task.weight);
                        }
                        pool.release(source_slot);
                        mask_indices.push(Some(target_slot));
                    }
                }
                TaskKind::Mask => unreachable!(),
            }
        }

        let last = mask_indices[num_tasks - 1].expect("final bone mask task must produce a pool mask");
        (last, Some(last))
    }

    /// Number of bits used to serialize a task index into this list, per
    /// the wire format derivation in §6 (`ceil(log2(task_count))`).
    pub fn task_index_bits(&self) -> u32 {
        bits_for_count(self.tasks.len())
    }

    /// 5-bit task count prefix, 3-bit kind code per task, task-index fields
    /// sized to `task_index_bits`, mask indices sized to `max_bits_for_mask`
    /// (caller-supplied — derived from the encoding skeleton's registered
    /// mask count), 8-bit normalized floats for weights.
    pub fn serialize(&self, writer: &mut BitWriter, max_bits_for_mask: u32) {
        let num_tasks = self.tasks.len() as u32;
        debug_assert!(num_tasks <= 31);
        writer.write_uint(num_tasks, 5);

        let index_bits = self.task_index_bits();

        for task in &self.tasks {
            writer.write_uint(task.kind as u32, 3);
            match task.kind {
                TaskKind::Mask => writer.write_uint(task.mask_idx as u32, max_bits_for_mask),
                TaskKind::GenerateMask => writer.write_normalized_float8(task.weight),
                TaskKind::Blend => {
                    writer.write_uint(task.source_task_idx as u32, index_bits);
                    writer.write_uint(task.target_task_idx as u32, index_bits);
                    writer.write_normalized_float8(task.weight);
                }
                TaskKind::Scale => {
                    writer.write_uint(task.source_task_idx as u32, index_bits);
                    writer.write_normalized_float8(task.weight);
                }
                TaskKind::Combine => {
                    writer.write_uint(task.source_task_idx as u32, index_bits);
                    writer.write_uint(task.target_task_idx as u32, index_bits);
                }
            }
        }
    }

    pub fn deserialize(reader: &mut BitReader, max_bits_for_mask: u32) -> Result<Self> {
        let num_tasks = reader.read_uint(5)?;
        let index_bits = bits_for_count(num_tasks as usize);

        let mut tasks = Vec::with_capacity(num_tasks as usize);
        for _ in 0..num_tasks {
            let kind = TaskKind::from_code(reader.read_uint(3)? as u8);
            let task = match kind {
                TaskKind::Mask => BoneMaskTask::reference_mask(reader.read_uint(max_bits_for_mask)? as usize),
                TaskKind::GenerateMask => BoneMaskTask::generate(reader.read_normalized_float8()?),
                TaskKind::Blend => {
                    let source = reader.read_uint(index_bits)? as usize;
                    let target = reader.read_uint(index_bits)? as usize;
                    let weight = reader.read_normalized_float8()?;
                    BoneMaskTask::blend(source, target, weight)
                }
                TaskKind::Scale => {
                    let source = reader.read_uint(index_bits)? as usize;
                    let weight = reader.read_normalized_float8()?;
                    BoneMaskTask::scale(source, weight)
                }
                TaskKind::Combine => {
                    let source = reader.read_uint(index_bits)? as usize;
                    let target = reader.read_uint(index_bits)? as usize;
                    BoneMaskTask::combine(source, target)
                }
            };
            tasks.push(task);
        }

        Ok(Self { tasks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn chain_skeleton(n: usize) -> GraphSkeleton {
        let ids: Vec<String> = (0..n).map(|i| format!("bone_{i}")).collect();
        let parents: Vec<i32> = (0..n as i32).map(|i| i - 1).collect();
        GraphSkeleton::new(ids, parents)
    }

    #[test]
    fn single_reference_resolves_without_pool_slot() {
        let mut skel = chain_skeleton(4);
        let mask_idx = skel.register_mask("full", BoneMask::with_fixed_weight(&skel, 1.0));
        let skel = Rc::new(skel);
        let mut pool = BoneMaskPool::new(skel.clone());
        let list = BoneMaskTaskList::single_reference(mask_idx);
        let (_, slot) = list.generate(&skel, &mut pool);
        assert!(slot.is_none());
    }

    #[test]
    fn single_generate_produces_pool_slot() {
        let skel = Rc::new(chain_skeleton(4));
        let mut pool = BoneMaskPool::new(skel.clone());
        let list = BoneMaskTaskList::single_fixed_weight(0.5);
        let (idx, slot) = list.generate(&skel, &mut pool);
        assert_eq!(slot, Some(idx));
        assert_eq!(pool.get(idx).weight(0), 0.5);
        pool.release(idx);
    }

    #[test]
    fn blend_between_two_references_generates_mixed_result() {
        let mut skel = chain_skeleton(4);
        let zero_idx = skel.register_mask("zero", BoneMask::with_fixed_weight(&skel, 0.0));
        let one_idx = skel.register_mask("one", BoneMask::with_fixed_weight(&skel, 1.0));
        let skel = Rc::new(skel);
        let mut pool = BoneMaskPool::new(skel.clone());

        let mut list = BoneMaskTaskList::single_reference(zero_idx);
        list.blend_to(&BoneMaskTaskList::single_reference(one_idx), 0.5);

        let (idx, slot) = list.generate(&skel, &mut pool);
        assert!((pool.get(idx).weight(0) - 0.5).abs() < 1e-5);
        if let Some(s) = slot {
            pool.release(s);
        }
    }

    #[test]
    fn blend_to_generated_mask_at_full_weight_replaces_list() {
        let mut list = BoneMaskTaskList::single_fixed_weight(0.2);
        list.blend_to_generated_mask(0.9, 1.0);
        assert_eq!(list.tasks.len(), 1);
        assert_eq!(list.tasks[0].weight, 0.9);
    }

    #[test]
    fn serialize_then_deserialize_preserves_task_shape() {
        let mut list = BoneMaskTaskList::single_reference(3);
        list.blend_to(&BoneMaskTaskList::single_fixed_weight(0.6), 0.3);

        let mut writer = crate::graph::serialization::BitWriter::new();
        list.serialize(&mut writer, 8);
        let bytes = writer.into_bytes();

        let mut reader = crate::graph::serialization::BitReader::new(&bytes);
        let decoded = BoneMaskTaskList::deserialize(&mut reader, 8).unwrap();

        assert_eq!(decoded.tasks.len(), list.tasks.len());
        assert_eq!(decoded.tasks[0].mask_idx, 3);
    }
}
