//! Graph-core skeleton (spec §3): ordered bones with parent indices and
//! stable string identifiers, plus an indexed collection of precomputed bone
//! masks. Distinct from `crate::skeleton::Skeleton` (the GPU bone-matrix
//! skeleton used by Tier 2 playback) — this one is keyed by bone *ID* the way
//! the graph nodes reference bones (`effector_bone_id` etc in spec §4.4.5),
//! matching `Code/Engine/Animation/AnimationSkeleton.h`'s `GetBoneIndex`.

use crate::graph::bone_mask::BoneMask;
use crate::graph::transform::Transform;
use std::collections::HashMap;

pub const INVALID_INDEX: i32 = -1;

#[derive(Debug, Clone)]
pub struct GraphSkeleton {
    bone_ids: Vec<String>,
    /// Parent index per bone; `INVALID_INDEX` for the root. Invariant:
    /// `parent_index[i] < i` for all non-root bones (spec §3).
    parent_indices: Vec<i32>,
    bone_index_by_id: HashMap<String, usize>,
    masks: Vec<BoneMask>,
    mask_index_by_id: HashMap<String, usize>,
    /// Local-space bind pose, emitted by the `ReferencePose` task kind.
    bind_pose: Vec<Transform>,
}

impl GraphSkeleton {
    pub fn new(bone_ids: Vec<String>, parent_indices: Vec<i32>) -> Self {
        assert_eq!(bone_ids.len(), parent_indices.len());
        for (i, &parent) in parent_indices.iter().enumerate() {
            assert!(
                parent == INVALID_INDEX || (parent as usize) < i,
                "bone {i} has parent index {parent} >= its own index"
            );
        }

        let bone_index_by_id = bone_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let bind_pose = vec![Transform::IDENTITY; bone_ids.len()];

        Self {
            bone_ids,
            parent_indices,
            bone_index_by_id,
            masks: Vec::new(),
            mask_index_by_id: HashMap::new(),
            bind_pose,
        }
    }

    pub fn bind_pose(&self) -> &[Transform] {
        &self.bind_pose
    }

    pub fn set_bind_pose(&mut self, bind_pose: Vec<Transform>) {
        debug_assert_eq!(bind_pose.len(), self.bone_ids.len());
        self.bind_pose = bind_pose;
    }

    pub fn num_bones(&self) -> usize {
        self.bone_ids.len()
    }

    pub fn bone_id(&self, index: usize) -> &str {
        &self.bone_ids[index]
    }

    pub fn bone_index(&self, id: &str) -> Option<usize> {
        self.bone_index_by_id.get(id).copied()
    }

    pub fn parent_index(&self, index: usize) -> Option<usize> {
        let parent = self.parent_indices[index];
        if parent == INVALID_INDEX {
            None
        } else {
            Some(parent as usize)
        }
    }

    pub fn is_root(&self, index: usize) -> bool {
        self.parent_indices[index] == INVALID_INDEX
    }

    /// Register a precomputed mask under a stable ID for `Mask(index)` bone
    /// mask task list entries and lookup from definitions.
    pub fn register_mask(&mut self, id: impl Into<String>, mask: BoneMask) -> usize {
        let id = id.into();
        let index = self.masks.len();
        self.mask_index_by_id.insert(id, index);
        self.masks.push(mask);
        index
    }

    pub fn mask_index(&self, id: &str) -> Option<usize> {
        self.mask_index_by_id.get(id).copied()
    }

    pub fn mask(&self, index: usize) -> &BoneMask {
        &self.masks[index]
    }

    pub fn num_masks(&self) -> usize {
        self.masks.len()
    }

    /// Bit width needed to encode a mask index for this skeleton in the wire
    /// format (§6), mirroring `bone_index_bits`.
    pub fn mask_index_bits(&self) -> u32 {
        bits_for_count(self.masks.len())
    }

    /// Number of padded weight slots a `BoneMask` for this skeleton needs:
    /// `ceil(bone_count / 4) * 4` (spec §3).
    pub fn padded_weight_count(&self) -> usize {
        (self.num_bones() + 3) / 4 * 4
    }

    /// Bit width needed to encode a bone index for this skeleton in the wire
    /// format (§6): `ceil(log2(bone_count))`, minimum 1.
    pub fn bone_index_bits(&self) -> u32 {
        bits_for_count(self.num_bones())
    }
}

/// `ceil(log2(n))`, with a floor of 1 bit (matches the wire format's
/// field-width derivation for bone/task/mask indices in spec §6).
pub fn bits_for_count(n: usize) -> u32 {
    if n <= 1 {
        return 1;
    }
    (usize::BITS - (n - 1).leading_zeros()).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_skeleton(n: usize) -> GraphSkeleton {
        let ids: Vec<String> = (0..n).map(|i| format!("bone_{i}")).collect();
        let parents: Vec<i32> = (0..n as i32).map(|i| i - 1).collect();
        GraphSkeleton::new(ids, parents)
    }

    #[test]
    fn bone_lookup_by_id() {
        let skel = chain_skeleton(5);
        assert_eq!(skel.bone_index("bone_3"), Some(3));
        assert_eq!(skel.bone_index("missing"), None);
    }

    #[test]
    fn root_has_no_parent() {
        let skel = chain_skeleton(3);
        assert!(skel.is_root(0));
        assert_eq!(skel.parent_index(0), None);
        assert_eq!(skel.parent_index(2), Some(1));
    }

    #[test]
    fn padded_weight_count_rounds_up_to_four() {
        let skel = chain_skeleton(5);
        assert_eq!(skel.padded_weight_count(), 8);
        let skel8 = chain_skeleton(8);
        assert_eq!(skel8.padded_weight_count(), 8);
    }

    #[test]
    fn bits_for_count_matches_ceil_log2() {
        assert_eq!(bits_for_count(1), 1);
        assert_eq!(bits_for_count(2), 1);
        assert_eq!(bits_for_count(3), 2);
        assert_eq!(bits_for_count(5), 3);
        assert_eq!(bits_for_count(256), 8);
        assert_eq!(bits_for_count(257), 9);
    }

    #[test]
    #[should_panic]
    fn parent_index_must_be_less_than_own_index() {
        GraphSkeleton::new(vec!["a".into(), "b".into()], vec![-1, 5]);
    }
}
