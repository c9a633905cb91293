//! Per-bone blend weight mask (spec §4.1), grounded in
//! `Code/Engine/Animation/AnimationBoneMask.cpp`. Weights are padded to a
//! multiple of four floats (matching the source's SIMD-lane padding, even
//! though platform SIMD itself is out of scope) and tagged with a
//! `WeightInfo` so uniform masks (`Zero`/`One`) can short-circuit blend and
//! combine operations without touching every weight.

use crate::graph::skeleton::GraphSkeleton;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightInfo {
    Zero,
    One,
    Mixed,
}

#[derive(Debug, Clone)]
pub struct BoneMaskDefinitionEntry {
    pub bone_id: String,
    pub weight: f32,
}

#[derive(Debug, Clone, Default)]
pub struct BoneMaskDefinition {
    pub id: Option<String>,
    pub weights: Vec<BoneMaskDefinitionEntry>,
}

#[derive(Debug, Clone)]
pub struct BoneMask {
    id: Option<String>,
    weights: Vec<f32>,
    weight_info: WeightInfo,
}

impl BoneMask {
    /// All-zero mask, padded to the skeleton's weight-slot count.
    pub fn zero(skeleton: &GraphSkeleton) -> Self {
        Self {
            id: None,
            weights: vec![0.0; skeleton.padded_weight_count()],
            weight_info: WeightInfo::Zero,
        }
    }

    pub fn with_fixed_weight(skeleton: &GraphSkeleton, weight: f32) -> Self {
        debug_assert!((0.0..=1.0).contains(&weight));
        let weights = vec![weight; skeleton.padded_weight_count()];
        Self {
            id: None,
            weight_info: weight_info_for(weight),
            weights,
        }
    }

    /// Builds a mask from a definition, featherring intermediate bones
    /// between explicitly-weighted ancestors/descendants along each chain.
    pub fn from_definition(
        skeleton: &GraphSkeleton,
        definition: &BoneMaskDefinition,
        feather_intermediate_bones: bool,
    ) -> Self {
        let num_bones = skeleton.num_bones();
        let mut weights = vec![-1.0f32; num_bones];

        for entry in &definition.weights {
            let Some(idx) = skeleton.bone_index(&entry.bone_id) else {
                crate::graph_warn!("bone mask definition references unknown bone id '{}'", entry.bone_id);
                continue;
            };
            weights[idx] = entry.weight;
        }

        let original_weights = weights.clone();

        if feather_intermediate_bones {
            feather_chains(skeleton, &mut weights, &original_weights);
        } else {
            for w in weights.iter_mut() {
                if *w < 0.0 {
                    *w = 0.0;
                }
            }
        }

        if weights[0] < 0.0 {
            weights[0] = 0.0;
        }

        let padded = skeleton.padded_weight_count();
        weights.resize(padded, 0.0);

        let weight_info = uniform_weight_info(&weights[..num_bones]);

        Self {
            id: definition.id.clone(),
            weights,
            weight_info,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn weight_info(&self) -> WeightInfo {
        self.weight_info
    }

    pub fn weight(&self, bone_index: usize) -> f32 {
        self.weights[bone_index]
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn is_valid(&self) -> bool {
        !self.weights.is_empty() && self.weights.len() % 4 == 0
    }

    pub fn reset(&mut self, fixed_weight: f32) {
        debug_assert!((0.0..=1.0).contains(&fixed_weight));
        for w in self.weights.iter_mut() {
            *w = fixed_weight;
        }
        self.weight_info = weight_info_for(fixed_weight);
    }

    /// Per-bone multiply, in place. Both masks must share a skeleton (same
    /// weight count).
    pub fn combine_with(&mut self, other: &BoneMask) {
        debug_assert_eq!(self.weights.len(), other.weights.len());
        for (w, o) in self.weights.iter_mut().zip(other.weights.iter()) {
            *w *= o;
        }
        self.weight_info = WeightInfo::Mixed;
    }

    /// At `blend_weight == 0` the result is unchanged (`self`); at `1` the
    /// result is `source`.
    pub fn blend_from(&mut self, source: &BoneMask, blend_weight: f32) {
        debug_assert_eq!(self.weights.len(), source.weights.len());
        debug_assert!((0.0..=1.0).contains(&blend_weight));

        if source.weight_info != WeightInfo::Mixed && source.weight_info == self.weight_info {
            return;
        }
        if is_near_equal(blend_weight, 1.0) {
            return;
        }
        if is_near_equal(blend_weight, 0.0) {
            self.weights.copy_from_slice(&source.weights);
            self.weight_info = source.weight_info;
            return;
        }

        for (w, s) in self.weights.iter_mut().zip(source.weights.iter()) {
            *w = crate::graph::math::lerp(*s, *w, blend_weight);
        }
        self.weight_info = WeightInfo::Mixed;
    }

    /// Blends `self` towards `target` as `blend_weight` goes from 0 (unchanged)
    /// to 1 (fully `target`).
    pub fn blend_to(&mut self, target: &BoneMask, blend_weight: f32) {
        debug_assert_eq!(self.weights.len(), target.weights.len());
        debug_assert!((0.0..=1.0).contains(&blend_weight));

        if target.weight_info != WeightInfo::Mixed && target.weight_info == self.weight_info {
            return;
        }
        if is_near_equal(blend_weight, 0.0) {
            return;
        }
        if is_near_equal(blend_weight, 1.0) {
            self.weights.copy_from_slice(&target.weights);
            self.weight_info = target.weight_info;
            return;
        }

        for (w, t) in self.weights.iter_mut().zip(target.weights.iter()) {
            *w = crate::graph::math::lerp(*w, *t, blend_weight);
        }
        self.weight_info = WeightInfo::Mixed;
    }

    pub fn scale_weights(&mut self, scale: f32) {
        debug_assert!((0.0..=1.0).contains(&scale));
        if is_near_equal(scale, 1.0) {
            return;
        }
        if is_near_equal(scale, 0.0) {
            self.reset(0.0);
            return;
        }
        for w in self.weights.iter_mut() {
            *w *= scale;
        }
    }
}

fn is_near_equal(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

fn weight_info_for(weight: f32) -> WeightInfo {
    if weight == 0.0 {
        WeightInfo::Zero
    } else if weight == 1.0 {
        WeightInfo::One
    } else {
        WeightInfo::Mixed
    }
}

fn uniform_weight_info(weights: &[f32]) -> WeightInfo {
    let first = weights[0];
    if weights.iter().any(|&w| w != first) {
        return WeightInfo::Mixed;
    }
    weight_info_for(first)
}

/// Walks each bone, newest (deepest) first: fills "zero chains" (runs of
/// unset bones with no unset ancestor) with their nearest set ancestor's
/// weight, and "feather chains" (a set bone whose parent is unset) with a
/// linear interpolation between the two nearest set bones in the chain.
fn feather_chains(skeleton: &GraphSkeleton, weights: &mut [f32], original: &[f32]) {
    for bone_idx in (1..skeleton.num_bones()).rev() {
        if weights[bone_idx] == -1.0 {
            let mut chain = vec![bone_idx];
            let mut chain_weight = 0.0f32;
            let mut parent = skeleton.parent_index(bone_idx);

            while let Some(parent_idx) = parent {
                if original[parent_idx] != -1.0 {
                    chain_weight = original[parent_idx];
                    break;
                }
                chain.push(parent_idx);
                parent = skeleton.parent_index(parent_idx);
            }

            if parent.is_none() {
                chain.pop();
            }

            for &i in &chain {
                weights[i] = chain_weight;
            }
        } else if let Some(parent_idx) = skeleton.parent_index(bone_idx) {
            if weights[parent_idx] == -1.0 {
                let end_weight = weights[bone_idx];
                let mut start_weight: Option<f32> = None;

                let mut chain = vec![bone_idx];
                let mut parent = Some(parent_idx);
                while let Some(p) = parent {
                    chain.push(p);
                    if original[p] != -1.0 {
                        start_weight = Some(original[p]);
                        break;
                    }
                    parent = skeleton.parent_index(p);
                }

                let num_in_chain = chain.len();
                for i in (1..num_in_chain - 1).rev() {
                    let percentage_through = i as f32 / (num_in_chain - 1) as f32;
                    weights[chain[i]] = match start_weight {
                        Some(start) => crate::graph::math::lerp(end_weight, start, percentage_through),
                        None => 0.0,
                    };
                }
            }
        }
    }
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
    fn fixed_weight_mask_reports_uniform_tag() {
        let skel = chain_skeleton(6);
        let mask = BoneMask::with_fixed_weight(&skel, 1.0);
        assert_eq!(mask.weight_info(), WeightInfo::One);
    }

    #[test]
    fn from_definition_sets_explicit_weights() {
        let skel = chain_skeleton(4);
        let def = BoneMaskDefinition {
            id: Some("upper_body".into()),
            weights: vec![BoneMaskDefinitionEntry {
                bone_id: "bone_2".into(),
                weight: 1.0,
            }],
        };
        let mask = BoneMask::from_definition(&skel, &def, false);
        assert_eq!(mask.weight(2), 1.0);
        assert_eq!(mask.weight(0), 0.0);
    }

    #[test]
    fn feathering_interpolates_between_set_ancestors() {
        let skel = chain_skeleton(5);
        let def = BoneMaskDefinition {
            id: None,
            weights: vec![
                BoneMaskDefinitionEntry {
                    bone_id: "bone_0".into(),
                    weight: 0.0,
                },
                BoneMaskDefinitionEntry {
                    bone_id: "bone_4".into(),
                    weight: 1.0,
                },
            ],
        };
        let mask = BoneMask::from_definition(&skel, &def, true);
        assert!(mask.weight(1) > 0.0 && mask.weight(1) < mask.weight(2));
        assert!(mask.weight(2) > mask.weight(1) && mask.weight(2) < mask.weight(3));
        assert_eq!(mask.weight(4), 1.0);
    }

    #[test]
    fn blend_to_full_weight_copies_target() {
        let skel = chain_skeleton(4);
        let mut a = BoneMask::with_fixed_weight(&skel, 0.0);
        let b = BoneMask::with_fixed_weight(&skel, 1.0);
        a.blend_to(&b, 1.0);
        assert_eq!(a.weight_info(), WeightInfo::One);
    }

    #[test]
    fn combine_with_multiplies_weights() {
        let skel = chain_skeleton(4);
        let mut a = BoneMask::with_fixed_weight(&skel, 0.5);
        let b = BoneMask::with_fixed_weight(&skel, 0.5);
        a.combine_with(&b);
        assert!((a.weight(0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn scale_weights_zero_resets_to_zero() {
        let skel = chain_skeleton(4);
        let mut a = BoneMask::with_fixed_weight(&skel, 0.8);
        a.scale_weights(0.0);
        assert_eq!(a.weight_info(), WeightInfo::Zero);
    }
}
