//! Grow-only pool of scratch `BoneMask` buffers for bone mask task list
//! evaluation (spec §4.1), grounded in `AnimationBoneMask.cpp`'s
//! `BoneMaskPool`. Slots are indexed by `u8` (never more than 127 live at
//! once per the source's task-count cap), tracked with a first-free cursor
//! instead of a free list so acquire is a short linear scan from the last
//! known-free slot.

use crate::graph::bone_mask::BoneMask;
use crate::graph::skeleton::GraphSkeleton;
use std::rc::Rc;

const INITIAL_POOL_SIZE: usize = 64;

struct Slot {
    mask: BoneMask,
    is_used: bool,
}

/// Owns its skeleton via `Rc` rather than borrowing it, matching
/// `PoseBufferPool` — see that type's doc comment for why.
pub struct BoneMaskPool {
    skeleton: Rc<GraphSkeleton>,
    pool: Vec<Slot>,
    first_free: Option<usize>,
}

impl BoneMaskPool {
    pub fn new(skeleton: Rc<GraphSkeleton>) -> Self {
        let pool = (0..INITIAL_POOL_SIZE)
            .map(|_| Slot {
                mask: BoneMask::zero(&skeleton),
                is_used: false,
            })
            .collect();

        Self {
            skeleton,
            pool,
            first_free: Some(0),
        }
    }

    pub fn skeleton(&self) -> &GraphSkeleton {
        &self.skeleton
    }

    /// Returns the index of a free slot, growing the pool (doubling, minimum
    /// 127 new total) if none is free.
    pub fn acquire(&mut self, reset_mask: bool) -> usize {
        let idx = self.first_free.expect("bone mask pool has no free slot");
        debug_assert!(!self.pool[idx].is_used);
        self.pool[idx].is_used = true;

        if reset_mask {
            self.pool[idx].mask.reset(0.0);
        }

        self.first_free = ((idx + 1)..self.pool.len()).find(|&i| !self.pool[i].is_used);

        if self.first_free.is_none() {
            let current_size = self.pool.len();
            let new_size = current_size.max(127 / 2) * 2;
            let to_add = new_size.saturating_sub(current_size);
            for _ in 0..to_add {
                self.pool.push(Slot {
                    mask: BoneMask::zero(&self.skeleton),
                    is_used: false,
                });
            }
            self.first_free = Some(current_size);
        }

        idx
    }

    pub fn release(&mut self, idx: usize) {
        debug_assert!(self.pool[idx].is_used);
        self.pool[idx].is_used = false;
        let should_update = match self.first_free {
            Some(f) => idx < f,
            None => true,
        };
        if should_update {
            self.first_free = Some(idx);
        }
    }

    pub fn get(&self, idx: usize) -> &BoneMask {
        &self.pool[idx].mask
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut BoneMask {
        &mut self.pool[idx].mask
    }

    /// Asserts every slot has been released; call at the end of a frame in
    /// development builds.
    pub fn validate_all_released(&self) {
        if cfg!(debug_assertions) {
            debug_assert!(self.pool.iter().all(|s| !s.is_used));
            debug_assert_eq!(self.first_free, Some(0));
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
    fn acquire_then_release_restores_first_free() {
        let skel = Rc::new(chain_skeleton(4));
        let mut pool = BoneMaskPool::new(skel);
        let a = pool.acquire(true);
        let b = pool.acquire(true);
        assert_ne!(a, b);
        pool.release(a);
        pool.release(b);
        pool.validate_all_released();
    }

    #[test]
    fn pool_grows_past_initial_size() {
        let skel = Rc::new(chain_skeleton(4));
        let mut pool = BoneMaskPool::new(skel);
        let mut acquired = Vec::new();
        for _ in 0..(INITIAL_POOL_SIZE + 5) {
            acquired.push(pool.acquire(false));
        }
        assert!(pool.pool.len() > INITIAL_POOL_SIZE);
        for idx in acquired {
            pool.release(idx);
        }
        pool.validate_all_released();
    }
}
