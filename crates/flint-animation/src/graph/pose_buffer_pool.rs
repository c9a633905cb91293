//! Pose buffer pool (spec §4.2): a fixed-growth pool of `PoseBuffer` slots
//! plus a keyed cache for cross-frame "cached poses" (used by transitions to
//! snapshot a source state's pose). Mirrors `BoneMaskPool`'s first-free
//! cursor design (`graph::bone_mask_pool`) generalized to poses and to the
//! cached-pose keyed lookup the bone mask pool doesn't need.

use crate::graph::error::{GraphError, Result};
use crate::graph::pose::{Pose, PoseBuffer};
use crate::graph::skeleton::GraphSkeleton;
use std::rc::Rc;

const INITIAL_POOL_SIZE: usize = 32;
/// Cached-pose keys are allocated from a 7-bit space (spec §9): at most 127
/// concurrently alive cached poses per graph instance.
pub const MAX_CACHED_POSE_KEYS: usize = 127;

pub type CachedPoseKey = u8;

struct Slot {
    buffer: PoseBuffer,
    is_used: bool,
}

/// A cached-pose entry kept alive one extra frame past the transition that
/// owns it, per the forced-transition grace period design note.
struct PendingRelease {
    key: CachedPoseKey,
    frames_remaining: u8,
}

/// Owns its skeleton via `Rc` rather than borrowing it (§5's "shared
/// read-only across graph instances"), since the pool must persist across
/// frames (cached poses, pending releases) inside a long-lived `GraphInstance`
/// a host stores in a map — a borrowed reference would make that map
/// self-referential.
pub struct PoseBufferPool {
    skeleton: Rc<GraphSkeleton>,
    pool: Vec<Slot>,
    first_free: Option<usize>,
    cached: std::collections::HashMap<CachedPoseKey, usize>,
    pending_release: Vec<PendingRelease>,
}

impl PoseBufferPool {
    pub fn new(skeleton: Rc<GraphSkeleton>) -> Self {
        let pool = (0..INITIAL_POOL_SIZE)
            .map(|_| Slot {
                buffer: PoseBuffer::new(Pose::regular(&skeleton)),
                is_used: false,
            })
            .collect();

        Self {
            skeleton,
            pool,
            first_free: Some(0),
            cached: std::collections::HashMap::new(),
            pending_release: Vec::new(),
        }
    }

    pub fn acquire_new_buffer(&mut self) -> usize {
        let idx = self.first_free.expect("pose buffer pool has no free slot");
        debug_assert!(!self.pool[idx].is_used);
        self.pool[idx].is_used = true;
        self.pool[idx].buffer.mark_unset();

        self.first_free = ((idx + 1)..self.pool.len()).find(|&i| !self.pool[i].is_used);
        if self.first_free.is_none() {
            let current_size = self.pool.len();
            let new_size = current_size * 2;
            for _ in current_size..new_size {
                self.pool.push(Slot {
                    buffer: PoseBuffer::new(Pose::regular(&self.skeleton)),
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

    pub fn get(&self, idx: usize) -> &PoseBuffer {
        &self.pool[idx].buffer
    }

    pub fn get_mut(&mut self, idx: usize) -> &mut PoseBuffer {
        &mut self.pool[idx].buffer
    }

    /// Borrows two distinct slots mutably at once (needed by blend tasks,
    /// which read a target buffer while writing a source buffer in place).
    pub fn get_pair_mut(&mut self, a: usize, b: usize) -> (&mut PoseBuffer, &mut PoseBuffer) {
        assert_ne!(a, b, "cannot borrow the same pose buffer slot twice");
        if a < b {
            let (left, right) = self.pool.split_at_mut(b);
            (&mut left[a].buffer, &mut right[0].buffer)
        } else {
            let (left, right) = self.pool.split_at_mut(a);
            (&mut right[0].buffer, &mut left[b].buffer)
        }
    }

    pub fn copy_buffer(&mut self, dst: usize, src: usize) {
        if dst == src {
            return;
        }
        let (d, s) = self.get_pair_mut(dst, src);
        d.copy_from(s);
    }

    /// Returns the slot for `key` if one is already cached.
    pub fn get_cached(&self, key: CachedPoseKey) -> Option<usize> {
        self.cached.get(&key).copied()
    }

    /// Returns the slot for `key`, acquiring a fresh buffer and registering
    /// it under `key` if none exists yet.
    pub fn get_or_create_cached(&mut self, key: CachedPoseKey) -> Result<usize> {
        if let Some(&idx) = self.cached.get(&key) {
            return Ok(idx);
        }
        if self.cached.len() >= MAX_CACHED_POSE_KEYS {
            return Err(GraphError::PoseBufferPoolExhausted(MAX_CACHED_POSE_KEYS));
        }
        let idx = self.acquire_new_buffer();
        self.cached.insert(key, idx);
        Ok(idx)
    }

    /// Schedules `key`'s cached slot for release one frame from now,
    /// implementing the forced-transition one-extra-frame grace period.
    pub fn release_cached_after_grace_frame(&mut self, key: CachedPoseKey) {
        self.pending_release.push(PendingRelease {
            key,
            frames_remaining: 1,
        });
    }

    /// Call once per frame. Decrements pending releases and actually frees
    /// any that have reached zero.
    pub fn advance_frame(&mut self) {
        let mut still_pending = Vec::new();
        for mut pending in self.pending_release.drain(..) {
            if pending.frames_remaining == 0 {
                if let Some(idx) = self.cached.remove(&pending.key) {
                    self.release(idx);
                }
            } else {
                pending.frames_remaining -= 1;
                still_pending.push(pending);
            }
        }
        self.pending_release = still_pending;
    }

    pub fn validate_all_released(&self) {
        if cfg!(debug_assertions) {
            debug_assert!(self.pool.iter().enumerate().all(|(i, s)| self.cached.values().any(|&v| v == i) || !s.is_used));
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
    fn acquire_and_release_round_trips_first_free() {
        let skel = Rc::new(chain_skeleton(3));
        let mut pool = PoseBufferPool::new(skel);
        let a = pool.acquire_new_buffer();
        let b = pool.acquire_new_buffer();
        pool.release(a);
        pool.release(b);
    }

    #[test]
    fn cached_pose_key_is_stable_across_lookups() {
        let skel = Rc::new(chain_skeleton(3));
        let mut pool = PoseBufferPool::new(skel);
        let first = pool.get_or_create_cached(5).unwrap();
        let second = pool.get_or_create_cached(5).unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.get_cached(5), Some(first));
    }

    #[test]
    fn cached_pose_survives_exactly_one_extra_frame() {
        let skel = Rc::new(chain_skeleton(3));
        let mut pool = PoseBufferPool::new(skel);
        let idx = pool.get_or_create_cached(9).unwrap();
        pool.release_cached_after_grace_frame(9);

        pool.advance_frame();
        assert_eq!(pool.get_cached(9), Some(idx), "must survive one extra frame");

        pool.advance_frame();
        assert_eq!(pool.get_cached(9), None, "must be gone after the grace frame");
    }
}
