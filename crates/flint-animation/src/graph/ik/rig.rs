//! Opaque IK rig contract (spec §4.3's `IKRig` task kind). A rig definition
//! is a resource external to the graph core (compiled rig solvers, e.g. a
//! full-body rig with spine/limb chains) — the core only needs to push
//! effector targets into it and ask it to solve against a pose. Concrete
//! rigs implement this trait; none ship with the graph core itself.

use crate::graph::pose::Pose;
use crate::graph::skeleton::GraphSkeleton;
use crate::graph::transform::Transform;

pub const MAX_RIG_EFFECTORS: usize = 6;

pub trait IkRig {
    /// Sets the target for effector `slot` (`0..MAX_RIG_EFFECTORS`).
    fn set_target(&mut self, slot: usize, target: Transform);

    /// Solves the rig against `pose`, writing solved local transforms back.
    fn solve(&mut self, pose: &mut Pose, skeleton: &GraphSkeleton);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullRig {
        targets: [Option<Transform>; MAX_RIG_EFFECTORS],
    }

    impl IkRig for NullRig {
        fn set_target(&mut self, slot: usize, target: Transform) {
            self.targets[slot] = Some(target);
        }

        fn solve(&mut self, _pose: &mut Pose, _skeleton: &GraphSkeleton) {}
    }

    #[test]
    fn set_target_records_into_slot() {
        let mut rig = NullRig {
            targets: [None; MAX_RIG_EFFECTORS],
        };
        rig.set_target(2, Transform::IDENTITY);
        assert!(rig.targets[2].is_some());
        assert!(rig.targets[0].is_none());
    }
}
