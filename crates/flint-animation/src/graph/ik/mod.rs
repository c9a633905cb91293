pub mod aim;
pub mod chain_solver;
pub mod rig;
pub mod two_bone;
