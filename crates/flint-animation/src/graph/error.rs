//! Error taxonomy for the runtime graph (spec §7)
//!
//! Definition errors and deserialization errors are recoverable — callers get
//! a degraded-but-usable pose. Runtime invariant violations panic in debug
//! builds (`debug_assert!`) and are silently skipped in release, matching the
//! source's `EE_ASSERT` discipline. Pool exhaustion for the (statically
//! sized) pose buffer pool is the one fatal case.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("definition error: {0}")]
    Definition(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("pose buffer pool exhausted (max {0} buffers)")]
    PoseBufferPoolExhausted(usize),
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// Emits a development-tools warning, matching `EE_DEVELOPMENT_TOOLS`-gated
/// `context.LogError` calls in the source. Never aborts the frame.
#[macro_export]
macro_rules! graph_warn {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            eprintln!("[anim-graph] {}", format!($($arg)*));
        }
    };
}
