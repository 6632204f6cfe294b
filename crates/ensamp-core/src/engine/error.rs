use crate::core::snapshot::SnapshotError;
use crate::engine::hook::SyncPhase;
use thiserror::Error;

/// Boxed error type carried by adapter and listener failures.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the hook synchronization cycle.
///
/// Every variant is fatal at this layer: there is no retry, because a failed
/// synchronization or listener implies the mirrored physical state can no
/// longer be trusted.
#[derive(Debug, Error)]
pub enum HookError {
    /// A phase method was invoked out of cycle order.
    #[error("illegal synchronization phase: expected {expected:?}, found {found:?}")]
    Phase {
        expected: SyncPhase,
        found: SyncPhase,
    },

    /// The snapshot failed its length invariant after an engine sync.
    #[error("snapshot inconsistency after engine sync: {source}")]
    Snapshot {
        #[from]
        source: SnapshotError,
    },

    /// The engine adapter failed to translate state in either direction.
    #[error("engine synchronization failed: {source}")]
    Engine { source: BoxedError },

    /// A sampling-method listener failed during dispatch.
    #[error("listener '{name}' failed during {lifecycle}: {source}")]
    Listener {
        name: String,
        lifecycle: &'static str,
        source: BoxedError,
    },

    /// A listener was registered with frequency zero.
    #[error("listener '{name}' declares frequency 0; frequencies start at 1")]
    ZeroFrequency { name: String },
}
