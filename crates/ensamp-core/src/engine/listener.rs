//! The lifecycle contract sampling methods implement.

use super::cv::CvManager;
use crate::core::snapshot::Snapshot;

/// Result type for listener lifecycle methods.
///
/// Listener failures are wrapped into
/// [`HookError::Listener`](super::error::HookError::Listener) by the dispatching
/// hook and are fatal to the run.
pub type ListenerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// An observer of the synchronization cycle, typically a sampling method.
///
/// Listeners are registered on a [`Hook`](super::hook::Hook) and invoked in
/// registration order. Each carries an immutable dispatch frequency:
/// `post_integration` runs only on integration steps that are multiples of it,
/// while `pre_simulation` and `post_simulation` always run exactly once.
///
/// Listeners receive the live snapshot and apply bias by mutating its forces
/// in place. There is no copy-on-write: a listener observing forces already
/// modified by an earlier listener in the same cycle is expected behavior, and
/// biases compose additively in invocation order.
pub trait SimulationListener {
    /// A short identifier used in logs and error context.
    fn name(&self) -> &str {
        "listener"
    }

    /// The dispatch frequency in integration steps. Must be at least 1.
    fn frequency(&self) -> u64;

    /// Called once before the first integration cycle.
    fn pre_simulation(&mut self, snapshot: &mut Snapshot, cv_manager: &CvManager)
    -> ListenerResult;

    /// Called at the end of each qualifying integration cycle.
    fn post_integration(
        &mut self,
        snapshot: &mut Snapshot,
        cv_manager: &CvManager,
    ) -> ListenerResult;

    /// Called once after the last integration cycle.
    fn post_simulation(
        &mut self,
        snapshot: &mut Snapshot,
        cv_manager: &CvManager,
    ) -> ListenerResult;
}
