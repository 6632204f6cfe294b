//! The synchronization boundary between an external engine and the snapshot.
//!
//! A [`Hook`] owns one [`Snapshot`], the registered listeners, and the engine
//! adapter, and drives the per-cycle protocol
//! `Idle → EngineSynced → ListenersNotified → EngineUpdated → Idle` as an
//! explicit state machine. Each phase method checks the current phase, so an
//! out-of-order call (say, dispatching listeners before the engine has been
//! pulled) surfaces as a [`HookError::Phase`] instead of acting on stale state.

use super::cv::CvManager;
use super::error::HookError;
use super::listener::SimulationListener;
use crate::core::snapshot::Snapshot;
use tracing::{debug, trace};

/// Phase of the per-cycle synchronization state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// Between cycles; the engine owns the authoritative state.
    Idle,
    /// Engine state has been pulled into the snapshot and validated.
    EngineSynced,
    /// Listeners have observed (and possibly biased) the snapshot.
    ListenersNotified,
    /// The biased state has been pushed back to the engine.
    EngineUpdated,
}

/// The capability an engine adapter must provide to be driven by a [`Hook`].
///
/// Implementations translate between one engine's native representation and
/// the snapshot:
///
/// - After `sync_to_snapshot` returns, the snapshot's positions, forces,
///   species, and timestep must exactly reflect the engine's current state,
///   with index-aligned arrays (species resolved through the table built at
///   setup time).
/// - `sync_to_engine` must translate the possibly bias-modified force array
///   back into the engine's expected representation or commands without
///   reordering particles.
///
/// Adapters for velocity-Verlet-style engines that need the previous cycle's
/// forces to reconstruct an integration command keep that buffer as their own
/// state; it is not part of the snapshot.
pub trait SynchronizableEngine {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Pulls engine-native state into the snapshot.
    fn sync_to_snapshot(&mut self, snapshot: &mut Snapshot) -> Result<(), Self::Error>;

    /// Pushes the snapshot's state back into the engine.
    fn sync_to_engine(&mut self, snapshot: &Snapshot) -> Result<(), Self::Error>;
}

/// Listener lifecycle stage dispatched within one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Once before the first integration cycle; reaches every listener.
    PreSimulation,
    /// Once per integration cycle; reaches listeners whose frequency divides
    /// the current step count.
    PostIntegration,
    /// Once after the last integration cycle; reaches every listener.
    PostSimulation,
}

impl Lifecycle {
    fn label(self) -> &'static str {
        match self {
            Lifecycle::PreSimulation => "pre-simulation",
            Lifecycle::PostIntegration => "post-integration",
            Lifecycle::PostSimulation => "post-simulation",
        }
    }
}

/// The synchronization boundary object for one walker.
pub struct Hook<E: SynchronizableEngine> {
    engine: E,
    snapshot: Snapshot,
    cv_manager: CvManager,
    listeners: Vec<Box<dyn SimulationListener>>,
    phase: SyncPhase,
    step: u64,
}

impl<E: SynchronizableEngine> Hook<E> {
    /// Creates a hook around an engine adapter, a snapshot, and a CV manager.
    pub fn new(engine: E, snapshot: Snapshot, cv_manager: CvManager) -> Self {
        Self {
            engine,
            snapshot,
            cv_manager,
            listeners: Vec::new(),
            phase: SyncPhase::Idle,
            step: 0,
        }
    }

    /// Registers a listener; registration order is dispatch order.
    ///
    /// Listeners are never removed during a run.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::ZeroFrequency`] for a frequency-0 listener rather
    /// than guessing whether that means "every step" or "never".
    pub fn add_listener(&mut self, listener: Box<dyn SimulationListener>) -> Result<(), HookError> {
        if listener.frequency() == 0 {
            return Err(HookError::ZeroFrequency {
                name: listener.name().to_string(),
            });
        }
        self.listeners.push(listener);
        Ok(())
    }

    /// Returns the engine adapter.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the engine adapter for adapter-specific setup calls.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Returns the snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Returns the CV manager shared with listeners.
    pub fn cv_manager(&self) -> &CvManager {
        &self.cv_manager
    }

    /// Returns the number of registered listeners.
    pub fn n_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Returns the current phase of the state machine.
    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    /// Returns the number of completed integration cycles.
    pub fn step(&self) -> u64 {
        self.step
    }

    fn expect_phase(&self, expected: SyncPhase) -> Result<(), HookError> {
        if self.phase != expected {
            return Err(HookError::Phase {
                expected,
                found: self.phase,
            });
        }
        Ok(())
    }

    /// Pulls engine state into the snapshot (`Idle → EngineSynced`).
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Phase`] out of order, [`HookError::Engine`] if the
    /// adapter fails, and [`HookError::Snapshot`] if the pulled arrays violate
    /// the per-particle length invariant.
    pub fn sync_to_snapshot(&mut self) -> Result<(), HookError> {
        self.expect_phase(SyncPhase::Idle)?;
        self.engine
            .sync_to_snapshot(&mut self.snapshot)
            .map_err(|e| HookError::Engine {
                source: Box::new(e),
            })?;
        self.snapshot.validate()?;
        self.snapshot.set_iteration(self.step);
        self.phase = SyncPhase::EngineSynced;
        Ok(())
    }

    /// Dispatches one lifecycle stage (`EngineSynced → ListenersNotified`).
    ///
    /// Listeners run strictly in registration order and mutate the snapshot in
    /// place; for [`Lifecycle::PostIntegration`] only listeners whose
    /// frequency divides the current step count are invoked.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Phase`] out of order, or [`HookError::Listener`]
    /// wrapping the first listener failure (later listeners are not invoked).
    pub fn notify_listeners(&mut self, lifecycle: Lifecycle) -> Result<(), HookError> {
        self.expect_phase(SyncPhase::EngineSynced)?;

        let mut notified = 0;
        for listener in &mut self.listeners {
            if lifecycle == Lifecycle::PostIntegration && self.step % listener.frequency() != 0 {
                continue;
            }
            let result = match lifecycle {
                Lifecycle::PreSimulation => {
                    listener.pre_simulation(&mut self.snapshot, &self.cv_manager)
                }
                Lifecycle::PostIntegration => {
                    listener.post_integration(&mut self.snapshot, &self.cv_manager)
                }
                Lifecycle::PostSimulation => {
                    listener.post_simulation(&mut self.snapshot, &self.cv_manager)
                }
            };
            result.map_err(|e| HookError::Listener {
                name: listener.name().to_string(),
                lifecycle: lifecycle.label(),
                source: e,
            })?;
            notified += 1;
        }

        trace!(
            "Step {}: notified {}/{} listeners ({})",
            self.step,
            notified,
            self.listeners.len(),
            lifecycle.label()
        );
        self.phase = SyncPhase::ListenersNotified;
        Ok(())
    }

    /// Pushes the biased snapshot back to the engine
    /// (`ListenersNotified → EngineUpdated`).
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Phase`] out of order or [`HookError::Engine`] if
    /// the adapter fails.
    pub fn sync_to_engine(&mut self) -> Result<(), HookError> {
        self.expect_phase(SyncPhase::ListenersNotified)?;
        self.engine
            .sync_to_engine(&self.snapshot)
            .map_err(|e| HookError::Engine {
                source: Box::new(e),
            })?;
        self.phase = SyncPhase::EngineUpdated;
        Ok(())
    }

    /// Closes the cycle (`EngineUpdated → Idle`).
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Phase`] out of order.
    pub fn complete_cycle(&mut self) -> Result<(), HookError> {
        self.expect_phase(SyncPhase::EngineUpdated)?;
        self.phase = SyncPhase::Idle;
        Ok(())
    }

    fn run_cycle(&mut self, lifecycle: Lifecycle) -> Result<(), HookError> {
        self.sync_to_snapshot()?;
        self.notify_listeners(lifecycle)?;
        self.sync_to_engine()?;
        self.complete_cycle()
    }

    /// Runs the pre-simulation cycle, reaching every listener once.
    ///
    /// # Errors
    ///
    /// Propagates the phase, engine, snapshot, and listener errors of the
    /// individual cycle stages.
    pub fn pre_simulation(&mut self) -> Result<(), HookError> {
        debug!(
            "Pre-simulation: {} listeners, {} collective variables",
            self.listeners.len(),
            self.cv_manager.len()
        );
        self.run_cycle(Lifecycle::PreSimulation)
    }

    /// Runs one full post-integration cycle and advances the step counter.
    ///
    /// The counter advances before dispatch, so the first call is step 1 and a
    /// listener of frequency `f` fires on steps `f, 2f, …`.
    ///
    /// # Errors
    ///
    /// Propagates the phase, engine, snapshot, and listener errors of the
    /// individual cycle stages. The step counter still advances on failure;
    /// the run is not expected to continue past a hook error.
    pub fn post_integration(&mut self) -> Result<(), HookError> {
        self.step += 1;
        self.run_cycle(Lifecycle::PostIntegration)
    }

    /// Runs the post-simulation cycle, reaching every listener once.
    ///
    /// # Errors
    ///
    /// Propagates the phase, engine, snapshot, and listener errors of the
    /// individual cycle stages.
    pub fn post_simulation(&mut self) -> Result<(), HookError> {
        self.run_cycle(Lifecycle::PostSimulation)
    }
}
