//! The collective-variable interface consumed by sampling methods.
//!
//! ensamp does not define any collective variables itself; concrete CVs are
//! supplied by the configuration layer and invoked through this capability
//! trait during listener dispatch.

use crate::core::snapshot::Snapshot;

/// A scalar function of the physical state.
pub trait CollectiveVariable {
    /// A short identifier used in logs and output files.
    fn name(&self) -> &str;

    /// Evaluates the variable on the current snapshot.
    fn evaluate(&self, snapshot: &Snapshot) -> f64;
}

/// An ordered registry of collective variables.
///
/// Registration order is evaluation order, matching how sampling methods index
/// their grids by CV component.
#[derive(Default)]
pub struct CvManager {
    cvs: Vec<Box<dyn CollectiveVariable>>,
}

impl CvManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a collective variable; its index is the registration position.
    pub fn register(&mut self, cv: Box<dyn CollectiveVariable>) {
        self.cvs.push(cv);
    }

    /// Returns the number of registered variables.
    pub fn len(&self) -> usize {
        self.cvs.len()
    }

    /// Returns `true` if no variables are registered.
    pub fn is_empty(&self) -> bool {
        self.cvs.is_empty()
    }

    /// Iterates over the variables in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn CollectiveVariable> {
        self.cvs.iter().map(Box::as_ref)
    }

    /// Evaluates every variable on the snapshot, in registration order.
    pub fn evaluate_all(&self, snapshot: &Snapshot) -> Vec<f64> {
        self.cvs.iter().map(|cv| cv.evaluate(snapshot)).collect()
    }
}
