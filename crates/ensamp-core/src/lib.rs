//! # ensamp Core Library
//!
//! A coordination core for enhanced-sampling simulations. ensamp sits between an
//! external simulation engine (molecular dynamics or electronic structure) and a
//! set of sampling methods, keeping the engine's native state and the methods'
//! view of it in lockstep across a hierarchy of parallel walkers.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict two-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains the stateless data models: the
//!   [`Snapshot`](core::snapshot::Snapshot) mirroring one walker's physical state,
//!   and the N-dimensional [`Grid`](core::grid::Grid) that sampling methods use to
//!   accumulate and interpolate fields over collective-variable space.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates the
//!   synchronization cycle. It includes the [`Hook`](engine::hook::Hook) state
//!   machine that translates between the engine and the snapshot, the
//!   [`SimulationListener`](engine::listener::SimulationListener) dispatch
//!   contract that sampling methods implement, and the walker-topology helpers
//!   used to gate single-writer operations in multi-walker runs.
//!
//! Concrete engine adapters and concrete sampling algorithms live outside this
//! crate; they plug into the capability traits defined here.

pub mod core;
pub mod engine;
