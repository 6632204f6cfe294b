//! # Engine Module
//!
//! This module implements the stateful orchestration layer of ensamp: the
//! synchronization protocol that couples an external engine's native state to
//! the shared [`Snapshot`](crate::core::snapshot::Snapshot), and the dispatch
//! machinery that hands that snapshot to every registered sampling method.
//!
//! ## Overview
//!
//! Once per integration cycle the [`Hook`](hook::Hook) pulls engine-native
//! state into the snapshot, notifies listeners in registration order, and
//! pushes the (possibly bias-modified) forces back to the engine. The cycle is
//! an explicit state machine, so calling any phase out of order is a checked
//! runtime error rather than silent corruption.
//!
//! ## Architecture
//!
//! - **Synchronization** ([`hook`]) - The phase state machine, the
//!   [`SynchronizableEngine`](hook::SynchronizableEngine) adapter contract, and
//!   the listener registry
//! - **Listening** ([`listener`]) - The lifecycle contract sampling methods
//!   implement, with per-listener dispatch frequencies
//! - **Collective Variables** ([`cv`]) - The consumable CV interface and its
//!   ordered manager
//! - **Walker Topology** ([`topology`]) - Pure rank/size arithmetic for
//!   multi-walker runs
//! - **Error Handling** ([`error`]) - Hook-level error taxonomy
//!
//! All errors at this layer are unrecoverable by design: a failed
//! synchronization or listener means the physical state can no longer be
//! trusted, and the owning process is expected to terminate.

pub mod cv;
pub mod error;
pub mod hook;
pub mod listener;
pub mod topology;
