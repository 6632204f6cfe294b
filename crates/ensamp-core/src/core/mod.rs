//! # Core Module
//!
//! This module provides the fundamental data structures exchanged between an
//! external simulation engine and the sampling methods coordinated by ensamp.
//!
//! ## Overview
//!
//! The core module is deliberately free of orchestration logic. It defines the
//! two containers everything else operates on:
//!
//! - **Snapshot** ([`snapshot`]) - The canonical in-memory mirror of one walker's
//!   physical state (positions, forces, species, box geometry, timestep),
//!   synchronized with the engine once per integration cycle.
//! - **Grid** ([`grid`]) - A fixed-shape N-dimensional field over continuous
//!   collective-variable space, with periodic axes, per-node auxiliary storage,
//!   nearest-node lookup, and multilinear interpolation.
//!
//! Sampling methods own their grids and read/write the shared snapshot during
//! dispatch; the synchronization machinery in [`crate::engine`] owns the snapshot
//! for the rest of the cycle.

pub mod grid;
pub mod snapshot;
