//! Tree layout: configuration, geometry and the position calculator.
//!
//! # Responsibility
//! - Map the generation index to absolute box rectangles.
//! - Keep every position a pure function of index, registry and config.
//!
//! # Invariants
//! - Layout results are recomputed from scratch, never patched.

pub mod config;
pub mod engine;
pub mod geometry;
