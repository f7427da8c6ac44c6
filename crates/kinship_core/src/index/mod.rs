//! Generation / family-unit index.
//!
//! # Responsibility
//! - Group registered persons into generation levels and family units.
//!
//! # Invariants
//! - Family units keep insertion order inside their generation.
//! - A person belongs to exactly one family unit at a time.
//! - Rebuilding from unchanged registry state yields an equal index.

pub mod generation_index;
