//! Family-tree domain model.
//!
//! # Responsibility
//! - Define canonical person records and their relationship references.
//! - Define placement identifiers shared by index, layout and view layers.
//!
//! # Invariants
//! - Every person is identified by a stable `PersonId`.
//! - Relationship fields hold ids only; no person owns another person.

pub mod person;
pub mod placement;
