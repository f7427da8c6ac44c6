//! Person storage contracts and implementations.
//!
//! # Responsibility
//! - Define the storage seam the registry writes through.
//! - Keep iteration order deterministic for index rebuilds.
//!
//! # Invariants
//! - Storage never validates; validation belongs to the registry.
//! - Iteration order is insertion order.

pub mod person_repo;
