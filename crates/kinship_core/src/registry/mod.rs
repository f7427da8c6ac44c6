//! Person registry: validated writes over person storage.
//!
//! # Responsibility
//! - Validate person input before anything is stored.
//! - Own the single relationship write path (`link` / `unlink`).
//!
//! # Invariants
//! - Spouse and sibling references are symmetric.
//! - `A in B.parents` iff `B in A.children`.
//! - After `delete_person`, no stored person references the removed id.

pub mod person_registry;
