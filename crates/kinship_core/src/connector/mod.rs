//! Connector lines between positioned person boxes.
//!
//! # Responsibility
//! - Derive marriage, parent-child and sibling-bracket geometry from a
//!   finished layout and registry relationships.
//!
//! # Invariants
//! - Lines are rebuilt from scratch on every pass.
//! - One marriage line per couple, one parent-child line per listed parent,
//!   one bracket per unit with more than one sibling box.

pub mod router;
