//! Use-case services on top of the registry and layout pipeline.
//!
//! # Responsibility
//! - Orchestrate registry, index, layout and routing into rearrangement
//!   passes pushed to a `TreeView`.
//! - Keep the view layer decoupled from layout internals.

pub mod debounce;
pub mod relative_draft;
pub mod tree_service;
pub mod view;
