//! Core family-tree layout and connector engine.
//! This crate owns the person registry, generation index, layout and
//! rearrangement pipeline; views only render what it pushes to them.

pub mod connector;
pub mod index;
pub mod layout;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;

pub use connector::router::{Connector, ConnectorKind, ConnectorRouter};
pub use index::generation_index::{FamilyUnit, GenerationIndex};
pub use layout::config::{LayoutConfig, TreeConfig};
pub use layout::engine::{BoxRole, LayoutEngine, LayoutError, PersonBox, TreeLayout, UnitFrame};
pub use layout::geometry::{Point, Rect, Size};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{
    Gender, NewPerson, Person, PersonDetails, PersonId, PersonValidationError, Relationships,
};
pub use model::placement::{FamilyUnitId, GenerationLevel, Placement};
pub use registry::person_registry::{PersonRegistry, RegistryError, RegistryResult, RelationKind};
pub use repo::person_repo::{InMemoryPersonRepository, PersonRepository};
pub use service::debounce::Debouncer;
pub use service::relative_draft::{DraftError, RelativeDraft, RelativeKind, ValidatedRelative};
pub use service::tree_service::{FamilyTreeService, RearrangeOutcome, TreeStatus};
pub use service::view::{BoxPlacement, NullView, PassId, SettleMode, TreeView};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
