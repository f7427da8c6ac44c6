//! View-layer callback contract.
//!
//! # Responsibility
//! - Describe every outbound call the core makes on its rendering
//!   collaborator.
//!
//! # Invariants
//! - The core never reads view state back; the view only receives
//!   placements, lines, recentering and settle requests.
//! - `place_box` creates a box on first sight of an id and moves it after.

use crate::connector::router::Connector;
use crate::layout::engine::{BoxRole, PersonBox};
use crate::layout::geometry::{Point, Rect};
use crate::model::person::{PersonDetails, PersonId};
use crate::model::placement::{FamilyUnitId, GenerationLevel};
use serde::Serialize;
use std::time::Duration;

/// Monotonic rearrangement pass number, starting at 1.
pub type PassId = u64;

/// Everything the view needs to paint one person box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlacement {
    pub person_id: PersonId,
    pub details: PersonDetails,
    pub family_unit: FamilyUnitId,
    pub generation: GenerationLevel,
    pub role: BoxRole,
    pub rect: Rect,
    /// Offset from the family unit anchor, for views that position boxes
    /// inside unit containers.
    pub offset: Point,
    pub newly_added: bool,
    /// Position in the pass; the view staggers transitions by it.
    pub stagger_index: usize,
    /// `stagger_index * stagger_delay`.
    pub delay: Duration,
}

impl BoxPlacement {
    pub(crate) fn from_box(
        person_box: &PersonBox,
        details: PersonDetails,
        newly_added: bool,
        stagger_index: usize,
        delay: Duration,
    ) -> Self {
        Self {
            person_id: person_box.person_id.clone(),
            details,
            family_unit: person_box.family_unit.clone(),
            generation: person_box.generation,
            role: person_box.role,
            rect: person_box.rect,
            offset: person_box.offset,
            newly_added,
            stagger_index,
            delay,
        }
    }
}

/// How the view completes the settle phase of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleMode {
    /// Nothing to animate; the pass completes immediately.
    Immediate,
    /// The view calls `complete_settle(pass)` once its transition ends.
    Deferred,
}

/// Rendering collaborator driven by the rearrangement service.
pub trait TreeView {
    fn place_box(&mut self, placement: &BoxPlacement);
    fn remove_box(&mut self, id: &PersonId);
    fn draw_line(&mut self, connector: &Connector);
    fn clear_lines(&mut self);

    /// Recenters the viewport on the laid-out tree. Called once per pass
    /// that placed boxes, after lines and before the settle phase.
    fn center_on(&mut self, _bounds: Rect) {}

    /// Starts the settle phase of `pass`; `budget` bounds the transition.
    fn begin_settle(&mut self, _pass: PassId, _budget: Duration) -> SettleMode {
        SettleMode::Immediate
    }

    /// Transient "newly added" highlighting should end for `ids`.
    fn newly_added_cleared(&mut self, _ids: &[PersonId]) {}
}

/// View that renders nothing; useful for headless layout runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl TreeView for NullView {
    fn place_box(&mut self, _placement: &BoxPlacement) {}
    fn remove_box(&mut self, _id: &PersonId) {}
    fn draw_line(&mut self, _connector: &Connector) {}
    fn clear_lines(&mut self) {}
}
