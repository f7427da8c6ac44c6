#![allow(dead_code)]

use kinship_core::{
    BoxPlacement, Connector, FamilyTreeService, NewPerson, PassId, PersonId, Rect,
    Relationships, SettleMode, TreeConfig, TreeView,
};
use std::time::Duration;

/// One outbound call received by `RecordingView`.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Place(BoxPlacement),
    Remove(PersonId),
    Line(Connector),
    ClearLines,
    CenterOn(Rect),
    Settle(PassId, Duration),
    NewlyAddedCleared(Vec<PersonId>),
}

/// View that records every call and settles in a configurable mode.
#[derive(Debug)]
pub struct RecordingView {
    pub calls: Vec<ViewCall>,
    pub settle_mode: SettleMode,
}

impl RecordingView {
    pub fn immediate() -> Self {
        Self {
            calls: Vec::new(),
            settle_mode: SettleMode::Immediate,
        }
    }

    pub fn deferred() -> Self {
        Self {
            calls: Vec::new(),
            settle_mode: SettleMode::Deferred,
        }
    }

    pub fn placements(&self) -> Vec<&BoxPlacement> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ViewCall::Place(placement) => Some(placement),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<&Connector> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ViewCall::Line(connector) => Some(connector),
                _ => None,
            })
            .collect()
    }

    pub fn settle_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, ViewCall::Settle(..)))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl TreeView for RecordingView {
    fn place_box(&mut self, placement: &BoxPlacement) {
        self.calls.push(ViewCall::Place(placement.clone()));
    }

    fn remove_box(&mut self, id: &PersonId) {
        self.calls.push(ViewCall::Remove(id.clone()));
    }

    fn draw_line(&mut self, connector: &Connector) {
        self.calls.push(ViewCall::Line(connector.clone()));
    }

    fn clear_lines(&mut self) {
        self.calls.push(ViewCall::ClearLines);
    }

    fn center_on(&mut self, bounds: Rect) {
        self.calls.push(ViewCall::CenterOn(bounds));
    }

    fn begin_settle(&mut self, pass: PassId, budget: Duration) -> SettleMode {
        self.calls.push(ViewCall::Settle(pass, budget));
        self.settle_mode
    }

    fn newly_added_cleared(&mut self, ids: &[PersonId]) {
        self.calls.push(ViewCall::NewlyAddedCleared(ids.to_vec()));
    }
}

pub fn ready_service(view: RecordingView) -> FamilyTreeService<RecordingView> {
    let mut service = FamilyTreeService::new(TreeConfig::default(), view);
    service.mark_view_ready();
    service
}

/// Adds `id` (also used as its name) with no relationships.
pub fn add_plain(
    service: &mut FamilyTreeService<RecordingView>,
    id: &str,
    generation: i32,
    unit: &str,
) {
    service
        .add_person(
            NewPerson::new(id).with_id(id),
            generation,
            unit,
            Relationships::default(),
        )
        .expect("person should register");
}
