//! Rearrangement orchestrator.
//!
//! # Responsibility
//! - Own the registry, the generation index, the configuration and the view.
//! - Turn every mutation into one rearrangement pass: layout, connectors,
//!   then a staggered push of placements and lines to the view.
//! - Coalesce bursty resize and structure signals through debouncers.
//!
//! # Invariants
//! - At most one pass is in flight; triggers during a pass are coalesced.
//! - A failed pass leaves the view untouched and returns to idle.
//! - A deferred settle always completes, by signal or by deadline.
//! - Person names never reach the log; ids only.

use crate::connector::router::{Connector, ConnectorRouter};
use crate::index::generation_index::GenerationIndex;
use crate::layout::config::{LayoutConfig, TreeConfig};
use crate::layout::engine::{LayoutEngine, LayoutError, TreeLayout};
use crate::model::person::{NewPerson, Person, PersonDetails, PersonId, Relationships};
use crate::model::placement::{FamilyUnitId, GenerationLevel};
use crate::registry::person_registry::{PersonRegistry, RegistryResult};
use crate::repo::person_repo::{InMemoryPersonRepository, PersonRepository};
use crate::service::debounce::Debouncer;
use crate::service::relative_draft::{DraftError, RelativeDraft};
use crate::service::view::{BoxPlacement, PassId, SettleMode, TreeView};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Result of asking for a rearrangement pass.
#[derive(Debug, Clone, PartialEq)]
pub enum RearrangeOutcome {
    /// Pass ran and settled immediately.
    Completed(PassId),
    /// Pass ran; the view settles it later.
    Settling(PassId),
    /// Another pass is in flight; this trigger was dropped.
    Coalesced,
    /// The view has not reported ready yet.
    NotReady,
    /// Nothing to lay out; lines were cleared.
    Empty,
    /// Layout or routing failed; the view was not touched.
    Failed(LayoutError),
}

/// Snapshot returned by `get_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeStatus {
    pub initialized: bool,
    pub people_count: usize,
    pub generations_count: usize,
    pub is_rearranging: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum PassState {
    Idle,
    Rearranging {
        pass: PassId,
        deadline: Instant,
        highlighted: Vec<PersonId>,
    },
}

/// Family-tree facade driven synchronously by the view layer.
pub struct FamilyTreeService<V: TreeView, R: PersonRepository = InMemoryPersonRepository> {
    config: TreeConfig,
    /// Layout settings before any viewport adjustment.
    base_layout: LayoutConfig,
    /// Last debounced viewport width, reapplied when the config changes.
    viewport_width: Option<f64>,
    registry: PersonRegistry<R>,
    index: GenerationIndex,
    view: V,
    state: PassState,
    initialized: bool,
    next_pass: PassId,
    last_layout: TreeLayout,
    connectors: Vec<Connector>,
    recently_added: Vec<PersonId>,
    resize: Debouncer<f64>,
    structure: Debouncer<()>,
}

impl<V: TreeView> FamilyTreeService<V, InMemoryPersonRepository> {
    pub fn new(config: TreeConfig, view: V) -> Self {
        Self::with_repository(config, view, InMemoryPersonRepository::new())
    }
}

impl<V: TreeView, R: PersonRepository> FamilyTreeService<V, R> {
    /// Creates a service over `repo`; persons already stored are indexed.
    pub fn with_repository(config: TreeConfig, view: V, repo: R) -> Self {
        let registry = PersonRegistry::new(repo);
        let index = GenerationIndex::rebuild(&registry);
        Self {
            base_layout: config.layout.clone(),
            viewport_width: None,
            resize: Debouncer::new(config.resize_debounce()),
            structure: Debouncer::new(config.structure_debounce()),
            config,
            registry,
            index,
            view,
            state: PassState::Idle,
            initialized: false,
            next_pass: 1,
            last_layout: TreeLayout::default(),
            connectors: Vec::new(),
            recently_added: Vec::new(),
        }
    }

    /// The view can now receive placements; runs the first pass.
    pub fn mark_view_ready(&mut self) -> RearrangeOutcome {
        self.mark_view_ready_at(Instant::now())
    }

    pub fn mark_view_ready_at(&mut self, now: Instant) -> RearrangeOutcome {
        if !self.initialized {
            self.initialized = true;
            info!(
                "event=view_ready module=service status=ok people={}",
                self.registry.len()
            );
        }
        self.trigger_rearrangement_at(now)
    }

    /// Registers a person, indexes it and runs a pass.
    ///
    /// # Errors
    /// - Any `RegistryError`; nothing is written and no pass runs.
    pub fn add_person(
        &mut self,
        input: NewPerson,
        generation: GenerationLevel,
        family_unit: impl Into<FamilyUnitId>,
        relationships: Relationships,
    ) -> RegistryResult<Person> {
        let person = self
            .registry
            .add_person(input, generation, family_unit, relationships)?;
        self.index.assign(
            person.id.clone(),
            person.generation,
            person.family_unit.clone(),
        );
        self.recently_added.push(person.id.clone());
        info!(
            "event=person_added module=service status=ok person_id={} generation={} family_unit={}",
            person.id, person.generation, person.family_unit
        );
        self.trigger_after_mutation();
        Ok(person)
    }

    /// Validates `draft` against the registry and adds the derived person.
    ///
    /// # Errors
    /// - `DraftError` for malformed fields, an unknown anchor, or a
    ///   registry rejection of the derived person.
    pub fn add_relative(&mut self, draft: &RelativeDraft) -> Result<Person, DraftError> {
        let validated = draft.validate(&self.registry)?;
        debug!(
            "event=relative_draft module=service status=ok kind={:?} anchor={}",
            draft.kind, draft.anchor
        );
        self.add_person(
            validated.person,
            validated.generation,
            validated.family_unit,
            validated.relationships,
        )
        .map_err(DraftError::from)
    }

    /// Deletes a person, removes its box and runs a pass.
    ///
    /// Returns `false` (and does nothing) when `id` is unknown.
    pub fn delete_person(&mut self, id: &PersonId) -> bool {
        if !self.registry.delete_person(id) {
            return false;
        }
        self.index = GenerationIndex::rebuild(&self.registry);
        self.recently_added.retain(|added| added != id);
        if self.initialized {
            self.view.remove_box(id);
        }
        info!("event=person_deleted module=service status=ok person_id={id}");
        self.trigger_after_mutation();
        true
    }

    /// Replaces a person's descriptive fields and runs a pass.
    ///
    /// Returns `Ok(false)` when `id` is unknown.
    ///
    /// # Errors
    /// - `Validation` when `details` break a field invariant.
    pub fn edit_person(&mut self, id: &PersonId, details: PersonDetails) -> RegistryResult<bool> {
        if !self.registry.edit_person(id, details)? {
            return Ok(false);
        }
        self.index = GenerationIndex::rebuild(&self.registry);
        info!("event=person_edited module=service status=ok person_id={id}");
        self.trigger_after_mutation();
        Ok(true)
    }

    pub fn trigger_rearrangement(&mut self) -> RearrangeOutcome {
        self.trigger_rearrangement_at(Instant::now())
    }

    /// Runs one rearrangement pass unless one is already in flight.
    pub fn trigger_rearrangement_at(&mut self, now: Instant) -> RearrangeOutcome {
        if !self.initialized {
            debug!("event=rearrange module=service status=skipped reason=view_not_ready");
            return RearrangeOutcome::NotReady;
        }
        if let PassState::Rearranging { pass, .. } = &self.state {
            debug!("event=rearrange module=service status=coalesced in_flight={pass}");
            return RearrangeOutcome::Coalesced;
        }

        let (layout, connectors, placements) = match self.compute_pass() {
            Ok(computed) => computed,
            Err(err) => {
                error!("event=rearrange module=service status=error error={err}");
                self.state = PassState::Idle;
                return RearrangeOutcome::Failed(err);
            }
        };

        self.view.clear_lines();
        if layout.is_empty() {
            self.last_layout = layout;
            self.connectors.clear();
            debug!("event=rearrange module=service status=ok boxes=0");
            return RearrangeOutcome::Empty;
        }

        let pass = self.next_pass;
        self.next_pass += 1;
        for placement in &placements {
            self.view.place_box(placement);
        }
        for connector in &connectors {
            self.view.draw_line(connector);
        }

        let budget = self.config.settle_budget(placements.len());
        let highlighted = placements
            .iter()
            .filter(|placement| placement.newly_added)
            .map(|placement| placement.person_id.clone())
            .collect();
        self.state = PassState::Rearranging {
            pass,
            deadline: now + budget,
            highlighted,
        };
        info!(
            "event=rearrange module=service status=ok pass={pass} boxes={} lines={} budget_ms={}",
            placements.len(),
            connectors.len(),
            budget.as_millis()
        );
        self.last_layout = layout;
        self.connectors = connectors;
        if let Some(bounds) = self.last_layout.bounds() {
            self.view.center_on(bounds);
        }

        match self.view.begin_settle(pass, budget) {
            SettleMode::Immediate => {
                self.finish_pass();
                RearrangeOutcome::Completed(pass)
            }
            SettleMode::Deferred => RearrangeOutcome::Settling(pass),
        }
    }

    /// Ends a deferred settle; stale or unknown pass ids are ignored.
    pub fn complete_settle(&mut self, pass: PassId) -> bool {
        let in_flight = matches!(
            self.state,
            PassState::Rearranging { pass: current, .. } if current == pass
        );
        if !in_flight {
            debug!("event=settle module=service status=ignored pass={pass}");
            return false;
        }
        self.finish_pass();
        true
    }

    pub fn poll(&mut self) -> Option<RearrangeOutcome> {
        self.poll_at(Instant::now())
    }

    /// Advances time-driven work: the settle deadline, then debounced
    /// resize and structure signals.
    ///
    /// Returns the outcome of the pass a debounced signal started, if any.
    /// Debounced signals stay pending while a pass is in flight.
    pub fn poll_at(&mut self, now: Instant) -> Option<RearrangeOutcome> {
        if let PassState::Rearranging { pass, deadline, .. } = &self.state {
            if now < *deadline {
                return None;
            }
            warn!("event=settle module=service status=timeout pass={pass}");
            self.finish_pass();
        }

        let mut wanted = false;
        if let Some(width) = self.resize.tick_at(now) {
            self.viewport_width = Some(width);
            self.config.layout = self.base_layout.for_viewport_width(width);
            debug!(
                "event=resize module=service status=ok width={width} person_width={}",
                self.config.layout.person_width
            );
            wanted = true;
        }
        if self.structure.tick_at(now).is_some() {
            debug!("event=structure_changed module=service status=ok");
            wanted = true;
        }
        wanted.then(|| self.trigger_rearrangement_at(now))
    }

    pub fn notify_resize(&mut self, width: f64) {
        self.notify_resize_at(width, Instant::now());
    }

    /// Records a viewport width; applied once resizing goes quiet.
    pub fn notify_resize_at(&mut self, width: f64, now: Instant) {
        self.resize.signal_at(width, now);
    }

    pub fn notify_structure_changed(&mut self) {
        self.notify_structure_changed_at(Instant::now());
    }

    /// Records an external structural change in the view.
    pub fn notify_structure_changed_at(&mut self, now: Instant) {
        self.structure.signal_at((), now);
    }

    /// Replaces the configuration and runs a pass. A viewport width seen
    /// earlier still adjusts the new layout settings.
    ///
    /// # Errors
    /// - `InvalidConfig` when `config.layout` fails validation; the previous
    ///   configuration stays active.
    pub fn set_config(&mut self, config: TreeConfig) -> Result<RearrangeOutcome, LayoutError> {
        config.layout.validate()?;
        self.base_layout = config.layout.clone();
        self.resize.set_quiet_period(config.resize_debounce());
        self.structure.set_quiet_period(config.structure_debounce());
        self.config = config;
        if let Some(width) = self.viewport_width {
            self.config.layout = self.base_layout.for_viewport_width(width);
        }
        info!("event=config_update module=service status=ok");
        Ok(self.trigger_rearrangement())
    }

    pub fn get_status(&self) -> TreeStatus {
        TreeStatus {
            initialized: self.initialized,
            people_count: self.registry.len(),
            generations_count: self.index.generation_count(),
            is_rearranging: self.is_rearranging(),
        }
    }

    pub fn is_rearranging(&self) -> bool {
        matches!(self.state, PassState::Rearranging { .. })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Layout committed by the last successful pass.
    pub fn last_layout(&self) -> &TreeLayout {
        &self.last_layout
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn registry(&self) -> &PersonRegistry<R> {
        &self.registry
    }

    pub fn index(&self) -> &GenerationIndex {
        &self.index
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    fn trigger_after_mutation(&mut self) {
        let outcome = self.trigger_rearrangement();
        debug!("event=mutation_pass module=service status=ok outcome={outcome:?}");
    }

    /// Fallible half of a pass; touches nothing outside its return value.
    fn compute_pass(
        &self,
    ) -> Result<(TreeLayout, Vec<Connector>, Vec<BoxPlacement>), LayoutError> {
        let layout =
            LayoutEngine::new(self.config.layout.clone()).compute(&self.index, &self.registry)?;
        let connectors = ConnectorRouter::new(&self.config.layout).route(&layout, &self.registry)?;

        let stagger = self.config.stagger_delay();
        let placements = layout
            .boxes()
            .iter()
            .enumerate()
            .map(|(position, person_box)| -> Result<BoxPlacement, LayoutError> {
                let person = self
                    .registry
                    .get_person(&person_box.person_id)
                    .ok_or_else(|| LayoutError::UnknownPerson(person_box.person_id.clone()))?;
                Ok(BoxPlacement::from_box(
                    person_box,
                    person.details.clone(),
                    self.recently_added.contains(&person.id),
                    position,
                    stagger_offset(stagger, position),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((layout, connectors, placements))
    }

    fn finish_pass(&mut self) {
        let PassState::Rearranging {
            pass, highlighted, ..
        } = std::mem::replace(&mut self.state, PassState::Idle)
        else {
            return;
        };
        self.recently_added
            .retain(|added| !highlighted.contains(added));
        if !highlighted.is_empty() {
            self.view.newly_added_cleared(&highlighted);
        }
        debug!(
            "event=settle module=service status=ok pass={pass} cleared={}",
            highlighted.len()
        );
    }
}

fn stagger_offset(stagger: Duration, position: usize) -> Duration {
    stagger.saturating_mul(u32::try_from(position).unwrap_or(u32::MAX))
}
