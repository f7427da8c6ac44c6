//! Layout engine: generation index to concrete box positions.
//!
//! # Responsibility
//! - Place family units as uniform slots centered on the tree center.
//! - Place members inside a unit as wrapped rows, keeping married pairs
//!   side by side.
//!
//! # Invariants
//! - A generation's anchor y depends only on its level.
//! - Slots within one generation never overlap; a slot is widened to fit
//!   the unit's widest row plus margins.
//! - Output is a pure function of (index, registry, config).

use crate::index::generation_index::{FamilyUnit, GenerationIndex};
use crate::layout::config::LayoutConfig;
use crate::layout::geometry::{Point, Rect};
use crate::model::person::{Person, PersonId};
use crate::model::placement::{FamilyUnitId, GenerationLevel};
use crate::registry::person_registry::PersonRegistry;
use crate::repo::person_repo::PersonRepository;
use log::trace;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures while computing positions or connector geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The index references a person the registry does not hold.
    UnknownPerson(PersonId),
    /// A connector endpoint has no positioned box.
    MissingBox(PersonId),
    /// Configuration values cannot produce a layout.
    InvalidConfig(String),
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPerson(id) => write!(f, "indexed person not registered: {id}"),
            Self::MissingBox(id) => write!(f, "no positioned box for person: {id}"),
            Self::InvalidConfig(message) => write!(f, "invalid layout config: {message}"),
        }
    }
}

impl Error for LayoutError {}

/// How a box participates in its family unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxRole {
    /// One of a mutually married pair seated side by side.
    Couple,
    /// Member of a sibling row (including singletons).
    Sibling,
}

/// Computed position of one person box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonBox {
    pub person_id: PersonId,
    pub family_unit: FamilyUnitId,
    pub generation: GenerationLevel,
    pub role: BoxRole,
    pub row: usize,
    pub column: usize,
    /// Offset of the box's top-center from its unit anchor.
    pub offset: Point,
    /// Absolute rectangle on the tree canvas.
    pub rect: Rect,
}

/// Computed slot of one family unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitFrame {
    pub id: FamilyUnitId,
    pub generation: GenerationLevel,
    /// Horizontal center of the slot at the generation's y.
    pub anchor: Point,
    /// Slot rectangle: left edge, slot width, height of all rows.
    pub rect: Rect,
    pub rows: usize,
    pub members: Vec<PersonId>,
}

/// Result of one layout computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeLayout {
    boxes: Vec<PersonBox>,
    units: Vec<UnitFrame>,
    #[serde(skip)]
    lookup: HashMap<PersonId, usize>,
}

impl TreeLayout {
    /// Boxes in generation order, then unit order, then member order.
    pub fn boxes(&self) -> &[PersonBox] {
        &self.boxes
    }

    /// Unit frames in generation order, then insertion order.
    pub fn units(&self) -> &[UnitFrame] {
        &self.units
    }

    pub fn box_for(&self, id: &PersonId) -> Option<&PersonBox> {
        self.lookup.get(id).map(|position| &self.boxes[*position])
    }

    pub fn unit_frames_for(&self, level: GenerationLevel) -> impl Iterator<Item = &UnitFrame> {
        self.units.iter().filter(move |unit| unit.generation == level)
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Smallest rectangle enclosing every box.
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.boxes.first()?.rect;
        let (mut left, mut top, mut right, mut bottom) =
            (first.left(), first.top(), first.right(), first.bottom());
        for person_box in &self.boxes[1..] {
            left = left.min(person_box.rect.left());
            top = top.min(person_box.rect.top());
            right = right.max(person_box.rect.right());
            bottom = bottom.max(person_box.rect.bottom());
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    fn push_box(&mut self, person_box: PersonBox) {
        self.lookup
            .insert(person_box.person_id.clone(), self.boxes.len());
        self.boxes.push(person_box);
    }
}

/// Member arrangement relative to a unit anchor, before slots are known.
struct UnitArrangement {
    placed: Vec<PlacedMember>,
    rows: usize,
    content_width: f64,
}

struct PlacedMember {
    person_id: PersonId,
    role: BoxRole,
    row: usize,
    column: usize,
    offset: Point,
}

/// Stateless layout calculator over one configuration.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Computes positions for every indexed person.
    ///
    /// # Errors
    /// - `InvalidConfig` when the configuration fails validation.
    /// - `UnknownPerson` when the index and registry disagree.
    pub fn compute<R: PersonRepository>(
        &self,
        index: &GenerationIndex,
        registry: &PersonRegistry<R>,
    ) -> Result<TreeLayout, LayoutError> {
        self.config.validate()?;
        let mut layout = TreeLayout::default();

        for level in index.levels() {
            let units = index.units_for(level);
            let arrangements = units
                .iter()
                .map(|unit| self.arrange_unit(unit, registry))
                .collect::<Result<Vec<_>, _>>()?;
            self.place_generation(level, units, arrangements, &mut layout);
        }

        trace!(
            "event=layout_compute module=layout status=ok boxes={} units={}",
            layout.boxes.len(),
            layout.units.len()
        );
        Ok(layout)
    }

    fn place_generation(
        &self,
        level: GenerationLevel,
        units: &[FamilyUnit],
        arrangements: Vec<UnitArrangement>,
        layout: &mut TreeLayout,
    ) {
        let config = &self.config;
        let anchor_y = config.center.y + f64::from(level) * config.generation_height;
        let widest = arrangements
            .iter()
            .map(|arrangement| arrangement.content_width)
            .fold(0.0_f64, f64::max);
        let slot_width = config
            .family_unit_width
            .max(widest + 2.0 * config.person_margin);
        let total_width = units.len() as f64 * slot_width;
        let start_x = config.center.x - total_width / 2.0;

        for (position, (unit, arrangement)) in units.iter().zip(arrangements).enumerate() {
            let left = start_x + position as f64 * slot_width;
            let anchor = Point::new(left + slot_width / 2.0, anchor_y);
            let height = if arrangement.rows == 0 {
                0.0
            } else {
                arrangement.rows as f64 * config.row_height() - config.row_gutter
            };

            layout.units.push(UnitFrame {
                id: unit.id.clone(),
                generation: level,
                anchor,
                rect: Rect::new(left, anchor_y, slot_width, height),
                rows: arrangement.rows,
                members: unit.members.clone(),
            });

            for member in arrangement.placed {
                let rect = Rect::from_top_center(anchor.offset(member.offset), config.person_size());
                layout.push_box(PersonBox {
                    person_id: member.person_id,
                    family_unit: unit.id.clone(),
                    generation: level,
                    role: member.role,
                    row: member.row,
                    column: member.column,
                    offset: member.offset,
                    rect,
                });
            }
        }
    }

    fn arrange_unit<R: PersonRepository>(
        &self,
        unit: &FamilyUnit,
        registry: &PersonRegistry<R>,
    ) -> Result<UnitArrangement, LayoutError> {
        let members = unit
            .members
            .iter()
            .map(|id| {
                registry
                    .get_person(id)
                    .ok_or_else(|| LayoutError::UnknownPerson(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if members.is_empty() {
            return Ok(UnitArrangement {
                placed: Vec::new(),
                rows: 0,
                content_width: 0.0,
            });
        }

        Ok(self.arrange_rows(pair_spouses(&members)))
    }

    fn arrange_rows(&self, members: Vec<(PersonId, BoxRole)>) -> UnitArrangement {
        let config = &self.config;
        let cap = config.max_siblings_per_row;
        let count = members.len();
        let rows = count.div_ceil(cap);
        let mut content_width = 0.0_f64;

        let placed = members
            .into_iter()
            .enumerate()
            .map(|(position, (person_id, role))| {
                let row = position / cap;
                let column = position % cap;
                let in_row = cap.min(count - row * cap);
                content_width = content_width.max(row_width(in_row, config));
                let x = (column as f64 - (in_row as f64 - 1.0) / 2.0) * config.pitch();
                let y = row as f64 * config.row_height();
                PlacedMember {
                    person_id,
                    role,
                    row,
                    column,
                    offset: Point::new(x, y),
                }
            })
            .collect();

        UnitArrangement {
            placed,
            rows,
            content_width,
        }
    }
}

/// Member order for a row layout: each married pair found in the unit is
/// kept adjacent and tagged `Couple`; everyone else is a `Sibling`.
fn pair_spouses(members: &[&Person]) -> Vec<(PersonId, BoxRole)> {
    let mut seated: HashSet<&PersonId> = HashSet::new();
    let mut ordered = Vec::with_capacity(members.len());
    for person in members {
        if !seated.insert(&person.id) {
            continue;
        }
        let partner = members
            .iter()
            .find(|other| !seated.contains(&other.id) && person.is_married_to(other));
        match partner {
            Some(partner) => {
                seated.insert(&partner.id);
                ordered.push((person.id.clone(), BoxRole::Couple));
                ordered.push((partner.id.clone(), BoxRole::Couple));
            }
            None => ordered.push((person.id.clone(), BoxRole::Sibling)),
        }
    }
    ordered
}

fn row_width(members: usize, config: &LayoutConfig) -> f64 {
    if members == 0 {
        return 0.0;
    }
    members as f64 * config.person_width + (members - 1) as f64 * config.min_person_spacing
}
