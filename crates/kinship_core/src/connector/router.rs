//! Connector routing over a computed layout.

use crate::layout::config::LayoutConfig;
use crate::layout::engine::{BoxRole, LayoutError, PersonBox, TreeLayout};
use crate::layout::geometry::Point;
use crate::model::person::PersonId;
use crate::model::placement::FamilyUnitId;
use crate::registry::person_registry::PersonRegistry;
use crate::repo::person_repo::PersonRepository;
use serde::Serialize;
use std::collections::HashSet;

/// Line category, used by the view for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    Marriage,
    ParentChild,
    Sibling,
}

/// One straight connector segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    pub kind: ConnectorKind,
    /// Left spouse, parent, or leftmost sibling.
    pub from: PersonId,
    /// Right spouse, child, or rightmost sibling.
    pub to: PersonId,
    /// Set for sibling brackets only.
    pub family_unit: Option<FamilyUnitId>,
    pub start: Point,
    pub end: Point,
    pub length: f64,
}

impl Connector {
    fn new(kind: ConnectorKind, from: PersonId, to: PersonId, start: Point, end: Point) -> Self {
        Self {
            kind,
            from,
            to,
            family_unit: None,
            start,
            end,
            length: start.distance_to(end),
        }
    }

    pub fn involves(&self, id: &PersonId) -> bool {
        &self.from == id || &self.to == id
    }
}

/// Computes connector geometry for a finished layout.
#[derive(Debug, Clone)]
pub struct ConnectorRouter {
    sibling_bracket_offset: f64,
}

impl ConnectorRouter {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            sibling_bracket_offset: config.sibling_bracket_offset,
        }
    }

    /// Routes every connector: marriages, then parent-child, then brackets.
    /// A marriage line joins every mutually married pair, whatever unit the
    /// pair was laid out in.
    ///
    /// # Errors
    /// - `UnknownPerson` when a laid-out box has no registry record.
    /// - `MissingBox` when a relationship endpoint was not laid out.
    pub fn route<R: PersonRepository>(
        &self,
        layout: &TreeLayout,
        registry: &PersonRegistry<R>,
    ) -> Result<Vec<Connector>, LayoutError> {
        let mut connectors = self.marriage_lines(layout, registry)?;
        connectors.extend(self.parent_child_lines(layout, registry)?);
        connectors.extend(self.sibling_brackets(layout));
        Ok(connectors)
    }

    fn marriage_lines<R: PersonRepository>(
        &self,
        layout: &TreeLayout,
        registry: &PersonRegistry<R>,
    ) -> Result<Vec<Connector>, LayoutError> {
        let mut seen: HashSet<(PersonId, PersonId)> = HashSet::new();
        let mut lines = Vec::new();

        for person_box in layout.boxes() {
            let person = registry
                .get_person(&person_box.person_id)
                .ok_or_else(|| LayoutError::UnknownPerson(person_box.person_id.clone()))?;
            let Some(spouse_id) = person.spouse() else {
                continue;
            };
            let married = registry
                .get_person(spouse_id)
                .is_some_and(|spouse| person.is_married_to(spouse));
            if !married || !seen.insert(couple_key(&person.id, spouse_id)) {
                continue;
            }
            let spouse_box = require_box(layout, spouse_id)?;

            let (left, right) = if person_box.rect.center_x() <= spouse_box.rect.center_x() {
                (person_box, spouse_box)
            } else {
                (spouse_box, person_box)
            };
            lines.push(Connector::new(
                ConnectorKind::Marriage,
                left.person_id.clone(),
                right.person_id.clone(),
                Point::new(left.rect.right(), left.rect.center_y()),
                Point::new(right.rect.left(), right.rect.center_y()),
            ));
        }
        Ok(lines)
    }

    fn parent_child_lines<R: PersonRepository>(
        &self,
        layout: &TreeLayout,
        registry: &PersonRegistry<R>,
    ) -> Result<Vec<Connector>, LayoutError> {
        let mut lines = Vec::new();
        for child in registry.persons() {
            if child.relationships.parents.is_empty() {
                continue;
            }
            let child_box = require_box(layout, &child.id)?;
            for parent_id in &child.relationships.parents {
                let parent_box = require_box(layout, parent_id)?;
                lines.push(Connector::new(
                    ConnectorKind::ParentChild,
                    parent_id.clone(),
                    child.id.clone(),
                    parent_box.rect.bottom_center(),
                    child_box.rect.top_center(),
                ));
            }
        }
        Ok(lines)
    }

    fn sibling_brackets(&self, layout: &TreeLayout) -> Vec<Connector> {
        let mut lines = Vec::new();
        for unit in layout.units() {
            let siblings: Vec<&PersonBox> = unit
                .members
                .iter()
                .filter_map(|id| layout.box_for(id))
                .filter(|person_box| person_box.role == BoxRole::Sibling)
                .collect();
            if siblings.len() < 2 {
                continue;
            }

            let mut leftmost = siblings[0];
            let mut rightmost = siblings[0];
            let mut top = siblings[0].rect.top();
            for sibling in siblings.iter().skip(1).copied() {
                if sibling.rect.center_x() < leftmost.rect.center_x() {
                    leftmost = sibling;
                }
                if sibling.rect.center_x() > rightmost.rect.center_x() {
                    rightmost = sibling;
                }
                top = top.min(sibling.rect.top());
            }

            let y = top - self.sibling_bracket_offset;
            let mut bracket = Connector::new(
                ConnectorKind::Sibling,
                leftmost.person_id.clone(),
                rightmost.person_id.clone(),
                Point::new(leftmost.rect.center_x(), y),
                Point::new(rightmost.rect.center_x(), y),
            );
            bracket.family_unit = Some(unit.id.clone());
            lines.push(bracket);
        }
        lines
    }
}

/// Order-independent key for a couple.
fn couple_key(a: &PersonId, b: &PersonId) -> (PersonId, PersonId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

fn require_box<'a>(layout: &'a TreeLayout, id: &PersonId) -> Result<&'a PersonBox, LayoutError> {
    layout
        .box_for(id)
        .ok_or_else(|| LayoutError::MissingBox(id.clone()))
}
