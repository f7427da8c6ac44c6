//! Generation and family-unit grouping.

use crate::model::person::PersonId;
use crate::model::placement::{FamilyUnitId, GenerationLevel, Placement};
use crate::registry::person_registry::PersonRegistry;
use crate::repo::person_repo::PersonRepository;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Ordered members laid out together inside one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyUnit {
    pub id: FamilyUnitId,
    pub generation: GenerationLevel,
    pub members: Vec<PersonId>,
}

impl FamilyUnit {
    fn new(id: FamilyUnitId, generation: GenerationLevel) -> Self {
        Self {
            id,
            generation,
            members: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Persons grouped by generation level, then by family unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationIndex {
    generations: BTreeMap<GenerationLevel, Vec<FamilyUnit>>,
    placements: HashMap<PersonId, Placement>,
}

impl GenerationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh index from registry state in registration order.
    pub fn rebuild<R: PersonRepository>(registry: &PersonRegistry<R>) -> Self {
        let mut index = Self::new();
        for person in registry.persons() {
            index.assign(person.id.clone(), person.generation, person.family_unit.clone());
        }
        index
    }

    /// Appends `person` to the given unit, creating containers on first use.
    ///
    /// A person already indexed elsewhere is moved; existing members are
    /// never reordered.
    pub fn assign(
        &mut self,
        person: PersonId,
        generation: GenerationLevel,
        family_unit: impl Into<FamilyUnitId>,
    ) {
        let family_unit = family_unit.into();
        let placement = Placement::new(generation, family_unit.clone());
        if self.placements.get(&person) == Some(&placement) {
            return;
        }
        self.remove(&person);

        let units = self.generations.entry(generation).or_default();
        let unit = match units.iter().position(|unit| unit.id == family_unit) {
            Some(position) => &mut units[position],
            None => {
                units.push(FamilyUnit::new(family_unit, generation));
                let last = units.len() - 1;
                &mut units[last]
            }
        };
        unit.members.push(person.clone());
        self.placements.insert(person, placement);
    }

    /// Removes `person`, dropping units and generations that become empty.
    pub fn remove(&mut self, person: &PersonId) -> bool {
        let Some(placement) = self.placements.remove(person) else {
            return false;
        };
        if let Some(units) = self.generations.get_mut(&placement.generation) {
            for unit in units.iter_mut() {
                unit.members.retain(|member| member != person);
            }
            units.retain(|unit| !unit.is_empty());
            if units.is_empty() {
                self.generations.remove(&placement.generation);
            }
        }
        true
    }

    /// Family units of one generation in insertion order.
    pub fn units_for(&self, level: GenerationLevel) -> &[FamilyUnit] {
        self.generations
            .get(&level)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Populated generation levels, ascending.
    pub fn levels(&self) -> impl Iterator<Item = GenerationLevel> + '_ {
        self.generations.keys().copied()
    }

    /// Every family unit, generation ascending, insertion order within.
    pub fn units(&self) -> impl Iterator<Item = &FamilyUnit> {
        self.generations.values().flatten()
    }

    pub fn placement_of(&self, person: &PersonId) -> Option<&Placement> {
        self.placements.get(person)
    }

    pub fn generation_count(&self) -> usize {
        self.generations.len()
    }

    pub fn unit_count(&self) -> usize {
        self.generations.values().map(Vec::len).sum()
    }

    pub fn person_count(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}
