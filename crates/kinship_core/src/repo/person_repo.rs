//! Person repository contract and in-memory implementation.
//!
//! # Responsibility
//! - Store registered persons for the process lifetime.
//! - Provide ordered iteration so derived indexes are reproducible.
//!
//! # Invariants
//! - `ids()` yields ids in insertion order; removal keeps the relative order
//!   of the remaining ids.
//! - `insert` never overwrites an existing id.

use crate::model::person::{Person, PersonId};
use std::collections::HashMap;

/// Storage interface for registered persons.
pub trait PersonRepository {
    /// Stores a new person. Returns `false` when the id is already taken.
    fn insert(&mut self, person: Person) -> bool;
    fn get(&self, id: &PersonId) -> Option<&Person>;
    fn get_mut(&mut self, id: &PersonId) -> Option<&mut Person>;
    fn remove(&mut self, id: &PersonId) -> Option<Person>;
    fn contains(&self, id: &PersonId) -> bool {
        self.get(id).is_some()
    }
    /// Ids in insertion order.
    fn ids(&self) -> Vec<PersonId>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered, process-lifetime person storage.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPersonRepository {
    records: HashMap<PersonId, Person>,
    order: Vec<PersonId>,
}

impl InMemoryPersonRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersonRepository for InMemoryPersonRepository {
    fn insert(&mut self, person: Person) -> bool {
        if self.records.contains_key(&person.id) {
            return false;
        }
        self.order.push(person.id.clone());
        self.records.insert(person.id.clone(), person);
        true
    }

    fn get(&self, id: &PersonId) -> Option<&Person> {
        self.records.get(id)
    }

    fn get_mut(&mut self, id: &PersonId) -> Option<&mut Person> {
        self.records.get_mut(id)
    }

    fn remove(&mut self, id: &PersonId) -> Option<Person> {
        let removed = self.records.remove(id)?;
        self.order.retain(|candidate| candidate != id);
        Some(removed)
    }

    fn ids(&self) -> Vec<PersonId> {
        self.order.clone()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryPersonRepository, PersonRepository};
    use crate::model::person::{Person, PersonDetails, PersonId, Relationships};
    use crate::model::placement::FamilyUnitId;

    fn person(id: &str) -> Person {
        Person {
            id: PersonId::from(id),
            details: PersonDetails::new(id),
            generation: 0,
            family_unit: FamilyUnitId::default(),
            relationships: Relationships::default(),
        }
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut repo = InMemoryPersonRepository::new();
        assert!(repo.insert(person("p1")));
        assert!(!repo.insert(person("p1")));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn removal_keeps_relative_order() {
        let mut repo = InMemoryPersonRepository::new();
        for id in ["p1", "p2", "p3"] {
            repo.insert(person(id));
        }

        let removed = repo.remove(&PersonId::from("p2")).expect("p2 should exist");
        assert_eq!(removed.id.as_str(), "p2");
        assert_eq!(repo.ids(), vec![PersonId::from("p1"), PersonId::from("p3")]);
        assert!(repo.remove(&PersonId::from("p2")).is_none());
    }
}
