//! Person registry implementation.
//!
//! # Responsibility
//! - Create, edit and delete persons with field and reference validation.
//! - Keep relationship edges consistent on both endpoints.
//!
//! # Invariants
//! - `add_person` is all-or-nothing: a rejected input writes nothing.
//! - Unknown ids are lenient no-ops for delete, edit and lookup.
//! - Linking a spouse detaches any previous spouse on both sides.

use crate::model::person::{
    NewPerson, Person, PersonDetails, PersonId, PersonValidationError, Relationships,
};
use crate::model::placement::{FamilyUnitId, GenerationLevel};
use crate::repo::person_repo::{InMemoryPersonRepository, PersonRepository};
use log::debug;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by registry write operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Validation-class errors surfaced to registry callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Field-level person validation failed.
    Validation(PersonValidationError),
    /// Caller-supplied id is already registered.
    DuplicateId(PersonId),
    /// A relationship names a person that is not registered.
    UnknownRelative(PersonId),
    /// A relationship points a person at itself.
    SelfRelation(PersonId),
    /// The same relative is listed as both parent and child.
    ConflictingRelation(PersonId),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "person id already registered: {id}"),
            Self::UnknownRelative(id) => write!(f, "relative not found: {id}"),
            Self::SelfRelation(id) => write!(f, "person cannot be related to itself: {id}"),
            Self::ConflictingRelation(id) => {
                write!(f, "relative listed as both parent and child: {id}")
            }
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PersonValidationError> for RegistryError {
    fn from(value: PersonValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Relationship edge kinds accepted by `link` / `unlink`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `a` and `b` are married.
    Spouse,
    /// `a` is a parent of `b`.
    ParentOf,
    /// `a` and `b` are siblings.
    Sibling,
}

/// Registry of every known person.
#[derive(Debug, Default, Clone)]
pub struct PersonRegistry<R: PersonRepository = InMemoryPersonRepository> {
    repo: R,
}

impl PersonRegistry<InMemoryPersonRepository> {
    pub fn in_memory() -> Self {
        Self::new(InMemoryPersonRepository::new())
    }
}

impl<R: PersonRepository> PersonRegistry<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a person and links the given relationships on both ends.
    ///
    /// # Errors
    /// - `Validation` for a blank name, blank id or reversed lifespan.
    /// - `DuplicateId` when the supplied id is already registered.
    /// - `UnknownRelative` / `SelfRelation` / `ConflictingRelation` for
    ///   invalid relationship references.
    pub fn add_person(
        &mut self,
        input: NewPerson,
        generation: GenerationLevel,
        family_unit: impl Into<FamilyUnitId>,
        relationships: Relationships,
    ) -> RegistryResult<Person> {
        input.details.validate()?;
        let id = self.resolve_new_id(input.id)?;
        self.check_relationships(&id, &relationships)?;

        let person = Person {
            id: id.clone(),
            details: input.details.normalized(),
            generation,
            family_unit: family_unit.into(),
            relationships: Relationships::default(),
        };
        self.repo.insert(person);

        if let Some(spouse) = relationships.spouse {
            self.link(RelationKind::Spouse, &id, &spouse)?;
        }
        for parent in &relationships.parents {
            self.link(RelationKind::ParentOf, parent, &id)?;
        }
        for child in &relationships.children {
            self.link(RelationKind::ParentOf, &id, child)?;
        }
        for sibling in &relationships.siblings {
            self.link(RelationKind::Sibling, &id, sibling)?;
        }

        debug!(
            "event=person_add module=registry status=ok person_id={id} generation={generation}"
        );
        self.repo
            .get(&id)
            .cloned()
            .ok_or(RegistryError::UnknownRelative(id))
    }

    /// Removes a person and scrubs every reference to it.
    ///
    /// Returns `false` (and does nothing) when `id` is unknown.
    pub fn delete_person(&mut self, id: &PersonId) -> bool {
        if self.repo.remove(id).is_none() {
            debug!("event=person_delete module=registry status=noop person_id={id}");
            return false;
        }
        let mut scrubbed = 0usize;
        for other in self.repo.ids() {
            if let Some(person) = self.repo.get_mut(&other) {
                if person.relationships.scrub(id) {
                    scrubbed += 1;
                }
            }
        }
        debug!(
            "event=person_delete module=registry status=ok person_id={id} scrubbed={scrubbed}"
        );
        true
    }

    /// Replaces the descriptive fields of a person.
    ///
    /// Returns `Ok(false)` when `id` is unknown.
    pub fn edit_person(&mut self, id: &PersonId, details: PersonDetails) -> RegistryResult<bool> {
        details.validate()?;
        let Some(person) = self.repo.get_mut(id) else {
            debug!("event=person_edit module=registry status=noop person_id={id}");
            return Ok(false);
        };
        person.details = details.normalized();
        debug!("event=person_edit module=registry status=ok person_id={id}");
        Ok(true)
    }

    pub fn get_person(&self, id: &PersonId) -> Option<&Person> {
        self.repo.get(id)
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        self.repo.contains(id)
    }

    pub fn len(&self) -> usize {
        self.repo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repo.is_empty()
    }

    /// Persons in registration order.
    pub fn persons(&self) -> Vec<&Person> {
        self.repo
            .ids()
            .iter()
            .filter_map(|id| self.repo.get(id))
            .collect()
    }

    /// Records one relationship edge on both endpoints.
    ///
    /// Re-linking an existing edge is a no-op.
    pub fn link(&mut self, kind: RelationKind, a: &PersonId, b: &PersonId) -> RegistryResult<()> {
        self.check_pair(a, b)?;
        match kind {
            RelationKind::Spouse => {
                self.detach_spouse_unless(a, b);
                self.detach_spouse_unless(b, a);
                self.with_person(a, |person| person.relationships.spouse = Some(b.clone()));
                self.with_person(b, |person| person.relationships.spouse = Some(a.clone()));
            }
            RelationKind::ParentOf => {
                self.with_person(a, |person| push_unique(&mut person.relationships.children, b));
                self.with_person(b, |person| push_unique(&mut person.relationships.parents, a));
            }
            RelationKind::Sibling => {
                self.with_person(a, |person| push_unique(&mut person.relationships.siblings, b));
                self.with_person(b, |person| push_unique(&mut person.relationships.siblings, a));
            }
        }
        debug!("event=relation_link module=registry status=ok kind={kind:?} from={a} to={b}");
        Ok(())
    }

    /// Removes one relationship edge from both endpoints.
    ///
    /// Returns whether any reference was removed.
    pub fn unlink(&mut self, kind: RelationKind, a: &PersonId, b: &PersonId) -> bool {
        let mut changed = false;
        match kind {
            RelationKind::Spouse => {
                if self.get_person(a).and_then(Person::spouse) == Some(b) {
                    self.with_person(a, |person| person.relationships.spouse = None);
                    changed = true;
                }
                if self.get_person(b).and_then(Person::spouse) == Some(a) {
                    self.with_person(b, |person| person.relationships.spouse = None);
                    changed = true;
                }
            }
            RelationKind::ParentOf => {
                changed |= self.with_person(a, |person| remove_id(&mut person.relationships.children, b))
                    == Some(true);
                changed |= self.with_person(b, |person| remove_id(&mut person.relationships.parents, a))
                    == Some(true);
            }
            RelationKind::Sibling => {
                changed |= self.with_person(a, |person| remove_id(&mut person.relationships.siblings, b))
                    == Some(true);
                changed |= self.with_person(b, |person| remove_id(&mut person.relationships.siblings, a))
                    == Some(true);
            }
        }
        changed
    }

    /// Lists `(owner, missing)` pairs for references to unregistered ids.
    ///
    /// Empty whenever registry invariants hold.
    pub fn dangling_references(&self) -> Vec<(PersonId, PersonId)> {
        let mut dangling = Vec::new();
        for person in self.persons() {
            for referenced in person.relationships.referenced_ids() {
                if !self.repo.contains(referenced) {
                    dangling.push((person.id.clone(), referenced.clone()));
                }
            }
        }
        dangling
    }

    fn resolve_new_id(&self, requested: Option<PersonId>) -> RegistryResult<PersonId> {
        match requested {
            Some(id) => {
                let id = PersonId::new(id.as_str().trim());
                if id.is_blank() {
                    return Err(PersonValidationError::BlankId.into());
                }
                if self.repo.contains(&id) {
                    return Err(RegistryError::DuplicateId(id));
                }
                Ok(id)
            }
            None => loop {
                let candidate = PersonId::generate();
                if !self.repo.contains(&candidate) {
                    break Ok(candidate);
                }
            },
        }
    }

    fn check_relationships(
        &self,
        id: &PersonId,
        relationships: &Relationships,
    ) -> RegistryResult<()> {
        for referenced in relationships.referenced_ids() {
            if referenced == id {
                return Err(RegistryError::SelfRelation(id.clone()));
            }
            if !self.repo.contains(referenced) {
                return Err(RegistryError::UnknownRelative(referenced.clone()));
            }
        }
        let parents: HashSet<&PersonId> = relationships.parents.iter().collect();
        if let Some(conflict) = relationships
            .children
            .iter()
            .find(|child| parents.contains(child))
        {
            return Err(RegistryError::ConflictingRelation(conflict.clone()));
        }
        Ok(())
    }

    fn check_pair(&self, a: &PersonId, b: &PersonId) -> RegistryResult<()> {
        if a == b {
            return Err(RegistryError::SelfRelation(a.clone()));
        }
        for id in [a, b] {
            if !self.repo.contains(id) {
                return Err(RegistryError::UnknownRelative(id.clone()));
            }
        }
        Ok(())
    }

    /// Clears the spouse of `id`'s current partner unless that partner is `keep`.
    fn detach_spouse_unless(&mut self, id: &PersonId, keep: &PersonId) {
        let Some(previous) = self.get_person(id).and_then(Person::spouse).cloned() else {
            return;
        };
        if &previous == keep {
            return;
        }
        self.with_person(&previous, |person| {
            if person.relationships.spouse.as_ref() == Some(id) {
                person.relationships.spouse = None;
            }
        });
        self.with_person(id, |person| person.relationships.spouse = None);
        debug!("event=spouse_detach module=registry status=ok person_id={id} previous={previous}");
    }

    fn with_person<T>(&mut self, id: &PersonId, f: impl FnOnce(&mut Person) -> T) -> Option<T> {
        self.repo.get_mut(id).map(f)
    }
}

fn push_unique(list: &mut Vec<PersonId>, id: &PersonId) {
    if !list.contains(id) {
        list.push(id.clone());
    }
}

fn remove_id(list: &mut Vec<PersonId>, id: &PersonId) -> bool {
    let before = list.len();
    list.retain(|candidate| candidate != id);
    list.len() != before
}
