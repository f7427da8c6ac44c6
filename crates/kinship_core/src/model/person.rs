//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical person record owned by the registry.
//! - Define relationship references and the helpers that scrub them.
//!
//! # Invariants
//! - `id` is stable and never reused for another person.
//! - `name` is non-blank after trim once a person is registered.
//! - `death_year` is never earlier than `birth_year` when both are set.
//! - Relationship lists never contain the owning person or duplicates.

use crate::model::placement::{FamilyUnitId, GenerationLevel};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const GENERATED_ID_PREFIX: &str = "person_";

/// Stable person identifier.
///
/// Callers may supply their own ids (`p1`); otherwise the registry
/// generates `person_<uuid>` from a v4 uuid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh id with 122 random bits.
    pub fn generate() -> Self {
        Self(format!("{GENERATED_ID_PREFIX}{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PersonId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PersonId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Gender shown on a person box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    /// Lenient parse used for form input; anything unrecognized is `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Self::Male,
            "female" | "f" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

/// Relationship references stored on one person.
///
/// Both endpoints of every edge carry a reference; the registry link
/// operation is the only writer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relationships {
    pub spouse: Option<PersonId>,
    pub parents: Vec<PersonId>,
    pub children: Vec<PersonId>,
    pub siblings: Vec<PersonId>,
}

impl Relationships {
    pub fn with_spouse(mut self, spouse: impl Into<PersonId>) -> Self {
        self.spouse = Some(spouse.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<PersonId>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<PersonId>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_sibling(mut self, sibling: impl Into<PersonId>) -> Self {
        self.siblings.push(sibling.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.spouse.is_none()
            && self.parents.is_empty()
            && self.children.is_empty()
            && self.siblings.is_empty()
    }

    /// Every id referenced by any relationship field, in field order.
    pub fn referenced_ids(&self) -> impl Iterator<Item = &PersonId> {
        self.spouse
            .iter()
            .chain(self.parents.iter())
            .chain(self.children.iter())
            .chain(self.siblings.iter())
    }

    pub fn references(&self, id: &PersonId) -> bool {
        self.referenced_ids().any(|candidate| candidate == id)
    }

    /// Drops every reference to `id`. Returns whether anything changed.
    pub fn scrub(&mut self, id: &PersonId) -> bool {
        let mut changed = false;
        if self.spouse.as_ref() == Some(id) {
            self.spouse = None;
            changed = true;
        }
        for list in [&mut self.parents, &mut self.children, &mut self.siblings] {
            let before = list.len();
            list.retain(|candidate| candidate != id);
            changed |= list.len() != before;
        }
        changed
    }
}

/// Descriptive, user-editable fields of a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDetails {
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PersonDetails {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_birth_year(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    pub fn with_death_year(mut self, year: i32) -> Self {
        self.death_year = Some(year);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Validates field-level invariants.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank after trim.
    /// - `InvalidLifespan` when `death_year < birth_year`.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.name.trim().is_empty() {
            return Err(PersonValidationError::EmptyName);
        }
        if let (Some(birth), Some(death)) = (self.birth_year, self.death_year) {
            if death < birth {
                return Err(PersonValidationError::InvalidLifespan { birth, death });
            }
        }
        Ok(())
    }

    /// Returns a copy with trimmed name and blank optional text dropped.
    pub(crate) fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.title = normalize_optional(self.title);
        self.notes = normalize_optional(self.notes);
        self
    }
}

/// Input for registering a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    /// Caller-supplied id; generated when `None`.
    #[serde(default)]
    pub id: Option<PersonId>,
    #[serde(flatten)]
    pub details: PersonDetails,
}

impl NewPerson {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            details: PersonDetails::new(name),
        }
    }

    pub fn with_id(mut self, id: impl Into<PersonId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.details.gender = gender;
        self
    }

    pub fn with_details(mut self, details: PersonDetails) -> Self {
        self.details = details;
        self
    }
}

/// Canonical registered person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(flatten)]
    pub details: PersonDetails,
    pub generation: GenerationLevel,
    pub family_unit: FamilyUnitId,
    #[serde(default)]
    pub relationships: Relationships,
}

impl Person {
    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn spouse(&self) -> Option<&PersonId> {
        self.relationships.spouse.as_ref()
    }

    /// Whether `self` and `other` reference each other as spouses.
    pub fn is_married_to(&self, other: &Person) -> bool {
        self.spouse() == Some(&other.id) && other.spouse() == Some(&self.id)
    }
}

/// Field-level validation failures for person input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    /// Name is blank after trim.
    EmptyName,
    /// Caller-supplied id is blank after trim.
    BlankId,
    /// Death year precedes birth year.
    InvalidLifespan { birth: i32, death: i32 },
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "person name must not be blank"),
            Self::BlankId => write!(f, "person id must not be blank"),
            Self::InvalidLifespan { birth, death } => write!(
                f,
                "death_year ({death}) must be >= birth_year ({birth})"
            ),
        }
    }
}

impl Error for PersonValidationError {}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
