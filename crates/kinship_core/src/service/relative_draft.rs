//! Add-relative form input as a validated value object.
//!
//! # Responsibility
//! - Collect raw form fields for a new relative of an existing person.
//! - Derive the new person's generation, family unit and relationships
//!   from the anchor person.
//!
//! # Invariants
//! - Validation reads the registry but never writes it.
//! - Blank optional fields become `None`; malformed years are rejected.

use crate::model::person::{Gender, NewPerson, PersonDetails, PersonId, Relationships};
use crate::model::placement::{FamilyUnitId, GenerationLevel};
use crate::registry::person_registry::{PersonRegistry, RegistryError};
use crate::repo::person_repo::PersonRepository;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,4}$").expect("valid year regex"));

/// Relation of the new person to the anchor person.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeKind {
    Spouse,
    Parent,
    Child,
    Sibling,
}

/// Errors from validating or applying a relative draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// Anchor person is not registered.
    AnchorNotFound(PersonId),
    /// Name field is blank.
    EmptyName,
    /// A year field is not a 1-4 digit number.
    InvalidYear { field: &'static str, value: String },
    /// Anchor sits at the edge of the generation range, so there is no
    /// level above or below it.
    GenerationOutOfRange(GenerationLevel),
    /// Registry rejected the derived person.
    Registry(RegistryError),
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AnchorNotFound(id) => write!(f, "anchor person not found: {id}"),
            Self::EmptyName => write!(f, "relative name must not be blank"),
            Self::InvalidYear { field, value } => {
                write!(f, "{field} must be a year, got `{value}`")
            }
            Self::GenerationOutOfRange(level) => {
                write!(f, "no generation level next to anchor level {level}")
            }
            Self::Registry(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DraftError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RegistryError> for DraftError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

/// Raw form input for one new relative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeDraft {
    pub kind: RelativeKind,
    pub anchor: PersonId,
    pub name: String,
    pub gender: String,
    pub birth_year: String,
    pub death_year: String,
    pub title: String,
    pub notes: String,
}

/// Draft resolved against the registry, ready for `add_person`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRelative {
    pub person: NewPerson,
    pub generation: GenerationLevel,
    pub family_unit: FamilyUnitId,
    pub relationships: Relationships,
}

impl RelativeDraft {
    pub fn new(kind: RelativeKind, anchor: impl Into<PersonId>) -> Self {
        Self {
            kind,
            anchor: anchor.into(),
            name: String::new(),
            gender: String::new(),
            birth_year: String::new(),
            death_year: String::new(),
            title: String::new(),
            notes: String::new(),
        }
    }

    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = value.into();
        self
    }

    pub fn gender(mut self, value: impl Into<String>) -> Self {
        self.gender = value.into();
        self
    }

    pub fn birth_year(mut self, value: impl Into<String>) -> Self {
        self.birth_year = value.into();
        self
    }

    pub fn death_year(mut self, value: impl Into<String>) -> Self {
        self.death_year = value.into();
        self
    }

    pub fn title(mut self, value: impl Into<String>) -> Self {
        self.title = value.into();
        self
    }

    pub fn notes(mut self, value: impl Into<String>) -> Self {
        self.notes = value.into();
        self
    }

    /// Resolves placement and relationships from the anchor person.
    ///
    /// # Errors
    /// - `EmptyName` / `InvalidYear` for malformed fields.
    /// - `AnchorNotFound` when the anchor is not registered.
    /// - `GenerationOutOfRange` for a parent or child of an anchor at the
    ///   extreme generation level.
    /// - `Registry(Validation)` for field invariants such as lifespan order.
    pub fn validate<R: PersonRepository>(
        &self,
        registry: &PersonRegistry<R>,
    ) -> Result<ValidatedRelative, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::EmptyName);
        }
        let anchor = registry
            .get_person(&self.anchor)
            .ok_or_else(|| DraftError::AnchorNotFound(self.anchor.clone()))?;

        let mut details = PersonDetails::new(name).with_gender(Gender::parse(&self.gender));
        details.birth_year = parse_year("birth_year", &self.birth_year)?;
        details.death_year = parse_year("death_year", &self.death_year)?;
        details.title = non_blank(&self.title);
        details.notes = non_blank(&self.notes);
        details.validate().map_err(RegistryError::from)?;

        let anchor_id = anchor.id.clone();
        let (generation, family_unit, relationships) = match self.kind {
            RelativeKind::Spouse => (
                anchor.generation,
                anchor.family_unit.clone(),
                Relationships::default().with_spouse(anchor_id),
            ),
            RelativeKind::Parent => (
                step_generation(anchor.generation, -1)?,
                anchor.family_unit.parents_unit(),
                Relationships::default().with_child(anchor_id),
            ),
            RelativeKind::Child => (
                step_generation(anchor.generation, 1)?,
                anchor.family_unit.children_unit(),
                Relationships::default().with_parent(anchor_id),
            ),
            RelativeKind::Sibling => (
                anchor.generation,
                anchor.family_unit.clone(),
                Relationships::default().with_sibling(anchor_id),
            ),
        };

        Ok(ValidatedRelative {
            person: NewPerson::default().with_details(details),
            generation,
            family_unit,
            relationships,
        })
    }
}

fn step_generation(level: GenerationLevel, step: i32) -> Result<GenerationLevel, DraftError> {
    level
        .checked_add(step)
        .ok_or(DraftError::GenerationOutOfRange(level))
}

fn parse_year(field: &'static str, value: &str) -> Result<Option<i32>, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if !YEAR_RE.is_match(trimmed) {
        return Err(DraftError::InvalidYear {
            field,
            value: trimmed.to_string(),
        });
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| DraftError::InvalidYear {
            field,
            value: trimmed.to_string(),
        })
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
