//! Generation and family-unit placement identifiers.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Generation level. `0` is the root; ancestors added above it go negative.
pub type GenerationLevel = i32;

/// Identifier of a family unit inside one generation.
///
/// Ids are caller-chosen labels such as `main` or `main_children`; two
/// generations may reuse the same label without sharing members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FamilyUnitId(String);

impl FamilyUnitId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unit that holds the parents of people in `self`.
    pub fn parents_unit(&self) -> Self {
        Self(format!("{}_parents", self.0))
    }

    /// Unit that holds the children of people in `self`.
    pub fn children_unit(&self) -> Self {
        Self(format!("{}_children", self.0))
    }
}

impl Default for FamilyUnitId {
    fn default() -> Self {
        Self::new("main")
    }
}

impl Display for FamilyUnitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FamilyUnitId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FamilyUnitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Where a person sits in the generation / family-unit grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub generation: GenerationLevel,
    pub family_unit: FamilyUnitId,
}

impl Placement {
    pub fn new(generation: GenerationLevel, family_unit: impl Into<FamilyUnitId>) -> Self {
        Self {
            generation,
            family_unit: family_unit.into(),
        }
    }
}
