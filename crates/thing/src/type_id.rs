//! Stable type identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a thing schema.
///
/// Every entity type has one fixed UUID; it travels in the envelope around
/// the type-specific fragment and is the key into the
/// [`TypeRegistry`](crate::TypeRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThingTypeId(Uuid);

impl ThingTypeId {
    pub const fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Builds an identifier from its 128-bit value, usable in constants.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ThingTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for ThingTypeId {
    type Err = uuid::Error;

    /// Parses any UUID text form; case is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for ThingTypeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
