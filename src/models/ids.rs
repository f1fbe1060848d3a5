//! Portal and faction identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque portal identifier, stable across a portal's history.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortalId(String);

impl PortalId {
    /// Create a new PortalId.
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortalId({})", self.0)
    }
}

impl From<String> for PortalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PortalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Owning faction. `0` is reserved for unowned portals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Faction(pub u8);

impl Faction {
    /// Unowned / neutral.
    pub const NEUTRAL: Faction = Faction(0);

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for Faction {
    fn from(value: u8) -> Self {
        Self(value)
    }
}
