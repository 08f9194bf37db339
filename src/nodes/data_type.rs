//! Type names that flow through slots

use crate::constants::types::{WILDCARD, WILDCARD_LABEL};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a slot type, e.g. `IMAGE` or `MASK`
///
/// The wildcard `*` means "unknown/any" and is replaceable by any concrete
/// type. An empty name is treated as wildcard too, since hosts report unset
/// slot types that way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    /// Creates a type name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The wildcard type
    pub fn wildcard() -> Self {
        Self(WILDCARD.to_string())
    }

    /// Check if this is the wildcard (or an unset) type
    pub fn is_wildcard(&self) -> bool {
        self.0.is_empty() || self.0 == WILDCARD
    }

    /// Check if this is a concrete type
    pub fn is_concrete(&self) -> bool {
        !self.is_wildcard()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label to display on a slot of this type
    pub fn label(&self) -> &str {
        if self.is_wildcard() {
            WILDCARD_LABEL
        } else {
            &self.0
        }
    }
}

impl Default for TypeName {
    fn default() -> Self {
        Self::wildcard()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for TypeName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TypeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
