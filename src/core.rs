//! # Core
//!
//! Small serde helpers shared by the document and credential models.

use serde::{Deserialize, Serialize};

/// Allows serde to serialize/deserialize a string or an inline object —
/// used for `@context` entries and verification-relationship references
/// that may be either a VM id or an embedded `VerificationMethod`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value (e.g. a URI or a verification method id).
    String(String),

    /// Complex inline object value.
    Object(T),
}

impl<T: Default> Default for Kind<T> {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl<T> Kind<T> {
    /// Returns `true` if this is the string variant.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Returns the string value, if this is the string variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Object(_) => None,
        }
    }
}

impl<T> From<String> for Kind<T> {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Allows serde to serialize/deserialize a single object or a list of
/// objects — used for `controller` and `service.serviceEndpoint`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneMany<T> {
    /// Single object.
    One(T),

    /// A list of objects.
    Many(Vec<T>),
}

impl<T: Default> Default for OneMany<T> {
    fn default() -> Self {
        Self::One(T::default())
    }
}

impl<T: Clone> OneMany<T> {
    /// Returns this value as a `Vec`, whether it held one item or many.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item.clone()],
            Self::Many(items) => items.clone(),
        }
    }
}
