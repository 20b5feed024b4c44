//! List envelopes and expandable references.

use serde::{Deserialize, Serialize};

/// Page of objects from a list or search endpoint.
///
/// List endpoints paginate with `starting_after`, search endpoints with the
/// opaque `next_page` token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_page: Option<String>,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            has_more: false,
            next_page: None,
        }
    }
}

/// A reference that is either a bare id or, when requested with `expand`,
/// the full object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T> Expandable<T> {
    pub fn as_object(&self) -> Option<&T> {
        match self {
            Expandable::Id(_) => None,
            Expandable::Object(object) => Some(object),
        }
    }
}
