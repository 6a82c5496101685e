// File: form.rs
// Purpose: Capabilities the engine consumes from whatever hosts the form

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::template::TemplateKind;

/// Identity of a form in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormId(pub u64);

/// Identity of a single checkbox field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldId(pub u64);

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form#{}", self.0)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field#{}", self.0)
    }
}

/// A checkbox carrying the cardinality attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredField {
    pub id: FieldId,
    /// Group name (the checkbox `name`)
    pub name: String,
    /// Raw attribute value, e.g. `""`, `"3"` or `"3-5"`
    pub spec: String,
}

impl DeclaredField {
    pub fn new(id: FieldId, name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            spec: spec.into(),
        }
    }
}

/// A form scope as seen by the validator
///
/// Implemented by the DOM glue in the browser and by in-memory forms in tests.
pub trait FormScope {
    fn id(&self) -> FormId;

    /// Fields declaring a cardinality spec, in document order
    fn declared_fields(&self) -> Vec<DeclaredField>;

    /// Number of checked checkboxes named `group` inside this form
    fn checked_count(&self, group: &str) -> usize;

    /// Form-level template override for `kind`, if any
    fn message_override(&self, kind: TemplateKind) -> Option<String>;

    /// Platform custom-validity hook; an empty message clears it
    fn set_custom_validity(&mut self, field: FieldId, message: &str);

    /// Toggle the error class on the container enclosing `field`
    fn set_container_error(&mut self, field: FieldId, flagged: bool);
}

/// Feature-detection probe run once when the validator starts
pub trait CapabilityProbe {
    /// Whether fields expose a native "set custom validity message" hook
    fn supports_custom_validity(&self) -> bool;
}

impl CapabilityProbe for bool {
    fn supports_custom_validity(&self) -> bool {
        *self
    }
}
