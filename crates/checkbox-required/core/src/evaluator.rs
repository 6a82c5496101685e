//! Group evaluation
//!
//! `evaluate` is the pure decision for one group. `GroupPass` walks a form's
//! declared fields once, deduplicating by group name so every group is
//! judged exactly once per pass.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::form::{DeclaredField, FieldId};
use crate::spec::CardinalitySpec;
use crate::template::{MessageTemplates, TemplateKind};

/// Result of judging one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub error: bool,
    pub message: Option<String>,
    pub kind: Option<TemplateKind>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            error: false,
            message: None,
            kind: None,
        }
    }

    pub fn invalid(kind: TemplateKind, message: String) -> Self {
        Self {
            error: true,
            message: Some(message),
            kind: Some(kind),
        }
    }
}

/// Judge a group with `checked` members checked against `spec`
pub fn evaluate(
    spec: &CardinalitySpec,
    checked: usize,
    templates: &MessageTemplates,
) -> ValidationOutcome {
    if spec.admits(checked) {
        return ValidationOutcome::valid();
    }

    let kind = TemplateKind::for_spec(spec);
    ValidationOutcome::invalid(kind, templates.render(kind, spec))
}

/// A group as resolved from the first field that declared it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub spec: CardinalitySpec,
    /// Field that carries the group's error
    pub anchor: FieldId,
}

/// Outcome of one group within a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub group: Group,
    pub checked: usize,
    pub outcome: ValidationOutcome,
}

/// Deduplicates declared fields into groups for a single pass
///
/// The first field of a name (in document order) defines the group. Later
/// fields of the same name are covered by it; if they declare a different
/// spec the first one still wins and a warning is logged.
#[derive(Debug, Default)]
pub struct GroupPass {
    seen: HashMap<String, String>,
    groups: Vec<Group>,
}

impl GroupPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field; returns `true` when it opened a new group
    pub fn visit(&mut self, field: &DeclaredField) -> bool {
        if let Some(first) = self.seen.get(&field.name) {
            if CardinalitySpec::parse(first) != CardinalitySpec::parse(&field.spec) {
                warn!(
                    group = %field.name,
                    kept = %first,
                    ignored = %field.spec,
                    "conflicting checkbox group specs, first declaration wins"
                );
            }
            trace!(group = %field.name, field = %field.id, "group already covered");
            return false;
        }

        self.seen.insert(field.name.clone(), field.spec.clone());
        self.groups.push(Group {
            name: field.name.clone(),
            spec: CardinalitySpec::parse(&field.spec),
            anchor: field.id,
        });
        true
    }

    /// Build the pass from fields in document order
    pub fn collect<'a, I>(fields: I) -> Vec<Group>
    where
        I: IntoIterator<Item = &'a DeclaredField>,
    {
        let mut pass = Self::new();
        for field in fields {
            pass.visit(field);
        }
        pass.into_groups()
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}
