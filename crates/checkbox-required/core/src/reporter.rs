//! Error reporting backends
//!
//! Two ways of surfacing a group error:
//!
//! - **Native**: the platform's custom-validity hook. The platform itself
//!   refuses to submit a form while any field carries a message.
//! - **Fallback**: messages are kept in a per-field map owned by the reporter.
//!   A submit-time check flags the enclosing containers and blocks submission.
//!
//! The backend is chosen once, at startup, from a [`CapabilityProbe`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::form::{CapabilityProbe, FieldId, FormScope};

/// Which reporting mechanism is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Native,
    Fallback,
}

impl Backend {
    pub fn detect(probe: &dyn CapabilityProbe) -> Self {
        if probe.supports_custom_validity() {
            Backend::Native
        } else {
            Backend::Fallback
        }
    }

    pub fn reporter(self) -> Box<dyn ErrorReporter> {
        match self {
            Backend::Native => Box::new(NativeReporter::new()),
            Backend::Fallback => Box::new(FallbackReporter::new()),
        }
    }
}

/// Whether a submission may proceed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    Allow,
    Block,
}

impl SubmitDecision {
    pub fn is_allowed(self) -> bool {
        self == SubmitDecision::Allow
    }
}

/// Sets, clears and queries per-field errors
pub trait ErrorReporter {
    fn backend(&self) -> Backend;

    fn set_error(&mut self, form: &mut dyn FormScope, field: FieldId, message: &str);

    fn clear_error(&mut self, form: &mut dyn FormScope, field: FieldId);

    /// Message currently recorded for `field`, if the backend tracks it
    fn error_message(&self, field: FieldId) -> Option<&str>;

    fn has_error(&self, field: FieldId) -> bool {
        self.error_message(field).is_some()
    }

    /// Submit-time enforcement; backends the platform enforces always allow
    fn submit_check(&mut self, form: &mut dyn FormScope) -> SubmitDecision;
}

/// Forwards errors to the platform's custom-validity hook
///
/// Keeps a mirror of the messages it set so callers can inspect them; the
/// platform remains the source of truth for blocking.
#[derive(Debug, Default)]
pub struct NativeReporter {
    messages: HashMap<FieldId, String>,
}

impl NativeReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorReporter for NativeReporter {
    fn backend(&self) -> Backend {
        Backend::Native
    }

    fn set_error(&mut self, form: &mut dyn FormScope, field: FieldId, message: &str) {
        form.set_custom_validity(field, message);
        self.messages.insert(field, message.to_string());
    }

    fn clear_error(&mut self, form: &mut dyn FormScope, field: FieldId) {
        form.set_custom_validity(field, "");
        self.messages.remove(&field);
    }

    fn error_message(&self, field: FieldId) -> Option<&str> {
        self.messages.get(&field).map(String::as_str)
    }

    fn submit_check(&mut self, _form: &mut dyn FormScope) -> SubmitDecision {
        SubmitDecision::Allow
    }
}

/// Tracks errors itself and enforces them at submit time
#[derive(Debug, Default)]
pub struct FallbackReporter {
    errors: HashMap<FieldId, String>,
}

impl FallbackReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorReporter for FallbackReporter {
    fn backend(&self) -> Backend {
        Backend::Fallback
    }

    fn set_error(&mut self, _form: &mut dyn FormScope, field: FieldId, message: &str) {
        self.errors.insert(field, message.to_string());
    }

    fn clear_error(&mut self, _form: &mut dyn FormScope, field: FieldId) {
        self.errors.remove(&field);
    }

    fn error_message(&self, field: FieldId) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    fn submit_check(&mut self, form: &mut dyn FormScope) -> SubmitDecision {
        let mut seen = HashSet::new();
        let mut decision = SubmitDecision::Allow;

        for field in form.declared_fields() {
            if !seen.insert(field.name.clone()) {
                continue;
            }

            let flagged = self.errors.contains_key(&field.id);
            form.set_container_error(field.id, flagged);
            if flagged {
                debug!(form = %form.id(), group = %field.name, "blocking submission");
                decision = SubmitDecision::Block;
            }
        }

        decision
    }
}
