//! Checkbox Required Core
//!
//! Group cardinality validation for checkboxes. HTML's `required` attribute
//! works per element, so it cannot say "pick between 2 and 4 of these". This
//! crate reads a `data-checkbox-required` spec from the group, counts the
//! checked members and reports an error through either the platform's
//! custom-validity hook or a self-managed fallback.
//!
//! ```
//! use checkbox_required_core::{evaluate, CardinalitySpec, MessageTemplates};
//!
//! let spec = CardinalitySpec::parse("2-3");
//! let outcome = evaluate(&spec, 1, &MessageTemplates::default());
//! assert_eq!(outcome.message.as_deref(), Some("Please choose 2-3 options"));
//! ```
//!
//! DOM access lives outside this crate behind [`FormScope`] and
//! [`CapabilityProbe`]; see `checkbox-required-wasm` for the browser glue.

pub mod config;
pub mod evaluator;
pub mod form;
pub mod registry;
pub mod reporter;
pub mod spec;
pub mod template;
pub mod validator;

pub use config::{ConfigError, ValidatorConfig};
pub use evaluator::{evaluate, Group, GroupPass, GroupReport, ValidationOutcome};
pub use form::{CapabilityProbe, DeclaredField, FieldId, FormId, FormScope};
pub use registry::{SharedRegistry, WatchRegistry};
pub use reporter::{Backend, ErrorReporter, FallbackReporter, NativeReporter, SubmitDecision};
pub use spec::{Bound, CardinalitySpec, SpecError};
pub use template::{render, MessageTemplates, TemplateKind};
pub use validator::CheckboxValidator;
