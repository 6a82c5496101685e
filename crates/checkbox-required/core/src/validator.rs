//! Validator
//!
//! Ties the pieces together for each trigger a form can fire:
//!
//! - explicit initialisation: [`CheckboxValidator::attach`]
//! - a member checkbox changed: [`CheckboxValidator::on_change`]
//! - the form is being submitted: [`CheckboxValidator::on_submit`]
//!
//! Every trigger runs to completion synchronously. Nothing is cached between
//! passes apart from the reporter's current error state.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::ValidatorConfig;
use crate::evaluator::{evaluate, GroupPass, GroupReport};
use crate::form::{CapabilityProbe, FormId, FormScope};
use crate::registry::{SharedRegistry, WatchRegistry};
use crate::reporter::{Backend, ErrorReporter, SubmitDecision};

pub struct CheckboxValidator {
    config: ValidatorConfig,
    reporter: Box<dyn ErrorReporter>,
    registry: SharedRegistry,
}

impl CheckboxValidator {
    /// Create a validator, probing the platform once for native support
    ///
    /// A backend forced in `config` skips the probe.
    pub fn new(config: ValidatorConfig, probe: &dyn CapabilityProbe) -> Self {
        let backend = config.backend.unwrap_or_else(|| Backend::detect(probe));
        Self::with_backend(config, backend)
    }

    /// Create a validator with its own watch registry
    pub fn with_backend(config: ValidatorConfig, backend: Backend) -> Self {
        Self::with_registry(config, backend, WatchRegistry::shared())
    }

    /// Create a validator that shares `registry` with other validators
    ///
    /// A form attached by any of them counts as watched for all of them.
    pub fn with_registry(config: ValidatorConfig, backend: Backend, registry: SharedRegistry) -> Self {
        debug!(?backend, attribute = %config.attribute, "checkbox validator ready");
        Self {
            config,
            reporter: backend.reporter(),
            registry,
        }
    }

    pub fn registry(&self) -> SharedRegistry {
        Rc::clone(&self.registry)
    }

    pub fn backend(&self) -> Backend {
        self.reporter.backend()
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn reporter(&self) -> &dyn ErrorReporter {
        self.reporter.as_ref()
    }

    pub fn is_attached(&self, form: FormId) -> bool {
        self.registry.borrow().is_watched(form)
    }

    /// Start watching a form and run its initial pass
    ///
    /// Returns `None` when the form was already being watched, in which case
    /// nothing else happens.
    pub fn attach(&mut self, form: &mut dyn FormScope) -> Option<Vec<GroupReport>> {
        if !self.registry.borrow_mut().watch(form.id()) {
            trace!(form = %form.id(), "form already watched");
            return None;
        }

        debug!(form = %form.id(), "watching form");
        Some(self.check(form))
    }

    /// Stop watching a form and clear any errors it carries
    pub fn detach(&mut self, form: &mut dyn FormScope) -> bool {
        if !self.registry.borrow_mut().forget(form.id()) {
            return false;
        }

        for field in form.declared_fields() {
            self.reporter.clear_error(form, field.id);
            form.set_container_error(field.id, false);
        }
        debug!(form = %form.id(), "stopped watching form");
        true
    }

    /// Run one evaluation pass over every group in the form
    pub fn check(&mut self, form: &mut dyn FormScope) -> Vec<GroupReport> {
        let templates = self
            .config
            .templates
            .with_overrides(|kind| form.message_override(kind));
        let fields = form.declared_fields();

        for field in &fields {
            self.reporter.clear_error(form, field.id);
        }

        let mut reports = Vec::new();
        for group in GroupPass::collect(&fields) {
            let checked = form.checked_count(&group.name);
            let outcome = evaluate(&group.spec, checked, &templates);

            if let Some(message) = outcome.message.as_deref() {
                debug!(
                    form = %form.id(),
                    group = %group.name,
                    checked,
                    spec = %group.spec,
                    "checkbox group invalid"
                );
                self.reporter.set_error(form, group.anchor, message);
            } else {
                trace!(form = %form.id(), group = %group.name, checked, "checkbox group valid");
            }

            reports.push(GroupReport {
                group,
                checked,
                outcome,
            });
        }

        reports
    }

    /// A checkbox named `name` changed inside `form`
    ///
    /// Re-runs the pass when the form is watched and `name` is one of its
    /// declared groups.
    pub fn on_change(&mut self, form: &mut dyn FormScope, name: &str) -> Option<Vec<GroupReport>> {
        if !self.registry.borrow().is_watched(form.id()) {
            return None;
        }
        if !form.declared_fields().iter().any(|field| field.name == name) {
            return None;
        }
        Some(self.check(form))
    }

    /// Decide whether `form` may be submitted
    pub fn on_submit(&mut self, form: &mut dyn FormScope) -> SubmitDecision {
        if !self.registry.borrow().is_watched(form.id()) {
            return SubmitDecision::Allow;
        }
        self.reporter.submit_check(form)
    }
}

impl std::fmt::Debug for CheckboxValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckboxValidator")
            .field("backend", &self.backend())
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}
