//! Checkbox Required WASM
//!
//! Browser bindings for checkbox group validation. Finds every checkbox with
//! a `data-checkbox-required` attribute, watches its form once, re-validates
//! on change and, when the browser lacks `setCustomValidity`, blocks submit
//! itself.
//!
//! # Example (JavaScript)
//! ```javascript
//! import init, { CheckboxRequired } from './checkbox_required_wasm.js';
//!
//! await init();
//! const validator = new CheckboxRequired({ errorClass: 'is-invalid' });
//! validator.watchDocument();
//!
//! // when a form is removed from the page
//! validator.unwatchForm(form);
//! ```

mod dom;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use checkbox_required_core::{
    evaluate, Backend, CardinalitySpec, CheckboxValidator, FormId, FormScope, GroupReport,
    MessageTemplates,
    SharedRegistry, ValidatorConfig,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlFormElement, HtmlInputElement};

use crate::dom::{elements, DomForm, DomProbe, Identities};

/// Set panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Group outcome handed back to JavaScript
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub group: String,
    pub spec: String,
    pub checked: usize,
    pub error: bool,
    pub message: Option<String>,
}

impl From<GroupReport> for GroupSummary {
    fn from(report: GroupReport) -> Self {
        Self {
            group: report.group.name,
            spec: report.group.spec.to_string(),
            checked: report.checked,
            error: report.outcome.error,
            message: report.outcome.message,
        }
    }
}

/// State every validator in this document shares
///
/// Node ids, the watched-form registry and the attached listeners belong to
/// the document, so a second `CheckboxRequired` never wires a form twice.
#[derive(Clone, Default)]
struct Shared {
    ids: Rc<RefCell<Identities>>,
    registry: SharedRegistry,
    listeners: Rc<RefCell<HashMap<FormId, Listeners>>>,
}

thread_local! {
    static SHARED: Shared = Shared::default();
}

/// Event handlers attached to one form
struct Listeners {
    form: HtmlFormElement,
    change: Closure<dyn FnMut(Event)>,
    submit: Option<Closure<dyn FnMut(Event)>>,
}

impl Listeners {
    fn remove(&self) {
        let mut result = self
            .form
            .remove_event_listener_with_callback("change", self.change.as_ref().unchecked_ref());
        if let Some(submit) = &self.submit {
            result = result.and(
                self.form
                    .remove_event_listener_with_callback("submit", submit.as_ref().unchecked_ref()),
            );
        }
        if let Err(err) = result {
            tracing::warn!(?err, "failed to remove form listeners");
        }
    }
}

struct State {
    config: Rc<ValidatorConfig>,
    shared: Shared,
    validator: RefCell<CheckboxValidator>,
}

impl State {
    fn form(&self, element: HtmlFormElement) -> DomForm {
        DomForm::new(element, Rc::clone(&self.config), Rc::clone(&self.shared.ids))
    }
}

/// Checkbox group validator bound to the current document
#[wasm_bindgen]
pub struct CheckboxRequired {
    state: Rc<State>,
}

#[wasm_bindgen]
impl CheckboxRequired {
    /// Create a validator; `config` may be `undefined` for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CheckboxRequired, JsValue> {
        let config: ValidatorConfig = if config.is_undefined() || config.is_null() {
            ValidatorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?
        };
        config
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let backend = match config.backend {
            Some(backend) => backend,
            None => Backend::detect(&DomProbe::new(document()?)),
        };
        let shared = SHARED.with(Shared::clone);
        let validator =
            CheckboxValidator::with_registry(config.clone(), backend, Rc::clone(&shared.registry));

        Ok(Self {
            state: Rc::new(State {
                config: Rc::new(config),
                shared,
                validator: RefCell::new(validator),
            }),
        })
    }

    /// `"native"` or `"fallback"`
    #[wasm_bindgen(getter)]
    pub fn backend(&self) -> String {
        match self.state.validator.borrow().backend() {
            Backend::Native => "native".to_string(),
            Backend::Fallback => "fallback".to_string(),
        }
    }

    /// Watch every form that contains a declared checkbox
    ///
    /// Returns how many forms were newly watched.
    #[wasm_bindgen(js_name = watchDocument)]
    pub fn watch_document(&self) -> Result<u32, JsValue> {
        let fields = document()?.query_selector_all(&self.state.config.field_selector())?;

        let mut attached = 0;
        for field in elements(&fields) {
            let Some(form) = field.closest("form")? else {
                continue;
            };
            if let Ok(form) = form.dyn_into::<HtmlFormElement>() {
                if self.watch_form(form)? {
                    attached += 1;
                }
            }
        }
        Ok(attached)
    }

    /// Watch one form; returns `false` if it was already watched
    #[wasm_bindgen(js_name = watchForm)]
    pub fn watch_form(&self, form: HtmlFormElement) -> Result<bool, JsValue> {
        let mut scope = self.state.form(form.clone());
        if self.state.validator.borrow_mut().attach(&mut scope).is_none() {
            return Ok(false);
        }

        match self.listen(&form) {
            Ok(listeners) => {
                self.state
                    .shared
                    .listeners
                    .borrow_mut()
                    .insert(scope.id(), listeners);
                Ok(true)
            }
            Err(err) => {
                self.state.validator.borrow_mut().detach(&mut scope);
                Err(err)
            }
        }
    }

    /// Stop watching a form: clear its errors, drop its listeners and ids
    ///
    /// Returns `false` if the form was not being watched.
    #[wasm_bindgen(js_name = unwatchForm)]
    pub fn unwatch_form(&self, form: HtmlFormElement) -> bool {
        let mut scope = self.state.form(form.clone());
        let detached = self.state.validator.borrow_mut().detach(&mut scope);

        let listeners = self.state.shared.listeners.borrow_mut().remove(&scope.id());
        if let Some(listeners) = listeners {
            listeners.remove();
        }
        self.state.shared.ids.borrow_mut().release_form(&form);
        detached
    }

    /// Re-run validation for a watched form and return each group's outcome
    pub fn check(&self, form: HtmlFormElement) -> Result<JsValue, JsValue> {
        let mut scope = self.state.form(form);
        let reports: Vec<GroupSummary> = self
            .state
            .validator
            .borrow_mut()
            .check(&mut scope)
            .into_iter()
            .map(GroupSummary::from)
            .collect();
        Ok(serde_wasm_bindgen::to_value(&reports)?)
    }
}

impl CheckboxRequired {
    /// Attach the change listener, plus the submit listener for the fallback
    /// backend; nothing stays attached if either fails
    fn listen(&self, form: &HtmlFormElement) -> Result<Listeners, JsValue> {
        let state = Rc::clone(&self.state);
        let change = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(input) = event
                .target()
                .and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            let Some(form) = input.form() else {
                return;
            };
            let mut scope = state.form(form);
            state.validator.borrow_mut().on_change(&mut scope, &input.name());
        });
        form.add_event_listener_with_callback("change", change.as_ref().unchecked_ref())?;

        let mut listeners = Listeners {
            form: form.clone(),
            change,
            submit: None,
        };
        if self.state.validator.borrow().backend() != Backend::Fallback {
            return Ok(listeners);
        }

        let state = Rc::clone(&self.state);
        let submit = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(form) = event
                .current_target()
                .and_then(|target| target.dyn_into::<HtmlFormElement>().ok())
            else {
                return;
            };
            let mut scope = state.form(form);
            if !state.validator.borrow_mut().on_submit(&mut scope).is_allowed() {
                event.prevent_default();
            }
        });
        if let Err(err) = form.add_event_listener_with_callback("submit", submit.as_ref().unchecked_ref()) {
            listeners.remove();
            return Err(err);
        }
        listeners.submit = Some(submit);
        Ok(listeners)
    }
}

/// Parse a cardinality attribute value into `{ min, max }`
#[wasm_bindgen(js_name = parseSpec)]
pub fn parse_spec(raw: &str) -> Result<JsValue, JsValue> {
    Ok(serde_wasm_bindgen::to_value(&CardinalitySpec::parse(raw))?)
}

/// Judge a group without touching the DOM
///
/// Returns the rendered error message, or `undefined` when the count is valid.
#[wasm_bindgen(js_name = evaluateGroup)]
pub fn evaluate_group(raw: &str, checked: usize, templates: JsValue) -> Result<Option<String>, JsValue> {
    let templates: MessageTemplates = if templates.is_undefined() || templates.is_null() {
        MessageTemplates::default()
    } else {
        serde_wasm_bindgen::from_value(templates)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse templates: {}", e)))?
    };
    Ok(evaluate_with(raw, checked, &templates))
}

fn evaluate_with(raw: &str, checked: usize, templates: &MessageTemplates) -> Option<String> {
    evaluate(&CardinalitySpec::parse(raw), checked, templates).message
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document available"))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(target_arch = "wasm32")]
    use wasm_bindgen_test::*;

    #[test]
    fn test_evaluate_with_defaults() {
        let templates = MessageTemplates::default();
        assert_eq!(
            evaluate_with("", 0, &templates),
            Some("Please choose an option".to_string())
        );
        assert_eq!(evaluate_with("3-5", 4, &templates), None);
        assert_eq!(
            evaluate_with("0-5", 6, &templates),
            Some("Please choose at most 5 options".to_string())
        );
    }

    #[test]
    fn test_summary_from_report() {
        let report = GroupReport {
            group: checkbox_required_core::Group {
                name: "colors[]".to_string(),
                spec: CardinalitySpec::between(2, 3),
                anchor: checkbox_required_core::FieldId(0),
            },
            checked: 1,
            outcome: evaluate(&CardinalitySpec::between(2, 3), 1, &MessageTemplates::default()),
        };

        let summary = GroupSummary::from(report);
        assert_eq!(summary.spec, "2-3");
        assert!(summary.error);
        assert_eq!(summary.message.as_deref(), Some("Please choose 2-3 options"));
    }

    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen_test]
    fn test_parse_spec_returns_object() {
        let value = parse_spec("3-5").unwrap();
        assert!(value.is_object());
    }

    #[cfg(target_arch = "wasm32")]
    #[wasm_bindgen_test]
    fn test_evaluate_group_accepts_undefined_templates() {
        assert_eq!(evaluate_group("", 1, JsValue::UNDEFINED).unwrap(), None);
    }

    #[cfg(target_arch = "wasm32")]
    mod browser {
        use super::*;
        use web_sys::{Element, EventInit};

        // covers the DOM tests in `dom.rs` too
        wasm_bindgen_test_configure!(run_in_browser);

        fn mount(html: &str) -> HtmlFormElement {
            let document = document().unwrap();
            let form = document
                .create_element("form")
                .unwrap()
                .dyn_into::<HtmlFormElement>()
                .unwrap();
            form.set_inner_html(html);
            document.body().unwrap().append_child(&form).unwrap();
            form
        }

        fn fire(target: &Element, kind: &str) -> Event {
            let init = EventInit::new();
            init.set_bubbles(true);
            init.set_cancelable(true);
            let event = Event::new_with_event_init_dict(kind, &init).unwrap();
            target.dispatch_event(&event).unwrap();
            event
        }

        fn fallback() -> CheckboxRequired {
            let config = js_sys::Object::new();
            js_sys::Reflect::set(&config, &"backend".into(), &"fallback".into()).unwrap();
            CheckboxRequired::new(config.into()).unwrap()
        }

        const LIST: &str = r#"<ol><li id="row">
            <input type="checkbox" name="colors" value="red" data-checkbox-required="">
            <input type="checkbox" name="colors" value="blue">
        </li></ol>"#;

        #[wasm_bindgen_test]
        fn test_fallback_submit_is_cancelled_until_valid() {
            let form = mount(LIST);
            let validator = fallback();
            assert_eq!(validator.backend(), "fallback");
            assert!(validator.watch_form(form.clone()).unwrap());

            let row = form.query_selector("#row").unwrap().unwrap();
            let submit = fire(&form, "submit");
            assert!(submit.default_prevented());
            assert!(row.class_list().contains("validation-error"));

            let blue = form
                .query_selector("[value=blue]")
                .unwrap()
                .unwrap()
                .dyn_into::<HtmlInputElement>()
                .unwrap();
            blue.set_checked(true);
            fire(&blue, "change");

            let submit = fire(&form, "submit");
            assert!(!submit.default_prevented());
            assert!(!row.class_list().contains("validation-error"));

            assert!(validator.unwatch_form(form.clone()));
            form.remove();
        }

        #[wasm_bindgen_test]
        fn test_second_instance_does_not_rewire_form() {
            let form = mount(LIST);
            let first = CheckboxRequired::new(JsValue::UNDEFINED).unwrap();
            let second = CheckboxRequired::new(JsValue::UNDEFINED).unwrap();

            assert!(first.watch_form(form.clone()).unwrap());
            assert!(!second.watch_form(form.clone()).unwrap());
            assert_eq!(second.watch_document().unwrap(), 0);

            assert!(second.unwatch_form(form.clone()));
            form.remove();
        }

        #[wasm_bindgen_test]
        fn test_unwatch_allows_rewatch_and_drops_state() {
            let form = mount(LIST);
            let validator = CheckboxRequired::new(JsValue::UNDEFINED).unwrap();
            let listening = || validator.state.shared.listeners.borrow().len();
            let before = listening();

            assert!(validator.watch_form(form.clone()).unwrap());
            assert_eq!(listening(), before + 1);
            assert!(validator.unwatch_form(form.clone()));
            assert!(!validator.unwatch_form(form.clone()));
            assert!(!form.has_attribute(dom::NODE_ATTRIBUTE));
            assert_eq!(listening(), before);

            assert!(validator.watch_form(form.clone()).unwrap());
            assert!(validator.unwatch_form(form.clone()));
            form.remove();
        }
    }
}
