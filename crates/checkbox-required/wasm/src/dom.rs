// File: dom.rs
// Purpose: FormScope and CapabilityProbe over real DOM forms

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use checkbox_required_core::{
    CapabilityProbe, DeclaredField, FieldId, FormId, FormScope, TemplateKind, ValidatorConfig,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlFormElement, HtmlInputElement, Node, NodeList};

/// Attribute stamped on every form and checkbox the validator identifies
pub const NODE_ATTRIBUTE: &str = "data-checkbox-required-node";

/// Stable ids for the DOM nodes the validator has seen
///
/// Each node gets a numeric id stamped in [`NODE_ATTRIBUTE`]; lookups go
/// through that stamp. A stamp copied by `cloneNode` does not match the
/// registered element, so the copy gets a fresh id.
#[derive(Default)]
pub struct Identities {
    next: u64,
    forms: HashMap<u64, HtmlFormElement>,
    fields: HashMap<u64, HtmlInputElement>,
}

impl Identities {
    pub fn form_id(&mut self, form: &HtmlFormElement) -> FormId {
        FormId(identify(&mut self.next, &mut self.forms, form))
    }

    pub fn field_id(&mut self, input: &HtmlInputElement) -> FieldId {
        FieldId(identify(&mut self.next, &mut self.fields, input))
    }

    pub fn field(&self, id: FieldId) -> Option<&HtmlInputElement> {
        self.fields.get(&id.0)
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty() && self.fields.is_empty()
    }

    /// Drop `form`, its fields, and any node no longer in the document
    pub fn release_form(&mut self, form: &HtmlFormElement) {
        let form_node: &Node = form.as_ref();

        self.forms.retain(|_, known| {
            let keep = &*known != form && known.is_connected();
            if !keep {
                unstamp(known.as_ref());
            }
            keep
        });
        self.fields.retain(|_, input| {
            let keep = !form_node.contains(Some(input.as_ref())) && input.is_connected();
            if !keep {
                unstamp(input.as_ref());
            }
            keep
        });
    }
}

fn identify<T>(next: &mut u64, known: &mut HashMap<u64, T>, node: &T) -> u64
where
    T: AsRef<Element> + Clone + PartialEq,
{
    let element: &Element = node.as_ref();
    let stamped = element
        .get_attribute(NODE_ATTRIBUTE)
        .and_then(|value| value.parse::<u64>().ok());
    if let Some(id) = stamped {
        if known.get(&id) == Some(node) {
            return id;
        }
    }

    let id = *next;
    *next += 1;
    if let Err(err) = element.set_attribute(NODE_ATTRIBUTE, &id.to_string()) {
        tracing::warn!(?err, "failed to stamp node id");
    }
    known.insert(id, node.clone());
    id
}

fn unstamp(element: &Element) {
    if let Err(err) = element.remove_attribute(NODE_ATTRIBUTE) {
        tracing::warn!(?err, "failed to remove node id");
    }
}

/// One `<form>` as seen through the validator's capabilities
pub struct DomForm {
    element: HtmlFormElement,
    id: FormId,
    config: Rc<ValidatorConfig>,
    ids: Rc<RefCell<Identities>>,
}

impl DomForm {
    pub fn new(
        element: HtmlFormElement,
        config: Rc<ValidatorConfig>,
        ids: Rc<RefCell<Identities>>,
    ) -> Self {
        let id = ids.borrow_mut().form_id(&element);
        Self {
            element,
            id,
            config,
            ids,
        }
    }

    fn select(&self, selector: &str) -> Vec<Element> {
        match self.element.query_selector_all(selector) {
            Ok(list) => elements(&list),
            Err(err) => {
                tracing::warn!(selector, ?err, "selector rejected");
                Vec::new()
            }
        }
    }
}

impl FormScope for DomForm {
    fn id(&self) -> FormId {
        self.id
    }

    fn declared_fields(&self) -> Vec<DeclaredField> {
        let attribute = self.config.field_attribute();
        let mut ids = self.ids.borrow_mut();

        self.select(&self.config.field_selector())
            .into_iter()
            .filter_map(|element| element.dyn_into::<HtmlInputElement>().ok())
            .map(|input| {
                let spec = input.get_attribute(&attribute).unwrap_or_default();
                DeclaredField::new(ids.field_id(&input), input.name(), spec)
            })
            .collect()
    }

    fn checked_count(&self, group: &str) -> usize {
        let selector = format!(
            "[type=checkbox][name=\"{}\"]:checked",
            group.replace('\\', "\\\\").replace('"', "\\\"")
        );
        self.select(&selector).len()
    }

    fn message_override(&self, kind: TemplateKind) -> Option<String> {
        self.element
            .get_attribute(&kind.attribute_name(&self.config.attribute))
    }

    fn set_custom_validity(&mut self, field: FieldId, message: &str) {
        if let Some(input) = self.ids.borrow().field(field) {
            input.set_custom_validity(message);
        }
    }

    fn set_container_error(&mut self, field: FieldId, flagged: bool) {
        let ids = self.ids.borrow();
        let Some(input) = ids.field(field) else {
            return;
        };

        let container = match input.closest(&self.config.container) {
            Ok(Some(container)) => container,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(?err, container = %self.config.container, "bad container selector");
                return;
            }
        };

        let classes = container.class_list();
        let result = if flagged {
            classes.add_1(&self.config.error_class)
        } else {
            classes.remove_1(&self.config.error_class)
        };
        if let Err(err) = result {
            tracing::warn!(?err, "failed to toggle error class");
        }
    }
}

/// Detects `setCustomValidity` on a freshly created input
pub struct DomProbe {
    document: Document,
}

impl DomProbe {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl CapabilityProbe for DomProbe {
    fn supports_custom_validity(&self) -> bool {
        let Ok(input) = self.document.create_element("input") else {
            return false;
        };
        let probe: &JsValue = input.as_ref();
        js_sys::Reflect::get(probe, &JsValue::from_str("setCustomValidity"))
            .map(|value| value.is_function())
            .unwrap_or(false)
    }
}

pub fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
