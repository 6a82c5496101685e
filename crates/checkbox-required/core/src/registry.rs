//! Per-form "already watched" registry
//!
//! The flag belongs to the document, not to one validator: every validator
//! initialised over the same document should hold the same
//! [`SharedRegistry`] so a form is never wired twice.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::form::FormId;

/// Registry handle shared by every validator of one document
pub type SharedRegistry = Rc<RefCell<WatchRegistry>>;

/// Remembers which forms already have handlers attached
#[derive(Debug, Default)]
pub struct WatchRegistry {
    watched: HashMap<FormId, bool>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Mark `form` as watched; returns `false` if it already was
    pub fn watch(&mut self, form: FormId) -> bool {
        let flag = self.watched.entry(form).or_insert(false);
        if *flag {
            return false;
        }
        *flag = true;
        true
    }

    pub fn is_watched(&self, form: FormId) -> bool {
        self.watched.get(&form).copied().unwrap_or(false)
    }

    /// Drop a form that left the document
    pub fn forget(&mut self, form: FormId) -> bool {
        self.watched.remove(&form).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.watched.values().filter(|watched| **watched).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_is_set_if_absent() {
        let mut registry = WatchRegistry::new();
        assert!(!registry.is_watched(FormId(1)));

        assert!(registry.watch(FormId(1)));
        assert!(!registry.watch(FormId(1)));
        assert!(registry.is_watched(FormId(1)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_forget_allows_rewatch() {
        let mut registry = WatchRegistry::new();
        registry.watch(FormId(4));

        assert!(registry.forget(FormId(4)));
        assert!(!registry.forget(FormId(4)));
        assert!(registry.is_empty());
        assert!(registry.watch(FormId(4)));
    }

    #[test]
    fn test_shared_handle_sees_same_flags() {
        let registry = WatchRegistry::shared();
        let other = Rc::clone(&registry);

        assert!(registry.borrow_mut().watch(FormId(9)));
        assert!(!other.borrow_mut().watch(FormId(9)));
        assert!(other.borrow().is_watched(FormId(9)));
    }
}
