// File: config.rs
// Purpose: Validator configuration (attribute names, classes, default templates)

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reporter::Backend;
use crate::template::MessageTemplates;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse validator config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("attribute name must not be empty")]
    EmptyAttribute,
}

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorConfig {
    /// Data attribute suffix, read as `data-<attribute>` on each checkbox
    #[serde(default = "default_attribute")]
    pub attribute: String,

    /// Class toggled on the enclosing container by the fallback backend
    #[serde(default = "default_error_class")]
    pub error_class: String,

    /// Selector for the container that receives the error class
    #[serde(default = "default_container")]
    pub container: String,

    /// Templates used when a form does not override them
    #[serde(default)]
    pub templates: MessageTemplates,

    /// Skip capability detection and force a backend
    #[serde(default)]
    pub backend: Option<Backend>,
}

fn default_attribute() -> String {
    "checkbox-required".to_string()
}

fn default_error_class() -> String {
    "validation-error".to_string()
}

fn default_container() -> String {
    "form > ol > li, fieldset > ol > li".to_string()
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            attribute: default_attribute(),
            error_class: default_error_class(),
            container: default_container(),
            templates: MessageTemplates::default(),
            backend: None,
        }
    }
}

impl ValidatorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attribute.trim().is_empty() {
            return Err(ConfigError::EmptyAttribute);
        }
        Ok(())
    }

    /// `[data-checkbox-required]`
    pub fn field_selector(&self) -> String {
        format!("[data-{}]", self.attribute)
    }

    /// `data-checkbox-required`
    pub fn field_attribute(&self) -> String {
        format!("data-{}", self.attribute)
    }
}
