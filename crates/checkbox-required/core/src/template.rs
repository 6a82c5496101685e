//! Error message templates
//!
//! Four templates cover every failing shape of a cardinality spec. Each may
//! reference `{min}` and `{max}`; forms override them with
//! `data-checkbox-required-message-template-<kind>` attributes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spec::{Bound, CardinalitySpec};

/// Which template a failing group renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Exactly the default "at least one" rule
    Single,
    /// Lower bound only
    Min,
    /// Both bounds, non-zero minimum
    Range,
    /// Upper bound only (minimum of zero)
    Max,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Single,
        TemplateKind::Min,
        TemplateKind::Range,
        TemplateKind::Max,
    ];

    /// Pick the template for a spec that failed
    pub fn for_spec(spec: &CardinalitySpec) -> Self {
        match spec.max {
            None if spec.min == Bound::Count(1) => TemplateKind::Single,
            None => TemplateKind::Min,
            Some(_) if spec.min == Bound::Count(0) => TemplateKind::Max,
            Some(_) => TemplateKind::Range,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Single => "single",
            TemplateKind::Min => "min",
            TemplateKind::Range => "range",
            TemplateKind::Max => "max",
        }
    }

    /// Form attribute carrying the override, e.g.
    /// `data-checkbox-required-message-template-range`
    pub fn attribute_name(&self, attribute: &str) -> String {
        format!("data-{}-message-template-{}", attribute, self.as_str())
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four message templates used for one form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplates {
    pub single: String,
    pub min: String,
    pub range: String,
    pub max: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            single: "Please choose an option".to_string(),
            min: "Please choose at least {min} options".to_string(),
            range: "Please choose {min}-{max} options".to_string(),
            max: "Please choose at most {max} options".to_string(),
        }
    }
}

impl MessageTemplates {
    pub fn get(&self, kind: TemplateKind) -> &str {
        match kind {
            TemplateKind::Single => &self.single,
            TemplateKind::Min => &self.min,
            TemplateKind::Range => &self.range,
            TemplateKind::Max => &self.max,
        }
    }

    fn slot_mut(&mut self, kind: TemplateKind) -> &mut String {
        match kind {
            TemplateKind::Single => &mut self.single,
            TemplateKind::Min => &mut self.min,
            TemplateKind::Range => &mut self.range,
            TemplateKind::Max => &mut self.max,
        }
    }

    /// Layer per-form overrides on top of these templates
    ///
    /// Missing or empty overrides keep the current template.
    pub fn with_overrides<F>(&self, mut lookup: F) -> Self
    where
        F: FnMut(TemplateKind) -> Option<String>,
    {
        let mut templates = self.clone();
        for kind in TemplateKind::ALL {
            if let Some(text) = lookup(kind).filter(|text| !text.is_empty()) {
                *templates.slot_mut(kind) = text;
            }
        }
        templates
    }

    /// Render the message for a failing spec
    pub fn render(&self, kind: TemplateKind, spec: &CardinalitySpec) -> String {
        render(self.get(kind), spec)
    }
}

/// Substitute the first `{min}` and first `{max}` in `template`
///
/// A placeholder whose value is undefined stays in the text as written.
pub fn render(template: &str, spec: &CardinalitySpec) -> String {
    let message = template.replacen("{min}", &spec.min.to_string(), 1);
    match &spec.max {
        Some(max) => message.replacen("{max}", &max.to_string(), 1),
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("", TemplateKind::Single)]
    #[case("1", TemplateKind::Single)]
    #[case("3", TemplateKind::Min)]
    #[case("0", TemplateKind::Min)]
    #[case("3-5", TemplateKind::Range)]
    #[case("1-1", TemplateKind::Range)]
    #[case("0-5", TemplateKind::Max)]
    #[case("x", TemplateKind::Min)]
    fn test_kind_selection(#[case] raw: &str, #[case] expected: TemplateKind) {
        assert_eq!(TemplateKind::for_spec(&CardinalitySpec::parse(raw)), expected);
    }

    #[test]
    fn test_default_rendering() {
        let templates = MessageTemplates::default();

        let spec = CardinalitySpec::at_least(3);
        assert_eq!(
            templates.render(TemplateKind::Min, &spec),
            "Please choose at least 3 options"
        );

        let spec = CardinalitySpec::between(3, 5);
        assert_eq!(
            templates.render(TemplateKind::Range, &spec),
            "Please choose 3-5 options"
        );

        let spec = CardinalitySpec::between(0, 5);
        assert_eq!(
            templates.render(TemplateKind::Max, &spec),
            "Please choose at most 5 options"
        );
    }

    #[test]
    fn test_undefined_placeholder_left_alone() {
        let spec = CardinalitySpec::at_least(2);
        assert_eq!(render("{min} of {max}", &spec), "2 of {max}");
    }

    #[test]
    fn test_only_first_placeholder_replaced() {
        let spec = CardinalitySpec::between(1, 4);
        assert_eq!(render("{min}/{min} {max}/{max}", &spec), "1/{min} 4/{max}");
    }

    #[test]
    fn test_overrides() {
        let templates = MessageTemplates::default().with_overrides(|kind| match kind {
            TemplateKind::Single => Some("Pick one".to_string()),
            TemplateKind::Range => Some(String::new()),
            _ => None,
        });

        assert_eq!(templates.single, "Pick one");
        assert_eq!(templates.range, MessageTemplates::default().range);
        assert_eq!(templates.max, MessageTemplates::default().max);
    }

    #[test]
    fn test_attribute_name() {
        assert_eq!(
            TemplateKind::Max.attribute_name("checkbox-required"),
            "data-checkbox-required-message-template-max"
        );
    }
}
