/// Static template checks, run without a view
use crate::condition::{ConditionError, ConditionExpr};
use crate::data_path::{DataPath, PathError};
use crate::formatters::Formatter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use vellum_model::{
    walk_element, Condition, DataBinding, Element, ElementPath, UnknownElement, Visitor,
};

/// Validation warning level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Renders, but probably not as intended
    Warning,
    /// Part of the template can never render correctly
    Error,
}

/// Validation warning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
    pub path: ElementPath,
}

impl ValidationWarning {
    pub fn warning(path: &ElementPath, message: impl Into<String>) -> Self {
        Self {
            level: ValidationLevel::Warning,
            message: message.into(),
            path: path.clone(),
        }
    }

    pub fn error(path: &ElementPath, message: impl Into<String>) -> Self {
        Self {
            level: ValidationLevel::Error,
            message: message.into(),
            path: path.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == ValidationLevel::Error
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            ValidationLevel::Warning => "warning",
            ValidationLevel::Error => "error",
        };
        if self.path.is_root() {
            write!(f, "{} at <root>: {}", level, self.message)
        } else {
            write!(f, "{} at {}: {}", level, self.path, self.message)
        }
    }
}

/// Validator for element templates
#[derive(Default)]
pub struct Validator {
    warnings: Vec<ValidationWarning>,
    /// First path seen for each explicit element id
    ids: HashMap<String, ElementPath>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a template tree, in document order
    pub fn validate(&mut self, template: &Element) -> Vec<ValidationWarning> {
        self.warnings.clear();
        self.ids.clear();
        self.visit_element(template, &mut ElementPath::root());
        std::mem::take(&mut self.warnings)
    }

    fn check_condition(&mut self, condition: &Condition, path: &ElementPath) {
        let expression = condition.expression.as_str();
        if expression.contains("&&") || expression.contains("||") {
            self.warnings.push(ValidationWarning::warning(
                path,
                format!(
                    "Condition '{}' uses && or ||, which are not supported \
                     and will split incorrectly",
                    expression
                ),
            ));
        }

        match ConditionExpr::parse(expression) {
            Ok(_) => {}
            Err(err @ (ConditionError::Empty | ConditionError::NoOperator(_))) => {
                self.warnings.push(ValidationWarning::warning(
                    path,
                    format!("{}; the element will never be shown", err),
                ));
            }
            Err(err @ ConditionError::InvalidOperand { .. }) => {
                self.warnings
                    .push(ValidationWarning::error(path, err.to_string()));
            }
        }
    }

    fn check_binding(&mut self, binding: &DataBinding, path: &ElementPath) {
        match DataPath::parse(&binding.path) {
            Ok(_) => {}
            Err(PathError::Empty) => {
                self.warnings.push(ValidationWarning::warning(
                    path,
                    "Binding has an empty path and will always use its fallback",
                ));
            }
            Err(err) => {
                self.warnings
                    .push(ValidationWarning::error(path, err.to_string()));
            }
        }

        if let Some(spec) = binding.formatter.as_deref() {
            let formatter = Formatter::parse(spec);
            if !formatter.is_known() {
                self.warnings.push(ValidationWarning::warning(
                    path,
                    format!(
                        "Unknown formatter '{}' on '{}'; the value is shown unformatted",
                        formatter.name(),
                        binding.path
                    ),
                ));
            }
        }
    }
}

impl Visitor for Validator {
    fn visit_element(&mut self, element: &Element, path: &mut ElementPath) {
        if let Some(id) = element.id() {
            match self.ids.get(id) {
                Some(first) => {
                    let message =
                        format!("Duplicate element id '{}' (first used at {})", id, first);
                    self.warnings.push(ValidationWarning::warning(path, message));
                }
                None => {
                    self.ids.insert(id.to_string(), path.clone());
                }
            }
        }

        if let Element::Table { columns, .. } = element {
            if columns.is_empty() {
                self.warnings.push(ValidationWarning::warning(
                    path,
                    "Table has no columns and will render only empty rows",
                ));
            }
        }

        walk_element(self, element, path);
    }

    fn visit_condition(&mut self, condition: &Condition, path: &ElementPath) {
        self.check_condition(condition, path);
    }

    fn visit_binding(&mut self, binding: &DataBinding, path: &ElementPath) {
        self.check_binding(binding, path);
    }

    fn visit_unknown(&mut self, element: &UnknownElement, path: &ElementPath) {
        self.warnings.push(ValidationWarning::error(
            path,
            format!("Unknown element type '{}'; it will not be rendered", element.tag()),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_model::Column;

    fn validate(template: &Element) -> Vec<ValidationWarning> {
        Validator::new().validate(template)
    }

    #[test]
    fn test_clean_template_has_no_warnings() {
        let template = Element::frame(vec![
            Element::bound_text(DataBinding::new("client.name")),
            Element::repeater(
                DataBinding::new("items"),
                vec![Element::bound_text(
                    DataBinding::new("price").with_formatter("brl"),
                )],
            )
            .with_condition(Condition::new("items.length > 0")),
        ]);
        assert!(validate(&template).is_empty());
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let warnings = validate(&Element::frame(vec![Element::unknown("Chart")]));
        assert!(warnings[0].message.contains("'Chart'"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].is_error());
        assert_eq!(warnings[0].path.to_string(), "children[0]");
    }

    #[test]
    fn test_boolean_connectives_warn() {
        let template =
            Element::text("x").with_condition(Condition::new("a > 1 && b < 2"));
        let warnings = validate(&template);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, ValidationLevel::Warning);
        assert!(warnings[0].message.contains("&&"));
    }

    #[test]
    fn test_condition_without_operator_warns() {
        let template = Element::text("x").with_condition(Condition::new("status is sent"));
        let warnings = validate(&template);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("never be shown"));
    }

    #[test]
    fn test_bad_binding_paths() {
        let template = Element::frame(vec![
            Element::bound_text(DataBinding::new("items[x]")),
            Element::bound_text(DataBinding::new("")),
        ]);
        let warnings = validate(&template);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].is_error());
        assert!(!warnings[1].is_error());
    }

    #[test]
    fn test_unknown_formatter_and_empty_table() {
        let template = Element::frame(vec![
            Element::bound_text(DataBinding::new("x").with_formatter("currency|USD")),
            Element::table(DataBinding::new("items"), vec![]),
        ]);
        let warnings = validate(&template);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.contains("currency"));
        assert!(warnings[1].message.contains("no columns"));
    }

    #[test]
    fn test_column_bindings_are_checked() {
        let template = Element::table(
            DataBinding::new("items"),
            vec![Column::new("Bad", "a..b")],
        );
        let warnings = validate(&template);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].is_error());
    }

    #[test]
    fn test_duplicate_ids_warn() {
        let with_id = |id: &str| Element::Divider {
            id: Some(id.to_string()),
            style: None,
            condition: None,
            thickness: None,
            color: None,
        };
        let warnings = validate(&Element::frame(vec![with_id("rule"), with_id("rule")]));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].path.to_string(), "children[1]");
        assert!(warnings[0].message.contains("children[0]"));
    }

    #[test]
    fn test_validator_is_reusable() {
        let mut validator = Validator::new();
        assert_eq!(validator.validate(&Element::unknown("Chart")).len(), 1);
        assert!(validator.validate(&Element::text("ok")).is_empty());
    }
}
