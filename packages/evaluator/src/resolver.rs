//! # Binding Resolver
//!
//! Resolves a [`DataBinding`] against the view and an optional repeater
//! scope, then runs its formatter. Resolution never fails outward: misses,
//! malformed paths and formatter errors all degrade to the binding's
//! fallback (or the empty string).
//!
//! ## Scope rule
//!
//! Inside a repeater the current item is the *scope*. An unqualified path
//! (`qty`) is looked up in the scope when the scope has that key; anything
//! qualified (`totals.subtotal`) or absent from the scope reads the view.
//! An `items[]` step stands for the scope object itself when a scope is
//! active.

use crate::data_path::{DataPath, PathError, PathStep};
use crate::formatters::{FormatError, Formatter, DEFAULT_DATE_FORMAT};
use crate::value::display_value;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;
use vellum_model::{DataBinding, View};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Walk `path` from the scope or the view; `None` means "not found"
pub fn lookup<'a>(
    path: &DataPath,
    view: &'a View,
    scope: Option<&'a Value>,
) -> Option<Cow<'a, Value>> {
    let (first, rest) = path.steps().split_first()?;

    let from_scope = match (scope, path.head()) {
        (Some(Value::Object(map)), Some(head)) if !path.is_qualified() => map.contains_key(head),
        _ => false,
    };

    let mut current: Cow<'a, Value> = match first {
        PathStep::ArrayDeref(name) => match scope {
            Some(scope) => Cow::Borrowed(scope),
            None => Cow::Borrowed(view.get(name)?),
        },
        PathStep::Field(_) if from_scope => step(scope?, first)?,
        PathStep::Field(name) => Cow::Borrowed(view.get(name)?),
        PathStep::Index(_) => return None,
    };

    for next in rest {
        if current.is_null() {
            return None;
        }
        current = match (next, scope) {
            (PathStep::ArrayDeref(_), Some(scope)) => Cow::Borrowed(scope),
            _ => match current {
                Cow::Borrowed(value) => step(value, next)?,
                Cow::Owned(value) => Cow::Owned(step(&value, next)?.into_owned()),
            },
        };
    }

    (!current.is_null()).then_some(current)
}

fn step<'v>(value: &'v Value, next: &PathStep) -> Option<Cow<'v, Value>> {
    match (next, value) {
        (PathStep::Field(name) | PathStep::ArrayDeref(name), Value::Object(map)) => {
            map.get(name).map(Cow::Borrowed)
        }
        (PathStep::Field(name), Value::Array(items)) if name == "length" => {
            Some(Cow::Owned(Value::from(items.len())))
        }
        (PathStep::Field(name), Value::String(s)) if name == "length" => {
            Some(Cow::Owned(Value::from(s.chars().count())))
        }
        (PathStep::Field(name), Value::Array(items)) => name
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index))
            .map(Cow::Borrowed),
        (PathStep::Index(index), Value::Array(items)) => items.get(*index).map(Cow::Borrowed),
        _ => None,
    }
}

/// Resolution with a per-pass cache of parsed paths
#[derive(Debug, Clone)]
pub struct Resolver {
    paths: HashMap<String, Rc<DataPath>>,
    date_format: String,
}

impl Resolver {
    pub fn new() -> Self {
        Self::with_date_format(DEFAULT_DATE_FORMAT)
    }

    pub fn with_date_format(date_format: impl Into<String>) -> Self {
        Self {
            paths: HashMap::new(),
            date_format: date_format.into(),
        }
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Parse `raw`, reusing an earlier parse of the same string
    pub fn path(&mut self, raw: &str) -> Result<Rc<DataPath>, PathError> {
        if let Some(path) = self.paths.get(raw) {
            return Ok(Rc::clone(path));
        }
        let path = Rc::new(DataPath::parse(raw)?);
        self.paths.insert(raw.to_string(), Rc::clone(&path));
        Ok(path)
    }

    /// Raw (unformatted) value at `raw`; malformed paths are misses
    pub fn lookup_raw(&mut self, raw: &str, view: &View, scope: Option<&Value>) -> Option<Value> {
        match self.path(raw) {
            Ok(path) => lookup(&path, view, scope).map(Cow::into_owned),
            Err(err) => {
                debug!(path = raw, error = %err, "Unparseable binding path");
                None
            }
        }
    }

    /// Display string for `binding`; never fails
    pub fn resolve(
        &mut self,
        binding: Option<&DataBinding>,
        view: &View,
        scope: Option<&Value>,
    ) -> String {
        let Some(binding) = binding else {
            return String::new();
        };

        match self.try_resolve(binding, view, scope) {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(path = %binding.path, "Binding did not resolve, using fallback");
                binding.fallback_or_empty()
            }
            Err(err) => {
                debug!(path = %binding.path, error = %err, "Binding failed, using fallback");
                binding.fallback_or_empty()
            }
        }
    }

    /// `Ok(None)` is a plain miss; `Err` is a malformed path or formatter failure
    pub fn try_resolve(
        &mut self,
        binding: &DataBinding,
        view: &View,
        scope: Option<&Value>,
    ) -> Result<Option<String>, ResolveError> {
        let path = self.path(&binding.path)?;
        let Some(value) = lookup(&path, view, scope) else {
            return Ok(None);
        };

        let text = match binding.formatter.as_deref() {
            None => display_value(&value),
            Some(spec) => {
                let formatter = Formatter::parse(spec);
                if !formatter.is_known() {
                    // Reported to the host by the renderer's diagnostics
                    debug!(
                        formatter = spec,
                        path = %binding.path,
                        "Unknown formatter, passing value through"
                    );
                }
                formatter.apply(&value, &self.date_format)?
            }
        };
        Ok(Some(text))
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve one binding with default options
pub fn resolve(binding: Option<&DataBinding>, view: &View, scope: Option<&Value>) -> String {
    Resolver::new().resolve(binding, view, scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(value: Value) -> View {
        View::from_json(value).unwrap()
    }

    #[test]
    fn test_resolve_nested_field() {
        let view = view(json!({ "client": { "name": "João" } }));
        assert_eq!(
            resolve(Some(&DataBinding::new("client.name")), &view, None),
            "João"
        );
    }

    #[test]
    fn test_missing_field_uses_fallback() {
        let view = view(json!({ "client": {} }));
        let binding = DataBinding::new("client.missing").with_fallback("N/D");
        assert_eq!(resolve(Some(&binding), &view, None), "N/D");
        assert_eq!(
            resolve(Some(&DataBinding::new("client.missing")), &view, None),
            ""
        );
    }

    #[test]
    fn test_absent_binding_is_empty() {
        assert_eq!(resolve(None, &View::default(), None), "");
    }

    #[test]
    fn test_null_intermediate_aborts() {
        let view = view(json!({ "client": { "address": null } }));
        let binding = DataBinding::new("client.address.city").with_fallback("?");
        assert_eq!(resolve(Some(&binding), &view, None), "?");
    }

    #[test]
    fn test_null_leaf_uses_fallback() {
        let view = view(json!({ "proposal": { "validUntil": null } }));
        let binding = DataBinding::new("proposal.validUntil").with_fallback("-");
        assert_eq!(resolve(Some(&binding), &view, None), "-");
    }

    #[test]
    fn test_formatter_applied() {
        let view = view(json!({ "x": 1500.5 }));
        let binding = DataBinding::new("x").with_formatter("brl");
        assert_eq!(resolve(Some(&binding), &view, None), "R$ 1.500,50");
    }

    #[test]
    fn test_formatter_failure_uses_fallback() {
        let view = view(json!({ "x": "n/a" }));
        let binding = DataBinding::new("x").with_formatter("brl").with_fallback("—");
        assert_eq!(resolve(Some(&binding), &view, None), "—");
    }

    #[test]
    fn test_unprintable_number_uses_fallback() {
        let view = view(json!({ "x": 1e307 }));
        for spec in ["brl", "round|2", "percent"] {
            let binding = DataBinding::new("x").with_formatter(spec).with_fallback("-");
            assert_eq!(resolve(Some(&binding), &view, None), "-", "formatter {}", spec);
        }
    }

    #[test]
    fn test_malformed_path_uses_fallback() {
        let binding = DataBinding::new("items[").with_fallback("bad");
        assert_eq!(resolve(Some(&binding), &View::default(), None), "bad");
    }

    #[test]
    fn test_unqualified_path_reads_scope() {
        let view = view(json!({ "qty": 99 }));
        let scope = json!({ "qty": 2 });
        assert_eq!(
            resolve(Some(&DataBinding::new("qty")), &view, Some(&scope)),
            "2"
        );
    }

    #[test]
    fn test_unqualified_path_absent_from_scope_reads_view() {
        let view = view(json!({ "currency": "BRL" }));
        let scope = json!({ "qty": 2 });
        assert_eq!(
            resolve(Some(&DataBinding::new("currency")), &view, Some(&scope)),
            "BRL"
        );
    }

    #[test]
    fn test_qualified_path_ignores_scope() {
        let view = view(json!({ "totals": { "subtotal": 10 } }));
        let scope = json!({ "totals": { "subtotal": 1 } });
        assert_eq!(
            resolve(Some(&DataBinding::new("totals.subtotal")), &view, Some(&scope)),
            "10"
        );
    }

    #[test]
    fn test_array_marker_returns_scope_item() {
        let view = view(json!({ "items": [{ "name": "A" }, { "name": "B" }] }));
        let scope = json!({ "name": "B" });
        assert_eq!(
            resolve(Some(&DataBinding::new("items[].name")), &view, Some(&scope)),
            "B"
        );

        let scalar = json!("plain");
        assert_eq!(
            resolve(Some(&DataBinding::new("notes[]")), &view, Some(&scalar)),
            "plain"
        );
    }

    #[test]
    fn test_array_marker_without_scope_is_the_array() {
        let view = view(json!({ "items": [{ "name": "A" }] }));
        let path = DataPath::parse("items[]").unwrap();
        assert_eq!(
            lookup(&path, &view, None).map(Cow::into_owned),
            Some(json!([{ "name": "A" }]))
        );
        assert_eq!(
            resolve(Some(&DataBinding::new("items[].name").with_fallback("x")), &view, None),
            "x"
        );
    }

    #[test]
    fn test_indices_and_length() {
        let view = view(json!({ "items": [{ "qty": 2 }, { "qty": 5 }], "notes": ["a"] }));
        assert_eq!(
            resolve(Some(&DataBinding::new("items[1].qty")), &view, None),
            "5"
        );
        assert_eq!(
            resolve(Some(&DataBinding::new("items.1.qty")), &view, None),
            "5"
        );
        assert_eq!(
            resolve(Some(&DataBinding::new("items.length")), &view, None),
            "2"
        );
        assert_eq!(
            resolve(Some(&DataBinding::new("notes[0].length")), &view, None),
            "1"
        );
    }

    #[test]
    fn test_path_cache_reuses_parse() {
        let mut resolver = Resolver::new();
        let first = resolver.path("client.name").unwrap();
        let second = resolver.path("client.name").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }
}
