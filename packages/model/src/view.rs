use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Read-only business data a template is rendered against
///
/// The well-known sections of a proposal are named fields; anything else
/// the document store supplies is kept in `extra` and is just as reachable
/// from binding paths. The engine never mutates a view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct View {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub proposal: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub organization: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub client: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub salesperson: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub items: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub upgrades: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payments: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub notes: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub totals: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl View {
    /// Build a view from arbitrary JSON; non-object input is rejected
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Top-level lookup; absent and `null` sections are both `None`
    pub fn get(&self, key: &str) -> Option<&Value> {
        let value = match key {
            "proposal" => &self.proposal,
            "organization" => &self.organization,
            "client" => &self.client,
            "salesperson" => &self.salesperson,
            "items" => &self.items,
            "upgrades" => &self.upgrades,
            "payments" => &self.payments,
            "notes" => &self.notes,
            "totals" => &self.totals,
            _ => return self.extra.get(key).filter(|v| !v.is_null()),
        };
        (!value.is_null()).then_some(value)
    }
}
