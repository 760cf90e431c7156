/// Condition evaluation against realistic proposal data
use crate::*;
use serde_json::{json, Value};
use vellum_model::View;

fn proposal() -> View {
    View::from_json(json!({
        "proposal": { "status": "sent", "number": 42, "discount": 0, "validUntil": null },
        "client": { "name": "João", "vip": true, "tags": [] },
        "items": [{ "qty": 2 }, { "qty": 5 }],
        "payments": [],
        "totals": { "subtotal": 1500.5, "total": "1500.50" },
        "flags": { "show": true }
    }))
    .unwrap()
}

#[test]
fn test_length_checks() {
    let view = proposal();
    assert!(evaluate("items.length > 0", &view, None));
    assert!(evaluate("items.length == 2", &view, None));
    assert!(!evaluate("payments.length > 0", &view, None));
    assert!(evaluate("client.name.length >= 4", &view, None));
}

#[test]
fn test_truthiness_of_bare_paths() {
    let view = proposal();
    assert!(evaluate("flags.show", &view, None));
    assert!(evaluate("client.vip", &view, None));
    // Empty arrays are truthy
    assert!(evaluate("payments", &view, None));
    assert!(evaluate("client.tags", &view, None));
    assert!(!evaluate("proposal.discount", &view, None));
    assert!(!evaluate("proposal.validUntil", &view, None));
    assert!(!evaluate("proposal.nothing", &view, None));
}

#[test]
fn test_numeric_string_comparisons() {
    let view = proposal();
    assert!(evaluate("totals.total > 1000", &view, None));
    assert!(evaluate("totals.total == 1500.5", &view, None));
    assert!(evaluate("totals.subtotal <= 1500.5", &view, None));
    assert!(!evaluate("totals.subtotal < 1500.5", &view, None));
}

#[test]
fn test_string_equality_quoted_and_bare() {
    let view = proposal();
    assert!(evaluate("proposal.status == 'sent'", &view, None));
    assert!(evaluate("proposal.status == \"sent\"", &view, None));
    assert!(evaluate("proposal.status != draft", &view, None));
}

#[test]
fn test_right_operand_with_spaces_is_literal() {
    let view = View::from_json(json!({ "client": { "city": "São Paulo" } })).unwrap();
    assert!(evaluate("client.city == 'São Paulo'", &view, None));
    assert!(evaluate("client.city == São Paulo", &view, None));
}

#[test]
fn test_indexed_left_operand() {
    let view = proposal();
    assert!(evaluate("items[1].qty > 4", &view, None));
    assert!(!evaluate("items[2].qty > 4", &view, None));
}

#[test]
fn test_scope_item_in_condition() {
    let view = proposal();
    let item: Value = json!({ "qty": 5 });
    assert!(evaluate("qty == 5", &view, Some(&item)));
    assert!(evaluate("items[].qty == 5", &view, Some(&item)));
}

#[test]
fn test_parse_exposes_structure() {
    let expr = ConditionExpr::parse("proposal.number >= 40").unwrap();
    match expr {
        ConditionExpr::Compare { left, op, right } => {
            assert_eq!(left.as_str(), "proposal.number");
            assert_eq!(op, ComparisonOp::GreaterOrEqual);
            assert_eq!(right, Literal::Number(40.0));
        }
        other => panic!("Expected comparison, got {:?}", other),
    }
}
