/// Rendering behaviour across element kinds, scopes and visibility
use crate::*;
use serde_json::{json, Value};
use vellum_model::{Condition, DataBinding, DesignTokens, Direction, Element, View};

fn view(value: Value) -> View {
    View::from_json(value).unwrap()
}

fn render_texts(template: &Element, view: &View) -> Vec<String> {
    render(template, view, &DesignTokens::default(), None)
        .map(|node| node.collect_text())
        .unwrap_or_default()
}

#[test]
fn test_repeater_scope_shadows_only_unqualified_paths() {
    let view = view(json!({
        "items": [{ "qty": 2 }, { "qty": 5 }],
        "totals": { "subtotal": 1234 }
    }));
    let template = Element::frame(vec![Element::repeater(
        DataBinding::new("items"),
        vec![
            Element::bound_text(DataBinding::new("qty")),
            Element::bound_text(DataBinding::new("totals.subtotal")),
        ],
    )]);

    assert_eq!(render_texts(&template, &view), vec!["2", "1234", "5", "1234"]);
}

#[test]
fn test_repeater_output_is_item_major() {
    let view = view(json!({ "notes": ["first", "second"] }));
    let template = Element::frame(vec![Element::repeater(
        DataBinding::new("notes"),
        vec![
            Element::bound_text(DataBinding::new("notes[]")),
            Element::divider(),
        ],
    )]);

    let node = render(&template, &view, &DesignTokens::default(), None).unwrap();
    let kinds: Vec<_> = node.children().iter().map(RenderedNode::kind).collect();
    assert_eq!(kinds, vec!["Text", "Divider", "Text", "Divider"]);
    assert_eq!(node.collect_text(), vec!["first", "second"]);
}

#[test]
fn test_nested_repeater_replaces_outer_scope() {
    let view = view(json!({
        "name": "view-level",
        "items": [
            { "name": "A", "parts": [{ "sku": "a1" }, { "sku": "a2" }] },
            { "name": "B", "parts": [{ "sku": "b1" }] }
        ]
    }));
    let template = Element::frame(vec![Element::repeater(
        DataBinding::new("items"),
        vec![
            Element::bound_text(DataBinding::new("name")),
            Element::repeater(
                DataBinding::new("parts"),
                vec![
                    Element::bound_text(DataBinding::new("sku")),
                    // The outer item is not visible from the inner scope
                    Element::bound_text(DataBinding::new("name")),
                ],
            ),
        ],
    )]);

    assert_eq!(
        render_texts(&template, &view),
        vec!["A", "a1", "view-level", "a2", "view-level", "B", "b1", "view-level"]
    );
}

#[test]
fn test_repeater_over_missing_or_scalar_renders_nothing() {
    let view = view(json!({ "items": 3 }));
    let template = Element::frame(vec![
        Element::repeater(DataBinding::new("items"), vec![Element::text("x")]),
        Element::repeater(DataBinding::new("upgrades"), vec![Element::text("y")]),
    ]);
    assert!(render_texts(&template, &view).is_empty());
}

#[test]
fn test_top_level_repeater_renders_fragment() {
    let view = view(json!({ "items": [{ "qty": 1 }] }));
    let template = Element::repeater(
        DataBinding::new("items"),
        vec![Element::bound_text(DataBinding::new("qty"))],
    );
    match render(&template, &view, &DesignTokens::default(), None).unwrap() {
        RenderedNode::Fragment { children } => assert_eq!(children.len(), 1),
        other => panic!("Expected fragment, got {:?}", other),
    }
}

#[test]
fn test_hidden_element_contributes_nothing() {
    let view = view(json!({ "flags": { "show": false } }));
    let template = Element::frame(vec![
        Element::text("visible"),
        Element::frame(vec![Element::text("hidden child")])
            .with_condition(Condition::new("flags.show")),
    ]);

    let node = render(&template, &view, &DesignTokens::default(), None).unwrap();
    assert_eq!(node.children().len(), 1);
    assert_eq!(node.collect_text(), vec!["visible"]);
}

#[test]
fn test_inverted_condition() {
    let view = view(json!({ "items": [] }));
    let template = Element::frame(vec![
        Element::text("empty").with_condition(Condition::inverted("items.length > 0")),
        Element::text("has items").with_condition(Condition::new("items.length > 0")),
    ]);
    assert_eq!(render_texts(&template, &view), vec!["empty"]);
}

#[test]
fn test_hidden_subtree_is_not_visited() {
    let view = View::default();
    let tokens = DesignTokens::default();
    let template = Element::frame(vec![Element::frame(vec![
        Element::unknown("Chart"),
        Element::bound_text(DataBinding::new("x").with_formatter("shout")),
    ])
    .with_condition(Condition::new("flags.show"))]);

    let mut renderer = Renderer::new(&view, &tokens);
    renderer.render(&template);
    assert!(renderer.diagnostics().is_empty());
}

#[test]
fn test_condition_inside_repeater_uses_item_scope() {
    let view = view(json!({
        "items": [
            { "name": "Free", "price": 0 },
            { "name": "Paid", "price": 10 }
        ]
    }));
    let template = Element::frame(vec![Element::repeater(
        DataBinding::new("items"),
        vec![Element::bound_text(DataBinding::new("name"))
            .with_condition(Condition::new("price > 0"))],
    )]);
    assert_eq!(render_texts(&template, &view), vec!["Paid"]);
}

#[test]
fn test_layout_attributes_pass_through() {
    let template = Element::Stack {
        id: Some("header".into()),
        style: None,
        condition: None,
        direction: Direction::Row,
        gap: Some(8.0),
        align: Some(vellum_model::Align::Center),
        justify: Some(vellum_model::Justify::SpaceBetween),
        wrap: None,
        children: vec![Element::grid(3, vec![Element::text("cell")])],
    };

    match render(&template, &View::default(), &DesignTokens::default(), None).unwrap() {
        RenderedNode::Stack {
            id,
            direction,
            gap,
            wrap,
            children,
            ..
        } => {
            assert_eq!(id.as_deref(), Some("header"));
            assert_eq!(direction, Direction::Row);
            assert_eq!(gap, Some(8.0));
            assert!(!wrap);
            assert!(matches!(children[0], RenderedNode::Grid { cols: 3, .. }));
        }
        other => panic!("Expected stack, got {:?}", other),
    }
}

#[test]
fn test_image_binding_overrides_src() {
    let view = view(json!({ "organization": { "logo": "https://cdn/logo.png" } }));
    let template = Element::Image {
        id: None,
        style: None,
        condition: None,
        src: Some("placeholder.png".into()),
        binding: Some(DataBinding::new("organization.logo")),
        alt: Some("Logo".into()),
        object_fit: None,
        aspect_ratio: None,
    };

    match render(&template, &view, &DesignTokens::default(), None).unwrap() {
        RenderedNode::Image { src, alt, .. } => {
            assert_eq!(src, "https://cdn/logo.png");
            assert_eq!(alt, "Logo");
        }
        other => panic!("Expected image, got {:?}", other),
    }
}

#[test]
fn test_explicit_scope_argument() {
    let view = view(json!({ "qty": 1 }));
    let scope = json!({ "qty": 9 });
    let node = render(
        &Element::bound_text(DataBinding::new("qty")),
        &view,
        &DesignTokens::default(),
        Some(&scope),
    )
    .unwrap();
    assert_eq!(node.collect_text(), vec!["9"]);
}

#[test]
fn test_diagnostic_paths_inside_repeater() {
    let view = view(json!({ "items": [1, 2] }));
    let tokens = DesignTokens::default();
    let template = Element::frame(vec![
        Element::text("a"),
        Element::repeater(DataBinding::new("items"), vec![Element::unknown("Chart")]),
    ]);

    let mut renderer = Renderer::new(&view, &tokens);
    renderer.render(&template);
    let paths: Vec<String> = renderer
        .diagnostics()
        .iter()
        .map(|d| d.path.to_string())
        .collect();
    // Reported once per instantiation, at the template position
    assert_eq!(paths, vec!["children[1].children[0]", "children[1].children[0]"]);
}
