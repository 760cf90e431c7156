//! # Recursive Renderer
//!
//! Walks an element tree against a view and design tokens and produces a
//! [`RenderedNode`] tree:
//!
//! 1. A present `condition` is evaluated first; a hidden element yields no
//!    output and none of its descendants are visited.
//! 2. Leaves resolve their binding, or fall back to their literal field.
//! 3. Tables iterate their bound array, resolving each column with the row
//!    as scope.
//! 4. Frame/Stack/Grid render children in order under the same scope.
//! 5. Repeaters render every child once per item, with the item as the new
//!    scope (replacing, not merging with, the outer one).
//!
//! Rendering never fails. Problems a template author should hear about
//! (unknown tags, malformed conditions, unknown formatters) are collected
//! as [`RenderDiagnostic`]s tagged with the element path.

use crate::condition::ConditionExpr;
use crate::formatters::{Formatter, DEFAULT_DATE_FORMAT};
use crate::rendered::{RenderedNode, TableHeader};
use crate::resolver::Resolver;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use vellum_model::{Condition, DataBinding, DesignTokens, Element, ElementPath, Style, View};

const DEFAULT_DIVIDER_THICKNESS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Output format for `date` formatters without an argument
    pub date_format: String,
    /// Keep diagnostics for the host; when off they are only logged
    pub collect_diagnostics: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            collect_diagnostics: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    UnknownTag,
    MalformedCondition,
    UnknownFormatter,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::UnknownTag => "unknown tag",
            DiagnosticKind::MalformedCondition => "malformed condition",
            DiagnosticKind::UnknownFormatter => "unknown formatter",
        })
    }
}

/// Non-fatal problem found while rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderDiagnostic {
    pub path: ElementPath,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for RenderDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.path.is_root() {
            "<root>".to_string()
        } else {
            self.path.to_string()
        };
        write!(f, "{} at {}: {}", self.kind, at, self.message)
    }
}

pub struct Renderer<'a> {
    view: &'a View,
    tokens: &'a DesignTokens,
    resolver: Resolver,
    collect_diagnostics: bool,
    diagnostics: Vec<RenderDiagnostic>,
    path: ElementPath,
}

impl<'a> Renderer<'a> {
    pub fn new(view: &'a View, tokens: &'a DesignTokens) -> Self {
        Self::with_options(view, tokens, &RenderOptions::default())
    }

    pub fn with_options(view: &'a View, tokens: &'a DesignTokens, options: &RenderOptions) -> Self {
        Self {
            view,
            tokens,
            resolver: Resolver::with_date_format(options.date_format.clone()),
            collect_diagnostics: options.collect_diagnostics,
            diagnostics: Vec::new(),
            path: ElementPath::root(),
        }
    }

    /// Render a tree from its root, with no scope
    #[instrument(skip_all, fields(root = ?element.tag()))]
    pub fn render(&mut self, element: &Element) -> Option<RenderedNode> {
        self.render_scoped(element, None)
    }

    /// Render with an explicit scope, as if inside a repeater item
    pub fn render_scoped(
        &mut self,
        element: &Element,
        scope: Option<&Value>,
    ) -> Option<RenderedNode> {
        self.path = ElementPath::root();
        let before = self.diagnostics.len();
        let node = self.render_node(element, scope);
        info!(
            nodes = node.as_ref().map_or(0, RenderedNode::node_count),
            diagnostics = self.diagnostics.len() - before,
            "Render pass complete"
        );
        node
    }

    pub fn diagnostics(&self) -> &[RenderDiagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<RenderDiagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn render_node(&mut self, element: &Element, scope: Option<&Value>) -> Option<RenderedNode> {
        if let Some(condition) = element.condition() {
            if !self.is_visible(condition, scope) {
                debug!(
                    path = %self.path,
                    expression = %condition.expression,
                    "Element hidden by condition"
                );
                return None;
            }
        }

        let node = match element {
            Element::Frame {
                id,
                style,
                page_break,
                children,
                ..
            } => RenderedNode::Frame {
                id: id.clone(),
                style: self.merge_style(style.as_ref(), &[]),
                page_break: page_break.unwrap_or(false),
                children: self.render_children(children, scope),
            },

            Element::Stack {
                id,
                style,
                direction,
                gap,
                align,
                justify,
                wrap,
                children,
                ..
            } => RenderedNode::Stack {
                id: id.clone(),
                style: self.merge_style(style.as_ref(), &[]),
                direction: *direction,
                gap: *gap,
                align: *align,
                justify: *justify,
                wrap: wrap.unwrap_or(false),
                children: self.render_children(children, scope),
            },

            Element::Grid {
                id,
                style,
                cols,
                rows,
                gap,
                children,
                ..
            } => RenderedNode::Grid {
                id: id.clone(),
                style: self.merge_style(style.as_ref(), &[]),
                cols: *cols,
                rows: *rows,
                gap: *gap,
                children: self.render_children(children, scope),
            },

            Element::Text {
                id,
                style,
                content,
                binding,
                ..
            } => {
                let content = match binding {
                    Some(binding) => self.resolve(binding, scope),
                    None => content.clone().unwrap_or_default(),
                };
                RenderedNode::Text {
                    id: id.clone(),
                    style: self.merge_style(
                        style.as_ref(),
                        &[("color", "colors.text"), ("fontFamily", "typography.fontFamily")],
                    ),
                    content,
                }
            }

            Element::Image {
                id,
                style,
                src,
                binding,
                alt,
                object_fit,
                aspect_ratio,
                ..
            } => {
                let src = match binding {
                    Some(binding) => self.resolve(binding, scope),
                    None => src.clone().unwrap_or_default(),
                };
                RenderedNode::Image {
                    id: id.clone(),
                    style: self.merge_style(style.as_ref(), &[]),
                    src,
                    alt: alt.clone().unwrap_or_default(),
                    object_fit: *object_fit,
                    aspect_ratio: *aspect_ratio,
                }
            }

            Element::Table {
                id,
                style,
                columns,
                data_binding,
                ..
            } => {
                let items = self.items(data_binding, scope);
                let mut rows = Vec::with_capacity(items.len());
                for row in &items {
                    let mut cells = Vec::with_capacity(columns.len());
                    for column in columns {
                        cells.push(match &column.binding {
                            Some(binding) => self.resolve(binding, Some(row)),
                            None => String::new(),
                        });
                    }
                    rows.push(cells);
                }

                RenderedNode::Table {
                    id: id.clone(),
                    style: self.merge_style(
                        style.as_ref(),
                        &[
                            ("headerColor", "colors.primary"),
                            ("fontFamily", "typography.fontFamily"),
                        ],
                    ),
                    columns: columns
                        .iter()
                        .map(|column| TableHeader {
                            label: column.label.clone(),
                            width: column.width.clone(),
                            align: column.align,
                        })
                        .collect(),
                    rows,
                }
            }

            Element::Divider {
                id,
                style,
                thickness,
                color,
                ..
            } => RenderedNode::Divider {
                id: id.clone(),
                style: self.merge_style(style.as_ref(), &[]),
                thickness: thickness.unwrap_or(DEFAULT_DIVIDER_THICKNESS),
                color: color
                    .clone()
                    .or_else(|| self.tokens.color("border").cloned()),
            },

            Element::Repeater {
                data_binding,
                style,
                children,
                ..
            } => {
                let items = self.items(data_binding, scope);
                debug!(path = %data_binding.path, count = items.len(), "Expanding repeater");

                // A styled repeater wraps each instantiation in a frame carrying its style
                let style = style
                    .as_ref()
                    .filter(|style| !style.is_empty())
                    .map(|style| self.merge_style(Some(style), &[]));
                let mut rendered = Vec::new();
                for item in &items {
                    let instance = self.render_children(children, Some(item));
                    match &style {
                        Some(style) => rendered.push(RenderedNode::Frame {
                            id: None,
                            style: style.clone(),
                            page_break: false,
                            children: instance,
                        }),
                        None => rendered.extend(instance),
                    }
                }
                RenderedNode::Fragment { children: rendered }
            }

            Element::Unknown(unknown) => {
                self.diagnose(
                    DiagnosticKind::UnknownTag,
                    format!("Element type '{}' is not supported by this renderer", unknown.tag()),
                );
                return None;
            }
        };

        Some(node)
    }

    /// Render children in order, splicing repeater fragments in place
    fn render_children(
        &mut self,
        children: &[Element],
        scope: Option<&Value>,
    ) -> Vec<RenderedNode> {
        let mut out = Vec::with_capacity(children.len());
        for (index, child) in children.iter().enumerate() {
            self.path.push(index);
            match self.render_node(child, scope) {
                Some(RenderedNode::Fragment { children }) => out.extend(children),
                Some(node) => out.push(node),
                None => {}
            }
            self.path.pop();
        }
        out
    }

    fn is_visible(&mut self, condition: &Condition, scope: Option<&Value>) -> bool {
        let shown = match ConditionExpr::parse(&condition.expression) {
            Ok(expr) => expr.evaluate(self.view, scope),
            Err(err) => {
                self.diagnose(DiagnosticKind::MalformedCondition, err.to_string());
                false
            }
        };
        shown != condition.invert
    }

    fn resolve(&mut self, binding: &DataBinding, scope: Option<&Value>) -> String {
        if let Some(spec) = binding.formatter.as_deref() {
            let formatter = Formatter::parse(spec);
            if !formatter.is_known() {
                self.diagnose(
                    DiagnosticKind::UnknownFormatter,
                    format!("Formatter '{}' is not recognised", formatter.name()),
                );
            }
        }
        self.resolver.resolve(Some(binding), self.view, scope)
    }

    /// Bound array for a table or repeater; anything else is empty
    fn items(&mut self, binding: &DataBinding, scope: Option<&Value>) -> Vec<Value> {
        match self.resolver.lookup_raw(&binding.path, self.view, scope) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                debug!(path = %binding.path, value = %other, "Bound value is not an array");
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Token defaults first, then the element's own style on top
    fn merge_style(&self, own: Option<&Style>, defaults: &[(&str, &str)]) -> Style {
        let mut style: Style = defaults
            .iter()
            .filter_map(|(property, token)| {
                self.token(token)
                    .map(|value| (property.to_string(), Value::String(value.clone())))
            })
            .collect();
        if let Some(own) = own {
            style.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        style
    }

    fn token(&self, key: &str) -> Option<&String> {
        match key.split_once('.') {
            Some(("colors", name)) => self.tokens.color(name),
            Some(("typography", name)) => self.tokens.typography(name),
            _ => None,
        }
    }

    fn diagnose(&mut self, kind: DiagnosticKind, message: String) {
        warn!(path = %self.path, %kind, %message, "Render diagnostic");
        if self.collect_diagnostics {
            self.diagnostics.push(RenderDiagnostic {
                path: self.path.clone(),
                kind,
                message,
            });
        }
    }
}

/// Render one element with default options, discarding diagnostics
pub fn render(
    element: &Element,
    view: &View,
    tokens: &DesignTokens,
    scope: Option<&Value>,
) -> Option<RenderedNode> {
    Renderer::new(view, tokens).render_scoped(element, scope)
}
