use serde::{Deserialize, Serialize};
use vellum_model::{Align, ColumnAlign, Direction, Justify, ObjectFit, Style};

/// Table header cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHeader {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<ColumnAlign>,
}

/// Output of a render pass, consumed by the host presentation layer
///
/// Styles are already merged with token defaults and data is already
/// resolved, so nothing here refers back to the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RenderedNode {
    Frame {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        style: Style,
        #[serde(default, rename = "pageBreak")]
        page_break: bool,
        children: Vec<RenderedNode>,
    },

    Stack {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        style: Style,
        direction: Direction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gap: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        justify: Option<Justify>,
        #[serde(default)]
        wrap: bool,
        children: Vec<RenderedNode>,
    },

    Grid {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        style: Style,
        cols: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gap: Option<f64>,
        children: Vec<RenderedNode>,
    },

    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        style: Style,
        content: String,
    },

    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        style: Style,
        src: String,
        #[serde(default)]
        alt: String,
        #[serde(
            default,
            rename = "objectFit",
            skip_serializing_if = "Option::is_none"
        )]
        object_fit: Option<ObjectFit>,
        #[serde(
            default,
            rename = "aspectRatio",
            skip_serializing_if = "Option::is_none"
        )]
        aspect_ratio: Option<f64>,
    },

    Table {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        style: Style,
        columns: Vec<TableHeader>,
        /// Row-major cell text, one entry per column
        rows: Vec<Vec<String>>,
    },

    Divider {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default)]
        style: Style,
        thickness: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },

    /// Repeater output: item-major instances of the repeater body
    ///
    /// Containers splice fragments into their own children, so a fragment
    /// only survives at the top level of a render.
    Fragment { children: Vec<RenderedNode> },
}

impl RenderedNode {
    pub fn kind(&self) -> &'static str {
        match self {
            RenderedNode::Frame { .. } => "Frame",
            RenderedNode::Stack { .. } => "Stack",
            RenderedNode::Grid { .. } => "Grid",
            RenderedNode::Text { .. } => "Text",
            RenderedNode::Image { .. } => "Image",
            RenderedNode::Table { .. } => "Table",
            RenderedNode::Divider { .. } => "Divider",
            RenderedNode::Fragment { .. } => "Fragment",
        }
    }

    pub fn children(&self) -> &[RenderedNode] {
        match self {
            RenderedNode::Frame { children, .. }
            | RenderedNode::Stack { children, .. }
            | RenderedNode::Grid { children, .. }
            | RenderedNode::Fragment { children } => children,
            _ => &[],
        }
    }

    pub fn style(&self) -> Option<&Style> {
        match self {
            RenderedNode::Frame { style, .. }
            | RenderedNode::Stack { style, .. }
            | RenderedNode::Grid { style, .. }
            | RenderedNode::Text { style, .. }
            | RenderedNode::Image { style, .. }
            | RenderedNode::Table { style, .. }
            | RenderedNode::Divider { style, .. } => Some(style),
            RenderedNode::Fragment { .. } => None,
        }
    }

    /// Text content of every `Text` node, depth-first
    pub fn collect_text(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_text_into(&mut out);
        out
    }

    fn collect_text_into(&self, out: &mut Vec<String>) {
        if let RenderedNode::Text { content, .. } = self {
            out.push(content.clone());
        }
        for child in self.children() {
            child.collect_text_into(out);
        }
    }

    /// Number of nodes in this sub-tree, including itself
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(RenderedNode::node_count)
            .sum::<usize>()
    }
}
