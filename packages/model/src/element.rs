use crate::binding::{Condition, DataBinding};
use crate::error::ModelError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Presentation properties passed through to the host surface
pub type Style = BTreeMap<String, serde_json::Value>;

/// Discriminant of [`Element`], used by the factory and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementTag {
    Frame,
    Stack,
    Grid,
    Text,
    Image,
    Table,
    Divider,
    Repeater,
}

impl ElementTag {
    pub const ALL: [ElementTag; 8] = [
        ElementTag::Frame,
        ElementTag::Stack,
        ElementTag::Grid,
        ElementTag::Text,
        ElementTag::Image,
        ElementTag::Table,
        ElementTag::Divider,
        ElementTag::Repeater,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementTag::Frame => "Frame",
            ElementTag::Stack => "Stack",
            ElementTag::Grid => "Grid",
            ElementTag::Text => "Text",
            ElementTag::Image => "Image",
            ElementTag::Table => "Table",
            ElementTag::Divider => "Divider",
            ElementTag::Repeater => "Repeater",
        }
    }

    /// Only these tags may hold children
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ElementTag::Frame | ElementTag::Stack | ElementTag::Grid | ElementTag::Repeater
        )
    }
}

impl fmt::Display for ElementTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementTag {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownTag(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Row,
    #[default]
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Start,
    Center,
    End,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    Cover,
    Contain,
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlign {
    Left,
    Center,
    Right,
}

/// Table column: header label plus the per-row binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<ColumnAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<DataBinding>,
}

impl Column {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            width: None,
            align: None,
            binding: Some(DataBinding::new(path)),
        }
    }
}

/// Layout tree node
///
/// Identity for editing is positional (see [`crate::ElementPath`]); the
/// optional `id` is carried through to rendered output untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Element {
    /// Plain container
    Frame {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        #[serde(
            default,
            rename = "pageBreak",
            skip_serializing_if = "Option::is_none"
        )]
        page_break: Option<bool>,
        #[serde(default)]
        children: Vec<Element>,
    },

    /// One-dimensional flow container
    Stack {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        #[serde(default)]
        direction: Direction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gap: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<Align>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        justify: Option<Justify>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wrap: Option<bool>,
        #[serde(default)]
        children: Vec<Element>,
    },

    /// Two-dimensional container
    Grid {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        cols: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gap: Option<f64>,
        #[serde(default)]
        children: Vec<Element>,
    },

    /// Text leaf; `binding` overrides the literal `content`
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        binding: Option<DataBinding>,
    },

    /// Image leaf; `binding` overrides the literal `src`
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        binding: Option<DataBinding>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
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

    /// Leaf that iterates its own rows
    Table {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        #[serde(default)]
        columns: Vec<Column>,
        #[serde(rename = "dataBinding")]
        data_binding: DataBinding,
    },

    Divider {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thickness: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },

    /// Container instantiated once per item of the bound array
    Repeater {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
        #[serde(rename = "dataBinding")]
        data_binding: DataBinding,
        #[serde(default)]
        children: Vec<Element>,
    },

    /// Any `type` this build does not know about, kept verbatim
    #[serde(untagged)]
    Unknown(UnknownElement),
}

/// Raw fields of an element whose `type` is not one of [`ElementTag::ALL`]
///
/// Serialises back exactly as read, so documents written by a newer build
/// survive a load/edit/save cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UnknownElement {
    fields: Map<String, Value>,
}

impl UnknownElement {
    pub fn new(tag: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TYPE_FIELD.to_string(), Value::String(tag.into()));
        Self { fields }
    }

    /// The unrecognised `type` value
    pub fn tag(&self) -> &str {
        self.fields
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

const TYPE_FIELD: &str = "type";

/// Exact, case-sensitive match as serde compares tags
fn is_known_tag(tag: &str) -> bool {
    ElementTag::ALL.iter().any(|known| known.as_str() == tag)
}

impl<'de> Deserialize<'de> for UnknownElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        match fields.get(TYPE_FIELD) {
            // A known tag only lands here when its own fields failed to parse
            Some(Value::String(tag)) if is_known_tag(tag) => Err(D::Error::custom(format!(
                "invalid fields for element type '{}'",
                tag
            ))),
            Some(Value::String(_)) => Ok(Self { fields }),
            _ => Err(D::Error::custom("element is missing a string `type`")),
        }
    }
}

impl Element {
    /// Tag of this element; `None` for [`Element::Unknown`]
    pub fn tag(&self) -> Option<ElementTag> {
        match self {
            Element::Frame { .. } => Some(ElementTag::Frame),
            Element::Stack { .. } => Some(ElementTag::Stack),
            Element::Grid { .. } => Some(ElementTag::Grid),
            Element::Text { .. } => Some(ElementTag::Text),
            Element::Image { .. } => Some(ElementTag::Image),
            Element::Table { .. } => Some(ElementTag::Table),
            Element::Divider { .. } => Some(ElementTag::Divider),
            Element::Repeater { .. } => Some(ElementTag::Repeater),
            Element::Unknown(_) => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Element::Frame { id, .. }
            | Element::Stack { id, .. }
            | Element::Grid { id, .. }
            | Element::Text { id, .. }
            | Element::Image { id, .. }
            | Element::Table { id, .. }
            | Element::Divider { id, .. } => id.as_deref(),
            Element::Repeater { .. } | Element::Unknown(_) => None,
        }
    }

    pub fn style(&self) -> Option<&Style> {
        match self {
            Element::Frame { style, .. }
            | Element::Stack { style, .. }
            | Element::Grid { style, .. }
            | Element::Text { style, .. }
            | Element::Image { style, .. }
            | Element::Table { style, .. }
            | Element::Divider { style, .. }
            | Element::Repeater { style, .. } => style.as_ref(),
            Element::Unknown(_) => None,
        }
    }

    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Element::Frame { condition, .. }
            | Element::Stack { condition, .. }
            | Element::Grid { condition, .. }
            | Element::Text { condition, .. }
            | Element::Image { condition, .. }
            | Element::Table { condition, .. }
            | Element::Divider { condition, .. }
            | Element::Repeater { condition, .. } => condition.as_ref(),
            Element::Unknown(_) => None,
        }
    }

    pub fn is_container(&self) -> bool {
        self.tag().is_some_and(|tag| tag.is_container())
    }

    pub fn children(&self) -> Option<&[Element]> {
        match self {
            Element::Frame { children, .. }
            | Element::Stack { children, .. }
            | Element::Grid { children, .. }
            | Element::Repeater { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match self {
            Element::Frame { children, .. }
            | Element::Stack { children, .. }
            | Element::Grid { children, .. }
            | Element::Repeater { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Detach the children of a container, leaving it empty
    pub fn take_children(&mut self) -> Vec<Element> {
        self.children_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Set or clear the visibility condition
    pub fn set_condition(&mut self, new_condition: Option<Condition>) {
        match self {
            Element::Frame { condition, .. }
            | Element::Stack { condition, .. }
            | Element::Grid { condition, .. }
            | Element::Text { condition, .. }
            | Element::Image { condition, .. }
            | Element::Table { condition, .. }
            | Element::Divider { condition, .. }
            | Element::Repeater { condition, .. } => *condition = new_condition,
            Element::Unknown(_) => {}
        }
    }

    /// Number of elements in this sub-tree, including itself
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .map(|children| children.iter().map(Element::node_count).sum())
            .unwrap_or(0)
    }

    pub fn frame(children: Vec<Element>) -> Self {
        Element::Frame {
            id: None,
            style: None,
            condition: None,
            page_break: None,
            children,
        }
    }

    pub fn stack(direction: Direction, children: Vec<Element>) -> Self {
        Element::Stack {
            id: None,
            style: None,
            condition: None,
            direction,
            gap: None,
            align: None,
            justify: None,
            wrap: None,
            children,
        }
    }

    pub fn grid(cols: u32, children: Vec<Element>) -> Self {
        Element::Grid {
            id: None,
            style: None,
            condition: None,
            cols,
            rows: None,
            gap: None,
            children,
        }
    }

    /// Text with literal content
    pub fn text(content: impl Into<String>) -> Self {
        Element::Text {
            id: None,
            style: None,
            condition: None,
            content: Some(content.into()),
            binding: None,
        }
    }

    /// Text whose content comes from a binding
    pub fn bound_text(binding: DataBinding) -> Self {
        Element::Text {
            id: None,
            style: None,
            condition: None,
            content: None,
            binding: Some(binding),
        }
    }

    pub fn image(src: impl Into<String>) -> Self {
        Element::Image {
            id: None,
            style: None,
            condition: None,
            src: Some(src.into()),
            binding: None,
            alt: None,
            object_fit: None,
            aspect_ratio: None,
        }
    }

    pub fn table(data_binding: DataBinding, columns: Vec<Column>) -> Self {
        Element::Table {
            id: None,
            style: None,
            condition: None,
            columns,
            data_binding,
        }
    }

    pub fn divider() -> Self {
        Element::Divider {
            id: None,
            style: None,
            condition: None,
            thickness: None,
            color: None,
        }
    }

    /// Placeholder for a tag this build does not know
    pub fn unknown(tag: impl Into<String>) -> Self {
        Element::Unknown(UnknownElement::new(tag))
    }

    pub fn repeater(data_binding: DataBinding, children: Vec<Element>) -> Self {
        Element::Repeater {
            style: None,
            condition: None,
            data_binding,
            children,
        }
    }

    /// Builder-style variant of [`Element::set_condition`]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.set_condition(Some(condition));
        self
    }
}
