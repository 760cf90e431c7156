//! Default-initialised elements for palette insertion
//!
//! The defaults here are deliberately plain; hosts restyle new nodes
//! through `updateElementAtPath` once inserted.

use crate::binding::DataBinding;
use crate::element::{Column, Direction, Element, ElementTag};
use crate::error::ModelResult;

pub fn create_element_by_type(tag: ElementTag) -> Element {
    match tag {
        ElementTag::Frame => Element::frame(Vec::new()),
        ElementTag::Stack => Element::stack(Direction::Column, Vec::new()),
        ElementTag::Grid => Element::grid(2, Vec::new()),
        ElementTag::Text => Element::text("Text"),
        ElementTag::Image => Element::Image {
            id: None,
            style: None,
            condition: None,
            src: None,
            binding: None,
            alt: Some(String::new()),
            object_fit: None,
            aspect_ratio: None,
        },
        ElementTag::Table => Element::table(
            DataBinding::new("items"),
            vec![Column::new("Item", "name")],
        ),
        ElementTag::Divider => Element::divider(),
        ElementTag::Repeater => Element::repeater(DataBinding::new("items"), Vec::new()),
    }
}

/// Factory lookup by tag name, as palettes send it
pub fn create_element_by_name(name: &str) -> ModelResult<Element> {
    Ok(create_element_by_type(name.parse()?))
}
