use crate::binding::{Condition, DataBinding};
use crate::element::{Column, Element, UnknownElement};
use crate::path::ElementPath;

/// Visitor pattern for traversing an element tree immutably
///
/// Default implementations walk the entire tree, keeping the positional
/// path of the element being visited. Override specific `visit_*` methods
/// to act on nodes.
pub trait Visitor: Sized {
    fn visit_element(&mut self, element: &Element, path: &mut ElementPath) {
        walk_element(self, element, path);
    }

    fn visit_condition(&mut self, _condition: &Condition, _path: &ElementPath) {
        // Leaf node, no children to walk
    }

    fn visit_binding(&mut self, _binding: &DataBinding, _path: &ElementPath) {
        // Leaf node, no children to walk
    }

    fn visit_column(&mut self, column: &Column, path: &ElementPath) {
        if let Some(binding) = &column.binding {
            self.visit_binding(binding, path);
        }
    }

    fn visit_unknown(&mut self, _element: &UnknownElement, _path: &ElementPath) {}
}

pub fn walk_element<V: Visitor>(visitor: &mut V, element: &Element, path: &mut ElementPath) {
    if let Some(condition) = element.condition() {
        visitor.visit_condition(condition, path);
    }

    match element {
        Element::Text { binding, .. } | Element::Image { binding, .. } => {
            if let Some(binding) = binding {
                visitor.visit_binding(binding, path);
            }
        }
        Element::Table {
            columns,
            data_binding,
            ..
        } => {
            visitor.visit_binding(data_binding, path);
            for column in columns {
                visitor.visit_column(column, path);
            }
        }
        Element::Repeater { data_binding, .. } => {
            visitor.visit_binding(data_binding, path);
        }
        Element::Unknown(unknown) => visitor.visit_unknown(unknown, path),
        Element::Frame { .. }
        | Element::Stack { .. }
        | Element::Grid { .. }
        | Element::Divider { .. } => {}
    }

    if let Some(children) = element.children() {
        for (index, child) in children.iter().enumerate() {
            path.push(index);
            visitor.visit_element(child, path);
            path.pop();
        }
    }
}
