//! Markup tree serialization.

use super::{Element, Node, PropertyValue};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Serializes a markup tree to an HTML string.
///
/// Text is entity-encoded, raw nodes are written verbatim.
pub fn to_html(node: &Node) -> String {
    let mut out = String::with_capacity(4096);
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Root(root) => {
            for child in &root.children {
                write_node(child, out);
            }
        }
        Node::Element(element) => write_element(element, out),
        Node::Text(text) => out.push_str(&html_escape::encode_text(&text.value)),
        Node::Raw(raw) => out.push_str(&raw.value),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag_name);
    for (name, value) in &element.properties {
        match value {
            PropertyValue::String(value) => {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            PropertyValue::Bool(true) => {
                out.push(' ');
                out.push_str(name);
            }
            PropertyValue::Bool(false) => {}
            PropertyValue::Number(number) => {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&format_number(*number));
                out.push('"');
            }
        }
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
        return;
    }

    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&element.tag_name);
    out.push('>');
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}
