use crate::ast::{Attribute, AttributeValue, AttributeValuePart, ElementNode, Node};
use crate::codegen::TemplateShape;

/// Render a node back to markup text.
///
/// Elements keep their source name and attribute order, self-closing and void
/// elements close with ` />`, text is verbatim and expression tags keep their
/// source. Comments render as nothing since they are not valid in the output.
pub fn serialize_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

pub fn serialize_nodes<'n>(nodes: impl IntoIterator<Item = &'n Node>) -> Vec<String> {
    nodes.into_iter().map(serialize_node).collect()
}

/// True for nodes that render to meaningful output at the top level.
pub fn is_significant(node: &Node) -> bool {
    match node {
        Node::Element(_) | Node::ExpressionTag(_) => true,
        Node::Text(text) => !text.value.trim().is_empty(),
        Node::Comment(_) => false,
    }
}

/// Pick the return layout for the top-level template nodes. Only a single
/// element may be returned bare.
pub fn template_shape<'n>(nodes: impl IntoIterator<Item = &'n Node>) -> TemplateShape {
    let mut significant = nodes.into_iter().filter(|node| is_significant(node));
    match (significant.next(), significant.next()) {
        (None, _) => TemplateShape::Empty,
        (Some(Node::Element(_)), None) => TemplateShape::Element,
        _ => TemplateShape::Fragment,
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(el) => write_element(el, out),
        Node::Text(text) => out.push_str(&text.value),
        Node::ExpressionTag(tag) => {
            out.push('{');
            out.push_str(&tag.expression);
            out.push('}');
        }
        Node::Comment(_) => {}
    }
}

fn write_element(el: &ElementNode, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for attr in &el.attributes {
        out.push(' ');
        write_attribute(attr, out);
    }

    if el.self_closing {
        out.push_str(" />");
        return;
    }

    out.push('>');
    for child in &el.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn write_attribute(attr: &Attribute, out: &mut String) {
    out.push_str(&attr.name);
    match &attr.value {
        AttributeValue::Empty => {}
        AttributeValue::Expression(expr) => {
            out.push_str("={");
            out.push_str(expr);
            out.push('}');
        }
        AttributeValue::Text(parts) => {
            let value: String = parts
                .iter()
                .map(|part| match part {
                    AttributeValuePart::Text(text) => text.clone(),
                    AttributeValuePart::Expression(expr) => format!("{{{}}}", expr),
                })
                .collect();
            out.push('=');
            match (value.contains('"'), value.contains('\'')) {
                (true, false) => {
                    out.push('\'');
                    out.push_str(&value);
                    out.push('\'');
                }
                // Both quote kinds only come from unquoted source values.
                (true, true) => {
                    out.push('"');
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
                _ => {
                    out.push('"');
                    out.push_str(&value);
                    out.push('"');
                }
            }
        }
    }
}
