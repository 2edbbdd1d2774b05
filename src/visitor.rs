use crate::ast::{CommentNode, ElementNode, ExpressionTagNode, Node, TextNode};

/// The TemplateVisitor trait is the single traversal mechanism for template trees.
///
/// Implementers override `visit_*` methods to add behavior and call the
/// matching `walk_*` function to keep descending unless pruning is intended.
pub trait TemplateVisitor {
    fn visit_node(&mut self, node: &mut Node) {
        walk_node(self, node);
    }

    fn visit_element(&mut self, element: &mut ElementNode) {
        walk_element(self, element);
    }

    fn visit_text(&mut self, _text: &mut TextNode) {}

    fn visit_expression_tag(&mut self, _tag: &mut ExpressionTagNode) {}

    fn visit_comment(&mut self, _comment: &mut CommentNode) {}

    fn visit_children(&mut self, children: &mut [Node]) {
        walk_children(self, children);
    }
}

pub fn walk_children<V: TemplateVisitor + ?Sized>(visitor: &mut V, children: &mut [Node]) {
    for node in children {
        visitor.visit_node(node);
    }
}

pub fn walk_node<V: TemplateVisitor + ?Sized>(visitor: &mut V, node: &mut Node) {
    match node {
        Node::Element(el) => visitor.visit_element(el),
        Node::Text(t) => visitor.visit_text(t),
        Node::ExpressionTag(e) => visitor.visit_expression_tag(e),
        Node::Comment(c) => visitor.visit_comment(c),
    }
}

pub fn walk_element<V: TemplateVisitor + ?Sized>(visitor: &mut V, element: &mut ElementNode) {
    visitor.visit_children(&mut element.children);
}
