//! Scope injection for template elements and style selectors.
//!
//! Both halves use the same `data-scope-<id>` attribute name: elements carry
//! it as a presence-only attribute and every selector's subject compound
//! requires it, so scoped rules only match inside this component's output.

use std::convert::Infallible;

use lightningcss::selector::{Component, Selector};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::values::ident::Ident;
use lightningcss::visit_types;
use lightningcss::visitor::{Visit, VisitTypes, Visitor};

use crate::ast::{Attribute, ElementNode, Node, SourceSpan};
use crate::error::{CompileError, Result};
use crate::visitor::{walk_element, TemplateVisitor};

pub const SCOPE_ATTRIBUTE_PREFIX: &str = "data-scope-";

pub fn scope_attribute_name(id: &str) -> String {
    format!("{}{}", SCOPE_ATTRIBUTE_PREFIX, id)
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Appends the scope attribute to every element it visits.
pub struct ScopeInjector {
    attribute: String,
}

impl ScopeInjector {
    pub fn new(id: &str) -> Self {
        Self {
            attribute: scope_attribute_name(id),
        }
    }
}

impl TemplateVisitor for ScopeInjector {
    fn visit_element(&mut self, element: &mut ElementNode) {
        if !element.has_attribute(&self.attribute) {
            element.attributes.push(Attribute::empty(self.attribute.clone()));
        }
        walk_element(self, element);
    }
}

/// Return scoped copies of the template nodes. The input tree is untouched.
pub fn scope_template(nodes: &[&Node], id: &str) -> Vec<Node> {
    let mut scoped: Vec<Node> = nodes.iter().map(|node| (*node).clone()).collect();
    ScopeInjector::new(id).visit_children(&mut scoped);
    scoped
}

// ═══════════════════════════════════════════════════════════════════════════════
// STYLES
// ═══════════════════════════════════════════════════════════════════════════════

struct ScopeSelectorVisitor {
    attribute: String,
}

impl<'i> Visitor<'i> for ScopeSelectorVisitor {
    type Error = Infallible;

    fn visit_types(&self) -> VisitTypes {
        visit_types!(SELECTORS)
    }

    fn visit_selector(&mut self, selector: &mut Selector<'i>) -> std::result::Result<(), Self::Error> {
        let mut components = parse_order_components(selector);

        let insert_at = subject_insert_position(&components);
        components.insert(
            insert_at,
            Component::AttributeInNoNamespaceExists {
                local_name: Ident::from(self.attribute.clone()),
                local_name_lower: Ident::from(self.attribute.to_ascii_lowercase()),
            },
        );

        *selector = Selector::from(components);
        Ok(())
    }
}

/// Selector components left to right, as written. Storage keeps compounds in
/// matching order (rightmost first) with each compound's contents in source
/// order, so compounds are reversed while their contents are not.
fn parse_order_components<'i>(selector: &Selector<'i>) -> Vec<Component<'i>> {
    let match_order = selector.iter_raw_match_order().as_slice();
    let mut combinators = match_order.iter().rev().filter(|c| c.is_combinator());

    let mut components = Vec::with_capacity(match_order.len() + 1);
    for compound in match_order.split(|c| c.is_combinator()).rev() {
        components.extend(compound.iter().cloned());
        if let Some(combinator) = combinators.next() {
            components.push(combinator.clone());
        }
    }
    components
}

/// Pseudo-elements are attached to their originating compound through an
/// implied combinator; it does not start a new compound.
fn is_pseudo_element_marker(component: &Component<'_>) -> bool {
    component
        .as_combinator()
        .map_or(false, |combinator| combinator.is_pseudo_element())
}

fn is_compound_boundary(component: &Component<'_>) -> bool {
    component.is_combinator() && !is_pseudo_element_marker(component)
}

/// Index in parse order where the scope requirement joins the rightmost
/// compound: its end, or just before a trailing pseudo-element.
fn subject_insert_position(components: &[Component<'_>]) -> usize {
    let subject_start = components
        .iter()
        .rposition(is_compound_boundary)
        .map(|i| i + 1)
        .unwrap_or(0);

    components[subject_start..]
        .iter()
        .position(is_pseudo_element_marker)
        .map(|i| subject_start + i)
        .unwrap_or(components.len())
}

/// Rewrite every selector in a style block to require the scope attribute.
pub fn scope_stylesheet(css: &str, block: SourceSpan, id: &str) -> Result<String> {
    let style_error = |message: String| CompileError::StyleSyntax {
        range: block,
        message,
    };

    let mut stylesheet =
        StyleSheet::parse(css, ParserOptions::default()).map_err(|e| style_error(e.to_string()))?;

    let mut visitor = ScopeSelectorVisitor {
        attribute: scope_attribute_name(id),
    };
    stylesheet
        .visit(&mut visitor)
        .unwrap_or_else(|never| match never {});

    let printed = stylesheet
        .to_css(PrinterOptions::default())
        .map_err(|e| style_error(e.to_string()))?;

    Ok(printed.code)
}
