use crate::ast::{AttributeValue, AttributeValuePart, ElementNode, Node};

/// Top-level content of a document, classified by role.
#[derive(Debug, Clone, Default)]
pub struct Segments<'d> {
    /// Module and instance scripts in document order, for import hoisting.
    pub scripts: Vec<ScriptBlock<'d>>,
    pub styles: Vec<&'d ElementNode>,
    pub template: Vec<&'d Node>,
}

impl Segments<'_> {
    pub fn module_script_count(&self) -> usize {
        self.scripts.iter().filter(|block| block.is_module).count()
    }

    pub fn instance_script_count(&self) -> usize {
        self.scripts.len() - self.module_script_count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScriptBlock<'d> {
    pub element: &'d ElementNode,
    pub is_module: bool,
}

/// A script is module-scoped if it carries `module` or `context="module"`.
pub fn is_module_script(script: &ElementNode) -> bool {
    if script.has_attribute("module") {
        return true;
    }
    matches!(
        script.attribute("context").map(|attr| &attr.value),
        Some(AttributeValue::Text(parts))
            if matches!(parts.as_slice(), [AttributeValuePart::Text(v)] if v == "module")
    )
}

/// Classify top-level nodes into scripts, styles and template content.
///
/// A whitespace-only text node that would become the first template node is
/// dropped; whitespace after retained content is kept as-is.
pub fn segment(nodes: &[Node]) -> Segments<'_> {
    let mut segments = Segments::default();

    for node in nodes {
        match node {
            Node::Element(el) if el.name == "script" => {
                segments.scripts.push(ScriptBlock {
                    element: el,
                    is_module: is_module_script(el),
                });
            }
            Node::Element(el) if el.name == "style" => segments.styles.push(el),
            Node::Element(_) | Node::Text(_) | Node::ExpressionTag(_) | Node::Comment(_) => {
                if segments.template.is_empty() && node.is_whitespace() {
                    continue;
                }
                segments.template.push(node);
            }
        }
    }

    log::debug!(
        "segmented: {} module script(s), {} instance script(s), {} style(s), {} template node(s)",
        segments.module_script_count(),
        segments.instance_script_count(),
        segments.styles.len(),
        segments.template.len()
    );

    segments
}
