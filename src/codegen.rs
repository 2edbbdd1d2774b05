//! Codegen module for the SFC compiler
//!
//! Joins the classified spans into the final module text and stylesheet.
//! Output is assembled as plain text and never re-parsed.

use serde::{Deserialize, Serialize};

use crate::ast::SourceSpan;

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// An immutable unit of output text, either sliced verbatim from the source
/// or synthesized (rewritten CSS, serialized markup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub range: Option<SourceSpan>,
}

impl Span {
    pub fn verbatim(source: &str, range: SourceSpan) -> Self {
        Self {
            text: range.slice(source).to_string(),
            range: Some(range),
        }
    }

    pub fn synthesized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            range: None,
        }
    }
}

/// How the returned template is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateShape {
    /// Nothing renders: `<></>`.
    #[default]
    Empty,
    /// Exactly one element renders and is returned bare.
    Element,
    /// Anything else, wrapped in `<>` / `</>`.
    Fragment,
}

/// Output buckets. Insertion order within each bucket is source order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buckets {
    pub imports: Vec<Span>,
    pub module_body: Vec<Span>,
    pub instance_body: Vec<Span>,
    pub template: Vec<Span>,
    pub styles: Vec<Span>,
    #[serde(default)]
    pub template_shape: TemplateShape,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEXT HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Prefix every non-blank line with `spaces` spaces. Blank lines are dropped.
pub fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove the common leading whitespace of all non-blank lines, then trim
/// trailing whitespace on every line.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    let common = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| {
            // Blank lines may be shorter than the common indent.
            let mut cut = common.min(line.len() - line.trim_start().len());
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            line[cut..].trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASSEMBLY
// ═══════════════════════════════════════════════════════════════════════════════

const FUNCTION_HEADER: &str = "export default function(props) {";

/// Build the module text: imports, module body, then the default-exported
/// component function wrapping the instance body and the returned template.
pub fn assemble_module(buckets: &Buckets) -> String {
    let mut js = String::new();

    for span in &buckets.imports {
        js.push_str(&span.text);
        js.push('\n');
    }
    if !buckets.imports.is_empty() {
        js.push('\n');
    }

    for span in &buckets.module_body {
        js.push_str(&span.text);
        js.push('\n');
    }
    if !buckets.module_body.is_empty() {
        js.push('\n');
    }

    js.push_str(FUNCTION_HEADER);
    js.push('\n');

    for span in &buckets.instance_body {
        let body = span
            .text
            .split('\n')
            .map(str::trim_end)
            .collect::<Vec<_>>()
            .join("\n");
        js.push_str("  ");
        js.push_str(&body);
        js.push('\n');
    }
    if !buckets.instance_body.is_empty() {
        js.push('\n');
    }

    js.push_str("  return (\n");
    js.push_str(&assemble_template(buckets));
    js.push_str("  );\n");
    js.push_str("}\n");

    js
}

/// Render the returned template. A lone element is returned bare; text and
/// expression tags are only valid as fragment children.
fn assemble_template(buckets: &Buckets) -> String {
    let markup: String = buckets.template.iter().map(|span| span.text.as_str()).collect();

    match buckets.template_shape {
        TemplateShape::Empty => "    <></>\n".to_string(),
        TemplateShape::Element => format!("{}\n", indent(&markup, 4)),
        TemplateShape::Fragment => {
            let mut out = String::from("    <>\n");
            let body = indent(&markup, 6);
            if !body.is_empty() {
                out.push_str(&body);
                out.push('\n');
            }
            out.push_str("    </>\n");
            out
        }
    }
}

/// Build the stylesheet: each block dedented on its own, stripped of leading
/// and trailing blank lines, and newline-terminated.
pub fn assemble_styles(buckets: &Buckets) -> String {
    let mut css = String::new();

    for span in &buckets.styles {
        let block = dedent(&span.text);
        let block = block.trim_matches('\n');
        if block.is_empty() {
            continue;
        }
        css.push_str(block);
        css.push('\n');
    }

    css
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
