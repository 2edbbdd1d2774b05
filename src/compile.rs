//! Compile entry points.
//!
//! `compile` runs the whole pipeline for one source: parse, segment, extract
//! script spans, optionally scope, serialize, assemble. It holds no state
//! between calls, so identical source and options give identical output.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ast::{ElementNode, Node};
use crate::codegen::{assemble_module, assemble_styles, Buckets, Span};
use crate::error::Result;
use crate::id::{resolve_id, IdStrategy};
use crate::parse::parse_document;
use crate::scope::{scope_stylesheet, scope_template};
use crate::script::collect_script_spans;
use crate::segment::segment;
use crate::serialize::{serialize_node, template_shape};

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS / OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Rewrite template and styles so styles only apply to this component.
    pub scope: bool,
    /// Compilation id used verbatim in `data-scope-<id>`.
    pub id: Option<String>,
    /// Fallback when `id` is not set.
    pub id_strategy: IdStrategy,
}

impl CompileOptions {
    pub fn scoped(id: impl Into<String>) -> Self {
        Self {
            scope: true,
            id: Some(id.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
    /// Module with a single default-exported component function.
    pub code: String,
    /// Stylesheet text, empty when the source has no style blocks.
    pub styles: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PIPELINE
// ═══════════════════════════════════════════════════════════════════════════════

pub fn compile(source: &str, options: &CompileOptions) -> Result<CompileOutput> {
    let document = parse_document(source)?;
    let segments = segment(&document.nodes);

    let scope_id = options
        .scope
        .then(|| resolve_id(options.id.as_deref(), options.id_strategy, source));
    if let Some(id) = &scope_id {
        log::debug!("scoping with data-scope-{}", id);
    }

    let mut buckets = Buckets::default();

    for block in &segments.scripts {
        collect_script_spans(source, block.element, block.is_module, &mut buckets)?;
    }

    collect_template(&segments.template, scope_id.as_deref(), &mut buckets);

    for style in &segments.styles {
        if let Some(span) = style_span(source, style, scope_id.as_deref())? {
            buckets.styles.push(span);
        }
    }

    Ok(CompileOutput {
        code: assemble_module(&buckets),
        styles: assemble_styles(&buckets),
    })
}

fn collect_template(nodes: &[&Node], scope_id: Option<&str>, buckets: &mut Buckets) {
    buckets.template_shape = template_shape(nodes.iter().copied());

    match scope_id {
        Some(id) => {
            for node in scope_template(nodes, id) {
                buckets.template.push(Span::synthesized(serialize_node(&node)));
            }
        }
        None => {
            for node in nodes {
                buckets.template.push(Span::synthesized(serialize_node(node)));
            }
        }
    }
}

fn style_span(source: &str, style: &ElementNode, scope_id: Option<&str>) -> Result<Option<Span>> {
    let Some(content) = style.content_span() else {
        return Ok(None);
    };

    match scope_id {
        Some(id) => {
            let css = scope_stylesheet(content.slice(source), style.span, id)?;
            Ok(Some(Span::synthesized(css)))
        }
        None => Ok(Some(Span::verbatim(source, content))),
    }
}

/// Compile many sources in parallel. Each item gets its own document,
/// buckets and (unless `options.id` is set) its own id.
pub fn compile_batch<S>(sources: &[S], options: &CompileOptions) -> Vec<Result<CompileOutput>>
where
    S: AsRef<str> + Sync,
{
    sources
        .par_iter()
        .map(|source| compile(source.as_ref(), options))
        .collect()
}
