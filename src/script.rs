use oxc_allocator::Allocator;
use oxc_ast::ast::Statement;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

use crate::ast::{ElementNode, SourceSpan};
use crate::codegen::{Buckets, Span};
use crate::error::{CompileError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Import,
    Other,
}

/// One top-level statement, located in document coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStatement {
    pub kind: StatementKind,
    pub span: SourceSpan,
}

fn script_source_type() -> SourceType {
    SourceType::default()
        .with_typescript(true)
        .with_module(true)
        .with_jsx(true)
}

/// Parse a script element's body and return its top-level statements with
/// spans projected onto the full document source.
pub fn extract_statements(source: &str, script: &ElementNode) -> Result<Vec<ScriptStatement>> {
    let Some(content) = script.content_span() else {
        return Ok(vec![]);
    };
    let code = content.slice(source);
    if code.trim().is_empty() {
        return Ok(vec![]);
    }

    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, script_source_type()).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let message = ret
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unrecoverable script parse failure".to_string());
        return Err(CompileError::ScriptSyntax {
            range: script.span,
            message,
        });
    }

    let statements = ret
        .program
        .body
        .iter()
        .map(|stmt| {
            let span = stmt.span();
            ScriptStatement {
                kind: match stmt {
                    Statement::ImportDeclaration(_) => StatementKind::Import,
                    _ => StatementKind::Other,
                },
                span: SourceSpan::new(
                    content.start + span.start as usize,
                    content.start + span.end as usize,
                ),
            }
        })
        .collect();

    Ok(statements)
}

/// Route a script block's statements into the import, module or instance bucket.
pub fn collect_script_spans(
    source: &str,
    script: &ElementNode,
    is_module: bool,
    buckets: &mut Buckets,
) -> Result<()> {
    let statements = extract_statements(source, script)?;

    log::debug!(
        "script at {}..{}: {} statement(s), module = {}",
        script.span.start,
        script.span.end,
        statements.len(),
        is_module
    );

    for stmt in statements {
        let span = Span::verbatim(source, stmt.span);
        match stmt.kind {
            StatementKind::Import => buckets.imports.push(span),
            StatementKind::Other if is_module => buckets.module_body.push(span),
            StatementKind::Other => buckets.instance_body.push(span),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::parse::parse_document;

    fn first_script(source: &str) -> ElementNode {
        let doc = parse_document(source).unwrap();
        match doc.nodes.into_iter().find(|n| matches!(n, Node::Element(_))) {
            Some(Node::Element(el)) => el,
            _ => panic!("no script element"),
        }
    }

    #[test]
    fn test_statement_spans_map_to_document() {
        let source = "<script>\n  import foo from \"bar\";\n  // note\n  let s = 'a\\'b';\n</script>";
        let script = first_script(source);
        let statements = extract_statements(source, &script).unwrap();

        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].kind, StatementKind::Import);
        assert_eq!(statements[0].span.slice(source), "import foo from \"bar\";");
        assert_eq!(statements[1].kind, StatementKind::Other);
        assert_eq!(statements[1].span.slice(source), "let s = 'a\\'b';");
    }

    #[test]
    fn test_routing() {
        let source = "<script module>import a from 'a';\nexport const x = 1;</script>";
        let script = first_script(source);
        let mut buckets = Buckets::default();
        collect_script_spans(source, &script, true, &mut buckets).unwrap();

        assert_eq!(buckets.imports.len(), 1);
        assert_eq!(buckets.module_body[0].text, "export const x = 1;");
        assert!(buckets.instance_body.is_empty());
    }

    #[test]
    fn test_empty_script() {
        let source = "<script>\n   \n</script>";
        let script = first_script(source);
        assert!(extract_statements(source, &script).unwrap().is_empty());

        let script = first_script("<script></script>");
        assert!(extract_statements("<script></script>", &script).unwrap().is_empty());
    }

    #[test]
    fn test_syntax_error_carries_block_range() {
        let source = "<p>x</p><script>let = ;</script>";
        let doc = parse_document(source).unwrap();
        let script = doc.nodes[1].as_element().unwrap();
        match extract_statements(source, script) {
            Err(CompileError::ScriptSyntax { range, .. }) => {
                assert_eq!(range, SourceSpan::new(8, source.len()));
            }
            other => panic!("expected script error, got {:?}", other),
        }
    }

    #[test]
    fn test_typescript_and_jsx() {
        let source = "<script>type P = { a: number };\nconst el = <b>{1}</b>;</script>";
        let script = first_script(source);
        assert_eq!(extract_statements(source, &script).unwrap().len(), 2);
    }
}
