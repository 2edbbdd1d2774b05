//! End-to-end compile tests.
//!
//! Every test here goes from raw component source to the final module and
//! stylesheet text, so layout rules are pinned down exactly.

#[cfg(test)]
mod tests {
    use crate::ast::SourceSpan;
    use crate::compile::{compile, compile_batch, CompileOptions, CompileOutput};
    use crate::error::CompileError;
    use crate::id::{content_hash_id, IdStrategy};

    fn compile_default(source: &str) -> CompileOutput {
        compile(source, &CompileOptions::default()).unwrap()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // MODULE LAYOUT
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_markup_only() {
        let output = compile_default("<h1>hi</h1>");
        assert_eq!(
            output.code,
            "export default function(props) {\n  return (\n    <h1>hi</h1>\n  );\n}\n"
        );
        assert_eq!(output.styles, "");
    }

    #[test]
    fn test_multiple_roots_are_wrapped_in_fragment() {
        let source = "<Heading>greetings!</Heading>\n<p>hello, world!</p>\n";
        let expected = "\
export default function(props) {
  return (
    <>
      <Heading>greetings!</Heading>
      <p>hello, world!</p>
    </>
  );
}
";
        assert_eq!(compile_default(source).code, expected);
    }

    #[test]
    fn test_instance_script_goes_inside_function() {
        let source = "<script>\n  let name = \"jake\";\n</script>\n<p>hello, {name}!</p>\n";
        let expected = "\
export default function(props) {
  let name = \"jake\";

  return (
    <p>hello, {name}!</p>
  );
}
";
        assert_eq!(compile_default(source).code, expected);
    }

    #[test]
    fn test_imports_hoisted_and_comments_dropped() {
        let source = "\
<script>
  import foo from \"bar\";
  // test
  let name = \"jake\";
</script>
<!-- hi -->
<p>hello, {name}!</p>
";
        let expected = "\
import foo from \"bar\";

export default function(props) {
  let name = \"jake\";

  return (
    <p>hello, {name}!</p>
  );
}
";
        assert_eq!(compile_default(source).code, expected);
    }

    #[test]
    fn test_module_and_instance_scripts() {
        let source = "\
<script module>
  let x = 1;
</script>
<script>
  let y = 2;
</script>
<p>{x}{y}</p>
";
        let expected = "\
let x = 1;

export default function(props) {
  let y = 2;

  return (
    <p>{x}{y}</p>
  );
}
";
        assert_eq!(compile_default(source).code, expected);
    }

    #[test]
    fn test_legacy_context_module_flag() {
        let source = "<script context=\"module\">\n  import foo from \"bar\";\n  let name = \"jake\";\n</script>\n<p>hello, {name}!</p>\n";
        let expected = "\
import foo from \"bar\";

let name = \"jake\";

export default function(props) {
  return (
    <p>hello, {name}!</p>
  );
}
";
        assert_eq!(compile_default(source).code, expected);
    }

    #[test]
    fn test_imports_from_every_block_in_block_order() {
        let source = "<script>let a = 1;\nimport x from \"x\";</script><script module>import y from \"y\";\nlet m = 0;</script><p/>";
        let expected = "\
import x from \"x\";
import y from \"y\";

let m = 0;

export default function(props) {
  let a = 1;

  return (
    <p />
  );
}
";
        assert_eq!(compile_default(source).code, expected);
    }

    #[test]
    fn test_multiple_instance_scripts_concatenate() {
        let source = "<script>let a = 1;</script>\n<script>let b = 2;</script>\n<p>{a}{b}</p>";
        let code = compile_default(source).code;
        assert!(code.contains("{\n  let a = 1;\n  let b = 2;\n\n  return ("));
    }

    #[test]
    fn test_multiline_statement_keeps_inner_layout() {
        let source = "<script>\n  function greet() {\n    return \"hi\";\n  }\n</script>\n<p>{greet()}</p>";
        let code = compile_default(source).code;
        assert!(code.contains("  function greet() {\n    return \"hi\";\n  }\n"));
    }

    #[test]
    fn test_statement_text_is_verbatim() {
        let statement = "let s = \"a\\\"b\" /* keep */ + 'c' + `t${1}`;";
        let source = format!("<script>{}</script><p>{{s}}</p>", statement);
        let code = compile_default(&source).code;
        assert!(code.contains(&format!("  {}\n", statement)));
    }

    #[test]
    fn test_leading_whitespace_elided() {
        let output = compile_default("\n\n   <p>x</p>");
        assert!(output.code.contains("  return (\n    <p>x</p>\n  );"));
    }

    #[test]
    fn test_single_expression_tag_root_is_wrapped() {
        let expected = "\
export default function(props) {
  return (
    <>
      {greeting}
    </>
  );
}
";
        assert_eq!(compile_default("{greeting}").code, expected);
    }

    #[test]
    fn test_bare_text_root_is_wrapped() {
        let code = compile_default("\nhello world\n").code;
        assert!(code.contains("  return (\n    <>\n      hello world\n    </>\n  );"));
    }

    #[test]
    fn test_single_element_with_comment_stays_bare() {
        let code = compile_default("<!-- note -->\n<p>x</p>\n").code;
        assert!(code.contains("  return (\n    <p>x</p>\n  );"));
    }

    #[test]
    fn test_styles_only_document_returns_empty_fragment() {
        let output = compile_default("<style>\n  .foo {\n    color: red;\n  }\n</style>\n");
        assert!(output.code.contains("  return (\n    <></>\n  );"));
        assert_eq!(output.styles, ".foo {\n  color: red;\n}\n");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // STYLES AND SCOPING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_style_blocks_dedented_independently() {
        let source = "\
<p>x</p>
<style>
        .a { color: red; }
</style>
<style>
  .b {
    color: blue;
  }
</style>
";
        assert_eq!(
            compile_default(source).styles,
            ".a { color: red; }\n.b {\n  color: blue;\n}\n"
        );
    }

    #[test]
    fn test_unscoped_styles_are_not_validated() {
        let output = compile_default("<p>x</p><style>.a..b { }</style>");
        assert_eq!(output.styles, ".a..b { }\n");
    }

    #[test]
    fn test_scoped_example() {
        let source = "<p class=\"a\">hi</p><style>.a{color:red}</style>";
        let output = compile(source, &CompileOptions::scoped("z1")).unwrap();

        assert!(output.code.contains("    <p class=\"a\" data-scope-z1>hi</p>\n"));
        assert!(output.styles.contains(".a[data-scope-z1]"));
        assert!(output.styles.contains("color: red"));
    }

    #[test]
    fn test_scoped_component() {
        let source = "<p class=\"foo\">hello world!</p>\n<style>\n  .foo {\n    color: red;\n  }\n</style>\n";
        let output = compile(source, &CompileOptions::scoped("asdf")).unwrap();

        let expected_code = "\
export default function(props) {
  return (
    <p class=\"foo\" data-scope-asdf>hello world!</p>
  );
}
";
        assert_eq!(output.code, expected_code);
        assert_eq!(output.styles, ".foo[data-scope-asdf] {\n  color: red;\n}\n");
    }

    #[test]
    fn test_scoping_reaches_every_element() {
        let source = "<Card><ul><li>a</li><li><b>b</b></li></ul></Card><br>";
        let output = compile(source, &CompileOptions::scoped("k9")).unwrap();
        let template = output.code.split("return (").nth(1).unwrap();

        // Card, ul, li, li, b, br
        assert_eq!(template.matches(" data-scope-k9").count(), 6);
        assert!(template.contains("    <>\n"));
        assert!(template.contains("<br data-scope-k9 />"));
    }

    #[test]
    fn test_content_hash_id() {
        let source = "<p>x</p><style>p { margin: 0 }</style>";
        let options = CompileOptions {
            scope: true,
            id_strategy: IdStrategy::ContentHash,
            ..Default::default()
        };
        let output = compile(source, &options).unwrap();
        let attr = format!("data-scope-{}", content_hash_id(source));

        assert!(output.code.contains(&attr));
        assert!(output.styles.contains(&format!("p[{}]", attr)));
        assert_eq!(output, compile(source, &options).unwrap());
    }

    #[test]
    fn test_random_id_shared_between_template_and_styles() {
        let output = compile(
            "<p>x</p><style>p { margin: 0 }</style>",
            &CompileOptions {
                scope: true,
                ..Default::default()
            },
        )
        .unwrap();

        let start = output.code.find("data-scope-").unwrap();
        let attr = &output.code[start..start + "data-scope-".len() + 8];
        assert!(output.styles.contains(&format!("[{}]", attr)));
    }

    #[test]
    fn test_unscoped_output_has_no_scope_attribute() {
        let output = compile_default("<p class=\"a\">x</p><style>.a { color: red }</style>");
        assert!(!output.code.contains("data-scope-"));
        assert!(!output.styles.contains("data-scope-"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DETERMINISM / BATCH / OPTIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_deterministic_output() {
        let source = "<script>import a from \"a\";\nlet b = a;</script><p>{b}</p><style>.x { top: 0 }</style>";
        let options = CompileOptions::scoped("same");
        assert_eq!(compile(source, &options).unwrap(), compile(source, &options).unwrap());
    }

    #[test]
    fn test_compile_batch_preserves_order() {
        let sources = vec!["<h1>a</h1>", "<div>", "<h2>b</h2>"];
        let results = compile_batch(&sources, &CompileOptions::default());

        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap().code.contains("<h1>a</h1>"));
        assert!(matches!(results[1], Err(CompileError::MarkupSyntax { .. })));
        assert!(results[2].as_ref().unwrap().code.contains("<h2>b</h2>"));
    }

    #[test]
    fn test_options_from_json() {
        let options: CompileOptions =
            serde_json::from_str(r#"{"scope":true,"idStrategy":"content-hash"}"#).unwrap();
        assert!(options.scope);
        assert!(options.id.is_none());
        assert_eq!(options.id_strategy, IdStrategy::ContentHash);

        let defaults: CompileOptions = serde_json::from_str("{}").unwrap();
        assert!(!defaults.scope);
        assert_eq!(defaults.id_strategy, IdStrategy::Random);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ERRORS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_script_syntax_error() {
        let source = "<p>x</p>\n<script>let = ;</script>";
        match compile(source, &CompileOptions::default()) {
            Err(err @ CompileError::ScriptSyntax { .. }) => {
                assert_eq!(err.code(), "SFC-ERR-SCRIPT");
                assert_eq!(err.location(source), (2, 1));
                if let CompileError::ScriptSyntax { range, .. } = err {
                    assert_eq!(range, SourceSpan::new(9, 33));
                }
            }
            other => panic!("expected script error, got {:?}", other),
        }
    }

    #[test]
    fn test_markup_syntax_error() {
        match compile("<div><p>x</div>", &CompileOptions::default()) {
            Err(CompileError::MarkupSyntax { offset, .. }) => assert_eq!(offset, 9),
            other => panic!("expected markup error, got {:?}", other),
        }
    }

    #[test]
    fn test_scoped_style_syntax_error() {
        let source = "<p>x</p><style>.a..b { color: red }</style>";
        match compile(source, &CompileOptions::scoped("z1")) {
            Err(CompileError::StyleSyntax { range, .. }) => {
                assert_eq!(range.start, 8);
                assert_eq!(range.end, source.len());
            }
            other => panic!("expected style error, got {:?}", other),
        }
    }
}
