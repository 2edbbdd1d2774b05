//! Parse Module for the SFC compiler
//!
//! Turns component source into a [`Document`] whose nodes carry byte-accurate
//! spans. Tag and attribute names keep their source casing, `{expr}` tags are
//! recognised in text and attribute positions, and `<script>` / `<style>`
//! bodies are read as raw text.

use lazy_static::lazy_static;
use std::collections::HashSet;

use crate::ast::{
    Attribute, AttributeValue, AttributeValuePart, CommentNode, Document, ElementNode,
    ExpressionTagNode, Node, SourceSpan, TextNode,
};
use crate::error::{CompileError, Result};

lazy_static! {
    /// HTML void elements, which never have children or a closing tag.
    static ref VOID_ELEMENTS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("area");
        s.insert("base");
        s.insert("br");
        s.insert("col");
        s.insert("embed");
        s.insert("hr");
        s.insert("img");
        s.insert("input");
        s.insert("link");
        s.insert("meta");
        s.insert("param");
        s.insert("source");
        s.insert("track");
        s.insert("wbr");
        s
    };
}

/// Elements whose content is raw text up to the matching close tag.
fn is_raw_text_element(name: &str) -> bool {
    name == "script" || name == "style"
}

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(name.to_ascii_lowercase().as_str())
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXPRESSION SCANNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Find the end of a balanced brace expression, handling strings, template
/// literals and comments. `start_index` must point at the opening `{`.
/// Returns the index after the closing brace, or None if unbalanced.
pub fn find_balanced_brace_end(source: &str, start_index: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut i = start_index;
    let mut in_string: Option<u8> = None;
    // Brace depth at which each open template literal's `${` began.
    let mut template_stack: Vec<usize> = Vec::new();

    while i < bytes.len() {
        let c = bytes[i];

        if c == b'\\' && (in_string.is_some() || template_stack.last() == Some(&depth)) {
            i += 2;
            continue;
        }

        if let Some(quote) = in_string {
            if c == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }

        // Inside the literal part of a template string
        if template_stack.last() == Some(&depth) {
            if c == b'`' {
                template_stack.pop();
            } else if c == b'$' && bytes.get(i + 1) == Some(&b'{') {
                depth += 1;
                i += 2;
                continue;
            }
            i += 1;
            continue;
        }

        match c {
            b'"' | b'\'' => in_string = Some(c),
            b'`' => template_stack.push(depth),
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let close = source[i + 2..].find("*/")?;
                i += 2 + close + 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }

        i += 1;
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNER
// ═══════════════════════════════════════════════════════════════════════════════

struct Scanner<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
}

impl<'s> Scanner<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.source[self.pos..].starts_with(pat)
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// True when the next `<` opens a tag, closing tag or comment.
    fn at_markup_start(&self) -> bool {
        self.peek() == Some(b'<')
            && matches!(self.peek_at(1), Some(c) if c.is_ascii_alphabetic() || c == b'/' || c == b'!')
    }

    fn read_tag_name(&mut self) -> &'s str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b':' | b'.'))
        {
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    /// Parse sibling nodes until EOF or until the close tag of `parent`.
    fn parse_nodes(&mut self, parent: Option<(&str, usize)>) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            if self.at_eof() {
                return match parent {
                    Some((name, start)) => Err(CompileError::markup(
                        start,
                        format!("Unclosed element <{}>", name),
                    )),
                    None => Ok(nodes),
                };
            }

            if self.starts_with("</") {
                let close_start = self.pos;
                self.pos += 2;
                let name = self.read_tag_name();
                self.skip_whitespace();
                if self.peek() != Some(b'>') {
                    return Err(CompileError::markup(
                        close_start,
                        format!("Malformed closing tag </{}", name),
                    ));
                }
                self.pos += 1;

                return match parent {
                    Some((open, _)) if open == name => Ok(nodes),
                    Some((open, _)) => Err(CompileError::markup(
                        close_start,
                        format!("Expected </{}> but found </{}>", open, name),
                    )),
                    None => Err(CompileError::markup(
                        close_start,
                        format!("Unexpected closing tag </{}>", name),
                    )),
                };
            }

            if self.starts_with("<!") {
                nodes.push(self.parse_comment()?);
            } else if self.at_markup_start() {
                nodes.push(self.parse_element()?);
            } else if self.peek() == Some(b'{') {
                nodes.push(self.parse_expression_tag()?);
            } else {
                nodes.push(self.parse_text());
            }
        }
    }

    fn parse_text(&mut self) -> Node {
        let start = self.pos;
        // Always consume at least one byte so a stray `<` makes progress.
        self.pos += 1;
        while let Some(c) = self.peek() {
            if c == b'{' || self.at_markup_start() {
                break;
            }
            self.pos += 1;
        }
        // `pos` only ever stops on ASCII delimiters, so it is a char boundary.
        Node::Text(TextNode {
            value: self.source[start..self.pos].to_string(),
            span: SourceSpan::new(start, self.pos),
        })
    }

    fn parse_comment(&mut self) -> Result<Node> {
        let start = self.pos;
        let (open, close) = if self.starts_with("<!--") {
            ("<!--", "-->")
        } else {
            ("<!", ">")
        };

        let body_start = start + open.len();
        let body_len = self.source[body_start..].find(close).ok_or_else(|| {
            CompileError::markup(start, "Unterminated comment")
        })?;
        self.pos = body_start + body_len + close.len();

        Ok(Node::Comment(CommentNode {
            value: self.source[body_start..body_start + body_len].to_string(),
            span: SourceSpan::new(start, self.pos),
        }))
    }

    fn parse_expression_tag(&mut self) -> Result<Node> {
        let start = self.pos;
        let end = find_balanced_brace_end(self.source, start)
            .ok_or_else(|| CompileError::markup(start, "Unterminated expression"))?;
        self.pos = end;

        Ok(Node::ExpressionTag(ExpressionTagNode {
            expression: self.source[start + 1..end - 1].to_string(),
            span: SourceSpan::new(start, end),
        }))
    }

    fn parse_element(&mut self) -> Result<Node> {
        let start = self.pos;
        self.pos += 1;
        let name = self.read_tag_name().to_string();

        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(CompileError::markup(
                        start,
                        format!("Unterminated tag <{}", name),
                    ))
                }
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') if self.peek_at(1) == Some(b'>') => {
                    self.pos += 2;
                    self_closing = true;
                    break;
                }
                Some(_) => attributes.push(self.parse_attribute(&name)?),
            }
        }

        let mut children = Vec::new();
        if self_closing || is_void_element(&name) {
            self_closing = true;
        } else if is_raw_text_element(&name) {
            children = self.parse_raw_text(&name, start)?;
        } else {
            children = self.parse_nodes(Some((name.as_str(), start)))?;
        }

        Ok(Node::Element(ElementNode {
            name,
            attributes,
            children,
            self_closing,
            span: SourceSpan::new(start, self.pos),
        }))
    }

    fn parse_attribute(&mut self, tag: &str) -> Result<Attribute> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || matches!(c, b'=' | b'>' | b'"' | b'\'' | b'{' | b'<') {
                break;
            }
            if c == b'/' && self.peek_at(1) == Some(b'>') {
                break;
            }
            self.pos += 1;
        }

        if self.pos == start {
            return Err(CompileError::markup(
                start,
                format!("Unexpected character in <{}> tag", tag),
            ));
        }
        let name = self.source[start..self.pos].to_string();

        let checkpoint = self.pos;
        self.skip_whitespace();
        if self.peek() != Some(b'=') {
            self.pos = checkpoint;
            return Ok(Attribute {
                name,
                value: AttributeValue::Empty,
                span: SourceSpan::new(start, self.pos),
            });
        }
        self.pos += 1;
        self.skip_whitespace();

        let value = match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                let value_start = self.pos + 1;
                let len = self.source[value_start..]
                    .find(quote as char)
                    .ok_or_else(|| {
                        CompileError::markup(start, format!("Unterminated value for `{}`", name))
                    })?;
                self.pos = value_start + len + 1;
                AttributeValue::Text(split_value_parts(&self.source[value_start..value_start + len]))
            }
            Some(b'{') => {
                let expr_start = self.pos;
                let end = find_balanced_brace_end(self.source, expr_start).ok_or_else(|| {
                    CompileError::markup(expr_start, "Unterminated expression")
                })?;
                self.pos = end;
                AttributeValue::Expression(self.source[expr_start + 1..end - 1].to_string())
            }
            Some(_) => {
                let value_start = self.pos;
                while let Some(c) = self.peek() {
                    if c.is_ascii_whitespace() || c == b'>' {
                        break;
                    }
                    if c == b'/' && self.peek_at(1) == Some(b'>') {
                        break;
                    }
                    self.pos += 1;
                }
                AttributeValue::Text(vec![AttributeValuePart::Text(
                    self.source[value_start..self.pos].to_string(),
                )])
            }
            None => {
                return Err(CompileError::markup(
                    start,
                    format!("Missing value for `{}`", name),
                ))
            }
        };

        Ok(Attribute {
            name,
            value,
            span: SourceSpan::new(start, self.pos),
        })
    }

    /// Read a `<script>` / `<style>` body verbatim up to its close tag.
    fn parse_raw_text(&mut self, name: &str, element_start: usize) -> Result<Vec<Node>> {
        let close = format!("</{}", name);
        let content_start = self.pos;
        let len = self.source[content_start..].find(&close).ok_or_else(|| {
            CompileError::markup(element_start, format!("Unclosed element <{}>", name))
        })?;
        let content_end = content_start + len;

        self.pos = content_end + close.len();
        self.skip_whitespace();
        if self.peek() != Some(b'>') {
            return Err(CompileError::markup(
                content_end,
                format!("Malformed closing tag </{}", name),
            ));
        }
        self.pos += 1;

        if content_end == content_start {
            return Ok(vec![]);
        }
        Ok(vec![Node::Text(TextNode {
            value: self.source[content_start..content_end].to_string(),
            span: SourceSpan::new(content_start, content_end),
        })])
    }
}

/// Split a quoted attribute value into literal and `{expr}` parts.
fn split_value_parts(value: &str) -> Vec<AttributeValuePart> {
    let mut parts = Vec::new();
    let mut last_end = 0;
    let mut i = 0;

    while let Some(offset) = value[i..].find('{') {
        let brace = i + offset;
        match find_balanced_brace_end(value, brace) {
            Some(end) => {
                if brace > last_end {
                    parts.push(AttributeValuePart::Text(value[last_end..brace].to_string()));
                }
                parts.push(AttributeValuePart::Expression(
                    value[brace + 1..end - 1].to_string(),
                ));
                last_end = end;
                i = end;
            }
            None => break,
        }
    }

    if last_end < value.len() || parts.is_empty() {
        parts.push(AttributeValuePart::Text(value[last_end..].to_string()));
    }
    parts
}

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN PARSING FUNCTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse component source into a document of top-level nodes.
pub fn parse_document(source: &str) -> Result<Document> {
    let mut scanner = Scanner::new(source);
    let nodes = scanner.parse_nodes(None)?;

    log::debug!("parsed {} top-level nodes", nodes.len());

    Ok(Document {
        nodes,
        span: SourceSpan::new(0, source.len()),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node) -> &ElementNode {
        node.as_element().expect("expected element")
    }

    #[test]
    fn test_find_balanced_brace() {
        assert_eq!(find_balanced_brace_end("{hello}", 0), Some(7));
        assert_eq!(find_balanced_brace_end("{a + b}", 0), Some(7));
        assert_eq!(find_balanced_brace_end("{obj.map(x => x)}", 0), Some(17));
        assert_eq!(
            find_balanced_brace_end("{'string with { brace'}", 0),
            Some(23)
        );
        assert_eq!(find_balanced_brace_end("{`a ${ {b: 1}.b } }`}", 0), Some(21));
        assert_eq!(find_balanced_brace_end("{ /* } */ x }", 0), Some(13));
        assert_eq!(find_balanced_brace_end("{ unclosed", 0), None);
    }

    #[test]
    fn test_spans_are_byte_accurate() {
        let source = "<h1 class=\"a\">hi {name}</h1>\n<p/>";
        let doc = parse_document(source).unwrap();
        assert_eq!(doc.nodes.len(), 3);

        let h1 = element(&doc.nodes[0]);
        assert_eq!(h1.span.slice(source), "<h1 class=\"a\">hi {name}</h1>");
        assert_eq!(h1.children[0].span().slice(source), "hi ");
        assert_eq!(h1.children[1].span().slice(source), "{name}");
        assert_eq!(doc.nodes[1].span().slice(source), "\n");

        let p = element(&doc.nodes[2]);
        assert!(p.self_closing);
        assert!(p.children.is_empty());
    }

    #[test]
    fn test_script_body_is_raw_text() {
        let source = "<script module>\n  if (a < b) { x = `</p>`; }\n</script>";
        let doc = parse_document(source).unwrap();
        let script = element(&doc.nodes[0]);
        assert_eq!(script.name, "script");
        assert!(script.has_attribute("module"));

        let content = script.content_span().unwrap();
        assert_eq!(content.slice(source), "\n  if (a < b) { x = `</p>`; }\n");
    }

    #[test]
    fn test_component_casing_preserved() {
        let doc = parse_document("<Heading level={2}>greetings!</Heading>").unwrap();
        let heading = element(&doc.nodes[0]);
        assert_eq!(heading.name, "Heading");
        assert!(matches!(
            &heading.attributes[0].value,
            AttributeValue::Expression(src) if src == "2"
        ));
    }

    #[test]
    fn test_attribute_forms() {
        let doc = parse_document("<input disabled type=text value='a {b} c'>").unwrap();
        let input = element(&doc.nodes[0]);
        assert!(input.self_closing);
        assert!(matches!(input.attributes[0].value, AttributeValue::Empty));
        match &input.attributes[2].value {
            AttributeValue::Text(parts) => assert_eq!(parts.len(), 3),
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_comments() {
        let doc = parse_document("<!-- hi --><p>x</p>").unwrap();
        assert!(matches!(&doc.nodes[0], Node::Comment(c) if c.value == " hi "));
    }

    #[test]
    fn test_markup_errors() {
        assert!(matches!(
            parse_document("<div><p>x</div>"),
            Err(CompileError::MarkupSyntax { .. })
        ));
        assert!(parse_document("<div>").is_err());
        assert!(parse_document("</div>").is_err());
        assert!(parse_document("<p>{oops</p>").is_err());
        assert!(parse_document("<script>let a;").is_err());
        assert!(parse_document("<!-- open").is_err());
        assert!(parse_document("<p class=\"x>").is_err());
    }

    #[test]
    fn test_stray_angle_bracket_is_text() {
        let doc = parse_document("<p>1 < 2</p>").unwrap();
        let p = element(&doc.nodes[0]);
        assert!(matches!(&p.children[0], Node::Text(t) if t.value == "1 < 2"));
    }
}
