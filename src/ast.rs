use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE SPANS
// ═══════════════════════════════════════════════════════════════════════════════

/// Byte range `[start, end)` into the component source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOCUMENT TREE
// ═══════════════════════════════════════════════════════════════════════════════

/// Root of a parsed component source. Owned by a single compile call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub nodes: Vec<Node>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
    ExpressionTag(ExpressionTagNode),
    Comment(CommentNode),
}

impl Node {
    pub fn span(&self) -> SourceSpan {
        match self {
            Node::Element(el) => el.span,
            Node::Text(text) => text.span,
            Node::ExpressionTag(tag) => tag.span,
            Node::Comment(comment) => comment.span,
        }
    }

    /// True for text nodes containing nothing but whitespace.
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Text(text) if text.value.trim().is_empty())
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
    /// Written as `<name ... />` in the source, or a void element.
    #[serde(default)]
    pub self_closing: bool,
    pub span: SourceSpan,
}

impl ElementNode {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Span of the raw content between the open and close tags, if any.
    pub fn content_span(&self) -> Option<SourceSpan> {
        match (self.children.first(), self.children.last()) {
            (Some(first), Some(last)) => Some(SourceSpan::new(first.span().start, last.span().end)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub value: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionTagNode {
    pub expression: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub value: String,
    pub span: SourceSpan,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ATTRIBUTES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
    #[serde(default)]
    pub span: SourceSpan,
}

impl Attribute {
    /// A presence-only attribute, e.g. `disabled` or `data-scope-x1`.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: AttributeValue::Empty,
            span: SourceSpan::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum AttributeValue {
    Empty,
    /// Quoted or unquoted literal value, possibly interleaved with `{expr}` parts.
    Text(Vec<AttributeValuePart>),
    /// `name={expr}`
    Expression(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum AttributeValuePart {
    Text(String),
    Expression(String),
}
