use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::SourceSpan;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_MARKUP_SYNTAX: &str = "SFC-ERR-MARKUP";
pub const ERR_SCRIPT_SYNTAX: &str = "SFC-ERR-SCRIPT";
pub const ERR_STYLE_SYNTAX: &str = "SFC-ERR-STYLE";

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Every variant is fatal to the compile call that produced it.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CompileError {
    #[error("Markup syntax error at byte {offset}: {message}")]
    MarkupSyntax { offset: usize, message: String },

    #[error("Script syntax error in block {}..{}: {message}", .range.start, .range.end)]
    ScriptSyntax { range: SourceSpan, message: String },

    #[error("Style syntax error in block {}..{}: {message}", .range.start, .range.end)]
    StyleSyntax { range: SourceSpan, message: String },
}

impl CompileError {
    pub fn markup(offset: usize, message: impl Into<String>) -> Self {
        CompileError::MarkupSyntax {
            offset,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CompileError::MarkupSyntax { .. } => ERR_MARKUP_SYNTAX,
            CompileError::ScriptSyntax { .. } => ERR_SCRIPT_SYNTAX,
            CompileError::StyleSyntax { .. } => ERR_STYLE_SYNTAX,
        }
    }

    /// 1-based line and column of the error's starting byte.
    pub fn location(&self, source: &str) -> (usize, usize) {
        let offset = match self {
            CompileError::MarkupSyntax { offset, .. } => *offset,
            CompileError::ScriptSyntax { range, .. } | CompileError::StyleSyntax { range, .. } => {
                range.start
            }
        };
        offset_to_line_col(source, offset)
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let col = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, col)
}
