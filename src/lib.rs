//! # Single-file component compiler
//!
//! Turns a component source made of markup, `<script>` blocks and `<style>`
//! blocks into a JavaScript module with one default-exported component
//! function, plus an optional stylesheet.
//!
//! ## Pipeline
//!
//! 1. `parse`: source → top-level nodes with byte offsets.
//! 2. `segment`: module scripts, instance scripts, styles, template content.
//! 3. `script`: top-level statements of each script, classified as imports
//!    or body, kept as verbatim source slices.
//! 4. `scope` (optional): `data-scope-<id>` on every template element of a
//!    copy of the tree, and on the subject of every style selector.
//! 5. `serialize`: template nodes back to markup.
//! 6. `codegen`: buckets → module text and stylesheet text.
//!
//! ## Output Invariants
//!
//! 1. Imports from every script block are hoisted above everything else, in
//!    block order then statement order.
//! 2. Module-script statements sit at module scope; instance-script
//!    statements sit inside the component function.
//! 3. Statement text is never rewritten.
//! 4. Identical source and options give identical output, except for the
//!    random id strategy.

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod ast;
pub mod codegen;
pub mod compile;
pub mod error;
pub mod id;
pub mod parse;
pub mod plugin;
pub mod scope;
pub mod script;
pub mod segment;
pub mod serialize;
pub mod visitor;

#[cfg(test)]
mod compile_tests;

pub use compile::{compile, compile_batch, CompileOptions, CompileOutput};
pub use error::{CompileError, Result};
pub use id::IdStrategy;
pub use plugin::{PluginOptions, SfcPlugin, TransformResult};

#[cfg(feature = "napi")]
#[napi]
pub fn compile_sfc_native(
    source: String,
    options: Option<serde_json::Value>,
) -> napi::Result<serde_json::Value> {
    let options: CompileOptions = match options {
        Some(value) => {
            serde_json::from_value(value).map_err(|e| napi::Error::from_reason(e.to_string()))?
        }
        None => CompileOptions::default(),
    };

    let output = compile(&source, &options).map_err(|e| {
        let (line, column) = e.location(&source);
        napi::Error::from_reason(format!("[{}] {}:{}: {}", e.code(), line, column, e))
    })?;

    serde_json::to_value(output).map_err(|e| napi::Error::from_reason(e.to_string()))
}
