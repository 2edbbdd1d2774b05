//! Build-tool adapter.
//!
//! Compiled modules and stylesheets live in an in-memory store keyed by the
//! source file id and are served back through virtual ids of the form
//! `virtual:sfc<id>.jsx` and `virtual:sfc<id>.css`.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::compile::{compile, CompileOptions};

pub const VIRTUAL_PREFIX: &str = "virtual:sfc";

lazy_static! {
    static ref VIRTUAL_ID: Regex = Regex::new(r"^virtual:sfc(.+)\.(jsx|css)$").unwrap();
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginOptions {
    /// Only ids ending with this extension are compiled.
    pub extension: String,
    pub compile: CompileOptions,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            extension: ".sfc".to_string(),
            compile: CompileOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformResult {
    pub code: String,
    /// Source maps are not produced.
    pub map: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VirtualKind {
    Jsx,
    Css,
}

pub struct SfcPlugin {
    options: PluginOptions,
    jsx: RwLock<HashMap<String, String>>,
    css: RwLock<HashMap<String, String>>,
}

impl SfcPlugin {
    pub fn new(options: PluginOptions) -> Self {
        Self {
            options,
            jsx: RwLock::new(HashMap::new()),
            css: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        "sfc"
    }

    /// Claim virtual ids, and resolve relative imports made from inside a
    /// virtual module against the directory of the file it was compiled from.
    pub fn resolve_id(&self, id: &str, importer: Option<&str>) -> Option<String> {
        if id.starts_with(VIRTUAL_PREFIX) {
            return Some(id.to_string());
        }

        let importer = importer?.strip_prefix(VIRTUAL_PREFIX)?;
        if !id.starts_with('.') {
            return None;
        }

        let dir = Path::new(importer).parent().unwrap_or_else(|| Path::new(""));
        Some(normalize(&dir.join(id)).to_string_lossy().into_owned())
    }

    pub fn load(&self, id: &str) -> Option<String> {
        let (file, kind) = parse_virtual_id(id)?;
        let store = match kind {
            VirtualKind::Jsx => &self.jsx,
            VirtualKind::Css => &self.css,
        };
        let map = store.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        map.get(file).cloned()
    }

    /// Compile a matching file and return a proxy module that re-exports the
    /// compiled component and imports its stylesheet. Files that fail to
    /// compile are logged and skipped.
    pub fn transform(&self, source: &str, id: &str) -> Option<TransformResult> {
        if !id.ends_with(&self.options.extension) {
            return None;
        }

        let output = match compile(source, &self.options.compile) {
            Ok(output) => output,
            Err(e) => {
                let (line, column) = e.location(source);
                log::error!("Error processing {}:{}:{}: [{}] {}", id, line, column, e.code(), e);
                return None;
            }
        };

        let virtual_id = format!("{}{}", VIRTUAL_PREFIX, id);
        let mut code = String::new();

        self.jsx
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id.to_string(), output.code);
        code.push_str(&format!("export * from \"{}.jsx\";\n", virtual_id));
        code.push_str(&format!("export {{ default }} from \"{}.jsx\";\n", virtual_id));

        if !output.styles.is_empty() {
            self.css
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert(id.to_string(), output.styles);
            code.push_str(&format!("import \"{}.css\";\n", virtual_id));
        }

        log::debug!("transformed {}", id);
        Some(TransformResult { code, map: None })
    }
}

impl Default for SfcPlugin {
    fn default() -> Self {
        Self::new(PluginOptions::default())
    }
}

fn parse_virtual_id(id: &str) -> Option<(&str, VirtualKind)> {
    let caps = VIRTUAL_ID.captures(id)?;
    let file = caps.get(1)?.as_str();
    let kind = match caps.get(2)?.as_str() {
        "jsx" => VirtualKind::Jsx,
        _ => VirtualKind::Css,
    };
    Some((file, kind))
}

/// Lexically fold `.` and `..` segments.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
