use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// How a compile call picks its compilation id when the caller supplies none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    /// A fresh pseudo-random id per call.
    #[default]
    Random,
    /// Derived from the source text, so identical sources share an id.
    ContentHash,
}

const ID_LEN: usize = 8;

impl IdStrategy {
    pub fn generate(&self, source: &str) -> String {
        match self {
            IdStrategy::Random => random_id(),
            IdStrategy::ContentHash => content_hash_id(source),
        }
    }
}

pub fn random_id() -> String {
    format!("{:08x}", rand::random::<u32>())
}

pub fn content_hash_id(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(ID_LEN);
    hex
}

/// An explicit id always wins over the strategy.
pub fn resolve_id(explicit: Option<&str>, strategy: IdStrategy, source: &str) -> String {
    match explicit {
        Some(id) => id.to_string(),
        None => strategy.generate(source),
    }
}
