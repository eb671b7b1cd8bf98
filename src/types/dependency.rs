//! The catalog dependency record (§3).

use serde::Deserialize;

use crate::types::checksum::Checksum;

/// The literal stack identifier meaning "any stack".
pub const WILDCARD_STACK: &str = "*";

/// One entry from `metadata.dependencies` in the catalog TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct Dependency {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub version: String,
    #[serde(default)]
    pub stacks: Vec<String>,
    pub uri: String,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_checksum: Option<String>,
    #[serde(default)]
    pub source_sha256: Option<String>,
    #[serde(default)]
    pub cpe: Option<String>,
    #[serde(default)]
    pub cpes: Option<Vec<String>>,
    #[serde(default)]
    pub purl: Option<String>,
    #[serde(default)]
    pub licenses: Option<Vec<String>>,
    #[serde(default)]
    pub deprecation_date: Option<toml::value::Datetime>,
    #[serde(default, rename = "strip-components")]
    pub strip_components: u32,
}

impl Dependency {
    /// Whether this record lists the wildcard stack.
    pub fn is_wildcard_stack(&self) -> bool {
        self.stacks.iter().any(|s| s == WILDCARD_STACK)
    }

    /// Whether `stack` satisfies this record, either specifically or via wildcard.
    pub fn matches_stack(&self, stack: &str) -> bool {
        self.stacks.iter().any(|s| s == stack) || self.is_wildcard_stack()
    }

    /// The effective checksum: `checksum` takes precedence over legacy `sha256`.
    pub fn effective_checksum(&self) -> Option<Checksum> {
        if let Some(raw) = &self.checksum {
            Some(Checksum::parse(raw))
        } else {
            self.sha256.as_deref().map(Checksum::parse)
        }
    }

    /// The effective source checksum, same precedence rule as `effective_checksum`.
    pub fn effective_source_checksum(&self) -> Option<Checksum> {
        if let Some(raw) = &self.source_checksum {
            Some(Checksum::parse(raw))
        } else {
            self.source_sha256.as_deref().map(Checksum::parse)
        }
    }
}
