//! C1: Catalog Loader — parses the buildpack metadata TOML into dependency
//! records plus the default-versions table (§4.1, §6).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::types::Dependency;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("default-versions.{id} points at '{value}', which would recurse indefinitely")]
    RecursiveDefault { id: String, value: String },
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    metadata: RawMetadata,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    #[serde(default, rename = "default-versions")]
    default_versions: HashMap<String, String>,
    #[serde(default)]
    dependencies: Vec<Dependency>,
}

/// The parsed catalog: an ordered sequence of dependency records plus the
/// `id -> default constraint` table. Scoped to a single `Resolve` call.
#[derive(Debug, Default)]
pub struct Catalog {
    pub dependencies: Vec<Dependency>,
    pub default_versions: HashMap<String, String>,
}

impl Catalog {
    /// Load and parse a catalog TOML document from disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parse a catalog TOML document from an in-memory string.
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        let doc: RawDocument = toml::from_str(raw)?;

        for (id, value) in &doc.metadata.default_versions {
            if value.is_empty() || value == "default" {
                return Err(CatalogError::RecursiveDefault {
                    id: id.clone(),
                    value: value.clone(),
                });
            }
        }

        tracing::debug!(
            dependency_count = doc.metadata.dependencies.len(),
            default_count = doc.metadata.default_versions.len(),
            "loaded catalog"
        );

        Ok(Catalog {
            dependencies: doc.metadata.dependencies,
            default_versions: doc.metadata.default_versions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[metadata]
[metadata.default-versions]
x = "1.2.x"

[[metadata.dependencies]]
id = "x"
version = "1.2.3"
stacks = ["s"]
uri = "https://example.com/x-1.2.3.tgz"
checksum = "sha256:aaaa"

[[metadata.dependencies]]
id = "x"
version = "4.5.6"
stacks = ["*"]
uri = "https://example.com/x-4.5.6.tgz"
sha256 = "bbbb"
"#;

    #[test]
    fn parses_dependencies_and_defaults() {
        let catalog = Catalog::parse(SAMPLE).unwrap();
        assert_eq!(catalog.dependencies.len(), 2);
        assert_eq!(catalog.default_versions.get("x").unwrap(), "1.2.x");
        assert_eq!(catalog.dependencies[1].sha256.as_deref(), Some("bbbb"));
    }

    #[test]
    fn rejects_recursive_default() {
        let raw = r#"
[metadata]
[metadata.default-versions]
x = "default"
"#;
        let err = Catalog::parse(raw).unwrap_err();
        assert!(matches!(err, CatalogError::RecursiveDefault { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = Catalog::parse("not valid = [[[").unwrap_err();
        assert!(matches!(err, CatalogError::Toml(_)));
    }
}
