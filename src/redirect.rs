//! C5: Redirect Resolver (§4.5).
//!
//! Two pluggable collaborators, both optional and defaulting to no-ops:
//! a `MappingResolver` that redirects by content checksum (authoritative —
//! it skips the mirror lookup entirely when it has an answer) and a
//! `MirrorResolver` that redirects by the original URI.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedirectError {
    #[error("dependency mapping lookup failed: {0}")]
    Mapping(String),

    #[error("dependency mirror lookup failed: {0}")]
    Mirror(String),
}

/// Redirects a fetch by the dependency's content checksum.
pub trait MappingResolver: Send {
    fn find_dependency_mapping(
        &self,
        checksum: &str,
        platform_dir: &Path,
    ) -> Result<Option<String>, RedirectError>;
}

/// Redirects a fetch by the dependency's original URI (e.g. to a mirror).
pub trait MirrorResolver: Send {
    fn find_dependency_mirror(
        &self,
        uri: &str,
        platform_dir: &Path,
    ) -> Result<Option<String>, RedirectError>;
}

/// The default `MappingResolver`: never redirects.
pub struct NoMapping;

impl MappingResolver for NoMapping {
    fn find_dependency_mapping(
        &self,
        _checksum: &str,
        _platform_dir: &Path,
    ) -> Result<Option<String>, RedirectError> {
        Ok(None)
    }
}

/// The default `MirrorResolver`: never redirects.
pub struct NoMirror;

impl MirrorResolver for NoMirror {
    fn find_dependency_mirror(
        &self,
        _uri: &str,
        _platform_dir: &Path,
    ) -> Result<Option<String>, RedirectError> {
        Ok(None)
    }
}

/// Resolve the effective fetch URI for a dependency: try the checksum
/// mapping first (authoritative, skips the mirror entirely on a hit), then
/// fall back to the mirror lookup keyed on the original URI.
pub fn resolve_uri(
    mapping: &dyn MappingResolver,
    mirror: &dyn MirrorResolver,
    checksum: Option<&str>,
    original_uri: &str,
    platform_dir: &Path,
) -> Result<String, RedirectError> {
    if let Some(checksum) = checksum {
        if let Some(mapped) = mapping.find_dependency_mapping(checksum, platform_dir)? {
            tracing::debug!(checksum, mapped, "dependency mapping redirect");
            return Ok(mapped);
        }
    }

    if let Some(mirrored) = mirror.find_dependency_mirror(original_uri, platform_dir)? {
        tracing::debug!(original_uri, mirrored, "dependency mirror redirect");
        return Ok(mirrored);
    }

    Ok(original_uri.to_string())
}
