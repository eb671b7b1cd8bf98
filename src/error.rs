//! Top-level error taxonomy (§7): one `thiserror` enum per public operation,
//! aggregating the module-local errors via `#[from]` rather than re-deriving
//! the same variants twice.

use thiserror::Error;

use crate::archive::ExtractError;
use crate::catalog::CatalogError;
use crate::checksum::ChecksumError;
use crate::constraint::ConstraintError;
use crate::redirect::RedirectError;
use crate::transport::TransportError;

/// Errors raised by [`crate::resolve`].
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to parse catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("invalid constraint '{constraint}' for dependency '{id}': {source}")]
    InvalidConstraint {
        id: String,
        constraint: String,
        #[source]
        source: ConstraintError,
    },

    #[error("invalid version '{version}' for dependency '{id}': {source}")]
    InvalidVersion {
        id: String,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error(
        "no compatible version of '{id}' found for stack '{stack}'; available versions: [{}]",
        available.join(", ")
    )]
    NoCompatibleVersion {
        id: String,
        stack: String,
        available: Vec<String>,
    },

    #[error("dependency '{id}' has more than one wildcard-stack record at version {version}")]
    AmbiguousWildcard { id: String, version: String },
}

/// Errors raised by [`crate::delivery::DeliveryService::deliver`].
#[derive(Error, Debug)]
pub enum DeliverError {
    #[error("failed to resolve dependency redirect: {0}")]
    Redirect(#[from] RedirectError),

    #[error("failed to fetch dependency: {0}")]
    Fetch(#[from] TransportError),

    #[error("unsupported checksum algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("{0}")]
    Checksum(#[from] ChecksumError),

    #[error("failed to extract archive: {0}")]
    Archive(#[from] ExtractError),

    #[error("io error during delivery: {0}")]
    Io(#[from] std::io::Error),
}
