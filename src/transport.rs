//! The `Transport` collaborator (§5, §6): a synchronous, `Read`-returning
//! fetch abstraction. The core crate is single-threaded per delivery and
//! deliberately has no async runtime dependency, so `Transport` is plain
//! `std::io::Read`, not a stream of bytes chunks.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to open '{uri}': {source}")]
    Io {
        uri: String,
        #[source]
        source: io::Error,
    },

    #[error("unsupported URI scheme in '{0}'")]
    UnsupportedScheme(String),
}

/// Opens a byte stream for a dependency URI. Implementations may resolve
/// relative paths against `root`, add auth headers, retry, etc; none of
/// that is specified by the core.
pub trait Transport: Send {
    fn fetch(&self, root: &Path, uri: &str) -> Result<Box<dyn Read>, TransportError>;
}

/// A `Transport` over the local filesystem: `uri` is either a bare path
/// (resolved against `root` when relative) or a `file://` URI. Used by the
/// test suite and as a starting point for buildpacks that vendor
/// dependencies alongside the CNB.
pub struct FileTransport;

impl Transport for FileTransport {
    fn fetch(&self, root: &Path, uri: &str) -> Result<Box<dyn Read>, TransportError> {
        let path = if let Some(rest) = uri.strip_prefix("file://") {
            Path::new(rest).to_path_buf()
        } else {
            let candidate = Path::new(uri);
            if candidate.is_absolute() {
                candidate.to_path_buf()
            } else {
                root.join(candidate)
            }
        };

        let file = File::open(&path).map_err(|source| TransportError::Io {
            uri: uri.to_string(),
            source,
        })?;
        Ok(Box::new(file))
    }
}
