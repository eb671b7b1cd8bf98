//! C6: Delivery Orchestrator (§4.6).

use std::fs;
use std::io;
use std::path::Path;

use crate::archive::{self, ArchiveFormat};
use crate::checksum::ValidatingReader;
use crate::error::DeliverError;
use crate::redirect::{self, MappingResolver, MirrorResolver, NoMapping, NoMirror};
use crate::transport::Transport;
use crate::types::Dependency;

/// Orchestrates a single dependency delivery: redirect, fetch, verify,
/// extract (or copy). Holds the pluggable collaborators for its lifetime.
pub struct DeliveryService {
    transport: Box<dyn Transport>,
    mapping: Box<dyn MappingResolver>,
    mirror: Box<dyn MirrorResolver>,
}

/// Builds a [`DeliveryService`], defaulting the mapping and mirror
/// resolvers to no-ops.
pub struct DeliveryServiceBuilder {
    transport: Box<dyn Transport>,
    mapping: Box<dyn MappingResolver>,
    mirror: Box<dyn MirrorResolver>,
}

impl DeliveryService {
    pub fn builder(transport: impl Transport + 'static) -> DeliveryServiceBuilder {
        DeliveryServiceBuilder {
            transport: Box::new(transport),
            mapping: Box::new(NoMapping),
            mirror: Box::new(NoMirror),
        }
    }

    /// Resolve the effective fetch location, fetch, verify, and land the
    /// dependency's contents into `layer_path`.
    pub fn deliver(
        &self,
        dep: &Dependency,
        cnb_root: &Path,
        layer_path: &Path,
        platform_dir: &Path,
    ) -> Result<(), DeliverError> {
        // Step 1: effective checksum.
        let checksum = dep.effective_checksum();

        // Step 2: redirect.
        let effective_uri = redirect::resolve_uri(
            self.mapping.as_ref(),
            self.mirror.as_ref(),
            checksum.as_ref().map(|c| c.canonical()).as_deref(),
            &dep.uri,
            platform_dir,
        )?;

        // Step 3: fetch.
        tracing::debug!(uri = %effective_uri, "fetching dependency");
        let raw = self.transport.fetch(cnb_root, &effective_uri)?;

        // Step 4: wrap with the checksum validator.
        let validated = ValidatingReader::wrap(raw, checksum.as_ref())
            .map_err(|source| match source {
                crate::checksum::ChecksumError::UnsupportedAlgorithm(algo) => {
                    DeliverError::UnsupportedAlgorithm(algo)
                }
                other => DeliverError::Checksum(other),
            })?;

        // Step 5: peek format and land contents.
        let (format, sniffed) = archive::sniff(validated)?;
        tracing::debug!(?format, layer = %layer_path.display(), "extracting dependency");

        fs::create_dir_all(layer_path)?;

        match format {
            ArchiveFormat::Plain => {
                let basename = effective_uri
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("dependency");
                let dest = layer_path.join(basename);
                let mut out = fs::File::create(&dest)?;
                let mut sniffed = sniffed;
                io::copy(&mut sniffed, &mut out)?;
                set_executable(&dest)?;
                finalize(sniffed)?;
            }
            ArchiveFormat::Gzip => {
                let decoder = flate2::read::GzDecoder::new(sniffed.clone());
                archive::extract_tar(decoder, layer_path, dep.strip_components)?;
                finalize(sniffed)?;
            }
            ArchiveFormat::Xz => {
                let decoder = xz2::read::XzDecoder::new(sniffed.clone());
                archive::extract_tar(decoder, layer_path, dep.strip_components)?;
                finalize(sniffed)?;
            }
            ArchiveFormat::Bzip2 => {
                let decoder = bzip2::read::BzDecoder::new(sniffed.clone());
                archive::extract_tar(decoder, layer_path, dep.strip_components)?;
                finalize(sniffed)?;
            }
            ArchiveFormat::Tar => {
                archive::extract_tar(sniffed.clone(), layer_path, dep.strip_components)?;
                finalize(sniffed)?;
            }
        }

        tracing::debug!(id = %dep.id, version = %dep.version, "delivery complete");
        Ok(())
    }
}

/// `ValidatingReader` only hashes bytes that flow through it; the
/// decompressor/tar layer is handed a clone so draining that clone finishes
/// hashing whatever the decompressor didn't consume (trailing garbage).
fn finalize(sniffed: archive::Sniffed<ValidatingReader>) -> Result<(), DeliverError> {
    let validator: ValidatingReader = sniffed.into_inner();
    validator.drain_and_finalize()?;
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl DeliveryServiceBuilder {
    pub fn mapping_resolver(mut self, resolver: impl MappingResolver + 'static) -> Self {
        self.mapping = Box::new(resolver);
        self
    }

    pub fn mirror_resolver(mut self, resolver: impl MirrorResolver + 'static) -> Self {
        self.mirror = Box::new(resolver);
        self
    }

    pub fn build(self) -> DeliveryService {
        DeliveryService {
            transport: self.transport,
            mapping: self.mapping,
            mirror: self.mirror,
        }
    }
}
