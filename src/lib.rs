//! dependency-delivery
//!
//! Resolves a dependency record out of a buildpack catalog, then fetches,
//! checksum-verifies, and extracts it into a build layer. Grounded in the
//! cloud-native-buildpacks dependency model: one catalog TOML per buildpack,
//! one `Resolve` per `(id, constraint, stack)`, one `Deliver` per resolved
//! record.

pub mod archive;
pub mod bom;
pub mod catalog;
pub mod checksum;
pub mod constraint;
pub mod delivery;
pub mod error;
pub mod redirect;
pub mod resolver;
pub mod transport;
pub mod types;

pub use bom::{generate_bill_of_materials, BomEntry};
pub use catalog::{Catalog, CatalogError};
pub use delivery::{DeliveryService, DeliveryServiceBuilder};
pub use error::{DeliverError, ResolveError};
pub use redirect::{MappingResolver, MirrorResolver};
pub use resolver::{resolve, resolve_from_catalog};
pub use transport::{FileTransport, Transport, TransportError};
pub use types::{Checksum, Dependency};
