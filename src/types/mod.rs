//! Shared value types: the catalog dependency record and the checksum sum type.

pub mod checksum;
pub mod dependency;

pub use checksum::Checksum;
pub use dependency::{Dependency, WILDCARD_STACK};
