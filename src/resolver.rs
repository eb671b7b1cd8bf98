//! C2: Constraint Matcher (§4.2).

use std::path::Path;

use semver::Version;

use crate::catalog::Catalog;
use crate::constraint::Constraint;
use crate::error::ResolveError;
use crate::types::Dependency;

/// Resolve a single dependency from the catalog at `catalog_path`.
///
/// `constraint` of `""` or `"default"` triggers a default-version lookup;
/// everything else is parsed as a constraint expression (§4.2 step 3).
pub fn resolve(
    catalog_path: &Path,
    id: &str,
    constraint: &str,
    stack: &str,
) -> Result<Dependency, ResolveError> {
    let catalog = Catalog::load(catalog_path)?;
    resolve_from_catalog(&catalog, id, constraint, stack)
}

pub fn resolve_from_catalog(
    catalog: &Catalog,
    id: &str,
    constraint: &str,
    stack: &str,
) -> Result<Dependency, ResolveError> {
    // Step 1: filter to this id, on a compatible stack.
    let candidates: Vec<&Dependency> = catalog
        .dependencies
        .iter()
        .filter(|d| d.id == id && d.matches_stack(stack))
        .collect();

    // Step 2: resolve the effective constraint string.
    let effective = match constraint {
        "" | "default" => catalog
            .default_versions
            .get(id)
            .cloned()
            .unwrap_or_else(|| "*".to_string()),
        other => other.to_string(),
    };

    tracing::debug!(id, stack, constraint = %effective, "resolving dependency");

    // Step 3: parse the effective constraint.
    let parsed_constraint =
        Constraint::parse(&effective).map_err(|source| ResolveError::InvalidConstraint {
            id: id.to_string(),
            constraint: effective.clone(),
            source,
        })?;

    // Step 4: parse every candidate's version up front.
    let mut versioned: Vec<(Version, &Dependency)> = Vec::with_capacity(candidates.len());
    for dep in &candidates {
        let version =
            Version::parse(&dep.version).map_err(|source| ResolveError::InvalidVersion {
                id: id.to_string(),
                version: dep.version.clone(),
                source,
            })?;
        versioned.push((version, dep));
    }

    // Step 5: keep only versions satisfying the constraint.
    let mut matching: Vec<(Version, &Dependency)> = versioned
        .iter()
        .filter(|(v, _)| parsed_constraint.matches(v))
        .map(|(v, d)| (v.clone(), *d))
        .collect();

    if matching.is_empty() {
        let mut available: Vec<String> = versioned
            .iter()
            .map(|(v, _)| v.to_string())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        available.sort_by(|a, b| {
            Version::parse(a)
                .unwrap()
                .cmp(&Version::parse(b).unwrap())
        });
        return Err(ResolveError::NoCompatibleVersion {
            id: id.to_string(),
            stack: stack.to_string(),
            available,
        });
    }

    // Step 6: sort descending by version, stable so catalog order survives ties.
    matching.sort_by(|a, b| b.0.cmp(&a.0));

    let top_version = matching[0].0.clone();
    let tied: Vec<&Dependency> = matching
        .iter()
        .filter(|(v, _)| *v == top_version)
        .map(|(_, d)| *d)
        .collect();

    if tied.len() == 1 {
        tracing::debug!(id, version = %top_version, uri = %tied[0].uri, "resolved dependency");
        return Ok(tied[0].clone());
    }

    // Step 7: tie-break — prefer a record that doesn't carry the wildcard
    // stack at all, even if it also happens to list `stack` explicitly
    // (e.g. `stacks=["s","*"]` is wildcard-bearing, not specific).
    let specific: Vec<&Dependency> = tied
        .iter()
        .filter(|d| !d.is_wildcard_stack())
        .copied()
        .collect();

    if let Some(first) = specific.first() {
        return Ok((*first).clone());
    }

    let wildcard_only: Vec<&Dependency> = tied
        .iter()
        .filter(|d| d.is_wildcard_stack())
        .copied()
        .collect();

    if wildcard_only.len() > 1 {
        return Err(ResolveError::AmbiguousWildcard {
            id: id.to_string(),
            version: top_version.to_string(),
        });
    }

    Ok(tied[0].clone())
}
